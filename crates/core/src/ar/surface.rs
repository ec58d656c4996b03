//! Surface detection over the runtime's hit-test API.

use super::platform::{HitTestCapability, HitTestSourceHandle, ReferenceSpaceKind, SpaceHandle, XrPlatform};
use super::{Pose, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    /// No session.
    Idle,
    /// Hit testing unavailable for this session; no surfaces will be reported.
    Unsupported,
    /// Source requested, not yet delivered.
    Pending {
        session: SessionId,
        floor: SpaceHandle,
    },
    Active {
        floor: SpaceHandle,
        source: HitTestSourceHandle,
    },
}

/// Yields the first candidate surface pose per frame while a hit-test
/// source is active.
#[derive(Debug)]
pub struct SurfaceDetector {
    state: DetectorState,
}

impl Default for SurfaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceDetector {
    pub fn new() -> Self {
        Self {
            state: DetectorState::Idle,
        }
    }

    /// Set up detection for a new session.
    ///
    /// Any previous source is released first. Returns the capability that
    /// was found; on `Unsupported` (or a failed request) the caller should
    /// fall back to fixed-offset placement.
    pub fn start(&mut self, session: SessionId, platform: &mut dyn XrPlatform) -> HitTestCapability {
        self.stop(platform);

        if platform.hit_test_capability() == HitTestCapability::Unsupported {
            tracing::warn!(session = session.0, "Hit testing unsupported, using fixed-offset placement");
            self.state = DetectorState::Unsupported;
            return HitTestCapability::Unsupported;
        }

        let spaces = platform
            .request_reference_space(ReferenceSpaceKind::Viewer)
            .and_then(|viewer| {
                platform
                    .request_reference_space(ReferenceSpaceKind::LocalFloor)
                    .map(|floor| (viewer, floor))
            })
            .and_then(|(viewer, floor)| {
                platform
                    .request_hit_test_source(session, viewer)
                    .map(|()| floor)
            });

        match spaces {
            Ok(floor) => {
                self.state = DetectorState::Pending { session, floor };
                HitTestCapability::Supported
            }
            Err(e) => {
                tracing::warn!(session = session.0, error = %e, "Hit-test setup failed, using fixed-offset placement");
                self.state = DetectorState::Unsupported;
                HitTestCapability::Unsupported
            }
        }
    }

    /// Accept a hit-test source delivered by the runtime.
    ///
    /// Sources for any session other than the pending one are cancelled and
    /// ignored. Returns whether the source was accepted.
    pub fn on_source_ready(
        &mut self,
        session: SessionId,
        source: HitTestSourceHandle,
        platform: &mut dyn XrPlatform,
    ) -> bool {
        match self.state {
            DetectorState::Pending {
                session: pending,
                floor,
            } if pending == session => {
                self.state = DetectorState::Active { floor, source };
                true
            }
            _ => {
                tracing::debug!(session = session.0, "Dropping hit-test source for inactive session");
                platform.cancel_hit_test_source(source);
                false
            }
        }
    }

    /// The first candidate surface pose for this frame, in floor space.
    pub fn poll(&self, platform: &dyn XrPlatform) -> Option<Pose> {
        match self.state {
            DetectorState::Active { floor, source, .. } => {
                platform.hit_test_results(source, floor).into_iter().next()
            }
            _ => None,
        }
    }

    /// Release the source and forget the session's reference spaces.
    pub fn stop(&mut self, platform: &mut dyn XrPlatform) {
        if let DetectorState::Active { source, .. } = self.state {
            platform.cancel_hit_test_source(source);
        }
        self.state = DetectorState::Idle;
    }

    pub fn is_unsupported(&self) -> bool {
        self.state == DetectorState::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::super::testing::FakePlatform;
    use super::*;

    #[test]
    fn unsupported_platform_reports_nothing() {
        let mut platform = FakePlatform::unsupported();
        let mut detector = SurfaceDetector::new();
        assert_eq!(detector.start(SessionId(1), &mut platform), HitTestCapability::Unsupported);
        assert!(detector.is_unsupported());
        assert!(platform.source_requests.is_empty());
        assert_eq!(detector.poll(&platform), None);
    }

    #[test]
    fn requests_viewer_and_floor_spaces() {
        let mut platform = FakePlatform::supported();
        let mut detector = SurfaceDetector::new();
        detector.start(SessionId(1), &mut platform);
        assert_eq!(
            platform.spaces,
            vec![ReferenceSpaceKind::Viewer, ReferenceSpaceKind::LocalFloor]
        );
        assert_eq!(platform.source_requests, vec![SessionId(1)]);
    }

    #[test]
    fn failed_setup_falls_back() {
        let mut platform = FakePlatform::supported();
        platform.fail_reference_space = true;
        let mut detector = SurfaceDetector::new();
        assert_eq!(detector.start(SessionId(1), &mut platform), HitTestCapability::Unsupported);
        assert!(detector.is_unsupported());
    }

    #[test]
    fn yields_first_candidate_once_active() {
        let mut platform = FakePlatform::supported();
        platform.results = vec![
            Pose::from_position(Vec3::new(0.0, 0.0, -1.0)),
            Pose::from_position(Vec3::new(0.0, 0.0, -2.0)),
        ];
        let mut detector = SurfaceDetector::new();
        detector.start(SessionId(1), &mut platform);
        assert_eq!(detector.poll(&platform), None, "nothing before the source arrives");

        assert!(detector.on_source_ready(SessionId(1), HitTestSourceHandle(9), &mut platform));
        assert_eq!(detector.poll(&platform).unwrap().position.z, -1.0);
    }

    #[test]
    fn late_source_for_ended_session_is_cancelled() {
        let mut platform = FakePlatform::supported();
        platform.results = vec![Pose::from_position(Vec3::new(0.0, 0.0, -1.0))];
        let mut detector = SurfaceDetector::new();
        detector.start(SessionId(1), &mut platform);
        detector.stop(&mut platform);

        assert!(!detector.on_source_ready(SessionId(1), HitTestSourceHandle(4), &mut platform));
        assert_eq!(platform.cancelled, vec![HitTestSourceHandle(4)]);
        assert_eq!(detector.poll(&platform), None);
    }

    #[test]
    fn restart_releases_previous_source() {
        let mut platform = FakePlatform::supported();
        let mut detector = SurfaceDetector::new();
        detector.start(SessionId(1), &mut platform);
        detector.on_source_ready(SessionId(1), HitTestSourceHandle(1), &mut platform);

        detector.start(SessionId(2), &mut platform);
        assert_eq!(platform.cancelled, vec![HitTestSourceHandle(1)]);

        // A source for the old session arriving now is rejected.
        assert!(!detector.on_source_ready(SessionId(1), HitTestSourceHandle(2), &mut platform));
        assert!(detector.on_source_ready(SessionId(2), HitTestSourceHandle(3), &mut platform));
    }
}
