//! In-memory XR runtime for unit tests.

use super::platform::{HitTestCapability, HitTestSourceHandle, ReferenceSpaceKind, SpaceHandle, XrPlatform};
use super::render_loop::{FrameSnapshot, Renderer};
use super::{ArError, Pose, SessionId};

#[derive(Debug)]
pub struct FakePlatform {
    pub capability: HitTestCapability,
    pub fail_reference_space: bool,
    pub spaces: Vec<ReferenceSpaceKind>,
    pub source_requests: Vec<SessionId>,
    pub cancelled: Vec<HitTestSourceHandle>,
    pub results: Vec<Pose>,
}

impl FakePlatform {
    pub fn supported() -> Self {
        Self {
            capability: HitTestCapability::Supported,
            fail_reference_space: false,
            spaces: Vec::new(),
            source_requests: Vec::new(),
            cancelled: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            capability: HitTestCapability::Unsupported,
            ..Self::supported()
        }
    }
}

impl XrPlatform for FakePlatform {
    fn hit_test_capability(&self) -> HitTestCapability {
        self.capability
    }

    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> Result<SpaceHandle, ArError> {
        if self.fail_reference_space {
            return Err(ArError::Platform("reference space unavailable".into()));
        }
        self.spaces.push(kind);
        Ok(SpaceHandle(self.spaces.len() as u32))
    }

    fn request_hit_test_source(&mut self, session: SessionId, _space: SpaceHandle) -> Result<(), ArError> {
        self.source_requests.push(session);
        Ok(())
    }

    fn hit_test_results(&self, source: HitTestSourceHandle, _base: SpaceHandle) -> Vec<Pose> {
        if self.cancelled.contains(&source) {
            return Vec::new();
        }
        self.results.clone()
    }

    fn cancel_hit_test_source(&mut self, source: HitTestSourceHandle) {
        self.cancelled.push(source);
    }
}

/// Records every frame it is asked to draw.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<(bool, Option<Pose>)>,
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, frame: &FrameSnapshot<'_>) {
        let model_visible = frame.model.is_some_and(|m| m.visible);
        self.frames.push((model_visible, frame.reticle));
    }
}
