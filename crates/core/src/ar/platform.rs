//! Capability interface to the XR runtime.

use super::{ArError, Pose, SessionId};

/// Reference frames the viewer asks the runtime for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSpaceKind {
    /// Origin at the viewer (camera); used to cast hit-test rays.
    Viewer,
    /// Origin at floor level; hit results are reported in this frame.
    LocalFloor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTestSourceHandle(pub u32);

/// Whether the runtime can estimate real-world surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTestCapability {
    Supported,
    Unsupported,
}

/// The XR runtime as seen by [`ArView`](super::ArView).
///
/// Capability is queried once per session. Hit-test sources are created
/// asynchronously: `request_hit_test_source` only starts the request, and
/// the host reports completion through
/// [`ArView::on_hit_test_source_ready`](super::ArView::on_hit_test_source_ready)
/// with the session id passed here.
pub trait XrPlatform {
    fn hit_test_capability(&self) -> HitTestCapability;

    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> Result<SpaceHandle, ArError>;

    fn request_hit_test_source(
        &mut self,
        session: SessionId,
        space: SpaceHandle,
    ) -> Result<(), ArError>;

    /// Candidate surface poses for the current frame, expressed in `base`.
    fn hit_test_results(&self, source: HitTestSourceHandle, base: SpaceHandle) -> Vec<Pose>;

    fn cancel_hit_test_source(&mut self, source: HitTestSourceHandle);
}
