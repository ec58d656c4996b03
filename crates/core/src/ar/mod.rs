//! AR exercise viewer.
//!
//! A single configurable component that loads an exercise model, anchors it
//! to the first detected real-world surface, and lets the user drag, twist
//! and pinch it. The platform (camera tracking, hit testing, asset fetching,
//! drawing) sits behind traits so the placement logic is plain Rust and can
//! be driven by a browser host, a native XR runtime, or tests.
//!
//! Everything here runs on one thread. Platform requests that complete
//! later carry the [`SessionId`] they were issued for, and completions for
//! a session that has since ended are dropped.

pub mod animation;
pub mod interaction;
pub mod loader;
pub mod placement;
pub mod platform;
pub mod render_loop;
pub mod surface;
#[cfg(test)]
mod testing;
pub mod view;

use glam::{Quat, Vec3};

pub use animation::{AnimationClip, AnimationPlayer};
pub use interaction::{DragMapping, InteractionBounds, InteractionConfig, InteractionHandler};
pub use loader::{Aabb, AssetSource, LoadedAsset, LoadedModel, ModelLoader, SceneModel};
pub use placement::{PlacementController, PlacementMode, PlacementState};
pub use platform::{HitTestCapability, HitTestSourceHandle, ReferenceSpaceKind, SpaceHandle, XrPlatform};
pub use render_loop::{FrameClock, FrameSnapshot, RenderLoop, Renderer};
pub use surface::SurfaceDetector;
pub use view::{ArView, ArViewConfig, LoadTicket};

/// Identifies one AR session. A new id is issued on every session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// A position and orientation in some reference space (metres, radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Transform a point from this pose's local frame into its parent frame.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.orientation * local
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArError {
    #[error("Failed to load asset '{url}': {reason}")]
    AssetLoad { url: String, reason: String },

    #[error("Asset '{url}' has zero height")]
    DegenerateBounds { url: String },

    #[error("Platform request failed: {0}")]
    Platform(String),
}
