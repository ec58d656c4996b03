//! Unplaced -> Placed state machine.
//!
//! The model is anchored at most once per session. In automatic mode the
//! first surface pose anchors it; in manual mode surface poses only move a
//! reticle and a pointer-down over a visible reticle confirms placement.

use glam::Vec3;

use super::Pose;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    Automatic,
    ManualConfirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    Unplaced,
    Placed,
}

#[derive(Debug)]
pub struct PlacementController {
    mode: PlacementMode,
    state: PlacementState,
    reticle: Option<Pose>,
    anchor: Option<Pose>,
}

impl PlacementController {
    pub fn new(mode: PlacementMode) -> Self {
        Self {
            mode,
            state: PlacementState::Unplaced,
            reticle: None,
            anchor: None,
        }
    }

    /// Feed this frame's candidate surface pose.
    ///
    /// Returns the anchor pose if this call placed the model. `model_ready`
    /// is false while the model is still loading; nothing can be placed then.
    pub fn on_surface(&mut self, pose: Option<Pose>, model_ready: bool) -> Option<Pose> {
        if self.state == PlacementState::Placed {
            return None;
        }
        let pose = pose?;
        match self.mode {
            PlacementMode::Automatic if model_ready => self.place(pose),
            PlacementMode::Automatic | PlacementMode::ManualConfirm => {
                self.reticle = Some(pose);
                None
            }
        }
    }

    /// Handle a pointer-down. In manual mode this confirms placement at the
    /// reticle if it is showing.
    pub fn on_pointer_down(&mut self, model_ready: bool) -> Option<Pose> {
        if self.state == PlacementState::Placed
            || self.mode != PlacementMode::ManualConfirm
            || !model_ready
        {
            return None;
        }
        let pose = self.reticle?;
        self.place(pose)
    }

    fn place(&mut self, pose: Pose) -> Option<Pose> {
        tracing::info!(position = ?pose.position, "Model placed");
        self.state = PlacementState::Placed;
        self.reticle = None;
        self.anchor = Some(pose);
        Some(pose)
    }

    /// Back to `Unplaced`. Only a new session calls this.
    pub fn reset(&mut self) {
        self.state = PlacementState::Unplaced;
        self.reticle = None;
        self.anchor = None;
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn is_placed(&self) -> bool {
        self.state == PlacementState::Placed
    }

    /// Reticle pose while it is visible.
    pub fn reticle(&self) -> Option<Pose> {
        self.reticle
    }

    pub fn anchor(&self) -> Option<Pose> {
        self.anchor
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }
}

/// Pose `offset` metres in front of the viewer, dropped to floor level and
/// kept upright. Used when the runtime cannot hit-test.
///
/// The viewer looks down its local -Z axis, so an offset of
/// `(0, 0, -1.5)` means one and a half metres straight ahead.
pub fn fallback_pose(viewer: Pose, offset: Vec3) -> Pose {
    let mut position = viewer.transform_point(offset);
    position.y = 0.0;
    let forward = viewer.orientation * Vec3::NEG_Z;
    let yaw = forward.x.atan2(forward.z) + std::f32::consts::PI;
    Pose::new(position, glam::Quat::from_rotation_y(yaw))
}
