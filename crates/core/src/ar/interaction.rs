//! Touch manipulation of a placed model.
//!
//! One pointer drags (translate on the floor plane, or twist about the
//! vertical axis); two pointers pinch to push the model nearer or further.
//! Offsets are tracked relative to the placement anchor and clamped to
//! [`InteractionBounds`], and the model's height never changes.

use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Quat, Vec2, Vec3};

use super::loader::SceneModel;
use super::Pose;

pub type PointerId = u32;

/// What a single-pointer drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMapping {
    /// Screen x/y move the model along the anchor's own x/z axes.
    TranslateHorizontal,
    /// Screen x twists the model about the vertical axis.
    RotateY,
}

/// Limits on how far interaction may move the model from its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionBounds {
    /// Maximum floor-plane distance from the anchor, in metres.
    pub max_horizontal_offset: f32,
    pub min_depth_offset: f32,
    pub max_depth_offset: f32,
}

impl Default for InteractionBounds {
    fn default() -> Self {
        Self {
            max_horizontal_offset: 3.0,
            min_depth_offset: -2.0,
            max_depth_offset: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    pub single_drag: DragMapping,
    /// Metres per screen pixel.
    pub translate_sensitivity: f32,
    /// Radians per screen pixel.
    pub rotate_sensitivity: f32,
    pub pinch_enabled: bool,
    /// Metres of depth per pixel of change in finger spread.
    pub pinch_sensitivity: f32,
    pub bounds: InteractionBounds,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            single_drag: DragMapping::RotateY,
            translate_sensitivity: 0.005,
            rotate_sensitivity: 0.005,
            pinch_enabled: false,
            pinch_sensitivity: 0.005,
            bounds: InteractionBounds::default(),
        }
    }
}

#[derive(Debug)]
pub struct InteractionHandler {
    config: InteractionConfig,
    pointers: Vec<(PointerId, Vec2)>,
    last_spread: Option<f32>,
    drag_offset: Vec2,
    depth_offset: f32,
    yaw: f32,
}

impl InteractionHandler {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            pointers: Vec::with_capacity(2),
            last_spread: None,
            drag_offset: Vec2::ZERO,
            depth_offset: 0.0,
            yaw: 0.0,
        }
    }

    /// Start tracking a pointer. A third simultaneous pointer is ignored.
    pub fn pointer_down(&mut self, id: PointerId, position: Vec2) {
        if self.pointers.iter().any(|(p, _)| *p == id) || self.pointers.len() >= 2 {
            return;
        }
        self.pointers.push((id, position));
        self.last_spread = self.spread();
    }

    /// Apply a pointer move to `model`. Returns whether the model changed.
    pub fn pointer_move(
        &mut self,
        id: PointerId,
        position: Vec2,
        anchor: Pose,
        model: &mut SceneModel,
    ) -> bool {
        let Some(index) = self.pointers.iter().position(|(p, _)| *p == id) else {
            return false;
        };
        let previous = self.pointers[index].1;
        self.pointers[index].1 = position;

        let changed = match self.pointers.len() {
            1 => self.drag(position - previous),
            _ => self.pinch(),
        };
        if changed {
            self.apply(anchor, model);
        }
        changed
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        self.pointers.retain(|(p, _)| *p != id);
        self.last_spread = self.spread();
    }

    /// Forget pointers and offsets. Called when a session ends.
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.last_spread = None;
        self.drag_offset = Vec2::ZERO;
        self.depth_offset = 0.0;
        self.yaw = 0.0;
    }

    /// Write the anchor plus the current offsets into `model`.
    ///
    /// Offsets are expressed in the anchor's heading, so "drag up" moves the
    /// model along the direction the anchor faces whatever its world yaw.
    pub fn apply(&self, anchor: Pose, model: &mut SceneModel) {
        let local = Vec3::new(
            self.drag_offset.x,
            0.0,
            self.drag_offset.y + self.depth_offset,
        );
        model.translation = anchor.position
            + heading(anchor.orientation) * local
            + Vec3::Y * model.floor_offset;
        model.rotation = anchor.orientation * Quat::from_rotation_y(self.yaw);
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn drag_offset(&self) -> Vec2 {
        self.drag_offset
    }

    pub fn depth_offset(&self) -> f32 {
        self.depth_offset
    }

    fn drag(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        match self.config.single_drag {
            DragMapping::TranslateHorizontal => {
                let offset = self.drag_offset + delta * self.config.translate_sensitivity;
                self.drag_offset = offset.clamp_length_max(self.config.bounds.max_horizontal_offset);
            }
            DragMapping::RotateY => {
                self.yaw = wrap_angle(self.yaw + delta.x * self.config.rotate_sensitivity);
            }
        }
        true
    }

    fn pinch(&mut self) -> bool {
        let spread = self.spread();
        let previous = std::mem::replace(&mut self.last_spread, spread);
        if !self.config.pinch_enabled {
            return false;
        }
        let (Some(spread), Some(previous)) = (spread, previous) else {
            return false;
        };
        let change = spread - previous;
        if change == 0.0 {
            return false;
        }
        let bounds = self.config.bounds;
        self.depth_offset = (self.depth_offset + change * self.config.pinch_sensitivity)
            .clamp(bounds.min_depth_offset, bounds.max_depth_offset);
        true
    }

    fn spread(&self) -> Option<f32> {
        match self.pointers.as_slice() {
            [(_, a), (_, b)] => Some(a.distance(*b)),
            _ => None,
        }
    }
}

/// The rotation about the vertical axis contained in `orientation`.
fn heading(orientation: Quat) -> Quat {
    let (yaw, _, _) = orientation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

/// Wrap an angle into (-pi, pi].
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
