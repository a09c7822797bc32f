use glam::{Mat4, Vec2, Vec3};

use crate::math::{self, ScreenPoint};
use crate::store::CreatePlacement;

/// Preview nodes render at the asset's native size times this factor.
pub const BASE_SCALE: f32 = 0.01;
/// Lower bound on the interactive scale, absolute (not relative to
/// [`BASE_SCALE`]).
pub const MIN_SCALE: f32 = 0.001;
/// Upper bound on the interactive scale.
pub const MAX_SCALE: f32 = 0.1;
/// Screen pixels to world meters for the two-finger height adjustment.
pub const LIFT_SENSITIVITY: f32 = 0.002;

/// Which gesture a [`GestureEvent::GestureEnded`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Pan,
    Pinch,
    Rotate,
    TwoFingerPan,
}

/// Discrete gesture input produced by the host UI layer. Events for a given
/// gesture arrive strictly ordered and one at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    TapAt(ScreenPoint),
    /// Single-touch drag; carries the current touch location.
    PanChanged(ScreenPoint),
    /// Per-frame relative scale change; the recognizer resets its factor to
    /// 1 after each delivery, so consecutive events compound.
    PinchChanged(f32),
    /// Cumulative rotation in radians since the gesture began.
    RotateChanged(f32),
    /// Per-frame two-finger translation in screen pixels; only the vertical
    /// component is consumed.
    TwoFingerPanChanged(Vec2),
    GestureEnded(Gesture),
}

/// Transient state of an object being positioned.
///
/// Opened from a surface hit, mutated by gesture deltas, and consumed by
/// commit. At most one session exists at a time; cancelling simply drops it.
#[derive(Debug, Clone)]
pub struct PlacementSession {
    model: String,
    baseline: Mat4,
    position: Vec3,
    scale: f32,
    rotation_y: f32,
    rotation_baseline: f32,
}

impl PlacementSession {
    pub fn open(model: impl Into<String>, baseline: Mat4) -> Self {
        Self {
            model: model.into(),
            baseline,
            position: math::translation(&baseline),
            scale: BASE_SCALE,
            rotation_y: 0.0,
            rotation_baseline: 0.0,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn baseline(&self) -> Mat4 {
        self.baseline
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Absolute scale of the preview node.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rotation about the vertical axis in radians. Not normalized; may wrap.
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Drag: each surface hit replaces the position outright and moves the
    /// baseline so later gestures pivot around the new surface point. No
    /// accumulation across frames.
    pub fn drag_to(&mut self, transform: Mat4) {
        self.baseline = transform;
        self.position = math::translation(&transform);
    }

    /// Pinch: continuously-compounding multiplicative scale, clamped to
    /// `[MIN_SCALE, MAX_SCALE]`.
    pub fn pinch(&mut self, factor: f32) {
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Rotate: `delta` is the gesture's cumulative rotation since it began,
    /// negated to match the screen-to-world handedness.
    pub fn rotate(&mut self, delta: f32) {
        self.rotation_y = self.rotation_baseline - delta;
    }

    /// Latches the current rotation as the baseline for the next rotate
    /// gesture.
    pub fn end_rotate(&mut self) {
        self.rotation_baseline = self.rotation_y;
    }

    /// Two-finger vertical pan lifts the object off the detected plane; an
    /// independent axis the horizontal drag cannot reach.
    pub fn lift(&mut self, translation_y: f32) {
        self.position.y += -translation_y * LIFT_SENSITIVITY;
    }

    /// Switches the previewed asset without resetting the accumulated
    /// position, scale, or rotation.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Commit payload. The absolute scale is normalized back to a multiplier
    /// against [`BASE_SCALE`], which is what the store records.
    pub fn finish(self) -> CreatePlacement {
        CreatePlacement {
            model: self.model,
            position: self.position,
            rotation_y: self.rotation_y,
            scale: self.scale / BASE_SCALE,
        }
    }
}
