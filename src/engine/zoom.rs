pub const SCALE_MIN: f32 = 0.5;
pub const SCALE_MAX: f32 = 2.0;
pub const SCALE_STEP: f32 = 0.25;
pub const SCALE_DEFAULT: f32 = 1.0;

/// Pixels per day at scale 1.0.
pub const DAY_WIDTH_BASE: f32 = 24.0;

// The scale is kept as a whole number of steps away from the default so
// that the bounds are hit exactly, with no float drift.
const MIN_STEPS: i32 = -2;
const MAX_STEPS: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoomController {
    steps: i32,
}

impl ZoomController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted scale, snapped to the nearest step and clamped.
    pub fn with_scale(scale: f32) -> Self {
        if !scale.is_finite() {
            return Self::default();
        }
        let steps = ((scale - SCALE_DEFAULT) / SCALE_STEP).round();
        Self {
            steps: (steps as i32).clamp(MIN_STEPS, MAX_STEPS),
        }
    }

    pub fn scale(&self) -> f32 {
        SCALE_DEFAULT + self.steps as f32 * SCALE_STEP
    }

    /// Current pixels per day.
    pub fn day_width(&self) -> f32 {
        DAY_WIDTH_BASE * self.scale()
    }

    pub fn can_zoom_in(&self) -> bool {
        self.steps < MAX_STEPS
    }

    pub fn can_zoom_out(&self) -> bool {
        self.steps > MIN_STEPS
    }

    /// Returns whether the scale changed.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.steps += 1;
        true
    }

    /// Returns whether the scale changed.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.steps -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.steps = 0;
    }

    /// Wheel gesture, honoured only while the zoom modifier is held.
    /// Negative `delta_y` (wheel away from the user) zooms in. Returns
    /// whether the gesture was consumed.
    pub fn on_wheel(&mut self, delta_y: f32, modifier_held: bool) -> bool {
        if !modifier_held || delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        if delta_y < 0.0 {
            self.zoom_in();
        } else {
            self.zoom_out();
        }
        true
    }
}
