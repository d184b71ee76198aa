//! Rotation dial: turns a horizontal drag into a bounded angle.

use std::f64::consts::{FRAC_PI_4, FRAC_PI_8};

/// Largest swing a full-width drag produces.
pub const MAX_DRAG_SWING: f64 = FRAC_PI_4;

/// Largest distance from the main angle.
pub const MAX_DEVIATION: f64 = FRAC_PI_8;

/// Drag-to-angle state for the straighten control.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationDial {
    angle: f64,
    start_angle: f64,
    main_angle: f64,
}

impl RotationDial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current angle in radians, clockwise on screen.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn main_angle(&self) -> f64 {
        self.main_angle
    }

    /// Sets the angle directly, bounded around the main angle.
    pub fn set_angle(&mut self, angle: f64) {
        if angle.is_finite() {
            self.angle = self.bounded(angle);
        }
    }

    pub fn begin(&mut self) {
        self.start_angle = self.angle;
    }

    /// Applies the cumulative horizontal translation of the drag on a dial
    /// `dial_width` wide. Dragging left turns clockwise.
    ///
    /// Returns the new angle, or `None` when it did not change.
    pub fn drag_changed(&mut self, translation_x: f64, dial_width: f64) -> Option<f64> {
        if !translation_x.is_finite() || !dial_width.is_finite() || dial_width <= 0.0 {
            return None;
        }
        let intensity = (-translation_x / (dial_width / 2.0)).clamp(-1.0, 1.0);
        let angle = self.bounded(self.start_angle + MAX_DRAG_SWING * intensity);
        if angle == self.angle {
            return None;
        }
        self.angle = angle;
        Some(angle)
    }

    pub fn reset(&mut self) {
        self.angle = self.main_angle;
        self.start_angle = self.main_angle;
    }

    fn bounded(&self, angle: f64) -> f64 {
        angle.clamp(
            self.main_angle - MAX_DEVIATION,
            self.main_angle + MAX_DEVIATION,
        )
    }
}
