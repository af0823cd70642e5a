//! Pointer shaping.
//!
//! Raw cursor positions become the one to three floats a mode kernel
//! consumes. Precision is implemented with a virtual pointer so holding
//! the modifier slows motion without snapping the output, and mode or
//! orientation changes rebase the accumulator so the output never jumps.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::view::ViewParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Output stays zero; the mode is driven by typed values only.
    None,
    /// 2-D offset from the press position, converted to world units.
    Vector,
    /// Ratio of current to initial distance from the pivot.
    Spring,
    /// Spring that negates when the pointer crosses the pivot.
    SpringFlip,
    /// Spring minus one, so the neutral pose maps to zero.
    SpringDelta,
    /// Accumulated pixel travel scaled into two tilt angles.
    Trackball,
    /// Accumulated signed angle swept around the pivot.
    Angle,
    /// Angle expressed as a spring-like scalar for springy modes.
    AngleSpring,
    /// Horizontal travel as a fraction of the region width.
    HorizontalRatio,
    /// Horizontal travel in world units along the view right axis.
    HorizontalAbsolute,
    /// Vertical travel as a fraction of the region height.
    VerticalRatio,
    /// Vertical travel in world units along the view up axis.
    VerticalAbsolute,
    /// Travel projected on a caller-provided screen direction.
    CustomRatio,
    /// Custom ratio that flips past the reference segment start.
    CustomRatioFlip,
}

const TRACKBALL_FACTOR: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct PointerInput {
    pub mode: InputMode,
    /// Pointer position when the session started.
    imval: Vec2,
    /// Pivot in window pixels.
    center: Vec2,
    /// Virtual pointer position; tracks the raw pointer at reduced speed
    /// while precision is held.
    virtual_pos: Vec2,
    /// Last raw position seen, for per-step deltas.
    prev_raw: Vec2,
    precision: bool,
    precision_factor: f32,
    /// Precision scale used by the angular modes, usually coarser than the
    /// linear one so slow orbits stay controllable.
    angle_precision_factor: f32,
    /// Accumulated in f64 so many small steps do not drift.
    angle_accum: f64,
    /// Reference segment for the custom-ratio modes.
    custom_ref: [Vec2; 2],
}

impl PointerInput {
    pub fn new(mode: InputMode, center: Vec2, imval: Vec2) -> Self {
        Self {
            mode,
            imval,
            center,
            virtual_pos: imval,
            prev_raw: imval,
            precision: false,
            precision_factor: 0.1,
            angle_precision_factor: 0.1,
            angle_accum: 0.0,
            custom_ref: [center, imval],
        }
    }

    pub fn with_precision_factor(mut self, factor: f32) -> Self {
        self.precision_factor = factor;
        self
    }

    pub fn with_angle_precision_factor(mut self, factor: f32) -> Self {
        self.angle_precision_factor = factor;
        self
    }

    pub fn set_precision(&mut self, on: bool) {
        self.precision = on;
    }

    pub fn precision(&self) -> bool {
        self.precision
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Reference segment for `CustomRatio` modes, in window pixels.
    pub fn set_custom_ref(&mut self, from: Vec2, to: Vec2) {
        self.custom_ref = [from, to];
    }

    /// Switch the shaping mode mid-modal. The virtual pointer is reset to
    /// the current raw position so the new mode starts from neutral.
    pub fn set_mode(&mut self, mode: InputMode, raw: Vec2) {
        self.mode = mode;
        self.imval = raw;
        self.virtual_pos = raw;
        self.prev_raw = raw;
        self.angle_accum = 0.0;
    }

    /// Move the pivot without changing the current output. The initial and
    /// virtual positions shift by the same amount so distances and angles
    /// are preserved.
    pub fn rebase_center(&mut self, center: Vec2) {
        let shift = center - self.center;
        self.center = center;
        self.imval += shift;
        self.virtual_pos += shift;
        self.prev_raw += shift;
    }

    fn advance(&mut self, raw: Vec2) -> Vec2 {
        let delta = raw - self.prev_raw;
        self.prev_raw = raw;
        let scale = if self.precision {
            match self.mode {
                InputMode::Angle | InputMode::AngleSpring | InputMode::Trackball => {
                    self.angle_precision_factor
                }
                _ => self.precision_factor,
            }
        } else {
            1.0
        };
        self.virtual_pos += delta * scale;
        delta * scale
    }

    /// Shape one pointer sample into up to three floats.
    pub fn apply(&mut self, view: &ViewParams, raw: Vec2) -> [f32; 3] {
        let step = self.advance(raw);
        let pos = self.virtual_pos;
        match self.mode {
            InputMode::None => [0.0; 3],
            InputMode::Vector => {
                let world = view.delta_to_world(view.apply_aspect(pos - self.imval));
                world.to_array()
            }
            InputMode::Spring => [self.spring_ratio(pos), 0.0, 0.0],
            InputMode::SpringFlip => {
                let mut ratio = self.spring_ratio(pos);
                if self.crossed_pivot(pos) {
                    ratio = -ratio;
                }
                [ratio, 0.0, 0.0]
            }
            InputMode::SpringDelta => [self.spring_ratio(pos) - 1.0, 0.0, 0.0],
            InputMode::Trackball => [
                (pos.y - self.imval.y) * TRACKBALL_FACTOR,
                (pos.x - self.imval.x) * TRACKBALL_FACTOR,
                0.0,
            ],
            InputMode::Angle | InputMode::AngleSpring => {
                self.accumulate_angle(step);
                let angle = self.angle_accum as f32;
                if self.mode == InputMode::Angle {
                    [angle, 0.0, 0.0]
                } else {
                    [1.0 + angle, 0.0, 0.0]
                }
            }
            InputMode::HorizontalRatio => {
                [(pos.x - self.imval.x) / view.win_size.x * 2.0, 0.0, 0.0]
            }
            InputMode::VerticalRatio => {
                [(pos.y - self.imval.y) / view.win_size.y * 2.0, 0.0, 0.0]
            }
            InputMode::HorizontalAbsolute => {
                let world = view.delta_to_world(pos - self.imval);
                [world.dot(view.right()), 0.0, 0.0]
            }
            InputMode::VerticalAbsolute => {
                let world = view.delta_to_world(pos - self.imval);
                [world.dot(view.up()), 0.0, 0.0]
            }
            InputMode::CustomRatio | InputMode::CustomRatioFlip => {
                [self.custom_ratio(pos), 0.0, 0.0]
            }
        }
    }

    fn spring_ratio(&self, pos: Vec2) -> f32 {
        let initial = (self.imval - self.center).length();
        if initial < 1.0 {
            // Pointer started on the pivot; fall back to horizontal travel.
            return 1.0 + (pos.x - self.imval.x) / 100.0;
        }
        (pos - self.center).length() / initial
    }

    /// True when the pointer moved to the opposite side of the pivot from
    /// where it started. The dot is taken in f64 so a near-perpendicular
    /// crossing does not flicker.
    fn crossed_pivot(&self, pos: Vec2) -> bool {
        let a = self.imval - self.center;
        let b = pos - self.center;
        let dot = a.x as f64 * b.x as f64 + a.y as f64 * b.y as f64;
        dot < 0.0
    }

    fn accumulate_angle(&mut self, step: Vec2) {
        // Signed angle swept this step, from the previous virtual position
        // to the current one, around the pivot.
        let curr = self.virtual_pos - self.center;
        let prev = curr - step;
        if prev.length_squared() < 1.0 || curr.length_squared() < 1.0 {
            return;
        }
        let cross = prev.x as f64 * curr.y as f64 - prev.y as f64 * curr.x as f64;
        let dot = prev.x as f64 * curr.x as f64 + prev.y as f64 * curr.y as f64;
        self.angle_accum += cross.atan2(dot);
    }

    fn custom_ratio(&self, pos: Vec2) -> f32 {
        let dir = self.custom_ref[1] - self.custom_ref[0];
        let len_sq = dir.length_squared();
        if len_sq < f32::EPSILON {
            return 0.0;
        }
        let t = (pos - self.custom_ref[0]).dot(dir) / len_sq;
        if self.mode == InputMode::CustomRatioFlip {
            t
        } else {
            t.abs()
        }
    }
}
