//! Shrink/fatten.
//!
//! Moves each element along its own normal (the Z column of its axis
//! matrix). The alternate toggle enables even-thickness offsets, scaling
//! each element's step by its shell factor so oblique corners keep the
//! wall thickness constant.

use std::fmt::Write as _;

use xformkit_core::flags::SessionFlags;
use xformkit_core::input::InputMode;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result};

use crate::kernel::{resolve_num_input, ModeKernel};
use crate::parallel::for_each_element;

pub struct ShrinkFatten;

impl ModeKernel for ShrinkFatten {
    fn kind(&self) -> ModeKind {
        ModeKind::ShrinkFatten
    }

    fn input_mode(&self) -> InputMode {
        InputMode::VerticalAbsolute
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        resolve_num_input(t, 1);
        let offset = t.values_final[0];
        let even = t.flags.has(SessionFlags::ALT_TRANSFORM);

        let threshold = t.settings.read().parallel_threshold;
        for group in t.groups.iter_mut() {
            for_each_element(group, threshold, |el, ext| {
                if !el.is_transformed() {
                    return;
                }
                if el.is_unaffected() {
                    el.co = el.co_orig;
                    return;
                }
                let normal = el.axis_mtx.z_axis;
                let mut dist = offset * el.factor;
                if even {
                    if let Some(ext) = ext {
                        dist *= ext.shell_factor;
                    }
                }
                el.co = el.co_orig + el.protect_location(normal * dist);
            });
        }

        let mut out = String::new();
        if t.num.has_input() {
            let _ = write!(out, "Shrink/Fatten: {}", t.num.display());
        } else {
            let _ = write!(out, "Shrink/Fatten: {offset:.4}");
        }
        if even {
            out.push_str(" (Even)");
        }
        t.header = out;
    }
}
