//! Push/pull.
//!
//! Moves every element the same distance along its line to the pivot.
//! Positive values pull toward the pivot, negative push away. With an axis
//! constraint the per-element direction is projected onto the permitted
//! axes first, so the motion stays inside the constraint.

use std::fmt::Write as _;

use glam::Vec3;

use xformkit_core::input::InputMode;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result};

use crate::kernel::{resolve_num_input, ModeKernel};

pub struct PushPull;

impl ModeKernel for PushPull {
    fn kind(&self) -> ModeKind {
        ModeKind::PushPull
    }

    fn input_mode(&self) -> InputMode {
        InputMode::VerticalAbsolute
    }

    fn init(&self, _t: &mut TransformSession) -> Result<()> {
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        resolve_num_input(t, 1);
        let distance = t.values_final[0];

        let center_global = t.center_global;
        // Borrow the constraint out so the projection can run per element.
        let con = t.con.clone();
        for group in t.groups.iter_mut() {
            let center = group.to_local(center_global);
            for el in group.elements.iter_mut() {
                if !el.is_transformed() {
                    continue;
                }
                if el.is_unaffected() {
                    el.co = el.co_orig;
                    continue;
                }
                let mut dir = center - el.co_orig;
                if con.applied {
                    dir = con.constrain_vector(dir);
                }
                let dir = dir.normalize_or_zero();
                if dir == Vec3::ZERO {
                    el.co = el.co_orig;
                    continue;
                }
                el.co = el.co_orig + el.protect_location(dir * distance * el.factor);
            }
        }

        let mut out = String::new();
        if t.num.has_input() {
            let _ = write!(out, "Push/Pull: {}", t.num.display());
        } else {
            let _ = write!(out, "Push/Pull: {distance:.4}");
        }
        if con.applied {
            let _ = write!(out, " {}", con.label);
        }
        t.header = out;
    }
}
