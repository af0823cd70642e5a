//! Shear.
//!
//! Offsets each element along the view's horizontal axis in proportion to
//! its coordinate along the vertical axis (or the transpose when the
//! alternate toggle is set). The shear matrix is built in the view basis
//! and sandwiched back into global space.

use std::fmt::Write as _;

use glam::{Mat3, Vec3};

use xformkit_core::flags::SessionFlags;
use xformkit_core::input::InputMode;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result};

use crate::kernel::{resolve_num_input, ModeKernel};
use crate::parallel::for_each_element;

pub struct Shear;

impl ModeKernel for Shear {
    fn kind(&self) -> ModeKind {
        ModeKind::Shear
    }

    fn input_mode(&self) -> InputMode {
        InputMode::HorizontalRatio
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        // Shear happens in the view plane; axis constraints do not apply.
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        t.custom_vecs[0] = t.view.right();
        t.custom_vecs[1] = t.view.up();
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        resolve_num_input(t, 1);
        let value = t.values_final[0];

        let right = t.custom_vecs[0];
        let up = t.custom_vecs[1];
        let normal = right.cross(up);
        let basis = Mat3::from_cols(right, up, normal);

        // Vertical shear moves along up proportional to the right
        // coordinate; horizontal is the transpose.
        let mut smat = Mat3::IDENTITY;
        if t.flags.has(SessionFlags::ALT_TRANSFORM) {
            *smat.col_mut(0) = Vec3::new(1.0, value, 0.0);
        } else {
            *smat.col_mut(1) = Vec3::new(value, 1.0, 0.0);
        }
        let mat = basis * smat * basis.transpose();

        shear_elements(t, mat);

        let mut out = String::new();
        if t.num.has_input() {
            let _ = write!(out, "Shear: {}", t.num.display());
        } else {
            let _ = write!(out, "Shear: {value:.4}");
        }
        t.header = out;
    }
}

fn shear_elements(t: &mut TransformSession, mat: Mat3) {
    let center_global = t.center_global;
    let threshold = t.settings.read().parallel_threshold;
    for group in t.groups.iter_mut() {
        let local_mat = group.imat3 * mat * group.mat3;
        let center = group.to_local(center_global);
        for_each_element(group, threshold, |el, _| {
            if !el.is_transformed() {
                return;
            }
            if el.is_unaffected() {
                el.co = el.co_orig;
                return;
            }
            let rel = el.co_orig - center;
            let sheared = el.smtx * (local_mat * (el.mtx * rel));
            let delta = (sheared - rel) * el.factor;
            el.co = el.co_orig + el.protect_location(delta);
        });
    }
}
