//! Scaling.
//!
//! Resize scales coordinates around the pivot through the element space
//! sandwich and writes per-axis scale channels where they exist. Skin
//! resize applies the same scalar to the per-element radius channel
//! instead of coordinates.

use std::fmt::Write as _;

use glam::{Mat3, Vec3};

use xformkit_core::element::{ElementExt, TransformElement};
use xformkit_core::flags::{ElementFlags, ModifierFlags};
use xformkit_core::input::InputMode;
use xformkit_core::math;
use xformkit_core::numinput::NumFlags;
use xformkit_core::session::TransformSession;
use xformkit_core::snap::increment_snap;
use xformkit_core::{ModeKind, Result};

use crate::kernel::{resolve_num_input, ModeKernel};
use crate::parallel::for_each_element;

pub struct Resize;

impl ModeKernel for Resize {
    fn kind(&self) -> ModeKind {
        ModeKind::Resize
    }

    fn input_mode(&self) -> InputMode {
        InputMode::SpringFlip
    }

    fn value_count(&self) -> usize {
        3
    }

    fn num_flags(&self) -> NumFlags {
        NumFlags::new(NumFlags::NULL_ONE | NumFlags::AFFECT_ALL)
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        use xformkit_core::flags::SessionFlags;
        t.flags.set(SessionFlags::NULL_ONE);
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        // A spring ratio is uniform until a constraint or typed value makes
        // it per-axis.
        let ratio = t.values[0];
        t.values_final[0] = ratio;
        t.values_final[1] = ratio;
        t.values_final[2] = ratio;
        let numeric = resolve_num_input(t, 3);

        if !numeric {
            if t.snap.valid() {
                if let Some(factor) = t.snap.resize_factor(t.center_global) {
                    t.values_final[0] = factor;
                    t.values_final[1] = factor;
                    t.values_final[2] = factor;
                }
            } else if increment_active(t) {
                let (coarse, fine) = {
                    let s = t.settings.read();
                    (s.increment_precision, s.increment_precision * 0.1)
                };
                let precision = t.modifiers.has(ModifierFlags::PRECISION);
                for v in t.values_final[..3].iter_mut() {
                    *v = increment_snap(*v, coarse, fine, precision, 1.0);
                }
            }
        }

        let smat = Mat3::from_diagonal(Vec3::from_slice(&t.values_final[..3]));
        let smat = t.con.constrain_scale(smat);
        resize_elements(t, smat);

        t.header = resize_header(t);
    }
}

pub struct SkinResize;

impl ModeKernel for SkinResize {
    fn kind(&self) -> ModeKind {
        ModeKind::SkinResize
    }

    fn input_mode(&self) -> InputMode {
        InputMode::SpringFlip
    }

    fn num_flags(&self) -> NumFlags {
        NumFlags::new(NumFlags::NULL_ONE)
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        use xformkit_core::flags::SessionFlags;
        t.flags.set(SessionFlags::NULL_ONE);
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        resolve_num_input(t, 1);
        let ratio = t.values_final[0];

        let threshold = t.settings.read().parallel_threshold;
        for group in t.groups.iter_mut() {
            for_each_element(group, threshold, |el, _| {
                if !el.is_transformed() || el.value.is_none() {
                    return;
                }
                if el.is_unaffected() {
                    el.value = Some(el.value_orig);
                    return;
                }
                let factored = 1.0 + (ratio - 1.0) * el.factor;
                el.value = Some((el.value_orig * factored).max(0.0));
            });
        }

        t.header = format!("Skin Resize: {ratio:.4}");
    }
}

fn increment_active(t: &TransformSession) -> bool {
    use xformkit_core::snap::SnapModeSet;
    let base = t.snap.enabled && t.snap.modes.has(SnapModeSet::INCREMENT);
    base != t.modifiers.has(ModifierFlags::SNAP_INVERT)
        || t.modifiers.has(ModifierFlags::SNAP_FORCED)
}

/// Scale every element around its pivot by `smat` (global space).
pub fn resize_elements(t: &mut TransformSession, smat: Mat3) {
    let use_local = t.use_local_center();
    let center_global = t.center_global;
    let threshold = t.settings.read().parallel_threshold;

    for group in t.groups.iter_mut() {
        let local_mat = group.imat3 * smat * group.mat3;
        let shared_center = group.to_local(center_global);
        for_each_element(group, threshold, |el, ext| {
            if !el.is_transformed() {
                return;
            }
            if el.is_unaffected() {
                el.co = el.co_orig;
                return;
            }
            let center = if use_local || el.flags.has(ElementFlags::INDIVIDUAL_SCALE) {
                el.center
            } else {
                shared_center
            };
            resize_coords(el, center, local_mat);
            if let Some(ext) = ext {
                resize_channel(el, ext, local_mat);
            }
        });
    }
}

fn resize_coords(el: &mut TransformElement, center: Vec3, mat: Mat3) {
    let rel = el.co_orig - center;
    let scaled = el.smtx * (mat * (el.mtx * rel));
    // The proportional factor blends between the original and the fully
    // scaled position.
    let delta = (scaled - rel) * el.factor;
    el.co = el.co_orig + el.protect_location(delta);
}

fn resize_channel(el: &TransformElement, ext: &mut ElementExt, mat: Mat3) {
    let local = el.smtx * mat * el.mtx;
    // Signed extraction keeps mirror (negative determinant) scales intact.
    let fsize = math::mat3_to_size_signed(&local, &el.axis_mtx);
    let mut scale = ext.scale_orig;
    if el.flags.has(ElementFlags::SINGLE_SIZE) {
        let uniform = 1.0 + ((fsize.x + fsize.y + fsize.z) / 3.0 - 1.0) * el.factor;
        scale *= uniform;
    } else {
        for axis in 0..3 {
            if !el.protect.scale_axis(axis) {
                let factored = 1.0 + (fsize[axis] - 1.0) * el.factor;
                scale[axis] = ext.scale_orig[axis] * factored;
            }
        }
    }
    ext.scale = scale;
}

fn resize_header(t: &TransformSession) -> String {
    let mut out = String::new();
    if t.num.has_input() {
        let _ = write!(out, "Scale: {}", t.num.display());
    } else {
        let _ = write!(
            out,
            "Scale: {:.4} {:.4} {:.4}",
            t.values_final[0], t.values_final[1], t.values_final[2]
        );
    }
    if t.con.applied {
        let _ = write!(out, " {}", t.con.label);
    }
    out
}
