//! Translation.
//!
//! The workhorse mode. The pointer offset becomes a global-space delta,
//! then scene snap, increment snap and the axis constraint shape it, and
//! every element is rewritten as original plus the per-element projection
//! of that delta.

use std::fmt::Write as _;

use glam::Vec3;

use xformkit_core::flags::{ModifierFlags, SessionFlags};
use xformkit_core::input::InputMode;
use xformkit_core::math;
use xformkit_core::numinput::NumFlags;
use xformkit_core::session::TransformSession;
use xformkit_core::snap::{increment_snap, ProjectMissPolicy};
use xformkit_core::{ModeKind, Result};

use crate::kernel::{resolve_num_input, ModeKernel};
use crate::parallel::for_each_element;
use crate::rotate::rotate_channel;

pub struct Translate;

impl ModeKernel for Translate {
    fn kind(&self) -> ModeKind {
        ModeKind::Translate
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Vector
    }

    fn value_count(&self) -> usize {
        3
    }

    fn num_flags(&self) -> NumFlags {
        NumFlags::default()
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        t.axis = Vec3::ZERO;
        t.axis_orig = Vec3::ZERO;
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[..3].copy_from_slice(&t.values[..3]);
        let numeric = resolve_num_input(t, 3);

        let mut vec = Vec3::from_slice(&t.values_final[..3]);
        if numeric {
            vec = t.con.constrain_num_input(vec);
        } else {
            if t.snap.valid() {
                vec = t.snap.translation();
            } else if snap_increment_active(t) {
                let (coarse, fine) = {
                    let s = t.settings.read();
                    (s.increment, s.increment_precision)
                };
                let precision = t.modifiers.has(ModifierFlags::PRECISION);
                for axis in 0..3 {
                    vec[axis] =
                        increment_snap(vec[axis], coarse, fine, precision, t.view.aspect[axis]);
                }
            }
        }
        // Typed values honor an active constraint the same as pointer ones.
        vec = t.con.constrain_vector(vec);
        t.values_final[..3].copy_from_slice(&vec.to_array());

        apply_translation(t, vec);

        if t.flags.has(SessionFlags::SNAP_ALIGN_ROTATION) && t.snap.valid() {
            align_to_snap_normal(t);
        }
        if t.flags.has(SessionFlags::PROJECT_INDIVIDUAL) {
            project_elements(t);
        }

        t.header = translate_header(t, vec);
    }
}

fn snap_increment_active(t: &TransformSession) -> bool {
    use xformkit_core::snap::SnapModeSet;
    let base = t.snap.enabled && t.snap.modes.has(SnapModeSet::INCREMENT);
    let invert = t.modifiers.has(ModifierFlags::SNAP_INVERT);
    base != invert || t.modifiers.has(ModifierFlags::SNAP_FORCED)
}

fn apply_translation(t: &mut TransformSession, vec: Vec3) {
    let threshold = t.settings.read().parallel_threshold;
    for group in t.groups.iter_mut() {
        // Global delta into this group's object space once, not per element.
        let local = group.imat3 * vec;
        for_each_element(group, threshold, |el, _| {
            if !el.is_transformed() {
                return;
            }
            if el.is_unaffected() {
                el.co = el.co_orig;
                return;
            }
            let delta = el.protect_location(el.smtx * local * el.factor);
            el.co = el.co_orig + delta;
        });
    }
}

/// Re-orient rotation channels so each element's own up axis lands on the
/// snap-target normal.
fn align_to_snap_normal(t: &mut TransformSession) {
    let normal = t.snap.normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return;
    }
    let large_step = t.settings.read().large_rotation_step;
    for group in t.groups.iter_mut() {
        if group.exts.len() != group.elements.len() {
            continue;
        }
        let normal_local = (group.imat3 * normal).normalize_or_zero();
        for (el, ext) in group.elements.iter().zip(group.exts.iter_mut()) {
            if !el.is_transformed() || el.is_unaffected() {
                continue;
            }
            let up = el.axis_mtx.col(2).normalize_or_zero();
            let rot = math::rotation_between_vecs(up, normal_local);
            rotate_channel(ext, rot, large_step, el.protect);
        }
    }
}

/// Re-project each transformed element onto scene surfaces along the view
/// direction. Elements with no surface under them follow the miss policy.
fn project_elements(t: &mut TransformSession) {
    let Some(query) = t.snap_query.clone() else {
        return;
    };
    let dir = t.view.view_direction();
    let policy = t.settings.read().project_miss_policy;
    for group in t.groups.iter_mut() {
        let mat = group.mat;
        let imat = group.imat;
        for el in group.elements.iter_mut() {
            if !el.is_transformed() || el.is_unaffected() {
                continue;
            }
            let global = mat.transform_point3(el.co);
            match query.raycast(global - dir * 1000.0, dir) {
                Some(hit) => {
                    el.co = imat.transform_point3(hit.co);
                }
                None => match policy {
                    ProjectMissPolicy::KeepTransformed => {}
                    ProjectMissPolicy::Skip => el.co = el.co_orig,
                },
            }
        }
    }
}

fn translate_header(t: &TransformSession, vec: Vec3) -> String {
    let mut out = String::new();
    if t.num.has_input() {
        let _ = write!(out, "Move: {}", t.num.display());
    } else {
        let _ = write!(
            out,
            "Move: {:.4} {:.4} {:.4} ({:.4})",
            vec.x,
            vec.y,
            vec.z,
            vec.length()
        );
    }
    if t.con.applied {
        let _ = write!(out, " {}", t.con.label);
    }
    if t.prop_edit() {
        let _ = write!(out, " Proportional size: {:.2}", t.prop_size);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat3;
    use xformkit_core::constraint::AxisConstraint;
    use xformkit_core::element::TransformElement;
    use xformkit_core::flags::ElementFlags;
    use xformkit_core::group::ElementGroup;
    use xformkit_core::ProtectFlags;

    fn session(elements: Vec<TransformElement>) -> TransformSession {
        TransformSession::builder(ModeKind::Translate)
            .group(ElementGroup::new("obj", elements))
            .build()
            .unwrap()
    }

    #[test]
    fn test_plain_translation() {
        let mut t = session(vec![TransformElement::at(Vec3::new(1.0, 0.0, 0.0))]);
        Translate.init(&mut t).unwrap();
        t.values = [2.0, -1.0, 0.5, 0.0];
        Translate.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(3.0, -1.0, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_constraint_limits_delta() {
        let mut t = session(vec![TransformElement::at(Vec3::ZERO)]);
        Translate.init(&mut t).unwrap();
        t.con = AxisConstraint::single_axis(Mat3::IDENTITY, 0, "along global X");
        t.values = [2.0, 5.0, 7.0, 0.0];
        Translate.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(&t.values_final[..3], &[2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_factor_element_is_bit_exact() {
        let orig = Vec3::new(0.123456, -9.87, 4.4);
        let mut unsel = TransformElement::at(orig);
        unsel.flags.clear(ElementFlags::SELECTED);
        unsel.factor = 0.0;
        let mut t = session(vec![TransformElement::at(Vec3::ZERO), unsel]);
        Translate.init(&mut t).unwrap();
        t.values = [10.0, 20.0, 30.0, 0.0];
        Translate.apply(&mut t);
        assert_eq!(t.groups[0].elements[1].co, orig);
    }

    #[test]
    fn test_numeric_input_overrides_pointer() {
        let mut t = session(vec![TransformElement::at(Vec3::ZERO)]);
        Translate.init(&mut t).unwrap();
        t.num = xformkit_core::NumericInput::new(3, NumFlags::default());
        t.num.handle_char('5');
        t.values = [99.0, 99.0, 99.0, 0.0];
        Translate.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(5.0, 99.0, 99.0)).length() < 1e-4);
    }

    #[test]
    fn test_typed_value_travels_along_constraint() {
        let mut t = session(vec![TransformElement::at(Vec3::ZERO)]);
        Translate.init(&mut t).unwrap();
        t.con = AxisConstraint::single_axis(Mat3::IDENTITY, 1, "along global Y");
        t.num = xformkit_core::NumericInput::new(3, NumFlags::default());
        t.num.handle_char('5');
        t.values = [99.0, 99.0, 99.0, 0.0];
        Translate.apply(&mut t);
        let co = t.groups[0].elements[0].co;
        assert!((co - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-4);
        assert_eq!(co.x, 0.0);
    }

    #[test]
    fn test_protected_axis_unmoved() {
        let mut el = TransformElement::at(Vec3::ZERO);
        el.protect = ProtectFlags::new(ProtectFlags::LOC_Y);
        let mut t = session(vec![el]);
        Translate.init(&mut t).unwrap();
        t.values = [1.0, 2.0, 3.0, 0.0];
        Translate.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(1.0, 0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_proportional_factor_scales_delta() {
        let mut partial = TransformElement::at(Vec3::ZERO);
        partial.flags.clear(ElementFlags::SELECTED);
        partial.factor = 0.5;
        let mut t = session(vec![TransformElement::at(Vec3::ONE), partial]);
        Translate.init(&mut t).unwrap();
        t.values = [4.0, 0.0, 0.0, 0.0];
        Translate.apply(&mut t);
        assert!((t.groups[0].elements[1].co - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_snap_align_rotates_channel_onto_normal() {
        use xformkit_core::element::{ElementExt, Rotation};
        use xformkit_core::snap::SnapStatus;

        let el = TransformElement::at(Vec3::ZERO);
        let ext = ElementExt::new(Rotation::quaternion(glam::Quat::IDENTITY));
        let group = ElementGroup::new("obj", vec![el]).with_exts(vec![ext]);
        let mut t = TransformSession::builder(ModeKind::Translate)
            .group(group)
            .build()
            .unwrap();
        Translate.init(&mut t).unwrap();
        t.flags.set(SessionFlags::SNAP_ALIGN_ROTATION);
        t.snap.enabled = true;
        t.snap.set_source(Vec3::ZERO);
        t.snap.target = Vec3::new(1.0, 0.0, 0.0);
        t.snap.normal = Vec3::X;
        t.snap.status.set(SnapStatus::TARGET_FOUND);
        Translate.apply(&mut t);
        // Element carried onto the target and its up axis onto the normal.
        assert!((t.groups[0].elements[0].co - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        if let Rotation::Quaternion { quat, .. } = t.groups[0].exts[0].rotation {
            assert!((quat * Vec3::Z - Vec3::X).length() < 1e-4);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_header_mentions_constraint() {
        let mut t = session(vec![TransformElement::at(Vec3::ZERO)]);
        Translate.init(&mut t).unwrap();
        t.con = AxisConstraint::single_axis(Mat3::IDENTITY, 0, "along global X");
        t.values = [1.0, 0.0, 0.0, 0.0];
        Translate.apply(&mut t);
        assert!(t.header.contains("along global X"));
    }

    proptest::proptest! {
        #[test]
        fn prop_apply_is_exactly_original_plus_delta(
            ox in -100.0f32..100.0,
            oy in -100.0f32..100.0,
            oz in -100.0f32..100.0,
            dx in -100.0f32..100.0,
            dy in -100.0f32..100.0,
            dz in -100.0f32..100.0,
        ) {
            let orig = Vec3::new(ox, oy, oz);
            let mut t = session(vec![TransformElement::at(orig)]);
            Translate.init(&mut t).unwrap();
            t.values = [dx, dy, dz, 0.0];
            // Applying twice must not compound.
            Translate.apply(&mut t);
            Translate.apply(&mut t);
            let co = t.groups[0].elements[0].co;
            proptest::prop_assert!((co - (orig + Vec3::new(dx, dy, dz))).length() < 1e-3);
        }
    }
}
