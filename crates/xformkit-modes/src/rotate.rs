//! Rotation and trackball.
//!
//! Both kernels share the per-element rotation path: coordinates orbit the
//! pivot through the element's space sandwich, and rotation channels are
//! composed from the original channel values so repeated applies never
//! accumulate error. Large angles are fed to Euler channels in sub-steps
//! to keep the stored values continuous.

use std::fmt::Write as _;

use glam::{Mat3, Quat, Vec3};

use xformkit_core::element::{ElementExt, Rotation, TransformElement};
use xformkit_core::flags::{ModifierFlags, ProtectFlags};
use xformkit_core::input::InputMode;
use xformkit_core::math;
use xformkit_core::session::{TargetKind, TransformSession};
use xformkit_core::snap::increment_snap;
use xformkit_core::{ModeKind, Result};

use crate::kernel::{resolve_num_input, ModeKernel};

pub struct Rotate;

impl ModeKernel for Rotate {
    fn kind(&self) -> ModeKind {
        ModeKind::Rotate
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Angle
    }

    fn num_unit(&self) -> &'static str {
        "\u{b0}"
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        // Default rotation axis is the view direction; a constraint
        // replaces it during apply.
        t.axis = t.view.view_direction();
        t.axis_orig = t.axis;
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        let numeric = if resolve_num_input(t, 1) {
            // Typed degrees.
            t.values_final[0] = t.values_final[0].to_radians();
            true
        } else {
            false
        };

        if let Some(axis) = t.con.rotation_axis() {
            t.axis = axis;
        } else {
            t.axis = t.view.view_direction();
        }

        if !numeric {
            if t.snap.valid() {
                if let Some(angle) = t.snap.rotation_angle(t.center_global, t.axis) {
                    t.values_final[0] = angle;
                }
            } else if increment_active(t) {
                let (coarse, fine) = {
                    let s = t.settings.read();
                    (s.increment_angle, s.increment_angle_precision)
                };
                t.values_final[0] = increment_snap(
                    t.values_final[0],
                    coarse,
                    fine,
                    t.modifiers.has(ModifierFlags::PRECISION),
                    1.0,
                );
            }
        }

        let angle = t.values_final[0];
        rotate_elements(t, t.axis, angle);
        t.header = rotate_header(t, angle);
    }
}

pub struct Trackball;

impl ModeKernel for Trackball {
    fn kind(&self) -> ModeKind {
        ModeKind::Trackball
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Trackball
    }

    fn value_count(&self) -> usize {
        2
    }

    fn num_unit(&self) -> &'static str {
        "\u{b0}"
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        use xformkit_core::flags::SessionFlags;
        // The trackball axis is implicit in the drag; constraints do not
        // apply.
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[..2].copy_from_slice(&t.values[..2]);
        if resolve_num_input(t, 2) {
            t.values_final[0] = t.values_final[0].to_radians();
            t.values_final[1] = t.values_final[1].to_radians();
        }

        let mat = Mat3::from_axis_angle(t.view.right(), t.values_final[0])
            * Mat3::from_axis_angle(t.view.up(), t.values_final[1]);
        rotate_elements_mat(t, mat);

        t.header = format!(
            "Trackball: {:.2}\u{b0} {:.2}\u{b0}",
            t.values_final[0].to_degrees(),
            t.values_final[1].to_degrees()
        );
    }
}

fn increment_active(t: &TransformSession) -> bool {
    use xformkit_core::snap::SnapModeSet;
    let base = t.snap.enabled && t.snap.modes.has(SnapModeSet::INCREMENT);
    base != t.modifiers.has(ModifierFlags::SNAP_INVERT)
        || t.modifiers.has(ModifierFlags::SNAP_FORCED)
}

/// Rotate every element `angle` radians around the global `axis` through
/// the session pivot.
pub fn rotate_elements(t: &mut TransformSession, axis: Vec3, angle: f32) {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        // Degenerate axis behaves as a zero rotation.
        for group in t.groups.iter_mut() {
            for el in group.elements.iter_mut() {
                if el.is_transformed() {
                    el.co = el.co_orig;
                }
            }
        }
        return;
    }
    let compose_channels = t.target == TargetKind::Objects;
    let large_step = t.settings.read().large_rotation_step;
    let use_local = t.use_local_center();
    let center_global = t.center_global;

    for group in t.groups.iter_mut() {
        let axis_l = (group.imat3 * axis).normalize_or_zero();
        let shared_center = group.to_local(center_global);
        let has_exts = group.exts.len() == group.elements.len();
        for (i, el) in group.elements.iter_mut().enumerate() {
            if !el.is_transformed() {
                continue;
            }
            if el.is_unaffected() {
                el.co = el.co_orig;
                continue;
            }
            let center = if use_local { el.center } else { shared_center };
            let rot = Mat3::from_axis_angle(axis_l, angle * el.factor);
            rotate_coords(el, center, rot);
            if compose_channels && has_exts {
                let local = el.smtx * rot * el.mtx;
                rotate_channel(&mut group.exts[i], local, large_step, el.protect);
            }
        }
    }
}

/// Rotate by an arbitrary matrix (trackball, align).
pub fn rotate_elements_mat(t: &mut TransformSession, mat: Mat3) {
    let (axis, angle) = Quat::from_mat3(&mat).to_axis_angle();
    rotate_elements(t, axis, angle);
}

fn rotate_coords(el: &mut TransformElement, center: Vec3, rot: Mat3) {
    let rel = el.co_orig - center;
    let delta = el.smtx * (rot * (el.mtx * rel)) - rel;
    el.co = el.co_orig + el.protect_location(delta);
}

/// Compose `rot` onto the element's original rotation channel, honoring
/// per-axis rotation locks.
pub fn rotate_channel(ext: &mut ElementExt, rot: Mat3, large_step: f32, protect: ProtectFlags) {
    match &mut ext.rotation {
        Rotation::Quaternion { quat, quat_orig } => {
            // Quaternion components do not map onto axis locks; any lock
            // freezes the channel.
            if protect.any_rot_axis() {
                *quat = *quat_orig;
            } else {
                *quat = (Quat::from_mat3(&rot) * *quat_orig).normalize();
            }
        }
        Rotation::AxisAngle {
            axis,
            angle,
            axis_orig,
            angle_orig,
        } => {
            if protect.any_rot_axis() {
                *axis = *axis_orig;
                *angle = *angle_orig;
            } else {
                let base = Quat::from_axis_angle(axis_orig.normalize_or_zero(), *angle_orig);
                let (new_axis, new_angle) = (Quat::from_mat3(&rot) * base).to_axis_angle();
                *axis = new_axis;
                *angle = new_angle;
            }
        }
        Rotation::Euler {
            order,
            rot: eul,
            rot_orig,
            drot,
        } => {
            // Feed large rotations to the Euler channel in sub-steps so the
            // stored angles track the motion instead of wrapping.
            let (axis, angle) = Quat::from_mat3(&rot).to_axis_angle();
            let steps = ((angle.abs() / large_step).ceil() as usize).max(1);
            let base =
                Mat3::from_euler(*order, rot_orig.x + drot.x, rot_orig.y + drot.y, rot_orig.z + drot.z);
            let mut reference = *rot_orig + *drot;
            for k in 1..=steps {
                let partial = Mat3::from_axis_angle(axis, angle * k as f32 / steps as f32) * base;
                reference = math::mat3_to_compatible_euler(&partial, *order, reference);
            }
            let mut next = reference - *drot;
            for axis in 0..3 {
                if protect.rot_axis(axis) {
                    next[axis] = rot_orig[axis];
                }
            }
            *eul = next;
        }
    }
}

fn rotate_header(t: &TransformSession, angle: f32) -> String {
    let mut out = String::new();
    if t.num.has_input() {
        let _ = write!(out, "Rotation: {}", t.num.display());
    } else {
        let _ = write!(out, "Rotation: {:.2}\u{b0}", angle.to_degrees());
    }
    if t.con.applied {
        let _ = write!(out, " {}", t.con.label);
    }
    out
}
