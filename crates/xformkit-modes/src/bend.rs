//! Bend.
//!
//! Wraps the selection around a circular arc. The bend frame is seeded at
//! init: the arc axis is the view direction, the primary direction runs
//! from the pivot toward the pointer, and the reference length is the
//! pivot-to-pointer distance in world units. The swept angle comes from
//! the pointer; arc length along the primary direction is preserved.

use std::fmt::Write as _;

use glam::Vec3;

use xformkit_core::flags::SessionFlags;
use xformkit_core::input::InputMode;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result};

use crate::kernel::{resolve_num_input, ModeKernel};

pub struct Bend;

impl ModeKernel for Bend {
    fn kind(&self) -> ModeKind {
        ModeKind::Bend
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Angle
    }

    fn num_unit(&self) -> &'static str {
        "\u{b0}"
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        t.axis = t.view.view_direction();
        t.axis_orig = t.axis;

        // Primary bend direction: pivot toward the invocation pointer, in
        // the view plane.
        let screen_delta = t.mval_start - t.center2d;
        let mut dir = t.view.delta_to_world(screen_delta);
        let mut len = dir.length();
        if len < 1e-6 {
            dir = t.view.right();
            len = 1.0;
        } else {
            dir /= len;
        }
        t.custom_vecs[0] = dir;
        t.custom_vecs[1] = t.axis.cross(dir).normalize_or_zero();
        t.custom_vecs[2] = Vec3::new(len, 0.0, 0.0);
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        if resolve_num_input(t, 1) {
            t.values_final[0] = t.values_final[0].to_radians();
        }
        let angle = t.values_final[0];

        bend_elements(t, angle);

        let mut out = String::new();
        if t.num.has_input() {
            let _ = write!(out, "Bend Angle: {}", t.num.display());
        } else {
            let _ = write!(out, "Bend Angle: {:.2}\u{b0}", angle.to_degrees());
        }
        let _ = write!(out, " Radius: {:.4}", bend_radius(t, angle));
        t.header = out;
    }
}

fn bend_radius(t: &TransformSession, angle: f32) -> f32 {
    let len = t.custom_vecs[2].x;
    if angle.abs() < 1e-6 {
        f32::INFINITY
    } else {
        len / angle.abs()
    }
}

fn bend_elements(t: &mut TransformSession, angle: f32) {
    let dir = t.custom_vecs[0];
    let side = t.custom_vecs[1];
    let center_global = t.center_global;

    if angle.abs() < 1e-6 || side == Vec3::ZERO {
        for group in t.groups.iter_mut() {
            for el in group.elements.iter_mut() {
                if el.is_transformed() {
                    el.co = el.co_orig;
                }
            }
        }
        return;
    }

    let radius = t.custom_vecs[2].x / angle;

    for group in t.groups.iter_mut() {
        let pivot = group.to_local(center_global);
        let dir_l = (group.imat3 * dir).normalize_or_zero();
        let side_l = (group.imat3 * side).normalize_or_zero();
        for el in group.elements.iter_mut() {
            if !el.is_transformed() {
                continue;
            }
            if el.is_unaffected() {
                el.co = el.co_orig;
                continue;
            }
            let rel = el.co_orig - pivot;
            let x = rel.dot(dir_l);
            let y = rel.dot(side_l);
            let rest = rel - dir_l * x - side_l * y;

            // Arc length x maps to angle theta on a circle of the given
            // radius; the side coordinate offsets the effective radius.
            let theta = x / radius * el.factor;
            let r_eff = radius - y;
            let circle_center = pivot + side_l * radius;
            let bent = circle_center - side_l * (r_eff * theta.cos())
                + dir_l * (r_eff * theta.sin())
                + rest;
            el.co = el.co_orig + el.protect_location(bent - el.co_orig);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use xformkit_core::element::TransformElement;
    use xformkit_core::group::ElementGroup;
    use xformkit_core::session::PivotPoint;

    fn session(elements: Vec<TransformElement>) -> TransformSession {
        // Pointer one world unit to the right of the pivot, so the bend
        // direction is +X and the reference length is 1.
        let view = xformkit_core::ViewParams::default();
        let center_px = view.win_size * 0.5;
        TransformSession::builder(ModeKind::Bend)
            .pivot(PivotPoint::Cursor)
            .cursor(Vec3::ZERO)
            .mval(center_px + Vec2::new(1.0, 0.0))
            .view(view)
            .group(ElementGroup::new("obj", elements))
            .build()
            .unwrap()
    }

    #[test]
    fn test_zero_angle_is_identity() {
        let mut t = session(vec![TransformElement::at(Vec3::new(0.7, 0.2, -0.3))]);
        Bend.init(&mut t).unwrap();
        t.values[0] = 0.0;
        Bend.apply(&mut t);
        assert_eq!(t.groups[0].elements[0].co, Vec3::new(0.7, 0.2, -0.3));
    }

    #[test]
    fn test_pivot_stays_fixed() {
        let mut t = session(vec![TransformElement::at(Vec3::ZERO)]);
        Bend.init(&mut t).unwrap();
        t.values[0] = 1.0;
        Bend.apply(&mut t);
        assert!(t.groups[0].elements[0].co.length() < 1e-5);
    }

    #[test]
    fn test_arc_length_preserved_on_primary_axis() {
        let mut t = session(vec![TransformElement::at(Vec3::new(1.0, 0.0, 0.0))]);
        Bend.init(&mut t).unwrap();
        let angle = 0.8;
        t.values[0] = angle;
        Bend.apply(&mut t);
        let co = t.groups[0].elements[0].co;
        // The element sat at arc length 1 with reference length 1, so it
        // lands at angle `angle` on the circle of radius 1/angle.
        let r = 1.0 / angle;
        let expected = Vec3::new(r * angle.sin(), 0.0, 0.0)
            + Vec3::new(0.0, r - r * angle.cos(), 0.0) * side_sign(&t);
        assert!((co - expected).length() < 1e-4, "co = {co:?}");
    }

    fn side_sign(t: &TransformSession) -> f32 {
        // Side axis orientation depends on the view handedness; the test
        // only fixes the magnitude.
        if t.custom_vecs[1].y >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    #[test]
    fn test_header_reports_radius() {
        let mut t = session(vec![TransformElement::at(Vec3::new(1.0, 0.0, 0.0))]);
        Bend.init(&mut t).unwrap();
        t.values[0] = 0.5;
        Bend.apply(&mut t);
        assert!(t.header.contains("Radius"));
    }
}
