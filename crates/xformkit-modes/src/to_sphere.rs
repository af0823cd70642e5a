//! To Sphere.
//!
//! Pushes every element toward the sphere around the pivot whose radius is
//! the selection's mean distance from it. The ratio interpolates between
//! the original shape (0) and the perfect sphere (1).

use std::fmt::Write as _;

use glam::Vec3;

use xformkit_core::flags::SessionFlags;
use xformkit_core::input::InputMode;
use xformkit_core::numinput::NumFlags;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result};

use crate::kernel::{resolve_num_input, ModeKernel};

pub struct ToSphere;

impl ModeKernel for ToSphere {
    fn kind(&self) -> ModeKind {
        ModeKind::ToSphere
    }

    fn input_mode(&self) -> InputMode {
        InputMode::HorizontalRatio
    }

    fn num_flags(&self) -> NumFlags {
        NumFlags::new(NumFlags::NO_NEGATIVE)
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        // Mean radius of the affected elements, stored once so the target
        // sphere does not drift while the ratio changes.
        let mut sum = 0.0f32;
        let mut count = 0usize;
        let center_global = t.center_global;
        for group in &t.groups {
            let center = group.to_local(center_global);
            for el in &group.elements {
                if el.is_transformed() && !el.is_unaffected() {
                    sum += (el.co_orig - center).length();
                    count += 1;
                }
            }
        }
        t.custom_vecs[0] = Vec3::new(
            if count > 0 { sum / count as f32 } else { 0.0 },
            0.0,
            0.0,
        );
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        resolve_num_input(t, 1);
        let ratio = t.values_final[0].clamp(0.0, 1.0);
        t.values_final[0] = ratio;

        let radius = t.custom_vecs[0].x;
        let center_global = t.center_global;
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
                let rel = el.co_orig - center;
                let len = rel.length();
                if len < 1e-9 {
                    el.co = el.co_orig;
                    continue;
                }
                let target = len + (radius - len) * ratio * el.factor;
                let delta = rel * (target / len) - rel;
                el.co = el.co_orig + el.protect_location(delta);
            }
        }

        let mut out = String::new();
        if t.num.has_input() {
            let _ = write!(out, "To Sphere: {}", t.num.display());
        } else {
            let _ = write!(out, "To Sphere: {ratio:.4}");
        }
        t.header = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xformkit_core::element::TransformElement;
    use xformkit_core::group::ElementGroup;
    use xformkit_core::session::PivotPoint;

    fn session(points: &[Vec3]) -> TransformSession {
        TransformSession::builder(ModeKind::ToSphere)
            .pivot(PivotPoint::Cursor)
            .cursor(Vec3::ZERO)
            .group(ElementGroup::new(
                "obj",
                points.iter().map(|&p| TransformElement::at(p)).collect(),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_full_ratio_equalizes_radii() {
        let mut t = session(&[
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
        ]);
        ToSphere.init(&mut t).unwrap();
        t.values[0] = 1.0;
        ToSphere.apply(&mut t);
        let mean = 2.0;
        for el in &t.groups[0].elements {
            assert!((el.co.length() - mean).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_ratio_is_identity() {
        let mut t = session(&[Vec3::new(1.0, 2.0, 3.0)]);
        ToSphere.init(&mut t).unwrap();
        t.values[0] = 0.0;
        ToSphere.apply(&mut t);
        assert_eq!(t.groups[0].elements[0].co, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_ratio_clamped_to_unit_range() {
        let mut t = session(&[Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)]);
        ToSphere.init(&mut t).unwrap();
        t.values[0] = 5.0;
        ToSphere.apply(&mut t);
        assert_eq!(t.values_final[0], 1.0);
    }

    #[test]
    fn test_directions_preserved() {
        let p = Vec3::new(1.0, 1.0, 0.0);
        let mut t = session(&[p, Vec3::new(0.0, 0.0, 4.0)]);
        ToSphere.init(&mut t).unwrap();
        t.values[0] = 0.7;
        ToSphere.apply(&mut t);
        let co = t.groups[0].elements[0].co;
        assert!(co.normalize().dot(p.normalize()) > 0.9999);
    }
}
