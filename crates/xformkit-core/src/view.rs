//! View/projection parameters for the active region.
//!
//! Screen <-> world conversion for the pointer mapper and the snapping
//! engine. Projection failure (point behind the camera) returns a defined
//! fallback instead of erroring.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

#[derive(Debug, Clone, Copy)]
pub struct ViewParams {
    /// World to view.
    pub viewmat: Mat4,
    /// View to world.
    pub viewinv: Mat4,
    /// World to clip (projection * view).
    pub persmat: Mat4,
    /// Clip to world.
    pub persinv: Mat4,
    /// Region size in pixels.
    pub win_size: Vec2,
    /// Per-axis aspect correction for non-square pixel spaces (UV editors).
    pub aspect: Vec3,
    /// World units per pixel at the session pivot depth.
    pub zoom_factor: f32,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            viewmat: Mat4::IDENTITY,
            viewinv: Mat4::IDENTITY,
            persmat: Mat4::IDENTITY,
            persinv: Mat4::IDENTITY,
            win_size: Vec2::new(1024.0, 768.0),
            aspect: Vec3::ONE,
            zoom_factor: 1.0,
        }
    }
}

impl ViewParams {
    pub fn new(viewmat: Mat4, persmat: Mat4, win_size: Vec2) -> Self {
        Self {
            viewmat,
            viewinv: viewmat.inverse(),
            persmat,
            persinv: persmat.inverse(),
            win_size,
            aspect: Vec3::ONE,
            zoom_factor: 1.0,
        }
    }

    /// View-space basis axes in world space.
    pub fn right(&self) -> Vec3 {
        Mat3::from_mat4(self.viewinv).x_axis.normalize_or_zero()
    }

    pub fn up(&self) -> Vec3 {
        Mat3::from_mat4(self.viewinv).y_axis.normalize_or_zero()
    }

    /// World-space direction the camera looks along.
    pub fn view_direction(&self) -> Vec3 {
        -Mat3::from_mat4(self.viewinv).z_axis.normalize_or_zero()
    }

    /// A 2-D pixel delta as a world-space offset in the view plane.
    pub fn delta_to_world(&self, delta: Vec2) -> Vec3 {
        (self.right() * delta.x + self.up() * delta.y) * self.zoom_factor
    }

    /// Project a world point to window pixels. `None` when the point is on
    /// or behind the camera plane.
    pub fn project(&self, co: Vec3) -> Option<Vec2> {
        let clip = self.persmat * Vec4::new(co.x, co.y, co.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);
        Some((ndc * 0.5 + Vec2::splat(0.5)) * self.win_size)
    }

    /// Project with the region center as the defined fallback.
    pub fn project_or_center(&self, co: Vec3) -> Vec2 {
        self.project(co).unwrap_or(self.win_size * 0.5)
    }

    /// World-space ray through a window pixel, for snap queries.
    pub fn ray_from_screen(&self, mval: Vec2) -> (Vec3, Vec3) {
        let ndc = (mval / self.win_size) * 2.0 - Vec2::ONE;
        let near = self.persinv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far = self.persinv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near_w = if near.w.abs() > f32::EPSILON {
            near.truncate() / near.w
        } else {
            near.truncate()
        };
        let far_w = if far.w.abs() > f32::EPSILON {
            far.truncate() / far.w
        } else {
            far.truncate()
        };
        let dir = (far_w - near_w).normalize_or_zero();
        (near_w, dir)
    }

    /// Apply the per-axis aspect correction to a 2-D value.
    pub fn apply_aspect(&self, vec: Vec2) -> Vec2 {
        Vec2::new(vec.x / self.aspect.x, vec.y / self.aspect.y)
    }

    /// Remove the per-axis aspect correction from a 2-D value.
    pub fn remove_aspect(&self, vec: Vec2) -> Vec2 {
        Vec2::new(vec.x * self.aspect.x, vec.y * self.aspect.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_projection_maps_origin_to_center() {
        let view = ViewParams::default();
        let p = view.project(Vec3::ZERO).unwrap();
        assert!((p - view.win_size * 0.5).length() < 1e-3);
    }

    #[test]
    fn test_behind_camera_uses_fallback() {
        // Perspective projection with the camera at origin looking down -Z.
        let persp = Mat4::perspective_rh(1.0, 4.0 / 3.0, 0.1, 100.0);
        let view = ViewParams::new(Mat4::IDENTITY, persp, Vec2::new(800.0, 600.0));
        assert!(view.project(Vec3::new(0.0, 0.0, 5.0)).is_none());
        assert_eq!(
            view.project_or_center(Vec3::new(0.0, 0.0, 5.0)),
            Vec2::new(400.0, 300.0)
        );
    }

    #[test]
    fn test_delta_to_world_uses_view_basis() {
        let view = ViewParams::default();
        let world = view.delta_to_world(Vec2::new(2.0, 3.0));
        assert!((world - Vec3::new(2.0, 3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_aspect_round_trip() {
        let mut view = ViewParams::default();
        view.aspect = Vec3::new(2.0, 0.5, 1.0);
        let v = Vec2::new(3.0, 4.0);
        let back = view.remove_aspect(view.apply_aspect(v));
        assert!((back - v).length() < 1e-5);
    }
}
