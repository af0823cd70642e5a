//! Small fixed-size linear algebra helpers the kernels need beyond `glam`.

use glam::{EulerRot, Mat3, Quat, Vec3};

/// Tolerance under which a singular value is treated as a zero-scale axis.
pub const PSEUDO_INVERSE_EPSILON: f32 = 1e-8;

/// Moore-Penrose pseudo-inverse of a 3x3 matrix.
///
/// Tolerant of zero-scale axes: a matrix with one axis collapsed to zero
/// yields a finite inverse whose round trip holds on the remaining axes.
pub fn pseudo_inverse(m: Mat3) -> Mat3 {
    // Fast path for well-conditioned matrices.
    let det = m.determinant();
    if det.abs() > 1e-6 {
        return m.inverse();
    }

    // A = U S V^T  =>  A+ = V S+ U^T, built from the eigen system of A^T A.
    let ata = m.transpose() * m;
    let (eigvals, v) = jacobi_eigen_symmetric(ata);

    let mut pinv = Mat3::ZERO;
    for i in 0..3 {
        let sigma_sq = eigvals[i].max(0.0);
        if sigma_sq <= PSEUDO_INVERSE_EPSILON {
            continue;
        }
        let sigma = sigma_sq.sqrt();
        let v_col = v.col(i);
        let u_col = (m * v_col) / sigma;
        // pinv += v_col * (1/sigma) * u_col^T
        pinv += outer_product(v_col / sigma, u_col);
    }
    pinv
}

/// Outer product `a * b^T` as a column-major 3x3.
pub fn outer_product(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Eigen decomposition of a symmetric 3x3 via cyclic Jacobi rotations.
///
/// Returns eigenvalues and the matrix whose columns are the matching
/// eigenvectors. Converges in a handful of sweeps for the well-scaled
/// matrices this crate feeds it.
fn jacobi_eigen_symmetric(s: Mat3) -> ([f32; 3], Mat3) {
    let mut a = [
        [s.col(0).x, s.col(1).x, s.col(2).x],
        [s.col(0).y, s.col(1).y, s.col(2).y],
        [s.col(0).z, s.col(1).z, s.col(2).z],
    ];
    let mut v = [[1.0f32, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    for _sweep in 0..16 {
        let off = a[0][1].abs() + a[0][2].abs() + a[1][2].abs();
        if off < 1e-12 {
            break;
        }
        for p in 0..2 {
            for q in (p + 1)..3 {
                if a[p][q].abs() < 1e-15 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s_ = t * c;

                for k in 0..3 {
                    let akp = a[k][p];
                    let akq = a[k][q];
                    a[k][p] = c * akp - s_ * akq;
                    a[k][q] = s_ * akp + c * akq;
                }
                for k in 0..3 {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s_ * aqk;
                    a[q][k] = s_ * apk + c * aqk;
                }
                for k in 0..3 {
                    let vkp = v[k][p];
                    let vkq = v[k][q];
                    v[k][p] = c * vkp - s_ * vkq;
                    v[k][q] = s_ * vkp + c * vkq;
                }
            }
        }
    }

    let eigvals = [a[0][0], a[1][1], a[2][2]];
    let eigvecs = Mat3::from_cols(
        Vec3::new(v[0][0], v[1][0], v[2][0]),
        Vec3::new(v[0][1], v[1][1], v[2][1]),
        Vec3::new(v[0][2], v[1][2], v[2][2]),
    );
    (eigvals, eigvecs)
}

/// Unsigned per-axis scale of a rotation-scale matrix (column lengths).
pub fn mat3_to_size(m: &Mat3) -> Vec3 {
    Vec3::new(m.x_axis.length(), m.y_axis.length(), m.z_axis.length())
}

/// Per-axis scale with correct signs, recovered by comparing the rotated
/// basis vectors against a reference axis matrix.
///
/// Column lengths alone lose sign; a dot-product test per axis restores it,
/// so scaling a rotated object by `(-2, 3, 1)` on its own axes reports
/// `(-2, 3, 1)`, not `(2, 3, 1)`.
pub fn mat3_to_size_signed(m: &Mat3, reference: &Mat3) -> Vec3 {
    let mut size = mat3_to_size(m);
    let rot = Mat3::from_cols(
        m.x_axis.normalize_or_zero(),
        m.y_axis.normalize_or_zero(),
        m.z_axis.normalize_or_zero(),
    );
    if rot.x_axis.dot(reference.x_axis) < 0.0 {
        size.x = -size.x;
    }
    if rot.y_axis.dot(reference.y_axis) < 0.0 {
        size.y = -size.y;
    }
    if rot.z_axis.dot(reference.z_axis) < 0.0 {
        size.z = -size.z;
    }
    size
}

/// Rotation matrix mapping unit vector `from` onto unit vector `to`.
pub fn rotation_between_vecs(from: Vec3, to: Vec3) -> Mat3 {
    let from_n = from.normalize_or_zero();
    let to_n = to.normalize_or_zero();
    if from_n == Vec3::ZERO || to_n == Vec3::ZERO {
        return Mat3::IDENTITY;
    }
    Mat3::from_quat(Quat::from_rotation_arc(from_n, to_n))
}

/// Parametric position of `point` along the infinite line through `a`/`b`;
/// 0 at `a`, 1 at `b`. Falls back to 0 for a degenerate segment.
pub fn line_point_factor(point: Vec3, a: Vec3, b: Vec3) -> f32 {
    let dir = b - a;
    let len_sq = dir.length_squared();
    if len_sq < f32::EPSILON {
        0.0
    } else {
        (point - a).dot(dir) / len_sq
    }
}

/// Interpolate along the two-segment polyline `v1 -> v2 -> v3`, where the
/// breakpoint sits at `v2`'s parametric position on the `v1..v3` line.
pub fn interp_line_three_points(v1: Vec3, v2: Vec3, v3: Vec3, t: f32) -> Vec3 {
    let t_mid = line_point_factor(v2, v1, v3);
    if t < t_mid {
        if t_mid > f32::EPSILON {
            v1.lerp(v2, t / t_mid)
        } else {
            v2
        }
    } else {
        let span = 1.0 - t_mid;
        if span > f32::EPSILON {
            v2.lerp(v3, (t - t_mid) / span)
        } else {
            v2
        }
    }
}

/// Offset factor for keeping a constant shell thickness at a given surface
/// angle: 1 when flat, growing as the angle steepens.
pub fn shell_angle_to_dist(angle: f32) -> f32 {
    let c = angle.cos().abs();
    if c < 1e-8 {
        1.0
    } else {
        (1.0 / c).max(1.0)
    }
}

/// Shift each Euler component by full turns so it lands within pi of `prev`.
pub fn euler_compatible(mut eul: Vec3, prev: Vec3) -> Vec3 {
    use std::f32::consts::{PI, TAU};
    for i in 0..3 {
        while eul[i] - prev[i] > PI {
            eul[i] -= TAU;
        }
        while prev[i] - eul[i] > PI {
            eul[i] += TAU;
        }
    }
    eul
}

/// Euler angles of a rotation matrix, chosen compatible with `prev`.
pub fn mat3_to_compatible_euler(m: &Mat3, order: EulerRot, prev: Vec3) -> Vec3 {
    let q = Quat::from_mat3(m).normalize();
    let (a, b, c) = q.to_euler(order);
    euler_compatible(Vec3::new(a, b, c), prev)
}

/// Normalize an angle into the half-open interval (-pi, pi].
pub fn angle_wrap_signed(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Signed angle from `a` to `b` around `axis` (all in the plane normal to
/// `axis`), in (-pi, pi].
pub fn signed_angle_around_axis(a: Vec3, b: Vec3, axis: Vec3) -> f32 {
    let axis_n = axis.normalize_or_zero();
    let a_p = (a - axis_n * a.dot(axis_n)).normalize_or_zero();
    let b_p = (b - axis_n * b.dot(axis_n)).normalize_or_zero();
    if a_p == Vec3::ZERO || b_p == Vec3::ZERO {
        return 0.0;
    }
    let angle = a_p.dot(b_p).clamp(-1.0, 1.0).acos();
    if a_p.cross(b_p).dot(axis_n) < 0.0 {
        angle_wrap_signed(-angle)
    } else {
        angle_wrap_signed(angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn assert_vec3_near(a: Vec3, b: Vec3, eps: f32) {
        assert!(
            (a - b).length() < eps,
            "expected {b:?}, got {a:?} (eps {eps})"
        );
    }

    #[test]
    fn test_pseudo_inverse_regular_round_trip() {
        let m = Mat3::from_axis_angle(Vec3::new(0.3, 0.8, 0.2).normalize(), 0.7)
            * Mat3::from_diagonal(Vec3::new(2.0, 0.5, 3.0));
        let pinv = pseudo_inverse(m);
        let v = Vec3::new(1.0, -2.0, 0.5);
        assert_vec3_near(m * (pinv * v), v, 1e-4);
    }

    #[test]
    fn test_pseudo_inverse_zero_axis_is_finite() {
        let m = Mat3::from_diagonal(Vec3::new(2.0, 0.0, 3.0));
        let pinv = pseudo_inverse(m);
        for c in [pinv.x_axis, pinv.y_axis, pinv.z_axis] {
            assert!(c.is_finite(), "pseudo-inverse has non-finite entries: {pinv:?}");
        }
        // Round trip must hold on the two live axes.
        let v = Vec3::new(4.0, 0.0, -9.0);
        assert_vec3_near(m * (pinv * v), v, 1e-4);
    }

    #[test]
    fn test_mat3_to_size_signed_recovers_negative_axis() {
        let rot = Mat3::from_axis_angle(Vec3::new(1.0, 2.0, 0.5).normalize(), 1.1);
        let scaled = rot * Mat3::from_diagonal(Vec3::new(-2.0, 3.0, 1.0));
        let size = mat3_to_size_signed(&scaled, &rot);
        assert!((size.x + 2.0).abs() < 1e-4, "size {size:?}");
        assert!((size.y - 3.0).abs() < 1e-4, "size {size:?}");
        assert!((size.z - 1.0).abs() < 1e-4, "size {size:?}");
    }

    #[test]
    fn test_rotation_between_vecs_maps_from_to_to() {
        let from = Vec3::X;
        let to = Vec3::new(0.0, 1.0, 1.0).normalize();
        let m = rotation_between_vecs(from, to);
        assert_vec3_near(m * from, to, 1e-5);
    }

    #[test]
    fn test_line_point_factor_midpoint() {
        let f = line_point_factor(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        assert!((f - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_interp_line_three_points_endpoints() {
        let v1 = Vec3::ZERO;
        let v2 = Vec3::new(1.0, 1.0, 0.0);
        let v3 = Vec3::new(2.0, 0.0, 0.0);
        assert_vec3_near(interp_line_three_points(v1, v2, v3, 0.0), v1, 1e-6);
        assert_vec3_near(interp_line_three_points(v1, v2, v3, 1.0), v3, 1e-5);
    }

    #[test]
    fn test_angle_wrap_range() {
        assert!((angle_wrap_signed(3.0 * PI) - PI).abs() < 1e-5);
        assert!((angle_wrap_signed(-3.0 * PI) - PI).abs() < 1e-5);
        assert!((angle_wrap_signed(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_signed_angle_around_axis_sign() {
        let a = Vec3::X;
        let b = Vec3::Y;
        assert!((signed_angle_around_axis(a, b, Vec3::Z) - FRAC_PI_2).abs() < 1e-5);
        assert!((signed_angle_around_axis(b, a, Vec3::Z) + FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_euler_compatible_shifts_by_full_turns() {
        let prev = Vec3::new(6.0, 0.0, 0.0);
        let eul = euler_compatible(Vec3::new(6.0 - std::f32::consts::TAU, 0.0, 0.0), prev);
        assert!((eul.x - 6.0).abs() < 1e-5);
    }
}
