//! Per-element transform records.
//!
//! The flat, mode-agnostic representation every numeric kernel operates on.
//! Elements carry owned working copies of their coordinates; the host adapter
//! reads results back through the observer/commit contract, so no raw
//! back-pointers into host memory exist anywhere in the core.

use glam::{EulerRot, Mat3, Quat, Vec3};

use crate::flags::{ElementFlags, ProtectFlags};

/// One transformable element (a vertex, an object, a bone, a key, ...).
#[derive(Debug, Clone)]
pub struct TransformElement {
    /// Working location, rewritten by the active kernel every modal step.
    pub co: Vec3,
    /// Original location. Never mutated after creation; every incremental
    /// apply starts from it.
    pub co_orig: Vec3,
    /// Local pivot for this element, used by individual-origins pivoting.
    pub center: Vec3,
    /// Optional 1-D channel (bevel weight, crease, radius, tilt, ...).
    pub value: Option<f32>,
    /// Original value of the 1-D channel.
    pub value_orig: f32,
    /// Element-local space to kernel space.
    pub mtx: Mat3,
    /// Pseudo-inverse of `mtx`, finite even for zero-scale axes.
    pub smtx: Mat3,
    /// The element's own orientation, used for individual-origin rotation
    /// and axis-reoriented scaling.
    pub axis_mtx: Mat3,
    /// Proportional-editing weight: 1 for selected, falloff in (0, 1) for
    /// connected neighbors, 0 for unaffected.
    pub factor: f32,
    /// Raw connectivity distance from the nearest selected element.
    pub dist: f32,
    /// Distance actually used by falloff evaluation; `f32::MAX` marks
    /// elements unreachable under connected falloff.
    pub rdist: f32,
    pub flags: ElementFlags,
    pub protect: ProtectFlags,
}

impl TransformElement {
    /// A selected element at `co` with identity space matrices.
    pub fn at(co: Vec3) -> Self {
        let mut flags = ElementFlags::default();
        flags.set(ElementFlags::SELECTED);
        Self {
            co,
            co_orig: co,
            center: co,
            value: None,
            value_orig: 0.0,
            mtx: Mat3::IDENTITY,
            smtx: Mat3::IDENTITY,
            axis_mtx: Mat3::IDENTITY,
            factor: 1.0,
            dist: 0.0,
            rdist: 0.0,
            flags,
            protect: ProtectFlags::default(),
        }
    }

    /// Attach a 1-D value channel.
    pub fn with_value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self.value_orig = value;
        self
    }

    /// Set both space matrices, deriving `smtx` as the pseudo-inverse.
    pub fn with_space(mut self, mtx: Mat3) -> Self {
        self.smtx = crate::math::pseudo_inverse(mtx);
        self.mtx = mtx;
        self
    }

    /// Whether any kernel should touch this element at all.
    pub fn is_transformed(&self) -> bool {
        !self.flags.is_skipped()
    }

    /// A proportional weight of exactly zero must leave the element
    /// bit-identical to its original; kernels early-out through this.
    pub fn is_unaffected(&self) -> bool {
        self.factor == 0.0
    }

    /// Restore the working state to the original, bit-exact.
    pub fn restore(&mut self) {
        self.co = self.co_orig;
        if self.value.is_some() {
            self.value = Some(self.value_orig);
        }
    }

    /// Zero out protected location components of a delta vector. Elements
    /// with no writable location drop the whole delta.
    pub fn protect_location(&self, mut delta: Vec3) -> Vec3 {
        if self.flags.has(ElementFlags::NO_LOCATION) {
            return Vec3::ZERO;
        }
        for axis in 0..3 {
            if self.protect.loc_axis(axis) {
                delta[axis] = 0.0;
            }
        }
        delta
    }
}

/// Rotation storage representation, mirroring the host's channel layout.
///
/// Variants are mutually exclusive per element; kernels compose the applied
/// rotation into whichever representation the element stores.
#[derive(Debug, Clone)]
pub enum Rotation {
    Euler {
        order: EulerRot,
        rot: Vec3,
        rot_orig: Vec3,
        /// Parent-driven delta rotation applied outside this session.
        drot: Vec3,
    },
    Quaternion {
        quat: Quat,
        quat_orig: Quat,
    },
    AxisAngle {
        axis: Vec3,
        angle: f32,
        axis_orig: Vec3,
        angle_orig: f32,
    },
}

impl Rotation {
    pub fn euler_xyz(rot: Vec3) -> Self {
        Rotation::Euler {
            order: EulerRot::XYZ,
            rot,
            rot_orig: rot,
            drot: Vec3::ZERO,
        }
    }

    pub fn quaternion(quat: Quat) -> Self {
        Rotation::Quaternion {
            quat,
            quat_orig: quat,
        }
    }

    pub fn axis_angle(axis: Vec3, angle: f32) -> Self {
        Rotation::AxisAngle {
            axis,
            angle,
            axis_orig: axis,
            angle_orig: angle,
        }
    }

    /// Current rotation as a matrix.
    pub fn to_mat3(&self) -> Mat3 {
        match self {
            Rotation::Euler { order, rot, .. } => Mat3::from_euler(*order, rot.x, rot.y, rot.z),
            Rotation::Quaternion { quat, .. } => Mat3::from_quat(*quat),
            Rotation::AxisAngle { axis, angle, .. } => {
                let axis_n = axis.normalize_or_zero();
                if axis_n == Vec3::ZERO {
                    Mat3::IDENTITY
                } else {
                    Mat3::from_axis_angle(axis_n, *angle)
                }
            }
        }
    }

    pub fn restore(&mut self) {
        match self {
            Rotation::Euler { rot, rot_orig, .. } => *rot = *rot_orig,
            Rotation::Quaternion { quat, quat_orig } => *quat = *quat_orig,
            Rotation::AxisAngle {
                axis,
                angle,
                axis_orig,
                angle_orig,
            } => {
                *axis = *axis_orig;
                *angle = *angle_orig;
            }
        }
    }
}

/// Optional rotation/scale extension, parallel to the element array.
#[derive(Debug, Clone)]
pub struct ElementExt {
    pub rotation: Rotation,
    pub scale: Vec3,
    pub scale_orig: Vec3,
    /// Parent-driven scale delta applied outside this session.
    pub dscale: Vec3,
    /// Shell factor used by even-thickness shrink/fatten.
    pub shell_factor: f32,
}

impl ElementExt {
    pub fn new(rotation: Rotation) -> Self {
        Self {
            rotation,
            scale: Vec3::ONE,
            scale_orig: Vec3::ONE,
            dscale: Vec3::ZERO,
            shell_factor: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self.scale_orig = scale;
        self
    }

    pub fn restore(&mut self) {
        self.rotation.restore();
        self.scale = self.scale_orig;
    }
}
