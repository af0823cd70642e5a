//! Axis constraints.
//!
//! A constraint limits the transform to one or two axes of an orientation
//! basis. Vectors are projected through `B * S * B^-1` where `S` zeroes the
//! unselected rows; the projection is idempotent, so re-applying it after
//! snapping cannot move a value further.

use glam::{Mat3, Vec3};

/// Axis selection plus the basis it is expressed in.
#[derive(Debug, Clone)]
pub struct AxisConstraint {
    /// Whether projection is currently in effect.
    pub applied: bool,
    /// Which basis axes remain free.
    pub axes: [bool; 3],
    /// Basis is a per-group local orientation rather than a shared one.
    pub local: bool,
    /// Slot in the session orientation stack the basis came from.
    pub orientation_index: usize,
    basis: Mat3,
    basis_inv: Mat3,
    /// Header label, e.g. "along global X" or "locking local Z".
    pub label: String,
}

impl Default for AxisConstraint {
    fn default() -> Self {
        Self {
            applied: false,
            axes: [true; 3],
            local: false,
            orientation_index: 0,
            basis: Mat3::IDENTITY,
            basis_inv: Mat3::IDENTITY,
            label: String::new(),
        }
    }
}

impl AxisConstraint {
    /// Constrain to a single basis axis.
    pub fn single_axis(basis: Mat3, axis: usize, label: impl Into<String>) -> Self {
        let mut axes = [false; 3];
        axes[axis] = true;
        Self::with_axes(basis, axes, label)
    }

    /// Constrain to the plane excluding `axis`.
    pub fn plane(basis: Mat3, axis: usize, label: impl Into<String>) -> Self {
        let mut axes = [true; 3];
        axes[axis] = false;
        Self::with_axes(basis, axes, label)
    }

    pub fn with_axes(basis: Mat3, axes: [bool; 3], label: impl Into<String>) -> Self {
        Self {
            applied: true,
            axes,
            local: false,
            orientation_index: 0,
            basis,
            basis_inv: basis.inverse(),
            label: label.into(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn basis(&self) -> Mat3 {
        self.basis
    }

    pub fn set_basis(&mut self, basis: Mat3) {
        self.basis = basis;
        self.basis_inv = basis.inverse();
    }

    pub fn axis_count(&self) -> usize {
        self.axes.iter().filter(|&&a| a).count()
    }

    /// Project a world-space vector onto the permitted axes.
    pub fn constrain_vector(&self, vec: Vec3) -> Vec3 {
        if !self.applied {
            return vec;
        }
        let mut local = self.basis_inv * vec;
        for axis in 0..3 {
            if !self.axes[axis] {
                local[axis] = 0.0;
            }
        }
        self.basis * local
    }

    /// Reinterpret typed component values as coordinates on the permitted
    /// axes, so one typed number travels along a single-axis constraint
    /// instead of landing on global X.
    pub fn constrain_num_input(&self, vec: Vec3) -> Vec3 {
        if !self.applied {
            return vec;
        }
        let mut local = Vec3::ZERO;
        let mut src = 0;
        for axis in 0..3 {
            if self.axes[axis] {
                local[axis] = vec[src];
                src += 1;
            }
        }
        self.basis * local
    }

    /// Filter a scale matrix so only permitted axes depart from identity.
    /// The filter runs in basis space; unselected rows and columns are
    /// reset to the identity row/column.
    pub fn constrain_scale(&self, smat: Mat3) -> Mat3 {
        if !self.applied {
            return smat;
        }
        let mut local = self.basis_inv * smat * self.basis;
        for axis in 0..3 {
            if !self.axes[axis] {
                for other in 0..3 {
                    local.col_mut(other)[axis] = if other == axis { 1.0 } else { 0.0 };
                    local.col_mut(axis)[other] = if other == axis { 1.0 } else { 0.0 };
                }
            }
        }
        self.basis * local * self.basis_inv
    }

    /// Rotation axis implied by the constraint. One selected axis rotates
    /// around that axis; a plane rotates around the excluded axis; no
    /// constraint leaves the axis to the view.
    pub fn rotation_axis(&self) -> Option<Vec3> {
        if !self.applied {
            return None;
        }
        match self.axis_count() {
            1 => {
                let axis = self.axes.iter().position(|&a| a)?;
                Some(self.basis.col(axis).normalize_or_zero())
            }
            2 => {
                let axis = self.axes.iter().position(|&a| !a)?;
                Some(self.basis.col(axis).normalize_or_zero())
            }
            _ => None,
        }
    }
}

/// Tracks the X/Y/Z keypress state machine. Each press walks the session
/// orientation slots in order, then the per-group local basis, then
/// releases the constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintCycle {
    /// Constrain in the numbered orientation slot.
    Orientation(usize),
    /// Constrain in the group's own basis.
    Local,
    Off,
}

impl ConstraintCycle {
    pub fn first() -> Self {
        ConstraintCycle::Orientation(0)
    }

    /// Advance one press, given how many orientation slots the session
    /// carries.
    pub fn next(self, slots: usize) -> Self {
        match self {
            ConstraintCycle::Orientation(n) if n + 1 < slots => {
                ConstraintCycle::Orientation(n + 1)
            }
            ConstraintCycle::Orientation(_) => ConstraintCycle::Local,
            ConstraintCycle::Local => ConstraintCycle::Off,
            ConstraintCycle::Off => ConstraintCycle::Orientation(0),
        }
    }
}
