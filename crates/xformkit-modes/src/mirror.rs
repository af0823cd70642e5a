//! Mirror.
//!
//! Single-shot: reflects the selection through the pivot across the
//! constrained axis (or all axes when a plane is constrained). Without a
//! constraint nothing moves; the header prompts for an axis. Reflection
//! reuses the resize path with a negative scale, so scale channels keep
//! their sign through the signed size extraction.

use glam::{Mat3, Vec3};

use xformkit_core::input::InputMode;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result};

use crate::kernel::ModeKernel;
use crate::resize::resize_elements;

pub struct Mirror;

impl ModeKernel for Mirror {
    fn kind(&self) -> ModeKind {
        ModeKind::Mirror
    }

    fn input_mode(&self) -> InputMode {
        InputMode::None
    }

    fn init(&self, _t: &mut TransformSession) -> Result<()> {
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        if !t.con.applied {
            // Wait for an axis; keep everything at the original.
            for group in t.groups.iter_mut() {
                group.restore();
            }
            t.header = "Select a mirror axis (X, Y, Z)".to_string();
            return;
        }

        let mut diag = Vec3::ONE;
        for axis in 0..3 {
            if t.con.axes[axis] {
                diag[axis] = -1.0;
            }
        }
        t.values_final[0] = diag.x;
        t.values_final[1] = diag.y;
        t.values_final[2] = diag.z;

        let basis = t.con.basis();
        let smat = basis * Mat3::from_diagonal(diag) * basis.inverse();
        resize_elements(t, smat);

        t.header = format!("Mirror {}", t.con.label);
    }
}
