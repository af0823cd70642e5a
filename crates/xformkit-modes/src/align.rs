//! Align.
//!
//! Single-shot: rotates each element's channels so its own axes coincide
//! with the active orientation basis. Locations never move.

use xformkit_core::flags::SessionFlags;
use xformkit_core::input::InputMode;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result, TransformError};

use crate::kernel::ModeKernel;
use crate::rotate::rotate_channel;

pub struct Align;

impl ModeKernel for Align {
    fn kind(&self) -> ModeKind {
        ModeKind::Align
    }

    fn input_mode(&self) -> InputMode {
        InputMode::None
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        let has_channels = t
            .groups
            .iter()
            .any(|g| !g.exts.is_empty() && g.exts.len() == g.elements.len());
        if !has_channels {
            return Err(TransformError::ModeUnsupported {
                mode: ModeKind::Align,
                space: t.space,
            });
        }
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        let target = t.orientation_basis();
        let large_step = t.settings.read().large_rotation_step;

        for group in t.groups.iter_mut() {
            if group.exts.len() != group.elements.len() {
                continue;
            }
            let target_local = group.imat3 * target;
            for (el, ext) in group.elements.iter().zip(group.exts.iter_mut()) {
                if !el.is_transformed() || el.is_unaffected() {
                    continue;
                }
                // Rotation that carries the element's axes onto the target.
                let rot = target_local * el.axis_mtx.transpose();
                rotate_channel(ext, rot, large_step, el.protect);
            }
        }

        t.header = format!("Align to {}", t.orientation_name());
    }
}
