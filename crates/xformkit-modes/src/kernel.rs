//! The kernel trait every transform mode implements.
//!
//! A kernel owns no state. Everything it reads and writes lives on the
//! session, so switching modes mid-modal is a matter of restoring the
//! session and running another kernel's `init`.

use xformkit_core::event::RawEvent;
use xformkit_core::input::InputMode;
use xformkit_core::numinput::NumFlags;
use xformkit_core::observer::Redraw;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result};

pub trait ModeKernel: Send + Sync {
    fn kind(&self) -> ModeKind;

    /// How raw pointer motion is shaped for this mode.
    fn input_mode(&self) -> InputMode;

    /// How many floats the mode consumes (1 to 3).
    fn value_count(&self) -> usize {
        1
    }

    /// Restrictions on typed numeric input.
    fn num_flags(&self) -> NumFlags {
        NumFlags::default()
    }

    /// Unit suffix for typed values in the header.
    fn num_unit(&self) -> &'static str {
        ""
    }

    /// Validate preconditions and seed mode state on the session. Runs
    /// once, before the first apply.
    fn init(&self, t: &mut TransformSession) -> Result<()>;

    /// Shape `t.values` into `t.values_final`, rewrite every element from
    /// its original state, and compose the header.
    fn apply(&self, t: &mut TransformSession);

    /// Mode-specific event handling, after the shared keymap. The default
    /// consumes nothing.
    fn handle_event(&self, t: &mut TransformSession, event: &RawEvent) -> Redraw {
        let _ = (t, event);
        Redraw::Nothing
    }
}

/// Resolve typed numeric input against pointer-derived values. Returns
/// true when numeric capture overrode the values, which suppresses
/// increment snapping.
pub fn resolve_num_input(t: &mut TransformSession, count: usize) -> bool {
    if !t.num.has_input() {
        return false;
    }
    let mut vals = [0.0f32; 4];
    vals[..count].copy_from_slice(&t.values_final[..count]);
    let changed = t.num.apply(&mut vals[..count]);
    if changed {
        t.values_final[..count].copy_from_slice(&vals[..count]);
    }
    changed
}
