//! Bitflag sets used across the session and per-element records.
//!
//! Plain `u32` newtypes with named predicate accessors; no operator
//! overloading, state is queried through `has()` and mutated through
//! `set()`/`clear()`/`toggle()`.

/// Per-element flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementFlags(u32);

impl ElementFlags {
    /// Element is part of the selection and transforms at full weight.
    pub const SELECTED: u32 = 1 << 0;
    /// Element must be excluded from kernel iteration entirely
    /// (linked/uneditable data, handle covered by its own control point).
    pub const SKIP: u32 = 1 << 1;
    /// Element has no writable location; only rotation/scale channels apply.
    pub const NO_LOCATION: u32 = 1 << 2;
    /// Element scales through a single 1-D value instead of a 3-vector.
    pub const SINGLE_SIZE: u32 = 1 << 3;
    /// Element scales around its own center regardless of the pivot mode.
    pub const INDIVIDUAL_SCALE: u32 = 1 << 4;

    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn set(&mut self, bit: u32) {
        self.0 |= bit;
    }

    pub fn clear(&mut self, bit: u32) {
        self.0 &= !bit;
    }

    pub fn is_selected(self) -> bool {
        self.has(Self::SELECTED)
    }

    pub fn is_skipped(self) -> bool {
        self.has(Self::SKIP)
    }
}

/// Per-channel protection locks copied from the host data.
///
/// A locked channel keeps its initial value no matter what a kernel computes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtectFlags(u32);

impl ProtectFlags {
    pub const LOC_X: u32 = 1 << 0;
    pub const LOC_Y: u32 = 1 << 1;
    pub const LOC_Z: u32 = 1 << 2;
    pub const ROT_X: u32 = 1 << 3;
    pub const ROT_Y: u32 = 1 << 4;
    pub const ROT_Z: u32 = 1 << 5;
    pub const SCALE_X: u32 = 1 << 6;
    pub const SCALE_Y: u32 = 1 << 7;
    pub const SCALE_Z: u32 = 1 << 8;

    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn loc_axis(self, axis: usize) -> bool {
        self.has(Self::LOC_X << axis)
    }

    pub fn rot_axis(self, axis: usize) -> bool {
        self.has(Self::ROT_X << axis)
    }

    pub fn any_rot_axis(self) -> bool {
        self.has(Self::ROT_X | Self::ROT_Y | Self::ROT_Z)
    }

    pub fn scale_axis(self, axis: usize) -> bool {
        self.has(Self::SCALE_X << axis)
    }
}

/// Session-wide behavior flags, set at init or toggled by modal events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags(u32);

impl SessionFlags {
    /// Proportional editing is active.
    pub const PROP_EDIT: u32 = 1 << 0;
    /// Proportional falloff only reaches topologically connected elements.
    pub const PROP_CONNECTED: u32 = 1 << 1;
    /// Alternate behavior toggle (unclamped slide, even thickness, ...).
    pub const ALT_TRANSFORM: u32 = 1 << 2;
    /// The active mode refuses axis constraints.
    pub const NO_CONSTRAINT: u32 = 1 << 3;
    /// Numeric zero maps to one (scale-like modes).
    pub const NULL_ONE: u32 = 1 << 5;
    /// Per-element surface re-projection runs after each apply.
    pub const PROJECT_INDIVIDUAL: u32 = 1 << 7;
    /// Snap-found surface normals re-orient elements before translating.
    pub const SNAP_ALIGN_ROTATION: u32 = 1 << 8;

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn set(&mut self, bit: u32) {
        self.0 |= bit;
    }

    pub fn clear(&mut self, bit: u32) {
        self.0 &= !bit;
    }

    pub fn toggle(&mut self, bit: u32) {
        self.0 ^= bit;
    }

    /// Clear everything a mode init is allowed to own; session-level toggles
    /// (proportional editing) survive a mode switch.
    pub fn reset_mode_restrictions(&mut self) {
        self.0 &= Self::PROP_EDIT | Self::PROP_CONNECTED;
    }
}

/// Momentary input modifiers resolved from the modal keymap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierFlags(u32);

impl ModifierFlags {
    /// Precision drag (shift): input deltas are scaled down.
    pub const PRECISION: u32 = 1 << 0;
    /// Momentary snap invert (ctrl held).
    pub const SNAP_INVERT: u32 = 1 << 1;
    /// Snap toggled on for the rest of the session.
    pub const SNAP_FORCED: u32 = 1 << 2;

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn set(&mut self, bit: u32) {
        self.0 |= bit;
    }

    pub fn clear(&mut self, bit: u32) {
        self.0 &= !bit;
    }

    pub fn toggle(&mut self, bit: u32) {
        self.0 ^= bit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_flags_predicates() {
        let mut flags = ElementFlags::default();
        assert!(!flags.is_selected());
        flags.set(ElementFlags::SELECTED);
        assert!(flags.is_selected());
        flags.clear(ElementFlags::SELECTED);
        assert!(!flags.is_selected());
    }

    #[test]
    fn test_session_flags_mode_reset_keeps_prop_edit() {
        let mut flags = SessionFlags::default();
        flags.set(SessionFlags::PROP_EDIT);
        flags.set(SessionFlags::NO_CONSTRAINT);
        flags.set(SessionFlags::NULL_ONE);
        flags.reset_mode_restrictions();
        assert!(flags.has(SessionFlags::PROP_EDIT));
        assert!(!flags.has(SessionFlags::NO_CONSTRAINT));
        assert!(!flags.has(SessionFlags::NULL_ONE));
    }

    #[test]
    fn test_protect_flags_axis_lookup() {
        let protect = ProtectFlags::new(ProtectFlags::LOC_Y | ProtectFlags::SCALE_Z);
        assert!(!protect.loc_axis(0));
        assert!(protect.loc_axis(1));
        assert!(protect.scale_axis(2));
        assert!(!protect.rot_axis(1));
    }
}
