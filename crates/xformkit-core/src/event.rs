//! Events consumed by the modal loop.
//!
//! Hosts translate their native input into [`RawEvent`]s. Keymap-level
//! bindings arrive pre-resolved as [`ModalAction`]s; unresolved keypresses
//! arrive as `Key` so numeric capture and mode-specific keys still work.

use glam::Vec2;

/// Keymap-resolved modal actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Confirm,
    Cancel,
    /// Cycle constraint on an axis: global, local, off.
    AxisX,
    AxisY,
    AxisZ,
    /// Cycle the plane excluding an axis.
    PlaneX,
    PlaneY,
    PlaneZ,
    /// Drop any active constraint.
    ClearConstraint,
    /// Switch the session to another mode mid-modal.
    SwitchTranslate,
    SwitchRotate,
    SwitchResize,
    SwitchTrackball,
    /// Toggle snapping for the rest of the session.
    SnapToggle,
    /// Momentary snap invert while held.
    SnapInvertOn,
    SnapInvertOff,
    /// Record / remove a multi-point snap target.
    SnapAddPoint,
    SnapRemovePoint,
    PrecisionOn,
    PrecisionOff,
    /// Grow / shrink the proportional radius.
    PropSizeUp,
    PropSizeDown,
    /// Toggle the mode's alternate behavior (clamp, even thickness, ...).
    AlternateToggle,
    /// Cycle the orientation stack.
    CycleOrientation,
}

/// One input sample delivered to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    /// Pointer moved to this window position.
    Pointer(Vec2),
    /// A keypress the keymap did not claim.
    Key(char),
    /// A keymap-resolved action.
    Modal(ModalAction),
    /// Periodic tick, for hosts that re-snap while the pointer rests.
    Timer,
}
