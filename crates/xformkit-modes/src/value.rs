//! Value-channel modes.
//!
//! Six modes share one kernel shape: they never move coordinates, only the
//! per-element scalar channel (tilt, bevel weight, crease, curve radius,
//! envelope distance, bone roll). They differ in how pointer input maps to
//! the scalar and how the result is combined with the original value.

use std::fmt::Write as _;

use xformkit_core::flags::SessionFlags;
use xformkit_core::input::InputMode;
use xformkit_core::numinput::NumFlags;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result, TransformError};

use crate::kernel::{resolve_num_input, ModeKernel};

#[derive(Debug, Clone, Copy)]
enum ValueOp {
    /// value = orig + input
    Add,
    /// value = orig + input, input entered in degrees.
    AddAngle,
    /// value = orig * input
    Scale,
}

pub struct ValueMode {
    kind: ModeKind,
    input: InputMode,
    label: &'static str,
    op: ValueOp,
    clamp: Option<(f32, f32)>,
    num_flags: u32,
}

pub const TILT: ValueMode = ValueMode {
    kind: ModeKind::Tilt,
    input: InputMode::Angle,
    label: "Tilt",
    op: ValueOp::AddAngle,
    clamp: None,
    num_flags: 0,
};

pub const BEVEL_WEIGHT: ValueMode = ValueMode {
    kind: ModeKind::BevelWeight,
    input: InputMode::HorizontalRatio,
    label: "Bevel Weight",
    op: ValueOp::Add,
    clamp: Some((0.0, 1.0)),
    num_flags: 0,
};

pub const CREASE: ValueMode = ValueMode {
    kind: ModeKind::Crease,
    input: InputMode::HorizontalRatio,
    label: "Crease",
    op: ValueOp::Add,
    clamp: Some((0.0, 1.0)),
    num_flags: 0,
};

pub const CURVE_SHRINK_FATTEN: ValueMode = ValueMode {
    kind: ModeKind::CurveShrinkFatten,
    input: InputMode::SpringFlip,
    label: "Curve Radius",
    op: ValueOp::Scale,
    clamp: Some((0.0, f32::MAX)),
    num_flags: NumFlags::NULL_ONE | NumFlags::NO_NEGATIVE,
};

pub const BONE_ENVELOPE: ValueMode = ValueMode {
    kind: ModeKind::BoneEnvelope,
    input: InputMode::SpringFlip,
    label: "Envelope",
    op: ValueOp::Scale,
    clamp: Some((0.0, f32::MAX)),
    num_flags: NumFlags::NULL_ONE | NumFlags::NO_NEGATIVE,
};

pub const BONE_ROLL: ValueMode = ValueMode {
    kind: ModeKind::BoneRoll,
    input: InputMode::Angle,
    label: "Roll",
    op: ValueOp::AddAngle,
    clamp: None,
    num_flags: 0,
};

impl ModeKernel for ValueMode {
    fn kind(&self) -> ModeKind {
        self.kind
    }

    fn input_mode(&self) -> InputMode {
        self.input
    }

    fn num_flags(&self) -> NumFlags {
        NumFlags::new(self.num_flags)
    }

    fn num_unit(&self) -> &'static str {
        match self.op {
            ValueOp::AddAngle => "\u{b0}",
            _ => "",
        }
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        let has_channel = t
            .groups
            .iter()
            .flat_map(|g| g.elements.iter())
            .any(|el| el.is_transformed() && el.value.is_some());
        if !has_channel {
            return Err(TransformError::MissingTopology { mode: self.kind });
        }
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        let numeric = resolve_num_input(t, 1);
        if numeric && matches!(self.op, ValueOp::AddAngle) {
            t.values_final[0] = t.values_final[0].to_radians();
        }
        let input = t.values_final[0];

        for group in t.groups.iter_mut() {
            for el in group.elements.iter_mut() {
                if !el.is_transformed() || el.value.is_none() {
                    continue;
                }
                if el.is_unaffected() {
                    el.value = Some(el.value_orig);
                    continue;
                }
                let mut value = match self.op {
                    ValueOp::Add | ValueOp::AddAngle => el.value_orig + input * el.factor,
                    ValueOp::Scale => {
                        let factored = 1.0 + (input - 1.0) * el.factor;
                        el.value_orig * factored
                    }
                };
                if let Some((lo, hi)) = self.clamp {
                    value = value.clamp(lo, hi);
                }
                el.value = Some(value);
            }
        }

        let mut out = String::new();
        if t.num.has_input() {
            let _ = write!(out, "{}: {}", self.label, t.num.display());
        } else {
            match self.op {
                ValueOp::AddAngle => {
                    let _ = write!(out, "{}: {:.2}\u{b0}", self.label, input.to_degrees());
                }
                _ => {
                    let _ = write!(out, "{}: {:.4}", self.label, input);
                }
            }
        }
        t.header = out;
    }
}
