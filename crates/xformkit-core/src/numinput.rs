//! Typed numeric entry during a modal transform.
//!
//! Digits captured while the session runs override the pointer-derived
//! values. Up to three indices (one per axis), Tab cycles between them,
//! minus toggles sign, Backspace erases and finally releases the capture.

use std::fmt::Write as _;

const NUM_MAX: usize = 3;

/// Per-mode restrictions on what may be typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumFlags(u32);

impl NumFlags {
    /// A final value of 0 is replaced with 1 (scale-like modes).
    pub const NULL_ONE: u32 = 1 << 0;
    /// Negative input is rejected.
    pub const NO_NEGATIVE: u32 = 1 << 1;
    /// A final value of exactly 0 is rejected.
    pub const NO_ZERO: u32 = 1 << 2;
    /// Editing index 0 mirrors into all indices until Tab is pressed.
    pub const AFFECT_ALL: u32 = 1 << 3;

    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub fn has(self, bit: u32) -> bool {
        self.0 & bit != 0
    }
}

#[derive(Debug, Clone)]
pub struct NumericInput {
    /// Index currently being edited.
    idx: usize,
    /// Number of usable indices for the active mode (1 to 3).
    idx_max: usize,
    flags: NumFlags,
    buffers: [String; NUM_MAX],
    edited: [bool; NUM_MAX],
    negative: [bool; NUM_MAX],
    /// Unit suffix for the header, e.g. "" or "\u{b0}".
    unit: &'static str,
}

impl NumericInput {
    pub fn new(idx_max: usize, flags: NumFlags) -> Self {
        Self {
            idx: 0,
            idx_max: idx_max.clamp(1, NUM_MAX),
            flags,
            buffers: Default::default(),
            edited: [false; NUM_MAX],
            negative: [false; NUM_MAX],
            unit: "",
        }
    }

    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    pub fn reset(&mut self) {
        self.idx = 0;
        for buf in &mut self.buffers {
            buf.clear();
        }
        self.edited = [false; NUM_MAX];
        self.negative = [false; NUM_MAX];
    }

    /// Any index captured so far.
    pub fn has_input(&self) -> bool {
        self.edited.iter().any(|&e| e)
    }

    /// Feed one keypress. Returns true when the key was consumed, which
    /// means pointer input is suppressed for this event.
    pub fn handle_char(&mut self, ch: char) -> bool {
        match ch {
            '0'..='9' => {
                self.buffers[self.idx].push(ch);
                self.edited[self.idx] = true;
                true
            }
            '.' | ',' => {
                if !self.buffers[self.idx].contains('.') {
                    if self.buffers[self.idx].is_empty() {
                        self.buffers[self.idx].push('0');
                    }
                    self.buffers[self.idx].push('.');
                }
                self.edited[self.idx] = true;
                true
            }
            '-' => {
                if self.flags.has(NumFlags::NO_NEGATIVE) {
                    return false;
                }
                self.negative[self.idx] = !self.negative[self.idx];
                self.edited[self.idx] = true;
                true
            }
            '\t' => {
                if self.idx_max <= 1 {
                    return false;
                }
                self.idx = (self.idx + 1) % self.idx_max;
                true
            }
            '\u{8}' => {
                // Backspace erases one char, then releases the capture.
                if self.buffers[self.idx].pop().is_none() {
                    if self.negative[self.idx] {
                        self.negative[self.idx] = false;
                    } else {
                        self.edited[self.idx] = false;
                    }
                }
                true
            }
            _ => false,
        }
    }

    fn parse(&self, idx: usize) -> Option<f32> {
        if !self.edited[idx] {
            return None;
        }
        let raw: f32 = if self.buffers[idx].is_empty() {
            0.0
        } else {
            self.buffers[idx].parse().ok()?
        };
        let mut value = if self.negative[idx] { -raw } else { raw };
        if value == 0.0 && self.flags.has(NumFlags::NULL_ONE) {
            value = 1.0;
        }
        if value == 0.0 && self.flags.has(NumFlags::NO_ZERO) {
            return None;
        }
        Some(value)
    }

    /// Overwrite captured indices in `values`. Returns true when anything
    /// was overwritten.
    pub fn apply(&self, values: &mut [f32]) -> bool {
        let mut changed = false;
        let mirror_all = self.flags.has(NumFlags::AFFECT_ALL)
            && self.edited[0]
            && !self.edited[1..self.idx_max.min(values.len())].iter().any(|&e| e);
        for (i, slot) in values.iter_mut().enumerate().take(self.idx_max) {
            let src = if mirror_all { 0 } else { i };
            if let Some(v) = self.parse(src) {
                *slot = v;
                changed = true;
            }
        }
        changed
    }

    /// Header representation, e.g. `1.5` or `2|0.3|NONE`.
    pub fn display(&self) -> String {
        let mut out = String::new();
        for i in 0..self.idx_max {
            if i > 0 {
                out.push('|');
            }
            if self.edited[i] {
                if self.negative[i] {
                    out.push('-');
                }
                if self.buffers[i].is_empty() {
                    out.push('0');
                } else {
                    out.push_str(&self.buffers[i]);
                }
                out.push_str(self.unit);
            } else {
                let _ = write!(out, "NONE");
            }
            if i == self.idx && self.idx_max > 1 {
                out.push('\u{2039}');
            }
        }
        out
    }
}

impl Default for NumericInput {
    fn default() -> Self {
        Self::new(1, NumFlags::default())
    }
}
