//! Host integration callbacks.
//!
//! The session owns working copies of element coordinates. A host wires a
//! `SessionObserver` in to receive recalculation requests, redraw hints and
//! header text while the modal loop runs, and to commit or discard results
//! when it ends.

use crate::group::ElementGroup;

/// How much of the display is stale after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Redraw {
    Nothing,
    /// Overlay only (header text, guide lines).
    Soft,
    /// Geometry changed, re-evaluate and redraw.
    Hard,
}

impl Redraw {
    /// Keep the strongest request seen this event.
    pub fn combine(self, other: Redraw) -> Redraw {
        self.max(other)
    }
}

/// Result of driving the modal loop with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    StillRunning,
    Cancelled,
    Finished,
}

impl ExitCode {
    pub fn is_done(self) -> bool {
        !matches!(self, ExitCode::StillRunning)
    }
}

/// Host-side hooks. All methods have no-op defaults so tests can implement
/// only what they assert on.
pub trait SessionObserver {
    /// Element coordinates changed; the host should refresh dependent data.
    fn recalc(&mut self, _groups: &[ElementGroup]) {}

    /// Header / status line text for the active mode.
    fn report(&mut self, _text: &str) {}

    /// The session finished; working copies hold the final coordinates.
    fn commit(&mut self, _groups: &[ElementGroup]) {}

    /// The session was cancelled after coordinates were restored.
    fn discard(&mut self, _groups: &[ElementGroup]) {}
}

/// Observer that does nothing, for headless use.
#[derive(Debug, Default)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redraw_combine_keeps_strongest() {
        assert_eq!(Redraw::Nothing.combine(Redraw::Soft), Redraw::Soft);
        assert_eq!(Redraw::Hard.combine(Redraw::Soft), Redraw::Hard);
        assert_eq!(Redraw::Nothing.combine(Redraw::Nothing), Redraw::Nothing);
    }

    #[test]
    fn test_exit_code_done() {
        assert!(!ExitCode::StillRunning.is_done());
        assert!(ExitCode::Cancelled.is_done());
        assert!(ExitCode::Finished.is_done());
    }
}
