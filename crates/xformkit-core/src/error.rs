//! Error handling for the transform core.
//!
//! All fallible session/mode setup paths return [`TransformError`]. Degenerate
//! geometry during a modal step is never an error: kernels and the snapping
//! engine use `Option` sentinels so a single bad element or candidate can be
//! skipped without aborting the operation.

use thiserror::Error;

use crate::mode::ModeKind;
use crate::session::SpaceKind;

/// Transform error type
///
/// Represents errors raised while setting up a transform session or
/// initializing a mode. Once the modal loop is running, no kernel raises.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// No transformable element was found in the selection
    #[error("Nothing to transform")]
    NothingToTransform,

    /// Proportional editing found connected elements but no selected one
    #[error("No selected element found under proportional editing")]
    NoSelectedElement,

    /// The requested mode cannot run in the active editor/space
    #[error("{mode} is not supported in {space}")]
    ModeUnsupported {
        /// The mode that was requested.
        mode: ModeKind,
        /// The space the session is bound to.
        space: SpaceKind,
    },

    /// The mode needs adjacency data the selection adapter did not supply
    #[error("{mode} requires connected topology")]
    MissingTopology {
        /// The mode that was requested.
        mode: ModeKind,
    },

    /// A lifecycle call arrived in a state that cannot accept it
    #[error("Invalid session state: {reason}")]
    InvalidState {
        /// Why the state transition was rejected.
        reason: String,
    },

    /// Settings could not be read or written
    #[error("Settings error: {reason}")]
    Settings {
        /// The underlying failure description.
        reason: String,
    },
}

impl TransformError {
    /// Check if this error aborts session setup before the modal loop
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            TransformError::NothingToTransform | TransformError::NoSelectedElement
        )
    }

    /// Check if this error can be recovered by falling back to another mode
    pub fn is_mode_fallback(&self) -> bool {
        matches!(
            self,
            TransformError::MissingTopology { .. } | TransformError::ModeUnsupported { .. }
        )
    }
}

/// Result type using TransformError
pub type Result<T> = std::result::Result<T, TransformError>;
