//! # xformkit Core
//!
//! State, math and input plumbing for interactive modal transforms.
//! Provides the session object, per-element records, axis constraints,
//! snapping, proportional falloff and the pointer/numeric input mappers
//! that the mode kernels and the modal controller build on.

pub mod constraint;
pub mod element;
pub mod error;
pub mod event;
pub mod flags;
pub mod group;
pub mod input;
pub mod math;
pub mod mode;
pub mod numinput;
pub mod observer;
pub mod prop;
pub mod session;
pub mod settings;
pub mod snap;
pub mod view;

pub use constraint::{AxisConstraint, ConstraintCycle};

pub use element::{ElementExt, Rotation, TransformElement};

pub use error::{Result, TransformError};

pub use event::{ModalAction, RawEvent};

pub use flags::{ElementFlags, ModifierFlags, ProtectFlags, SessionFlags};

pub use group::{ElementGroup, SlideTopology, SlideVert};

pub use input::{InputMode, PointerInput};

pub use mode::ModeKind;

pub use numinput::{NumFlags, NumericInput};

pub use observer::{ExitCode, NullObserver, Redraw, SessionObserver};

pub use prop::{Falloff, Lcg};

pub use session::{
    PivotPoint, SessionBuilder, SessionState, SpaceKind, TargetKind, TransformSession,
};

pub use settings::{settings_handle, SettingsHandle, TransformSettings};

pub use snap::{
    increment_snap, ProjectMissPolicy, SnapContext, SnapHit, SnapModeSet, SnapQuery,
    SnapSourcePolicy, SnapStatus,
};

pub use view::ViewParams;
