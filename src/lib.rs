//! # XformKit
//!
//! An interactive modal transform core, host-agnostic: the kind of
//! translate/rotate/scale engine a 3D editor runs between mouse-down and
//! confirm, with:
//! - 20 transform modes (translate, rotate, trackball, resize, shear,
//!   bend, to-sphere, mirror, align, slides, value channels, ...)
//! - Axis/plane constraints in global, local and custom orientations
//! - Increment and scene-geometry snapping with multi-point averaging
//! - Proportional editing with eight falloff curves
//! - Typed numeric input and precision pointer shaping
//!
//! ## Architecture
//!
//! XformKit is organized as a workspace with multiple crates:
//!
//! 1. **xformkit-core** - Session, elements, constraints, snapping, input
//! 2. **xformkit-modes** - The mode kernels and their registry
//! 3. **xformkit-session** - The modal controller driving a session
//! 4. **xformkit** - Facade crate and headless demo binary
//!
//! A host embeds the library by collecting its selection into
//! [`ElementGroup`]s, building a [`TransformSession`], wiring a
//! [`SessionObserver`] and pumping raw events into a
//! [`ModalRunner`] until it reports done.

pub use xformkit_core::{
    AxisConstraint, ConstraintCycle, ElementExt, ElementFlags, ElementGroup, ExitCode, Falloff,
    InputMode, ModalAction, ModeKind, ModifierFlags, NullObserver, NumericInput, PivotPoint,
    PointerInput,
    ProtectFlags, RawEvent, Redraw, Result, Rotation, SessionBuilder, SessionFlags,
    SessionObserver, SessionState, SnapContext, SnapHit, SnapQuery, SpaceKind, TargetKind,
    TransformElement, TransformError, TransformSession, TransformSettings, ViewParams,
};

pub use xformkit_modes::{kernel_for, ModeKernel};
pub use xformkit_session::{start, ModalRunner};

/// Initialize tracing for binaries embedding the library. Filtering comes
/// from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
