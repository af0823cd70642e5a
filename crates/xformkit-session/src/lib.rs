//! # xformkit Session
//!
//! The modal controller. Takes a built `TransformSession`, binds the mode
//! kernel and drives the event loop: pointer shaping, constraint and snap
//! toggles, numeric capture, mode switching, confirm and cancel.

pub mod controller;

pub use controller::{start, ModalRunner};
