//! # xformkit Modes
//!
//! The numeric kernels behind every transform mode. Each kernel reads the
//! shaped input values off the session, rewrites element working state
//! from the originals, and composes the header line. Dispatch goes
//! through [`registry::kernel_for`].

pub mod align;
pub mod bend;
pub mod edge_slide;
pub mod kernel;
pub mod mirror;
pub mod parallel;
pub mod push_pull;
pub mod registry;
pub mod resize;
pub mod rotate;
pub mod shear;
pub mod shrink_fatten;
pub mod to_sphere;
pub mod translate;
pub mod value;
pub mod vert_slide;

pub use kernel::ModeKernel;

pub use registry::kernel_for;

pub use rotate::{rotate_channel, rotate_elements, rotate_elements_mat};

pub use resize::resize_elements;
