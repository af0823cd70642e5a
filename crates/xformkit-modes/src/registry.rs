//! Mode dispatch table.

use std::collections::HashMap;
use std::sync::LazyLock;

use xformkit_core::ModeKind;

use crate::align::Align;
use crate::bend::Bend;
use crate::edge_slide::EdgeSlide;
use crate::kernel::ModeKernel;
use crate::mirror::Mirror;
use crate::push_pull::PushPull;
use crate::resize::{Resize, SkinResize};
use crate::rotate::{Rotate, Trackball};
use crate::shear::Shear;
use crate::shrink_fatten::ShrinkFatten;
use crate::to_sphere::ToSphere;
use crate::translate::Translate;
use crate::value;
use crate::vert_slide::VertSlide;

static REGISTRY: LazyLock<HashMap<ModeKind, Box<dyn ModeKernel>>> = LazyLock::new(|| {
    let kernels: Vec<Box<dyn ModeKernel>> = vec![
        Box::new(Translate),
        Box::new(Rotate),
        Box::new(Trackball),
        Box::new(Resize),
        Box::new(SkinResize),
        Box::new(Shear),
        Box::new(Bend),
        Box::new(ToSphere),
        Box::new(ShrinkFatten),
        Box::new(PushPull),
        Box::new(value::TILT),
        Box::new(value::BEVEL_WEIGHT),
        Box::new(value::CREASE),
        Box::new(value::CURVE_SHRINK_FATTEN),
        Box::new(value::BONE_ENVELOPE),
        Box::new(value::BONE_ROLL),
        Box::new(EdgeSlide),
        Box::new(VertSlide),
        Box::new(Mirror),
        Box::new(Align),
    ];
    kernels.into_iter().map(|k| (k.kind(), k)).collect()
});

/// Kernel for a mode. Every `ModeKind` has one.
pub fn kernel_for(kind: ModeKind) -> &'static dyn ModeKernel {
    REGISTRY
        .get(&kind)
        .map(|k| k.as_ref())
        .unwrap_or_else(|| unreachable!("unregistered mode {kind:?}"))
}
