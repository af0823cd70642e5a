//! Threaded element fan-out.
//!
//! Kernels write every element from its original state each apply, so the
//! per-element work is independent and parallelizes directly. Small
//! selections stay serial; the threshold comes from the settings.

use rayon::prelude::*;

use xformkit_core::element::{ElementExt, TransformElement};
use xformkit_core::group::ElementGroup;

/// Run `f` over every element of `group`, in parallel above `threshold`.
/// The extension slot is `None` when the group carries no channel data.
pub fn for_each_element<F>(group: &mut ElementGroup, threshold: usize, f: F)
where
    F: Fn(&mut TransformElement, Option<&mut ElementExt>) + Sync + Send,
{
    let has_exts = group.exts.len() == group.elements.len();
    if group.elements.len() >= threshold {
        if has_exts {
            group
                .elements
                .par_iter_mut()
                .zip(group.exts.par_iter_mut())
                .for_each(|(el, ext)| f(el, Some(ext)));
        } else {
            group.elements.par_iter_mut().for_each(|el| f(el, None));
        }
    } else if has_exts {
        for (el, ext) in group.elements.iter_mut().zip(group.exts.iter_mut()) {
            f(el, Some(ext));
        }
    } else {
        for el in group.elements.iter_mut() {
            f(el, None);
        }
    }
}
