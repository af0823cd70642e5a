//! Edge slide.
//!
//! Slides selected edge-loop vertices along their adjacent edges. The
//! adapter precomputes, per vertex, the two candidate directions toward
//! the neighboring loops; the sign of the slide factor picks the side.
//! Requires slide topology, so sessions without it fall back to another
//! mode.

use std::fmt::Write as _;

use tracing::debug;

use xformkit_core::event::RawEvent;
use xformkit_core::flags::SessionFlags;
use xformkit_core::input::InputMode;
use xformkit_core::observer::Redraw;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result, TransformError};

use crate::kernel::{resolve_num_input, ModeKernel};

pub struct EdgeSlide;

impl ModeKernel for EdgeSlide {
    fn kind(&self) -> ModeKind {
        ModeKind::EdgeSlide
    }

    fn input_mode(&self) -> InputMode {
        InputMode::CustomRatioFlip
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        let has_data = t
            .groups
            .iter()
            .any(|g| g.slide.as_ref().is_some_and(|s| s.has_edge_data()));
        if !has_data {
            return Err(TransformError::MissingTopology {
                mode: ModeKind::EdgeSlide,
            });
        }
        let verts: usize = t
            .groups
            .iter()
            .filter_map(|g| g.slide.as_ref())
            .map(|s| s.verts.len())
            .sum();
        debug!(verts, "edge slide topology bound");
        // Seed the pointer's reference segment from the active vertex's
        // slide direction, projected to the screen.
        seed_custom_ref(t);
        // Scratch: x = even, y = clamp (on by default), z = flipped.
        t.custom_vecs[2] = glam::Vec3::new(0.0, 1.0, 0.0);
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        resolve_num_input(t, 1);
        let even = t.custom_vecs[2].x != 0.0;
        let clamp = t.custom_vecs[2].y != 0.0;
        let flipped = t.custom_vecs[2].z != 0.0;

        let mut perc = t.values_final[0];
        if flipped {
            perc = -perc;
        }
        if clamp {
            perc = perc.clamp(-1.0, 1.0);
        }
        t.values_final[0] = perc;

        let side = if perc < 0.0 { 1 } else { 0 };
        let abs = perc.abs();

        for group in t.groups.iter_mut() {
            let Some(slide) = group.slide.clone() else {
                continue;
            };
            let active_len = slide
                .verts
                .get(slide.active)
                .map(|sv| sv.edge_len)
                .unwrap_or(1.0);
            for sv in &slide.verts {
                let Some(el) = group.elements.get_mut(sv.element) else {
                    continue;
                };
                if !el.is_transformed() {
                    continue;
                }
                if el.is_unaffected() {
                    el.co = el.co_orig;
                    continue;
                }
                let dir = sv.dir_side[side];
                let delta = if even {
                    // Same absolute distance for every vertex, measured
                    // against the active vertex's edge.
                    let len = dir.length();
                    if len < 1e-9 {
                        glam::Vec3::ZERO
                    } else {
                        dir / len * (abs * active_len)
                    }
                } else {
                    dir * abs
                };
                el.co = el.co_orig + el.protect_location(delta * el.factor);
            }
        }

        let mut out = String::new();
        if t.num.has_input() {
            let _ = write!(out, "Edge Slide: {}", t.num.display());
        } else {
            let _ = write!(out, "Edge Slide: {perc:.4}");
        }
        let _ = write!(
            out,
            " (E)ven: {} (C)lamp: {} (F)lip: {}",
            on_off(even),
            on_off(clamp),
            on_off(flipped)
        );
        t.header = out;
    }

    fn handle_event(&self, t: &mut TransformSession, event: &RawEvent) -> Redraw {
        let RawEvent::Key(key) = event else {
            return Redraw::Nothing;
        };
        match key.to_ascii_lowercase() {
            'e' => {
                t.custom_vecs[2].x = 1.0 - t.custom_vecs[2].x;
                Redraw::Hard
            }
            'c' => {
                t.custom_vecs[2].y = 1.0 - t.custom_vecs[2].y;
                Redraw::Hard
            }
            'f' => {
                t.custom_vecs[2].z = 1.0 - t.custom_vecs[2].z;
                Redraw::Hard
            }
            _ => Redraw::Nothing,
        }
    }
}

fn on_off(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

fn seed_custom_ref(t: &mut TransformSession) {
    for group in &t.groups {
        let Some(slide) = &group.slide else {
            continue;
        };
        let Some(sv) = slide.verts.get(slide.active) else {
            continue;
        };
        let Some(el) = group.elements.get(sv.element) else {
            continue;
        };
        let a = group.to_global(el.co_orig);
        let b = group.to_global(el.co_orig + sv.dir_side[0]);
        let (Some(pa), Some(pb)) = (t.view.project(a), t.view.project(b)) else {
            continue;
        };
        t.pointer.set_custom_ref(pa, pb);
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use smallvec::SmallVec;
    use xformkit_core::element::TransformElement;
    use xformkit_core::group::{ElementGroup, SlideTopology, SlideVert};

    fn slide_session() -> TransformSession {
        let elements = vec![
            TransformElement::at(Vec3::ZERO),
            TransformElement::at(Vec3::new(1.0, 0.0, 0.0)),
        ];
        let topology = SlideTopology {
            verts: vec![
                SlideVert {
                    element: 0,
                    dir_side: [Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -2.0, 0.0)],
                    edge_len: 1.0,
                    links: SmallVec::new(),
                },
                SlideVert {
                    element: 1,
                    dir_side: [Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, -0.5, 0.0)],
                    edge_len: 0.5,
                    links: SmallVec::new(),
                },
            ],
            active: 0,
            active_link: 0,
        };
        TransformSession::builder(ModeKind::EdgeSlide)
            .group(ElementGroup::new("obj", elements).with_slide(topology))
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_topology_is_fallback_error() {
        let mut t = TransformSession::builder(ModeKind::EdgeSlide)
            .group(ElementGroup::new("obj", vec![TransformElement::at(Vec3::ZERO)]))
            .build()
            .unwrap();
        let err = EdgeSlide.init(&mut t).unwrap_err();
        assert!(err.is_mode_fallback());
    }

    #[test]
    fn test_positive_factor_slides_side_zero() {
        let mut t = slide_session();
        EdgeSlide.init(&mut t).unwrap();
        t.values[0] = 0.5;
        EdgeSlide.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-5);
        assert!((t.groups[0].elements[1].co - Vec3::new(1.0, 0.25, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_negative_factor_slides_other_side() {
        let mut t = slide_session();
        EdgeSlide.init(&mut t).unwrap();
        t.values[0] = -0.5;
        EdgeSlide.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_clamp_limits_factor() {
        let mut t = slide_session();
        EdgeSlide.init(&mut t).unwrap();
        t.values[0] = 3.0;
        EdgeSlide.apply(&mut t);
        assert_eq!(t.values_final[0], 1.0);
        // Unclamped after toggling.
        EdgeSlide.handle_event(&mut t, &RawEvent::Key('c'));
        EdgeSlide.apply(&mut t);
        assert_eq!(t.values_final[0], 3.0);
    }

    #[test]
    fn test_even_uses_active_edge_length() {
        let mut t = slide_session();
        EdgeSlide.init(&mut t).unwrap();
        EdgeSlide.handle_event(&mut t, &RawEvent::Key('e'));
        t.values[0] = 0.5;
        EdgeSlide.apply(&mut t);
        // Both verts move 0.5 * active_len = 0.5 along their directions.
        assert!((t.groups[0].elements[0].co - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-5);
        assert!((t.groups[0].elements[1].co - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_flip_reverses_direction() {
        let mut t = slide_session();
        EdgeSlide.init(&mut t).unwrap();
        EdgeSlide.handle_event(&mut t, &RawEvent::Key('f'));
        t.values[0] = 0.5;
        EdgeSlide.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
    }
}
