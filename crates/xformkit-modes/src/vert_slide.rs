//! Vertex slide.
//!
//! Slides each selected vertex toward one of its linked neighbors. The
//! factor interpolates from the original position (0) to the link (1),
//! clamped unless the clamp toggle is off. The active link can be cycled
//! to choose which neighbor the slide follows.

use std::fmt::Write as _;

use tracing::debug;

use xformkit_core::event::RawEvent;
use xformkit_core::flags::SessionFlags;
use xformkit_core::input::InputMode;
use xformkit_core::observer::Redraw;
use xformkit_core::session::TransformSession;
use xformkit_core::{ModeKind, Result, TransformError};

use crate::kernel::{resolve_num_input, ModeKernel};

pub struct VertSlide;

impl ModeKernel for VertSlide {
    fn kind(&self) -> ModeKind {
        ModeKind::VertSlide
    }

    fn input_mode(&self) -> InputMode {
        InputMode::CustomRatioFlip
    }

    fn init(&self, t: &mut TransformSession) -> Result<()> {
        t.flags.set(SessionFlags::NO_CONSTRAINT);
        let has_data = t
            .groups
            .iter()
            .any(|g| g.slide.as_ref().is_some_and(|s| s.has_vert_data()));
        if !has_data {
            return Err(TransformError::MissingTopology {
                mode: ModeKind::VertSlide,
            });
        }
        let linked: usize = t
            .groups
            .iter()
            .filter_map(|g| g.slide.as_ref())
            .flat_map(|s| s.verts.iter())
            .filter(|sv| !sv.links.is_empty())
            .count();
        debug!(linked, "vert slide topology bound");
        // Scratch: y = clamp, on by default.
        t.custom_vecs[2] = glam::Vec3::new(0.0, 1.0, 0.0);
        Ok(())
    }

    fn apply(&self, t: &mut TransformSession) {
        t.values_final[0] = t.values[0];
        resolve_num_input(t, 1);
        let clamp = t.custom_vecs[2].y != 0.0;
        let mut perc = t.values_final[0];
        if clamp {
            perc = perc.clamp(0.0, 1.0);
        }
        t.values_final[0] = perc;

        for group in t.groups.iter_mut() {
            let Some(slide) = group.slide.clone() else {
                continue;
            };
            for sv in &slide.verts {
                if sv.links.is_empty() {
                    continue;
                }
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
                let link = sv.links[slide.active_link.min(sv.links.len() - 1)];
                let target = el.co_orig.lerp(link, perc * el.factor);
                el.co = el.co_orig + el.protect_location(target - el.co_orig);
            }
        }

        let mut out = String::new();
        if t.num.has_input() {
            let _ = write!(out, "Vertex Slide: {}", t.num.display());
        } else {
            let _ = write!(out, "Vertex Slide: {perc:.4}");
        }
        let _ = write!(out, " (C)lamp: {}", if clamp { "on" } else { "off" });
        t.header = out;
    }

    fn handle_event(&self, t: &mut TransformSession, event: &RawEvent) -> Redraw {
        let RawEvent::Key(key) = event else {
            return Redraw::Nothing;
        };
        match key.to_ascii_lowercase() {
            'c' => {
                t.custom_vecs[2].y = 1.0 - t.custom_vecs[2].y;
                Redraw::Hard
            }
            'f' => {
                // Cycle the active link on every group's topology.
                for group in t.groups.iter_mut() {
                    if let Some(slide) = group.slide.as_mut() {
                        let max_links = slide
                            .verts
                            .iter()
                            .map(|sv| sv.links.len())
                            .max()
                            .unwrap_or(0);
                        if max_links > 0 {
                            slide.active_link = (slide.active_link + 1) % max_links;
                        }
                    }
                }
                Redraw::Hard
            }
            _ => Redraw::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use smallvec::smallvec;
    use xformkit_core::element::TransformElement;
    use xformkit_core::group::{ElementGroup, SlideTopology, SlideVert};

    fn slide_session() -> TransformSession {
        let elements = vec![TransformElement::at(Vec3::ZERO)];
        let topology = SlideTopology {
            verts: vec![SlideVert {
                element: 0,
                dir_side: [Vec3::ZERO; 2],
                edge_len: 1.0,
                links: smallvec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)],
            }],
            active: 0,
            active_link: 0,
        };
        TransformSession::builder(ModeKind::VertSlide)
            .group(ElementGroup::new("obj", elements).with_slide(topology))
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_links_is_fallback_error() {
        let mut t = TransformSession::builder(ModeKind::VertSlide)
            .group(ElementGroup::new("obj", vec![TransformElement::at(Vec3::ZERO)]))
            .build()
            .unwrap();
        let err = VertSlide.init(&mut t).unwrap_err();
        assert!(err.is_mode_fallback());
    }

    #[test]
    fn test_half_slide_toward_link() {
        let mut t = slide_session();
        VertSlide.init(&mut t).unwrap();
        t.values[0] = 0.5;
        VertSlide.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_clamped_to_link() {
        let mut t = slide_session();
        VertSlide.init(&mut t).unwrap();
        t.values[0] = 4.0;
        VertSlide.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_cycling_switches_link() {
        let mut t = slide_session();
        VertSlide.init(&mut t).unwrap();
        VertSlide.handle_event(&mut t, &RawEvent::Key('f'));
        t.values[0] = 1.0;
        VertSlide.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_unclamped_overshoots() {
        let mut t = slide_session();
        VertSlide.init(&mut t).unwrap();
        VertSlide.handle_event(&mut t, &RawEvent::Key('c'));
        t.values[0] = 1.5;
        VertSlide.apply(&mut t);
        assert!((t.groups[0].elements[0].co - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }
}
