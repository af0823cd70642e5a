//! Proportional editing falloff.
//!
//! Selected elements always get factor 1. Unselected elements inside the
//! influence radius get a weight from the active curve; outside the radius
//! (or unreachable, distance `f32::MAX`) the factor is exactly 0 so kernels
//! can skip them without drift.

use serde::{Deserialize, Serialize};

use crate::group::ElementGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    Smooth,
    Sphere,
    Root,
    Sharp,
    Linear,
    Constant,
    Random,
    InverseSquare,
}

impl Falloff {
    /// Curve weight for a normalized distance `d` in [0, 1], where 1 is at
    /// the pivot and 0 at the radius edge.
    pub fn weight(self, dist: f32, rng: &mut Lcg) -> f32 {
        let d = dist.clamp(0.0, 1.0);
        match self {
            Falloff::Smooth => 3.0 * d * d - 2.0 * d * d * d,
            Falloff::Sphere => (2.0 * d - d * d).max(0.0).sqrt(),
            Falloff::Root => d.sqrt(),
            Falloff::Sharp => d * d,
            Falloff::Linear => d,
            Falloff::Constant => 1.0,
            Falloff::Random => rng.next_f32() * d,
            Falloff::InverseSquare => d * (2.0 - d),
        }
    }
}

/// Small deterministic generator so the random falloff is reproducible
/// within a session.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_mul(6364136223846793005).wrapping_add(1),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}

/// Recompute every element factor from the current radius and curve.
///
/// Called on init and again whenever the radius or curve changes mid-modal,
/// so factors never go stale.
pub fn calculate_factors(
    groups: &mut [ElementGroup],
    falloff: Falloff,
    size: f32,
    connected: bool,
    rng: &mut Lcg,
) {
    for group in groups.iter_mut() {
        for element in group.elements.iter_mut() {
            if element.flags.is_selected() {
                element.factor = 1.0;
                continue;
            }
            let dist = if connected { element.rdist } else { element.dist };
            if dist == f32::MAX || dist > size || size <= 0.0 {
                element.factor = 0.0;
            } else {
                element.factor = falloff.weight(1.0 - dist / size, rng);
            }
        }
    }
}
