//! Deterministic random number generation for damage rolls.
//!
//! The caller owns the seed (via `StructureConfig::seed`). Identical seeds and
//! identical impact sequences always produce identical outcomes.

use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Resource, Clone, Debug)]
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform integer in `[low, high]`.
    pub fn gen_inclusive(&mut self, low: i32, high: i32) -> i32 {
        self.inner.gen_range(low..=high)
    }

    /// Scale damage by a uniform 50-150% roll. Saturates at the `i32` range.
    pub fn rand_damage_050_150(&mut self, damage: i32) -> i32 {
        let percent = self.gen_inclusive(50, 150);
        scale_percent(damage, percent)
    }
}

/// `value * percent / 100`, computed wide and clamped back into `i32`.
pub(crate) fn scale_percent(value: i32, percent: i32) -> i32 {
    let scaled = i64::from(value) * i64::from(percent) / 100;
    scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(0)
    }
}
