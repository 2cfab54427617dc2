//! Damage-model collaborator.
//!
//! The structural core never decides how much a hit hurts. It asks a
//! [`DamageModel`] to turn raw projectile damage into a scalar, rolls 50-150%
//! on top, and compares the result to the part's constitution.

use crate::components::DamageModifier;
use crate::rng::scale_percent;
use bevy_ecs::prelude::*;
use std::collections::HashMap;

pub trait DamageModel {
    fn resolve(&self, raw_damage: i32, modifier: DamageModifier) -> i32;
}

/// Passes raw damage through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnmodifiedDamage;

impl DamageModel for UnmodifiedDamage {
    fn resolve(&self, raw_damage: i32, _modifier: DamageModifier) -> i32 {
        raw_damage
    }
}

/// Percentage per modifier; unknown modifiers deal 100%.
#[derive(Debug, Clone, Default)]
pub struct PercentTable {
    percent: HashMap<DamageModifier, i32>,
}

impl PercentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, modifier: DamageModifier, percent: i32) -> Self {
        self.percent.insert(modifier, percent);
        self
    }
}

impl DamageModel for PercentTable {
    fn resolve(&self, raw_damage: i32, modifier: DamageModifier) -> i32 {
        let pct = self.percent.get(&modifier).copied().unwrap_or(100);
        scale_percent(raw_damage, pct)
    }
}

/// ECS handle for whichever damage model the battle uses.
#[derive(Resource)]
pub struct DamageModelResource(pub Box<dyn DamageModel + Send + Sync>);

impl Default for DamageModelResource {
    fn default() -> Self {
        Self(Box::new(UnmodifiedDamage))
    }
}
