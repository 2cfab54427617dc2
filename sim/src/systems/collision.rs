//! Projectile impacts against map parts.

use crate::battlescape::Battlescape;
use crate::components::*;
use crate::damage::DamageModelResource;
use crate::rng::SimRng;
use bevy_ecs::prelude::*;

/// Running totals of impact outcomes.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpactStats {
    pub ignored: u64,
    pub absorbed: u64,
    pub destroyed: u64,
}

impl ImpactStats {
    pub fn record(&mut self, outcome: ImpactOutcome) {
        match outcome {
            ImpactOutcome::Ignored => self.ignored += 1,
            ImpactOutcome::Absorbed => self.absorbed += 1,
            ImpactOutcome::Destroyed => self.destroyed += 1,
        }
    }
}

/// System that resolves every pending impact and despawns it.
///
/// Impacts are handled in spawn order so damage rolls stay reproducible.
pub fn projectile_impact_system(
    mut commands: Commands,
    impacts: Query<(Entity, &ProjectileImpact)>,
    mut scape: ResMut<Battlescape>,
    model: Res<DamageModelResource>,
    mut rng: ResMut<SimRng>,
    mut stats: ResMut<ImpactStats>,
) {
    let mut pending: Vec<(Entity, ProjectileImpact)> = impacts.iter().map(|(e, i)| (e, *i)).collect();
    pending.sort_by_key(|(e, _)| *e);

    for (entity, impact) in pending {
        let outcome = scape.handle_collision(impact.target, impact.damage, model.0.as_ref(), &mut rng);
        stats.record(outcome);
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{place, scape};

    fn world_with_ground() -> (World, PartId) {
        let (mut bs, t) = scape((3, 3, 3));
        let ground = place(&mut bs, t.ground, 1, 1, 0);
        let mut world = World::new();
        world.insert_resource(bs);
        world.insert_resource(DamageModelResource::default());
        world.insert_resource(SimRng::new(9));
        world.insert_resource(ImpactStats::default());
        (world, ground)
    }

    #[test]
    fn test_impacts_are_resolved_and_despawned() {
        let (mut world, ground) = world_with_ground();
        world.spawn(ProjectileImpact::new(ground, 1));
        world.spawn(ProjectileImpact::new(ground, 500));
        world.spawn(ProjectileImpact::new(PartId(40), 500));

        let mut schedule = Schedule::default();
        schedule.add_systems(projectile_impact_system);
        schedule.run(&mut world);

        let mut query = world.query::<&ProjectileImpact>();
        assert_eq!(query.iter(&world).count(), 0);

        let stats = *world.resource::<ImpactStats>();
        assert_eq!(
            stats,
            ImpactStats {
                ignored: 1,
                absorbed: 1,
                destroyed: 1
            }
        );
        let scape = world.resource::<Battlescape>();
        assert_eq!(scape.part(ground).unwrap().form, PartForm::DestroyedGround);
    }
}
