//! Movement system - commits proposed moves with collision avoidance.

use crate::components::*;
use crate::config::SimConfig;
use crate::systems::ai::PendingDecisions;
use crate::systems::snapshot::TickSnapshot;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// System that applies the moves proposed by the state machine.
///
/// Moves are committed in spawn order against a grid that starts from the
/// snapshot positions and is updated as each move lands. A move whose
/// destination comes within the collision radius of any other combatant is
/// rejected outright for this tick; there is no partial slide.
pub fn movement_system(
    config: Res<SimConfig>,
    snapshot: Res<TickSnapshot>,
    decisions: Res<PendingDecisions>,
    mut query: Query<(&Faction, &mut Position)>,
) {
    let mut grid = snapshot.grid.clone();

    for decision in &decisions.0 {
        let Some(dest) = decision.destination else {
            continue;
        };
        if !dest.is_finite() || grid.any_closer_than(dest, config.collision_radius, decision.id) {
            continue;
        }
        let Ok((faction, mut pos)) = query.get_mut(decision.entity) else {
            continue;
        };
        pos.0 = dest;
        grid.insert(decision.id, dest, *faction);
    }
}
