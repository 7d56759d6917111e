//! Per-tick passives, purging the dead and dropping dangling targets.

use crate::components::*;
use crate::config::SimConfig;
use crate::effects::apply_passives;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// System that applies regeneration/decay and counts down debuffs.
///
/// Runs for every alive combatant regardless of its attack state.
pub fn passive_effect_system(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    mut query: Query<(&CombatStats, &mut Health, &mut ResistDebuff)>,
) {
    let delta = dt.0;
    for (stats, mut health, mut debuff) in query.iter_mut() {
        if !health.is_alive() {
            continue;
        }
        if !stats.effects.is_empty() {
            apply_passives(&stats.effects, &mut health, &config, delta);
        }
        if debuff.is_active() || debuff.cooldown > 0.0 {
            debuff.tick(delta);
        }
    }
}

/// System that despawns every combatant whose health reached zero.
pub fn purge_system(
    mut commands: Commands,
    query: Query<(Entity, &CombatantId, &Species, &Faction, &Health)>,
) {
    for (entity, id, species, faction, health) in query.iter() {
        if !health.is_alive() {
            tracing::debug!(id = id.0, species = %species.0, ?faction, "combatant died");
            commands.entity(entity).despawn();
        }
    }
}

/// System that clears targets that are no longer alive enemies.
///
/// A combatant left approaching or winding up against nothing falls back to
/// waiting; one in recovery keeps counting down.
pub fn target_cleanup_system(
    alive: Query<(&CombatantId, &Faction, &Health)>,
    mut query: Query<(&Faction, &mut Targets, &mut AttackCycle)>,
) {
    let factions: HashMap<CombatantId, Faction> = alive
        .iter()
        .filter(|(_, _, health)| health.is_alive())
        .map(|(id, faction, _)| (*id, *faction))
        .collect();

    for (faction, mut targets, mut cycle) in query.iter_mut() {
        let valid = targets
            .iter()
            .all(|id| factions.get(id).is_some_and(|f| f != faction));
        if valid {
            continue;
        }
        targets
            .0
            .retain(|id| factions.get(id).is_some_and(|f| f != faction));
        if targets.is_empty()
            && matches!(cycle.state, AttackState::Engaging | AttackState::Windup)
        {
            *cycle = AttackCycle::waiting();
        }
    }
}
