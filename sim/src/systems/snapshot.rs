//! Tick-start snapshot of the alive collection.
//!
//! Every decision in a tick is computed against this snapshot, never against
//! components another system already updated in the same tick.

use crate::components::*;
use crate::config::SimConfig;
use crate::damage::{Mitigation, Offense};
use crate::spatial::{SpatialEntry, SpatialGrid};
use crate::vector::Vector;
use bevy_ecs::prelude::*;

/// Global simulation tick counter.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Read-only copy of one alive combatant as of tick start.
#[derive(Debug, Clone)]
pub struct CombatantView {
    pub entity: Entity,
    pub id: CombatantId,
    pub faction: Faction,
    pub pos: Vector,
    pub health: Health,
    pub stats: CombatStats,
    /// Magic resist after any active debuff.
    pub magic_resist: f32,
    pub cycle: AttackCycle,
    pub targets: Targets,
}

impl CombatantView {
    pub fn offense(&self) -> Offense {
        Offense {
            attack: self.stats.attack,
            damage_type: self.stats.damage_type,
        }
    }

    pub fn mitigation(&self) -> Mitigation {
        Mitigation {
            defense: self.stats.defense,
            magic_resist: self.magic_resist,
        }
    }
}

/// Alive combatants in spawn order, plus a grid over their positions.
#[derive(Resource, Debug, Clone, Default)]
pub struct TickSnapshot {
    pub views: Vec<CombatantView>,
    pub grid: SpatialGrid,
}

impl TickSnapshot {
    pub fn new(mut views: Vec<CombatantView>, cell_size: f32) -> Self {
        views.sort_by_key(|v| v.id);
        let grid = SpatialGrid::from_entries(
            cell_size,
            views.iter().map(|v| SpatialEntry {
                id: v.id,
                pos: v.pos,
                faction: v.faction,
            }),
        );
        Self { views, grid }
    }

    pub fn get(&self, id: CombatantId) -> Option<&CombatantView> {
        self.views
            .binary_search_by_key(&id, |v| v.id)
            .ok()
            .map(|i| &self.views[i])
    }

    /// Whether `id` is alive and fights against `faction`.
    pub fn is_enemy_of(&self, faction: Faction, id: CombatantId) -> bool {
        self.get(id).is_some_and(|v| v.faction != faction)
    }

    pub fn enemies_of(&self, faction: Faction) -> impl Iterator<Item = &CombatantView> {
        self.views.iter().filter(move |v| v.faction != faction)
    }
}

/// System that captures the alive collection at tick start.
pub fn snapshot_system(
    config: Res<SimConfig>,
    mut snapshot: ResMut<TickSnapshot>,
    query: Query<(
        Entity,
        &CombatantId,
        &Faction,
        &Position,
        &Health,
        &CombatStats,
        &ResistDebuff,
        &AttackCycle,
        &Targets,
    )>,
) {
    let views = query
        .iter()
        .filter(|(_, _, _, _, health, ..)| health.is_alive())
        .map(
            |(entity, id, faction, pos, health, stats, debuff, cycle, targets)| CombatantView {
                entity,
                id: *id,
                faction: *faction,
                pos: pos.0,
                health: *health,
                stats: stats.clone(),
                magic_resist: debuff.effective_resist(stats.magic_resist),
                cycle: *cycle,
                targets: targets.clone(),
            },
        )
        .collect();

    *snapshot = TickSnapshot::new(views, config.grid_cell_size);
}
