//! Serializable view of the battlefield.
//!
//! The `Snapshot` struct is what a renderer or a replay log consumes: one
//! entry per alive combatant, in spawn order, plus the clock.

use crate::components::*;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single combatant's state for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: u32,
    pub species: String,
    pub faction: Faction,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub health_max: f32,
    pub skill: f32,
    pub skill_max: f32,
    pub state: AttackState,
    /// Ids of the current targets, primary first.
    pub targets: Vec<u32>,
}

impl CombatantSnapshot {
    pub fn primary_target(&self) -> Option<u32> {
        self.targets.first().copied()
    }
}

/// Complete battlefield state at the end of a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks run since the last clear.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// Alive combatants ordered by id.
    pub combatants: Vec<CombatantSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let mut query = world.query::<(
            &CombatantId,
            &Species,
            &Faction,
            &Position,
            &Health,
            &SkillGauge,
            &AttackCycle,
            &Targets,
        )>();

        let mut combatants: Vec<CombatantSnapshot> = query
            .iter(world)
            .filter(|(_, _, _, _, health, ..)| health.is_alive())
            .map(
                |(id, species, faction, pos, health, skill, cycle, targets)| CombatantSnapshot {
                    id: id.0,
                    species: species.0.clone(),
                    faction: *faction,
                    x: pos.0.x,
                    y: pos.0.y,
                    health: health.current,
                    health_max: health.max,
                    skill: skill.current,
                    skill_max: skill.max,
                    state: cycle.state,
                    targets: targets.iter().map(|t| t.0).collect(),
                },
            )
            .collect();
        combatants.sort_by_key(|c| c.id);

        Self {
            tick,
            time,
            combatants,
        }
    }

    pub fn get(&self, id: u32) -> Option<&CombatantSnapshot> {
        self.combatants
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &self.combatants[i])
    }

    pub fn count(&self, faction: Faction) -> usize {
        self.combatants.iter().filter(|c| c.faction == faction).count()
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
