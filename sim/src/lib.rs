//! Arena Sim - Battle Simulation Core
//!
//! A deterministic, fixed-timestep ECS simulation of two armies fighting on a
//! small rectangular arena. Uses `bevy_ecs` for the entity-component-system
//! architecture.
//!
//! Each tick is snapshot, compute, commit: every combatant decides against
//! the same tick-start view of the field, then all damage, moves and deaths
//! are applied together. Identical setups always produce identical battles.

pub mod army;
pub mod battlefield;
pub mod components;
pub mod config;
pub mod damage;
pub mod effects;
pub mod error;
pub mod factory;
pub mod scenario;
pub mod spatial;
pub mod species;
pub mod systems;
pub mod vector;
pub mod world;

pub use army::{deployment_slots, Composition};
pub use battlefield::{Battlefield, Outcome, Placement, PlacementRejection};
pub use components::*;
pub use config::{BurnConfig, FieldConfig, SimConfig};
pub use damage::{compute_damage, DamageFloor, Mitigation, Offense};
pub use effects::{Effect, EffectSet};
pub use error::{Result, SimError};
pub use scenario::{run_scenario, BattleScenario, ExpectedResult, ScenarioReport};
pub use spatial::{SpatialEntry, SpatialGrid};
pub use species::{DamageType, SkillProfile, SpeciesTable, SpeciesTemplate};
pub use vector::Vector;
pub use world::{CombatantSnapshot, Snapshot};
