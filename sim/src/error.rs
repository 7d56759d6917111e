//! Error types for the simulation.

use crate::components::{CombatantId, Faction};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// A composition or placement referenced a species missing from the table.
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("{faction:?} army of {requested} does not fit its {capacity} deployment slots")]
    ArmyOverflow {
        faction: Faction,
        requested: usize,
        capacity: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid speed multiplier: {0}")]
    InvalidSpeed(f32),

    /// A tick left a combatant outside its documented bounds.
    #[error("Invariant violated at tick {tick} by combatant {id:?}: {detail}")]
    InvariantViolation {
        tick: u64,
        id: CombatantId,
        detail: String,
    },

    /// The run already hit an invariant violation and can no longer advance.
    #[error("Simulation corrupted at tick {0}; clear the battlefield to continue")]
    Corrupted(u64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
