//! ECS systems for the arena simulation.
//!
//! Systems contain the battle rules that operate on components.
//!
//! ## Tick Order
//!
//! Every tick runs as one chain: snapshot, compute, commit.
//!
//! **Snapshot**
//! - `snapshot_system` - Captures the alive combatants and a spatial grid
//!
//! **Compute** (read-only on entities, parallel with the `parallel` feature)
//! - `decision_system` - One attack state-machine step per combatant
//! - `combat_gather_system` - Expands completed windups into hits
//!
//! **Commit**
//! - `passive_effect_system` - Regeneration, decay, debuff timers
//! - `combat_apply_system` - Applies summed damage and debuffs
//! - `decision_apply_system` - Commits state, targets and skill gauge
//! - `movement_system` - Moves with collision rejection, in spawn order
//! - `purge_system` - Despawns the dead
//! - `target_cleanup_system` - Drops targets that died this tick
//! - `invariant_check_system` - Reports anything left out of bounds

pub mod ai;
pub mod combat;
pub mod invariants;
pub mod lifecycle;
pub mod movement;
pub mod snapshot;

pub use ai::*;
pub use combat::*;
pub use invariants::*;
pub use lifecycle::*;
pub use movement::*;
pub use snapshot::*;
