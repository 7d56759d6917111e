//! Public API for the simulation.
//!
//! `Battlefield` owns every combatant and the schedule that advances them.
//! A frontend sets up a battle, drives it with `run_one_tick` (headless) or
//! `advance` (real time), and reads state back through `snapshot`.
//!
//! ## Fixed Timestep
//!
//! Each tick advances the clock by `SimConfig::fixed_timestep` (default
//! 1/30 s). `advance(real_dt)` scales wall-clock time by the speed multiplier,
//! accumulates it, and runs as many whole ticks as fit. Speed therefore
//! changes how often ticks run, never what a tick does.

use crate::army::{deployment_slots, head_count, Composition};
use crate::components::*;
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::species::SpeciesTable;
use crate::systems::*;
use crate::vector::Vector;
use crate::world::{CombatantSnapshot, Snapshot};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upper bound on ticks one `advance` call may run (one minute at 30 Hz).
pub const MAX_TICKS_PER_ADVANCE: u64 = 1_800;

/// Result of the victory check after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both sides still have combatants.
    Undecided,
    LeftWins,
    RightWins,
    /// Both sides were wiped out on the same tick.
    Draw,
}

impl Outcome {
    fn from_counts(left: usize, right: usize) -> Self {
        match (left, right) {
            (0, 0) => Outcome::Draw,
            (0, _) => Outcome::RightWins,
            (_, 0) => Outcome::LeftWins,
            _ => Outcome::Undecided,
        }
    }

    pub fn is_decided(self) -> bool {
        self != Outcome::Undecided
    }
}

/// Why a sandbox placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRejection {
    OffField,
    WrongHalf,
    TooClose,
}

/// Result of [`Battlefield::place`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Placed(CombatantId),
    Rejected(PlacementRejection),
}

/// The arena: ECS world, schedule and clock.
pub struct Battlefield {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    /// Scaled real time not yet consumed by a whole tick.
    time_accumulator: f32,
    speed: f32,
    next_id: u32,
    /// Tick at which an invariant violation was detected.
    corrupted_at: Option<u64>,
}

impl Battlefield {
    /// Create an empty battlefield with the default rules.
    pub fn new() -> Self {
        Self::build(SimConfig::default())
    }

    /// Create an empty battlefield with custom rules.
    pub fn with_config(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(SimTick(0));
        world.insert_resource(config);
        world.insert_resource(TickSnapshot::default());
        world.insert_resource(PendingDecisions::default());
        world.insert_resource(PendingCombatResults::default());
        world.insert_resource(InvariantReport::default());

        // One chain: every decision reads the snapshot taken at its head, and
        // every write happens after all decisions are known.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                snapshot_system,
                decision_system,
                combat_gather_system,
                passive_effect_system,
                combat_apply_system,
                decision_apply_system,
                movement_system,
                purge_system,
                target_cleanup_system,
                invariant_check_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
            speed: 1.0,
            next_id: 0,
            corrupted_at: None,
        }
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    /// Run one fixed tick and report the victory check.
    ///
    /// Fails without touching the world if an earlier tick was corrupted.
    pub fn run_one_tick(&mut self) -> Result<Outcome> {
        if let Some(tick) = self.corrupted_at {
            return Err(SimError::Corrupted(tick));
        }

        let dt = self.config().fixed_timestep;
        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.world.resource_mut::<SimTick>().increment();

        self.schedule.run(&mut self.world);
        self.tick += 1;
        self.time += dt;

        let report = self.world.resource::<InvariantReport>();
        if !report.is_clean() {
            let violation = &report.violations[0];
            let err = SimError::InvariantViolation {
                tick: self.tick,
                id: violation.id,
                detail: violation.detail.clone(),
            };
            tracing::error!(tick = self.tick, %err, "simulation corrupted");
            self.corrupted_at = Some(self.tick);
            return Err(err);
        }

        let outcome = self.outcome();
        if outcome.is_decided() {
            tracing::info!(tick = self.tick, time = self.time, ?outcome, "battle decided");
        } else {
            tracing::trace!(tick = self.tick, "tick complete");
        }
        Ok(outcome)
    }

    /// Feed wall-clock time; runs every whole tick it pays for.
    ///
    /// Stops at the first decisive tick and drops any leftover time, so a
    /// finished battle is never ticked past its end. At most
    /// [`MAX_TICKS_PER_ADVANCE`] ticks run per call; a larger backlog is
    /// discarded.
    pub fn advance(&mut self, real_dt: f32) -> Result<Outcome> {
        let fixed_dt = self.config().fixed_timestep;
        self.time_accumulator += real_dt.max(0.0) * self.speed;

        let due = (self.time_accumulator / fixed_dt).floor() as u64;
        let ticks = due.min(MAX_TICKS_PER_ADVANCE);
        if ticks < due {
            tracing::warn!(due, ran = ticks, "advance fell behind; dropping backlog");
            self.time_accumulator = 0.0;
        } else {
            self.time_accumulator = (self.time_accumulator - ticks as f32 * fixed_dt).max(0.0);
        }

        let mut outcome = Outcome::Undecided;
        for _ in 0..ticks {
            outcome = self.run_one_tick()?;
            if outcome.is_decided() {
                self.time_accumulator = 0.0;
                break;
            }
        }
        Ok(outcome)
    }

    /// Run ticks until the battle is decided or `max_ticks` have run.
    pub fn run_to_completion(&mut self, max_ticks: u64) -> Result<Outcome> {
        for _ in 0..max_ticks {
            let outcome = self.run_one_tick()?;
            if outcome.is_decided() {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Undecided)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the real-time speed multiplier. Must be finite and positive.
    pub fn set_speed(&mut self, multiplier: f32) -> Result<()> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(SimError::InvalidSpeed(multiplier));
        }
        self.speed = multiplier;
        Ok(())
    }

    /// Remove every combatant and reset the clock.
    ///
    /// Ids keep counting so a target id from before the clear can never
    /// resolve to a new combatant.
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<CombatantId>>()
            .iter(&self.world)
            .collect();
        let removed = entities.len();
        for entity in entities {
            self.world.despawn(entity);
        }

        self.world.insert_resource(SimTick(0));
        self.world.insert_resource(TickSnapshot::default());
        self.world.insert_resource(PendingDecisions::default());
        self.world.insert_resource(PendingCombatResults::default());
        self.world.insert_resource(InvariantReport::default());
        self.tick = 0;
        self.time = 0.0;
        self.time_accumulator = 0.0;
        self.corrupted_at = None;

        tracing::info!(removed, "battlefield cleared");
    }

    /// Clear the field and deploy both armies.
    ///
    /// Every species and both army sizes are validated before anything is
    /// touched; on error the field is left exactly as it was.
    pub fn setup_battle(
        &mut self,
        left: &Composition,
        right: &Composition,
        table: &SpeciesTable,
    ) -> Result<()> {
        for name in left.keys().chain(right.keys()) {
            table.require(name)?;
        }
        let field = &self.config().field;
        let left_slots = deployment_slots(Faction::Left, head_count(left), field)?;
        let right_slots = deployment_slots(Faction::Right, head_count(right), field)?;

        self.clear();
        for (faction, army, slots) in [
            (Faction::Left, left, left_slots),
            (Faction::Right, right, right_slots),
        ] {
            let mut slots = slots.into_iter();
            for (name, &count) in army {
                let template = Arc::clone(table.require(name)?);
                for _ in 0..count {
                    let Some(pos) = slots.next() else {
                        break;
                    };
                    self.append_monster(CombatantBundle::from_template(&template, faction, pos));
                }
            }
        }

        tracing::info!(
            left = head_count(left),
            right = head_count(right),
            "battle set up"
        );
        Ok(())
    }

    /// Insert one externally built combatant and return its id.
    ///
    /// The bundle's own id is ignored; ids follow spawn order.
    pub fn append_monster(&mut self, mut bundle: CombatantBundle) -> CombatantId {
        let id = CombatantId(self.next_id);
        self.next_id += 1;
        bundle.id = id;
        tracing::debug!(
            id = id.0,
            species = %bundle.species.0,
            faction = ?bundle.faction,
            x = bundle.position.0.x,
            y = bundle.position.0.y,
            "combatant spawned"
        );
        self.world.spawn(bundle);
        id
    }

    /// Sandbox placement of a single combatant.
    ///
    /// An unknown species is an error. A bad position is not: it is reported
    /// as [`Placement::Rejected`] and nothing is spawned.
    pub fn place(
        &mut self,
        table: &SpeciesTable,
        species: &str,
        faction: Faction,
        pos: Vector,
    ) -> Result<Placement> {
        let bundle = CombatantBundle::create(table, species, faction, pos)?;

        if let Some(reason) = self.check_placement(faction, pos) {
            tracing::warn!(species, ?faction, x = pos.x, y = pos.y, ?reason, "placement rejected");
            return Ok(Placement::Rejected(reason));
        }
        Ok(Placement::Placed(self.append_monster(bundle)))
    }

    fn check_placement(&mut self, faction: Faction, pos: Vector) -> Option<PlacementRejection> {
        let (field, min_gap) = {
            let config = self.config();
            (config.field.clone(), config.collision_radius)
        };
        if !pos.is_finite() || !field.contains(pos) {
            return Some(PlacementRejection::OffField);
        }
        if !field.in_half(faction, pos) {
            return Some(PlacementRejection::WrongHalf);
        }
        let crowded = self
            .world
            .query::<(&Position, &Health)>()
            .iter(&self.world)
            .any(|(other, health)| health.is_alive() && other.0.distance(&pos) < min_gap);
        crowded.then_some(PlacementRejection::TooClose)
    }

    /// Victory check against the current alive set.
    pub fn outcome(&mut self) -> Outcome {
        Outcome::from_counts(
            self.alive_count(Faction::Left),
            self.alive_count(Faction::Right),
        )
    }

    pub fn alive_count(&mut self, faction: Faction) -> usize {
        self.world
            .query::<(&Faction, &Health)>()
            .iter(&self.world)
            .filter(|(f, health)| **f == faction && health.is_alive())
            .count()
    }

    /// Get a snapshot of the current battlefield state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> Result<String> {
        Ok(self.snapshot().to_json()?)
    }

    /// Alive combatants in spawn order.
    pub fn combatants(&mut self) -> Vec<CombatantSnapshot> {
        self.snapshot().combatants
    }

    pub fn combatant(&mut self, id: CombatantId) -> Option<CombatantSnapshot> {
        self.snapshot().get(id.0).cloned()
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Elapsed simulation time in seconds.
    pub fn elapsed(&self) -> f32 {
        self.time
    }

    pub fn is_corrupted(&self) -> bool {
        self.corrupted_at.is_some()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for testing).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesTemplate;

    fn table() -> SpeciesTable {
        [
            SpeciesTemplate {
                name: "Grunt".into(),
                ..SpeciesTemplate::default()
            },
            SpeciesTemplate {
                name: "Archer".into(),
                attack_range: 4.0,
                ..SpeciesTemplate::default()
            },
        ]
        .into_iter()
        .collect()
    }

    fn army(entries: &[(&str, u32)]) -> Composition {
        entries.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    }

    #[test]
    fn test_new_battlefield() {
        let mut field = Battlefield::new();
        assert_eq!(field.current_tick(), 0);
        assert_eq!(field.elapsed(), 0.0);
        assert!(field.combatants().is_empty());
    }

    #[test]
    fn test_empty_field_is_a_draw() {
        let mut field = Battlefield::new();
        assert_eq!(field.run_one_tick().unwrap(), Outcome::Draw);
        assert_eq!(field.current_tick(), 1);
    }

    #[test]
    fn test_one_sided_field_is_decided() {
        let mut field = Battlefield::new();
        let table = table();
        field
            .setup_battle(&army(&[("Grunt", 2)]), &Composition::new(), &table)
            .unwrap();
        assert_eq!(field.run_one_tick().unwrap(), Outcome::LeftWins);
    }

    #[test]
    fn test_setup_with_unknown_species_spawns_nothing() {
        let mut field = Battlefield::new();
        let table = table();
        field
            .setup_battle(&army(&[("Grunt", 1)]), &army(&[("Grunt", 1)]), &table)
            .unwrap();

        let err = field
            .setup_battle(
                &army(&[("Grunt", 3)]),
                &army(&[("Grunt", 1), ("Dragon", 1)]),
                &table,
            )
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownSpecies(name) if name == "Dragon"));
        // The previous battle is untouched.
        assert_eq!(field.combatants().len(), 2);
    }

    #[test]
    fn test_ids_follow_spawn_order_across_clear() {
        let mut field = Battlefield::new();
        let a = field.append_monster(CombatantBundle::default());
        let b = field.append_monster(CombatantBundle::default());
        assert!(a < b);

        field.clear();
        assert!(field.combatants().is_empty());
        let c = field.append_monster(CombatantBundle::default());
        assert!(c > b);
    }

    #[test]
    fn test_place_validates_position() {
        let mut field = Battlefield::new();
        let table = table();
        let placed = field
            .place(&table, "Grunt", Faction::Left, Vector::new(3.0, 3.0))
            .unwrap();
        assert!(matches!(placed, Placement::Placed(_)));

        let wrong_half = field
            .place(&table, "Grunt", Faction::Left, Vector::new(8.0, 3.0))
            .unwrap();
        assert_eq!(wrong_half, Placement::Rejected(PlacementRejection::WrongHalf));

        let too_close = field
            .place(&table, "Archer", Faction::Left, Vector::new(3.1, 3.0))
            .unwrap();
        assert_eq!(too_close, Placement::Rejected(PlacementRejection::TooClose));

        let off_field = field
            .place(&table, "Grunt", Faction::Right, Vector::new(14.0, 3.0))
            .unwrap();
        assert_eq!(off_field, Placement::Rejected(PlacementRejection::OffField));

        assert!(field
            .place(&table, "Dragon", Faction::Left, Vector::new(1.0, 1.0))
            .is_err());
        assert_eq!(field.combatants().len(), 1);
    }

    #[test]
    fn test_advance_respects_speed() {
        let mut field = Battlefield::new();
        let table = table();
        field
            .setup_battle(&army(&[("Grunt", 1)]), &army(&[("Grunt", 1)]), &table)
            .unwrap();

        field.advance(0.05).unwrap();
        assert_eq!(field.current_tick(), 1);

        field.set_speed(4.0).unwrap();
        field.advance(0.05).unwrap();
        // 0.0167 left over + 0.2 of scaled time = 6 more ticks.
        assert_eq!(field.current_tick(), 7);
    }

    #[test]
    fn test_advance_caps_ticks_at_extreme_speed() {
        let mut field = Battlefield::new();
        let statue = SpeciesTemplate {
            name: "Statue".into(),
            move_speed: 0.0,
            ..SpeciesTemplate::default()
        };
        field.append_monster(CombatantBundle::from_template(
            &statue,
            Faction::Left,
            Vector::new(1.0, 4.5),
        ));
        field.append_monster(CombatantBundle::from_template(
            &statue,
            Faction::Right,
            Vector::new(12.0, 4.5),
        ));

        field.set_speed(1e8).unwrap();
        assert_eq!(field.advance(0.033).unwrap(), Outcome::Undecided);
        assert_eq!(field.current_tick(), MAX_TICKS_PER_ADVANCE);

        // The backlog was dropped, not carried into the next call.
        field.set_speed(1.0).unwrap();
        field.advance(0.0).unwrap();
        assert_eq!(field.current_tick(), MAX_TICKS_PER_ADVANCE);
    }

    #[test]
    fn test_with_config_rejects_zero_cell_size() {
        let config = SimConfig {
            grid_cell_size: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            Battlefield::with_config(config),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(Battlefield::with_config(SimConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_speed_is_rejected() {
        let mut field = Battlefield::new();
        assert!(matches!(field.set_speed(0.0), Err(SimError::InvalidSpeed(_))));
        assert!(field.set_speed(f32::NAN).is_err());
        assert_eq!(field.speed(), 1.0);
    }

    #[test]
    fn test_corruption_halts_further_ticks() {
        let mut field = Battlefield::new();
        let table = table();
        field
            .setup_battle(&army(&[("Grunt", 1)]), &army(&[("Grunt", 1)]), &table)
            .unwrap();

        // Break a bound behind the rules' back.
        let mut query = field.world_mut().query::<&mut SkillGauge>();
        for mut gauge in query.iter_mut(field.world_mut()) {
            gauge.current = -5.0;
        }

        assert!(matches!(
            field.run_one_tick(),
            Err(SimError::InvariantViolation { tick: 1, .. })
        ));
        assert!(field.is_corrupted());
        assert!(matches!(field.run_one_tick(), Err(SimError::Corrupted(1))));

        field.clear();
        assert!(!field.is_corrupted());
    }
}
