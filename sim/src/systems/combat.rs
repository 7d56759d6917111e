//! Combat resolution - turns completed windups into damage.
//!
//! ## Gather / Apply
//!
//! 1. **Gather** ([`combat_gather_system`]) reads the tick snapshot and the
//!    pending decisions, and expands every strike into [`CombatEvent`]s:
//!    primary hits, splash hits, reflected damage and burn debuffs. Nothing on
//!    the entities is touched.
//! 2. **Apply** ([`combat_apply_system`]) folds the events into health and
//!    debuffs.
//!
//! Because every strike in a tick is computed from the same snapshot, two
//! combatants can kill each other on the same tick, and the order attackers
//! are visited in never changes who was alive to be hit.

use crate::components::*;
use crate::config::SimConfig;
use crate::damage::{compute_damage, DamageFloor};
use crate::effects::{burn_on_hit, reflect_on_hit};
use crate::systems::ai::{Decision, PendingDecisions};
use crate::systems::snapshot::TickSnapshot;
use bevy_ecs::prelude::*;
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One effect of a strike on a combatant.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    Damage {
        source: CombatantId,
        target: Entity,
        amount: f32,
        kind: HitKind,
    },
    Debuff {
        target: Entity,
        debuff: ResistDebuff,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Primary,
    Splash,
    Reflect,
}

/// Collected combat results to apply after the gather phase.
#[derive(Default, Clone, Debug)]
pub struct CombatResults {
    pub damage: HashMap<Entity, f32>,
    pub debuffs: Vec<(Entity, ResistDebuff)>,
}

impl CombatResults {
    /// Fold events in order; per-target sums are accumulated in event order.
    pub fn record(&mut self, event: CombatEvent) {
        match event {
            CombatEvent::Damage { target, amount, .. } => {
                *self.damage.entry(target).or_insert(0.0) += amount;
            }
            CombatEvent::Debuff { target, debuff } => self.debuffs.push((target, debuff)),
        }
    }
}

/// Resource holding results between gather and apply.
#[derive(Resource, Default)]
pub struct PendingCombatResults(pub CombatResults);

/// Expand one decision's strike into combat events.
pub fn resolve_strike(
    decision: &Decision,
    snapshot: &TickSnapshot,
    config: &SimConfig,
) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    if decision.strike.is_empty() {
        return events;
    }
    let Some(attacker) = snapshot.get(decision.id) else {
        return events;
    };
    let floor = DamageFloor::from(config);

    for defender in decision.strike.iter().filter_map(|id| snapshot.get(*id)) {
        let amount = compute_damage(attacker.offense(), defender.mitigation(), floor);
        events.push(CombatEvent::Damage {
            source: attacker.id,
            target: defender.entity,
            amount,
            kind: HitKind::Primary,
        });

        if let Some(reflected) =
            reflect_on_hit(&defender.stats.effects, attacker.magic_resist, config)
        {
            events.push(CombatEvent::Damage {
                source: defender.id,
                target: attacker.entity,
                amount: reflected,
                kind: HitKind::Reflect,
            });
        }

        if let Some(debuff) = burn_on_hit(&attacker.stats.effects, config) {
            events.push(CombatEvent::Debuff {
                target: defender.entity,
                debuff,
            });
        }
    }

    if attacker.stats.effects.splashes() {
        let mut splashed: Vec<CombatantId> = Vec::new();
        for primary in decision.strike.iter().filter_map(|id| snapshot.get(*id)) {
            for entry in snapshot.grid.query_faction(
                primary.pos,
                config.splash_radius,
                attacker.faction.opponent(),
            ) {
                if decision.strike.contains(&entry.id) || splashed.contains(&entry.id) {
                    continue;
                }
                let Some(victim) = snapshot.get(entry.id) else {
                    continue;
                };
                splashed.push(entry.id);
                events.push(CombatEvent::Damage {
                    source: attacker.id,
                    target: victim.entity,
                    amount: compute_damage(attacker.offense(), victim.mitigation(), floor),
                    kind: HitKind::Splash,
                });
            }
        }
    }

    events
}

/// Combat gather system - computes damage intents without applying them.
///
/// ## Data Access (READ-ONLY on entities)
/// - Reads: SimConfig, TickSnapshot, PendingDecisions
/// - Writes: PendingCombatResults (resource only)
pub fn combat_gather_system(
    config: Res<SimConfig>,
    snapshot: Res<TickSnapshot>,
    decisions: Res<PendingDecisions>,
    mut pending: ResMut<PendingCombatResults>,
) {
    let snapshot: &TickSnapshot = &snapshot;
    let config: &SimConfig = &config;

    #[cfg(feature = "parallel")]
    let per_attacker: Vec<Vec<CombatEvent>> = decisions
        .0
        .par_iter()
        .map(|decision| resolve_strike(decision, snapshot, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let per_attacker: Vec<Vec<CombatEvent>> = decisions
        .0
        .iter()
        .map(|decision| resolve_strike(decision, snapshot, config))
        .collect();

    // Merge sequentially so float sums do not depend on thread scheduling.
    let mut results = CombatResults::default();
    for event in per_attacker.into_iter().flatten() {
        if let CombatEvent::Damage {
            source,
            amount,
            kind,
            ..
        } = &event
        {
            tracing::debug!(source = source.0, amount, ?kind, "hit");
        }
        results.record(event);
    }
    pending.0 = results;
}

/// Combat apply system - applies pending damage and debuffs.
///
/// Must run after the passive effects so that regeneration can never lift a
/// combatant killed this tick back above zero.
pub fn combat_apply_system(
    pending: Res<PendingCombatResults>,
    mut query: Query<(&mut Health, &mut ResistDebuff)>,
) {
    let results = &pending.0;

    for (&entity, &amount) in &results.damage {
        if let Ok((mut health, _)) = query.get_mut(entity) {
            health.damage(amount);
        }
    }

    for (entity, debuff) in &results.debuffs {
        if let Ok((_, mut current)) = query.get_mut(*entity) {
            current.try_apply(debuff.reduction, debuff.remaining, debuff.cooldown);
        }
    }
}
