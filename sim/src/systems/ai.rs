//! Attack state machine.
//!
//! Each tick every alive combatant takes exactly one step:
//!
//! ```text
//! WAITING --target found--> ENGAGING --in range--> WINDUP --timer--> RECOVERY
//!    ^                         |                     |                  |
//!    +------target lost--------+----targets died-----+------timer-------+
//! ```
//!
//! Zero-time transitions fall through within the same step: a combatant whose
//! recovery ends re-targets immediately, and a freshly chosen target already
//! in range starts the windup on the same tick.
//!
//! The step is a pure function of the tick snapshot ([`decide`]); the
//! resulting [`Decision`]s are committed by the apply systems afterwards.

use crate::components::*;
use crate::systems::movement::DeltaTime;
use crate::systems::snapshot::{CombatantView, TickSnapshot};
use crate::vector::Vector;
use bevy_ecs::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Timers at or below this are treated as expired.
const TIMER_EPSILON: f32 = 1e-4;

/// Outcome of one combatant's state-machine step.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub entity: Entity,
    pub id: CombatantId,
    pub cycle: AttackCycle,
    pub targets: Targets,
    /// Proposed position after moving; collision is resolved on commit.
    pub destination: Option<Vector>,
    /// Targets hit this tick. Empty unless a windup completed.
    pub strike: Vec<CombatantId>,
}

/// Decisions of the current tick, in snapshot (spawn) order.
#[derive(Resource, Debug, Clone, Default)]
pub struct PendingDecisions(pub Vec<Decision>);

/// Nearest enemies of `me`, closest first, ties by spawn order.
pub fn select_targets(me: &CombatantView, snapshot: &TickSnapshot) -> Targets {
    let mut candidates: Vec<(f32, CombatantId)> = snapshot
        .enemies_of(me.faction)
        .map(|enemy| (me.pos.distance(&enemy.pos), enemy.id))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    Targets(
        candidates
            .into_iter()
            .take(me.stats.effects.target_count())
            .map(|(_, id)| id)
            .collect(),
    )
}

/// Run one state-machine step for `me` against the tick snapshot.
pub fn decide(me: &CombatantView, snapshot: &TickSnapshot, dt: f32) -> Decision {
    // Targets that died or left the field since last tick are dropped first.
    let mut targets = Targets(
        me.targets
            .iter()
            .copied()
            .filter(|id| snapshot.is_enemy_of(me.faction, *id))
            .collect(),
    );
    let mut cycle = me.cycle;
    let mut destination = None;
    let mut strike = Vec::new();

    match cycle.state {
        AttackState::Recovery => {
            cycle.timer -= dt;
            if cycle.timer > TIMER_EPSILON {
                return Decision {
                    entity: me.entity,
                    id: me.id,
                    cycle,
                    targets,
                    destination,
                    strike,
                };
            }
            cycle = AttackCycle::waiting();
            targets.clear();
        }
        AttackState::Windup if targets.is_empty() => {
            tracing::trace!(id = me.id.0, "windup aborted, targets gone");
            cycle = AttackCycle::waiting();
        }
        AttackState::Windup => {
            cycle.timer -= dt;
            if cycle.timer <= TIMER_EPSILON {
                // Only targets still within reach at release are hit.
                strike = targets
                    .iter()
                    .copied()
                    .filter(|id| {
                        snapshot
                            .get(*id)
                            .is_some_and(|t| me.pos.distance(&t.pos) <= me.stats.attack_range)
                    })
                    .collect();
            }
            if cycle.timer > TIMER_EPSILON || !strike.is_empty() {
                if !strike.is_empty() {
                    cycle = AttackCycle::recovery(me.stats.recovery);
                }
                return Decision {
                    entity: me.entity,
                    id: me.id,
                    cycle,
                    targets,
                    destination,
                    strike,
                };
            }
            tracing::trace!(id = me.id.0, "windup released with no target in reach");
            cycle = AttackCycle::waiting();
            targets.clear();
        }
        AttackState::Engaging if targets.is_empty() => {
            cycle = AttackCycle::waiting();
        }
        AttackState::Engaging | AttackState::Waiting => {}
    }

    if cycle.state == AttackState::Waiting {
        targets = select_targets(me, snapshot);
        if !targets.is_empty() {
            cycle = AttackCycle::engaging();
        }
    }

    if cycle.state == AttackState::Engaging {
        if let Some(primary) = targets.primary().and_then(|id| snapshot.get(id)) {
            if me.pos.distance(&primary.pos) <= me.stats.attack_range {
                cycle = AttackCycle::windup(me.stats.windup);
            } else {
                destination = Some(
                    me.pos
                        .move_toward(&primary.pos, me.stats.move_speed * dt),
                );
            }
        }
    }

    Decision {
        entity: me.entity,
        id: me.id,
        cycle,
        targets,
        destination,
        strike,
    }
}

/// System that runs the state machine for every combatant in the snapshot.
///
/// ## Data Access
/// - Reads: DeltaTime, TickSnapshot
/// - Writes: PendingDecisions (resource only)
pub fn decision_system(
    dt: Res<DeltaTime>,
    snapshot: Res<TickSnapshot>,
    mut pending: ResMut<PendingDecisions>,
) {
    let delta = dt.0;
    let snapshot: &TickSnapshot = &snapshot;

    #[cfg(feature = "parallel")]
    {
        pending.0 = snapshot
            .views
            .par_iter()
            .map(|view| decide(view, snapshot, delta))
            .collect();
    }

    #[cfg(not(feature = "parallel"))]
    {
        pending.0 = snapshot
            .views
            .iter()
            .map(|view| decide(view, snapshot, delta))
            .collect();
    }
}

/// System that commits state, targets and skill gauge from the decisions.
pub fn decision_apply_system(
    dt: Res<DeltaTime>,
    pending: Res<PendingDecisions>,
    mut query: Query<(&mut AttackCycle, &mut Targets, &mut SkillGauge, &CombatStats)>,
) {
    for decision in &pending.0 {
        let Ok((mut cycle, mut targets, mut skill, stats)) = query.get_mut(decision.entity) else {
            continue;
        };
        *cycle = decision.cycle;
        if *targets != decision.targets {
            *targets = decision.targets.clone();
        }

        let mut gain = stats.skill_per_second * dt.0;
        if !decision.strike.is_empty() {
            gain += stats.skill_per_strike;
        }
        skill.fill(gain);
    }
}
