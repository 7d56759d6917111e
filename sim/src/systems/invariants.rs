//! End-of-tick consistency check.
//!
//! Runs last in the schedule. Anything it finds means the rules above it are
//! broken, so the battlefield refuses to advance once a report is non-empty.

use crate::components::*;
use bevy_ecs::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub id: CombatantId,
    pub detail: String,
}

/// Violations found by the last tick's check.
#[derive(Resource, Debug, Clone, Default)]
pub struct InvariantReport {
    pub violations: Vec<Violation>,
}

impl InvariantReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check one survivor's vitals; targets are checked separately.
fn check_vitals(health: &Health, skill: &SkillGauge, pos: &Position) -> Option<String> {
    if !health.current.is_finite() || health.current < 0.0 || health.current > health.max {
        return Some(format!("health {} outside [0, {}]", health.current, health.max));
    }
    if !skill.current.is_finite() || skill.current < 0.0 || skill.current > skill.max {
        return Some(format!("skill {} outside [0, {}]", skill.current, skill.max));
    }
    if !pos.0.is_finite() {
        return Some(format!("non-finite position {:?}", pos.0));
    }
    None
}

/// System that records every bound broken after the tick committed.
pub fn invariant_check_system(
    mut report: ResMut<InvariantReport>,
    query: Query<(
        &CombatantId,
        &Faction,
        &Health,
        &SkillGauge,
        &Position,
        &Targets,
    )>,
) {
    report.violations.clear();

    let alive: HashMap<CombatantId, Faction> = query
        .iter()
        .filter(|(_, _, health, ..)| health.is_alive())
        .map(|(id, faction, ..)| (*id, *faction))
        .collect();

    let mut found = Vec::new();
    for (id, faction, health, skill, pos, targets) in query.iter() {
        if let Some(detail) = check_vitals(health, skill, pos) {
            found.push(Violation { id: *id, detail });
        }
        for target in targets.iter() {
            match alive.get(target) {
                None => found.push(Violation {
                    id: *id,
                    detail: format!("targets missing combatant {}", target.0),
                }),
                Some(f) if f == faction => found.push(Violation {
                    id: *id,
                    detail: format!("targets ally {}", target.0),
                }),
                Some(_) => {}
            }
        }
    }

    found.sort_by_key(|v| v.id);
    for violation in &found {
        tracing::warn!(id = violation.id.0, detail = %violation.detail, "invariant violated");
    }
    report.violations = found;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(world: &mut World) -> InvariantReport {
        world.insert_resource(InvariantReport::default());
        let mut schedule = Schedule::default();
        schedule.add_systems(invariant_check_system);
        schedule.run(world);
        world.resource::<InvariantReport>().clone()
    }

    #[test]
    fn test_clean_world_reports_nothing() {
        let mut world = World::new();
        world.spawn(CombatantBundle {
            id: CombatantId(1),
            faction: Faction::Left,
            targets: Targets(vec![CombatantId(2)]),
            ..Default::default()
        });
        world.spawn(CombatantBundle {
            id: CombatantId(2),
            faction: Faction::Right,
            ..Default::default()
        });
        assert!(run(&mut world).is_clean());
    }

    #[test]
    fn test_overfull_health_is_reported() {
        let mut world = World::new();
        world.spawn(CombatantBundle {
            id: CombatantId(1),
            health: Health { current: 120.0, max: 100.0 },
            ..Default::default()
        });
        let report = run(&mut world);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].id, CombatantId(1));
    }

    #[test]
    fn test_dangling_and_friendly_targets_are_reported() {
        let mut world = World::new();
        world.spawn(CombatantBundle {
            id: CombatantId(1),
            faction: Faction::Left,
            targets: Targets(vec![CombatantId(2), CombatantId(9)]),
            ..Default::default()
        });
        world.spawn(CombatantBundle {
            id: CombatantId(2),
            faction: Faction::Left,
            ..Default::default()
        });
        let report = run(&mut world);
        assert_eq!(report.violations.len(), 2);
        assert!(report.violations.iter().all(|v| v.id == CombatantId(1)));
    }
}
