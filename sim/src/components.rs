//! ECS components for the arena simulation.
//!
//! Components are pure data containers attached to combatant entities.
//! All game logic lives in systems that query these components.

use crate::effects::EffectSet;
use crate::species::DamageType;
use crate::vector::Vector;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Spawn-order identifier of a combatant.
///
/// Ids are handed out in increasing order by the battlefield and never reused
/// within a session, so they double as the deterministic tie-breaker.
#[derive(
    Component, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub struct CombatantId(pub u32);

/// Side a combatant fights for. Fixed at creation.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Left,
    Right,
}

impl Faction {
    pub fn opponent(self) -> Self {
        match self {
            Faction::Left => Faction::Right,
            Faction::Right => Faction::Left,
        }
    }
}

impl Default for Faction {
    fn default() -> Self {
        Self::Left
    }
}

/// Name of the species template the combatant was built from.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species(pub String);

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// Position on the battlefield in field units.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vector);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vector::new(x, y))
    }
}

// ============================================================================
// VITALS
// ============================================================================

/// Health of a combatant.
///
/// Only damage may take `current` to zero; only the regeneration and decay
/// passives clamp against `max`. Anything else leaving `[0, max]` is caught by
/// the invariant check.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Apply damage; lethal damage leaves the combatant at exactly zero.
    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    /// Regeneration passive: heal, capped at max.
    pub fn regenerate(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Decay passive: lose health, may kill, never ends above max.
    pub fn decay(&mut self, amount: f32) {
        self.current = (self.current - amount).min(self.max).max(0.0);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Skill gauge. Fills over time and on each strike, holding at `max`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillGauge {
    pub current: f32,
    pub max: f32,
}

impl SkillGauge {
    pub fn new(max: f32) -> Self {
        Self { current: 0.0, max }
    }

    pub fn fill(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

impl Default for SkillGauge {
    fn default() -> Self {
        Self::new(100.0)
    }
}

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Per-combatant copy of the species stats it was built from.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub attack: f32,
    pub defense: f32,
    /// Base magic resist; see [`ResistDebuff`] for the effective value.
    pub magic_resist: f32,
    /// Units per second.
    pub move_speed: f32,
    pub attack_range: f32,
    /// Seconds from one strike decision to the next.
    pub attack_interval: f32,
    /// Seconds of committed delay before a strike lands.
    pub windup: f32,
    /// Seconds after a strike before the next decision.
    pub recovery: f32,
    pub damage_type: DamageType,
    pub effects: EffectSet,
    pub skill_per_second: f32,
    pub skill_per_strike: f32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            attack: 100.0,
            defense: 0.0,
            magic_resist: 0.0,
            move_speed: 1.0,
            attack_range: 1.0,
            attack_interval: 1.0,
            windup: 0.25,
            recovery: 0.75,
            damage_type: DamageType::Physical,
            effects: EffectSet::default(),
            skill_per_second: 0.0,
            skill_per_strike: 0.0,
        }
    }
}

/// Timed magic-resist reduction (burn hook).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResistDebuff {
    /// Magic resist removed while active.
    pub reduction: f32,
    /// Seconds left on the active debuff.
    pub remaining: f32,
    /// Seconds before the debuff may be applied again.
    pub cooldown: f32,
}

impl ResistDebuff {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Magic resist after the debuff, never below zero.
    pub fn effective_resist(&self, base: f32) -> f32 {
        if self.is_active() {
            (base - self.reduction).max(0.0)
        } else {
            base
        }
    }

    /// Start the debuff unless it is cooling down. Returns whether it applied.
    pub fn try_apply(&mut self, reduction: f32, duration: f32, cooldown: f32) -> bool {
        if self.cooldown > 0.0 {
            return false;
        }
        self.reduction = reduction;
        self.remaining = duration;
        self.cooldown = cooldown;
        true
    }

    /// Count down timers; the reduction is dropped when the debuff expires.
    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
            if self.remaining <= 0.0 {
                self.reduction = 0.0;
            }
        }
    }
}

// ============================================================================
// AI COMPONENTS
// ============================================================================

/// Attack state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackState {
    /// Idle, looking for a target.
    Waiting,
    /// Closing in on a chosen target.
    Engaging,
    /// Committed pre-attack delay.
    Windup,
    /// Post-attack delay before the next decision.
    Recovery,
}

impl Default for AttackState {
    fn default() -> Self {
        Self::Waiting
    }
}

/// Current phase plus the timer counting down within it.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackCycle {
    pub state: AttackState,
    /// Seconds remaining in Windup or Recovery; unused otherwise.
    pub timer: f32,
}

impl AttackCycle {
    pub fn waiting() -> Self {
        Self::default()
    }

    pub fn engaging() -> Self {
        Self {
            state: AttackState::Engaging,
            timer: 0.0,
        }
    }

    pub fn windup(duration: f32) -> Self {
        Self {
            state: AttackState::Windup,
            timer: duration,
        }
    }

    pub fn recovery(duration: f32) -> Self {
        Self {
            state: AttackState::Recovery,
            timer: duration,
        }
    }
}

/// Weak, id-based reference to the current target(s). The first entry is the
/// primary target.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets(pub Vec<CombatantId>);

impl Targets {
    pub fn primary(&self) -> Option<CombatantId> {
        self.0.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: CombatantId) -> bool {
        self.0.contains(&id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatantId> {
        self.0.iter()
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete combatant entity.
///
/// `id` is assigned by the battlefield when the bundle is appended.
#[derive(Bundle, Debug, Clone, Default)]
pub struct CombatantBundle {
    pub id: CombatantId,
    pub species: Species,
    pub faction: Faction,
    pub position: Position,
    pub health: Health,
    pub skill: SkillGauge,
    pub stats: CombatStats,
    pub cycle: AttackCycle,
    pub targets: Targets,
    pub debuff: ResistDebuff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_floors_at_zero() {
        let mut health = Health::new(100.0);
        health.damage(30.0);
        assert_eq!(health.current, 70.0);
        assert!(health.is_alive());

        health.damage(500.0);
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_regenerate_caps_at_max() {
        let mut health = Health::new(100.0);
        health.damage(5.0);
        health.regenerate(50.0);
        assert_eq!(health.current, 100.0);
    }

    #[test]
    fn test_decay_can_kill() {
        let mut health = Health { current: 4.0, max: 100.0 };
        health.decay(10.0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_skill_gauge_holds_at_max() {
        let mut gauge = SkillGauge::new(10.0);
        gauge.fill(4.0);
        assert_eq!(gauge.current, 4.0);
        gauge.fill(40.0);
        assert_eq!(gauge.current, 10.0);
    }

    #[test]
    fn test_resist_debuff_expires_and_cools_down() {
        let mut debuff = ResistDebuff::default();
        assert!(debuff.try_apply(20.0, 1.0, 2.0));
        assert_eq!(debuff.effective_resist(50.0), 30.0);
        assert_eq!(debuff.effective_resist(10.0), 0.0);

        // Cooling down: a second application is refused.
        assert!(!debuff.try_apply(20.0, 1.0, 2.0));

        debuff.tick(1.0);
        assert!(!debuff.is_active());
        assert_eq!(debuff.effective_resist(50.0), 50.0);

        debuff.tick(1.0);
        assert!(debuff.try_apply(20.0, 1.0, 2.0));
    }

    #[test]
    fn test_faction_opponent() {
        assert_eq!(Faction::Left.opponent(), Faction::Right);
        assert_eq!(Faction::Right.opponent(), Faction::Left);
    }
}
