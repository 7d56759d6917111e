//! Combat calculator.
//!
//! Pure functions only: the same inputs always give the same damage.

use crate::config::SimConfig;
use crate::species::DamageType;

/// Attacker side of a damage roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offense {
    pub attack: f32,
    pub damage_type: DamageType,
}

/// Defender side of a damage roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mitigation {
    pub defense: f32,
    /// Effective (possibly debuffed) magic resist.
    pub magic_resist: f32,
}

/// Lower bound of any hit: `max(ratio * attack, minimum)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageFloor {
    pub ratio: f32,
    pub minimum: f32,
}

impl DamageFloor {
    pub fn for_attack(&self, attack: f32) -> f32 {
        (attack * self.ratio).max(self.minimum)
    }
}

impl Default for DamageFloor {
    fn default() -> Self {
        Self {
            ratio: 0.05,
            minimum: 1.0,
        }
    }
}

impl From<&SimConfig> for DamageFloor {
    fn from(config: &SimConfig) -> Self {
        Self {
            ratio: config.min_damage_ratio,
            minimum: config.min_damage,
        }
    }
}

/// Damage of one hit.
///
/// The damage type picks the mitigating stat, which scales attack by
/// `(100 - resist) / 100`. The result never drops below the floor, so even a
/// resist of 100 or more cannot nullify a hit.
pub fn compute_damage(attacker: Offense, defender: Mitigation, floor: DamageFloor) -> f32 {
    let resist = match attacker.damage_type {
        DamageType::Physical => defender.defense,
        DamageType::Magic => defender.magic_resist,
    };
    let raw = attacker.attack * (100.0 - resist) / 100.0;
    raw.max(floor.for_attack(attacker.attack))
}

/// Damage a reflect defender returns: `max(floor, base * (100 - resist) / 100)`
/// where `resist` is the attacker's current magic resist.
pub fn reflect_damage(attacker_magic_resist: f32, base: f32, floor: f32) -> f32 {
    (base * (100.0 - attacker_magic_resist) / 100.0).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn offense(attack: f32, damage_type: DamageType) -> Offense {
        Offense {
            attack,
            damage_type,
        }
    }

    #[test]
    fn test_damage_type_selects_resist() {
        let defender = Mitigation {
            defense: 50.0,
            magic_resist: 20.0,
        };
        let floor = DamageFloor::default();

        let physical = compute_damage(offense(200.0, DamageType::Physical), defender, floor);
        assert!((physical - 100.0).abs() < 1e-4);

        let magic = compute_damage(offense(200.0, DamageType::Magic), defender, floor);
        assert!((magic - 160.0).abs() < 1e-4);
    }

    #[test]
    fn test_full_resist_hits_floor() {
        let defender = Mitigation {
            defense: 150.0,
            magic_resist: 100.0,
        };
        let floor = DamageFloor::default();

        assert_eq!(
            compute_damage(offense(400.0, DamageType::Physical), defender, floor),
            20.0
        );
        assert_eq!(
            compute_damage(offense(400.0, DamageType::Magic), defender, floor),
            20.0
        );
        // Weak attackers still deal the absolute minimum.
        assert_eq!(
            compute_damage(offense(0.0, DamageType::Magic), defender, floor),
            1.0
        );
    }

    #[test]
    fn test_reflect_formula() {
        assert_eq!(reflect_damage(50.0, 300.0, 15.0), 150.0);
        assert_eq!(reflect_damage(0.0, 300.0, 15.0), 300.0);
        assert_eq!(reflect_damage(99.0, 300.0, 15.0), 15.0);
        assert_eq!(reflect_damage(120.0, 300.0, 15.0), 15.0);
    }

    proptest! {
        #[test]
        fn damage_never_below_floor(
            attack in 0.0f32..5000.0,
            defense in 0.0f32..1000.0,
            magic_resist in 0.0f32..1000.0,
            magic in any::<bool>(),
        ) {
            let damage_type = if magic { DamageType::Magic } else { DamageType::Physical };
            let floor = DamageFloor::default();
            let damage = compute_damage(
                offense(attack, damage_type),
                Mitigation { defense, magic_resist },
                floor,
            );
            prop_assert!(damage >= floor.for_attack(attack));
            prop_assert!(damage > 0.0);
        }
    }
}
