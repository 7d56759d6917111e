//! Combatant factory: turns a species template into a spawnable bundle.
//!
//! Building a bundle never touches the world, so a failed lookup cannot leave
//! a half-made combatant on the battlefield.

use crate::components::*;
use crate::error::Result;
use crate::species::{SpeciesTable, SpeciesTemplate};
use crate::vector::Vector;

impl CombatantBundle {
    /// Fresh combatant at full health, state Waiting, no target.
    pub fn from_template(template: &SpeciesTemplate, faction: Faction, position: Vector) -> Self {
        Self {
            id: CombatantId::default(),
            species: Species(template.name.clone()),
            faction,
            position: Position(position),
            health: Health::new(template.health),
            skill: SkillGauge::new(template.skill.max),
            stats: CombatStats {
                attack: template.attack,
                defense: template.defense,
                magic_resist: template.magic_resist,
                move_speed: template.move_speed,
                attack_range: template.attack_range,
                attack_interval: template.attack_interval,
                windup: template.windup(),
                recovery: template.recovery(),
                damage_type: template.damage_type,
                effects: template.effects.clone(),
                skill_per_second: template.skill.per_second,
                skill_per_strike: template.skill.per_strike,
            },
            cycle: AttackCycle::waiting(),
            targets: Targets::default(),
            debuff: ResistDebuff::default(),
        }
    }

    /// Look the species up by name and build it.
    pub fn create(
        table: &SpeciesTable,
        species: &str,
        faction: Faction,
        position: Vector,
    ) -> Result<Self> {
        let template = table.require(species)?;
        Ok(Self::from_template(template, faction, position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Effect, EffectSet};
    use crate::error::SimError;

    #[test]
    fn test_from_template_copies_stats() {
        let template = SpeciesTemplate {
            name: "Crusher".into(),
            health: 3000.0,
            attack: 450.0,
            defense: 200.0,
            attack_interval: 2.0,
            effects: EffectSet::new([Effect::Splash]),
            ..SpeciesTemplate::default()
        };

        let bundle = CombatantBundle::from_template(&template, Faction::Right, Vector::new(8.0, 2.0));
        assert_eq!(bundle.species.0, "Crusher");
        assert_eq!(bundle.faction, Faction::Right);
        assert_eq!(bundle.health, Health::new(3000.0));
        assert_eq!(bundle.stats.defense, 200.0);
        assert!((bundle.stats.windup - 0.5).abs() < 1e-6);
        assert!((bundle.stats.recovery - 1.5).abs() < 1e-6);
        assert!(bundle.stats.effects.splashes());
        assert_eq!(bundle.cycle.state, AttackState::Waiting);
        assert!(bundle.targets.is_empty());
        assert_eq!(bundle.skill.current, 0.0);
    }

    #[test]
    fn test_create_unknown_species_fails() {
        let table = SpeciesTable::new();
        let result = CombatantBundle::create(&table, "Ghost", Faction::Left, Vector::ZERO);
        assert!(matches!(result, Err(SimError::UnknownSpecies(_))));
    }
}
