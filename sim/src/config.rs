//! Simulation configuration.
//!
//! Every tunable constant of the battle rules lives here so that a run can be
//! reproduced from a single serialized config. Defaults match the standard
//! 13 x 9 arena at 30 Hz.

use crate::components::Faction;
use crate::error::{Result, SimError};
use crate::vector::Vector;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Top-level configuration, inserted into the world as a resource.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds (1/30 = 30 Hz).
    pub fixed_timestep: f32,
    pub field: FieldConfig,
    /// Minimum distance kept between any two alive combatants.
    pub collision_radius: f32,
    /// Radius around a primary target that splash damage reaches.
    pub splash_radius: f32,
    /// Base damage returned by a reflect defender before magic resist.
    pub reflect_base: f32,
    /// Reflected damage never drops below this.
    pub reflect_floor: f32,
    /// Health regained per second by regenerating species.
    pub regen_per_second: f32,
    /// Health lost per second by decaying species.
    pub decay_per_second: f32,
    /// Minimum damage as a fraction of attack.
    pub min_damage_ratio: f32,
    /// Absolute minimum damage of any hit.
    pub min_damage: f32,
    pub burn: BurnConfig,
    /// Cell size of the spatial grid used for neighbor queries.
    pub grid_cell_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 30.0,
            field: FieldConfig::default(),
            collision_radius: 0.2,
            splash_radius: 2.0,
            reflect_base: 300.0,
            reflect_floor: 15.0,
            regen_per_second: 250.0,
            decay_per_second: 300.0,
            min_damage_ratio: 0.05,
            min_damage: 1.0,
            burn: BurnConfig::default(),
            grid_cell_size: 1.0,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the tick loop and spatial grid cannot run with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("fixed_timestep", self.fixed_timestep),
            ("grid_cell_size", self.grid_cell_size),
            ("field.width", self.field.width),
            ("field.height", self.field.height),
            ("field.deploy_spacing", self.field.deploy_spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        let non_negative = [
            ("collision_radius", self.collision_radius),
            ("splash_radius", self.splash_radius),
            ("field.deploy_margin", self.field.deploy_margin),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Arena geometry and deployment layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// Distance kept from the field edges and the midline when deploying.
    pub deploy_margin: f32,
    /// Lattice spacing between deployed combatants.
    pub deploy_spacing: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 13.0,
            height: 9.0,
            deploy_margin: 0.5,
            deploy_spacing: 0.5,
        }
    }
}

impl FieldConfig {
    /// Neutral line separating the two halves.
    pub fn midline(&self) -> f32 {
        self.width / 2.0
    }

    pub fn contains(&self, pos: Vector) -> bool {
        (0.0..=self.width).contains(&pos.x) && (0.0..=self.height).contains(&pos.y)
    }

    /// LEFT owns `x < midline`, RIGHT owns `x >= midline`.
    pub fn in_half(&self, faction: Faction, pos: Vector) -> bool {
        if !self.contains(pos) {
            return false;
        }
        match faction {
            Faction::Left => pos.x < self.midline(),
            Faction::Right => pos.x >= self.midline(),
        }
    }
}

/// Magic-resist debuff applied by burn attackers.
///
/// Off by default: the effect tag is recognised and the hook runs, but no
/// debuff is applied unless `enabled` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnConfig {
    pub enabled: bool,
    /// Magic resist removed while the debuff is active.
    pub resist_reduction: f32,
    /// Seconds the debuff lasts.
    pub duration: f32,
    /// Seconds after application before the same defender can be burned again.
    pub cooldown: f32,
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            resist_reduction: 20.0,
            duration: 10.0,
            cooldown: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_field_halves() {
        let field = FieldConfig::default();
        assert_eq!(field.midline(), 6.5);
        assert!(field.in_half(Faction::Left, Vector::new(6.49, 4.0)));
        assert!(!field.in_half(Faction::Left, Vector::new(6.5, 4.0)));
        assert!(field.in_half(Faction::Right, Vector::new(6.5, 4.0)));
        assert!(!field.in_half(Faction::Right, Vector::new(13.5, 4.0)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{"splash_radius": 3.0, "burn": {"enabled": true}}"#)
            .unwrap();
        assert_eq!(config.splash_radius, 3.0);
        assert!(config.burn.enabled);
        assert_eq!(config.burn.duration, 10.0);
        assert_eq!(config.collision_radius, 0.2);
    }

    #[test]
    fn test_zero_cell_size_is_rejected() {
        let err = SimConfig::from_json(r#"{"grid_cell_size": 0.0}"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(msg) if msg.contains("grid_cell_size")));
        assert!(SimConfig::from_json(r#"{"fixed_timestep": -1.0}"#).is_err());
        assert!(SimConfig::default().validate().is_ok());
    }
}
