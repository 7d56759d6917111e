//! Per-species special effects.
//!
//! Effects are tags on a species and are resolved at three hook points:
//!
//! - **strike** (attacker side, when a windup completes): how many targets are
//!   chosen ([`EffectSet::target_count`]) and whether the hit splashes;
//! - **on-hit reaction**: reflect (defender side) and burn (attacker side),
//!   see [`reflect_on_hit`] and [`burn_on_hit`];
//! - **per-tick passive**: regeneration and decay, see [`apply_passives`].

use crate::components::{Health, ResistDebuff};
use crate::config::SimConfig;
use crate::damage::reflect_damage;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One special-effect tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Effect {
    /// Hits also land on enemies near the primary target.
    Splash,
    /// Returns damage to whoever strikes this combatant.
    Reflect,
    /// Heals every tick.
    Regeneration,
    /// Loses health every tick.
    Decay,
    /// Hits lower the defender's magic resist for a while (off by default).
    Burn,
    /// Picks the two nearest enemies as simultaneous targets.
    StrikeTwo,
}

impl Effect {
    pub fn tag(self) -> &'static str {
        match self {
            Effect::Splash => "splash",
            Effect::Reflect => "reflect",
            Effect::Regeneration => "regen",
            Effect::Decay => "decay",
            Effect::Burn => "burn",
            Effect::StrikeTwo => "strike_two",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error for a tag that names no known effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEffect(pub String);

impl FromStr for Effect {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "splash" | "溅射" => Ok(Effect::Splash),
            "reflect" | "反伤" => Ok(Effect::Reflect),
            "regen" | "regeneration" | "再生" => Ok(Effect::Regeneration),
            "decay" | "dot" | "掉血" => Ok(Effect::Decay),
            "burn" | "灼燃" => Ok(Effect::Burn),
            "strike_two" | "打2" => Ok(Effect::StrikeTwo),
            other => Err(UnknownEffect(other.to_string())),
        }
    }
}

/// The effect tags of one species.
///
/// Serialized as a space-separated tag list, e.g. `"splash strike_two"`.
/// Unrecognised tags are dropped when parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectSet(Vec<Effect>);

impl EffectSet {
    pub fn new(effects: impl IntoIterator<Item = Effect>) -> Self {
        let mut list: Vec<Effect> = effects.into_iter().collect();
        list.sort();
        list.dedup();
        Self(list)
    }

    /// Parse a space-separated tag list.
    pub fn parse(tags: &str) -> Self {
        Self::new(tags.split_whitespace().filter_map(|tag| match tag.parse() {
            Ok(effect) => Some(effect),
            Err(UnknownEffect(tag)) => {
                tracing::debug!(%tag, "ignoring unknown effect tag");
                None
            }
        }))
    }

    pub fn contains(&self, effect: Effect) -> bool {
        self.0.contains(&effect)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Effect> + '_ {
        self.0.iter().copied()
    }

    /// Number of enemies selected as targets when acquiring.
    pub fn target_count(&self) -> usize {
        if self.contains(Effect::StrikeTwo) {
            2
        } else {
            1
        }
    }

    pub fn splashes(&self) -> bool {
        self.contains(Effect::Splash)
    }
}

impl fmt::Display for EffectSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, effect) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{effect}")?;
        }
        Ok(())
    }
}

impl Serialize for EffectSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EffectSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagsVisitor;

        impl<'de> de::Visitor<'de> for TagsVisitor {
            type Value = EffectSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a space-separated effect tag string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EffectSet, E> {
                Ok(EffectSet::parse(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<EffectSet, E> {
                Ok(EffectSet::default())
            }
        }

        deserializer.deserialize_any(TagsVisitor)
    }
}

// ============================================================================
// HOOKS
// ============================================================================

/// Per-tick passive: regeneration heals and decay drains, both clamped to max.
pub fn apply_passives(effects: &EffectSet, health: &mut Health, config: &SimConfig, dt: f32) {
    for effect in effects.iter() {
        match effect {
            Effect::Regeneration => health.regenerate(config.regen_per_second * dt),
            Effect::Decay => health.decay(config.decay_per_second * dt),
            Effect::Splash | Effect::Reflect | Effect::Burn | Effect::StrikeTwo => {}
        }
    }
}

/// On-hit reaction of the defender: damage returned to the attacker, if any.
pub fn reflect_on_hit(
    defender_effects: &EffectSet,
    attacker_magic_resist: f32,
    config: &SimConfig,
) -> Option<f32> {
    defender_effects
        .contains(Effect::Reflect)
        .then(|| reflect_damage(attacker_magic_resist, config.reflect_base, config.reflect_floor))
}

/// On-hit reaction of the attacker: the debuff a burn hit would apply.
///
/// Returns `None` while burn is disabled in the config.
pub fn burn_on_hit(attacker_effects: &EffectSet, config: &SimConfig) -> Option<ResistDebuff> {
    (config.burn.enabled && attacker_effects.contains(Effect::Burn)).then(|| ResistDebuff {
        reduction: config.burn.resist_reduction,
        remaining: config.burn.duration,
        cooldown: config.burn.cooldown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_tags() {
        let set = EffectSet::parse("打2 splash bogus 溅射");
        assert!(set.contains(Effect::StrikeTwo));
        assert!(set.contains(Effect::Splash));
        assert_eq!(set.iter().count(), 2);
        assert_eq!(set.target_count(), 2);
        assert_eq!(set.to_string(), "splash strike_two");
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let set = EffectSet::new([Effect::Reflect, Effect::Regeneration]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#""reflect regen""#);
        let back: EffectSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_passives_regen_and_decay() {
        let config = SimConfig::default();
        let dt = config.fixed_timestep;

        let mut health = Health { current: 100.0, max: 1000.0 };
        apply_passives(&EffectSet::new([Effect::Regeneration]), &mut health, &config, dt);
        assert!((health.current - (100.0 + 250.0 / 30.0)).abs() < 1e-3);

        let mut full = Health::new(1000.0);
        apply_passives(&EffectSet::new([Effect::Regeneration]), &mut full, &config, dt);
        assert_eq!(full.current, 1000.0);

        let mut decaying = Health::new(1000.0);
        apply_passives(&EffectSet::new([Effect::Decay]), &mut decaying, &config, dt);
        assert!((decaying.current - (1000.0 - 10.0)).abs() < 1e-3);
    }

    #[test]
    fn test_reflect_only_for_tagged_defender() {
        let config = SimConfig::default();
        let reflect = EffectSet::new([Effect::Reflect]);
        assert_eq!(reflect_on_hit(&reflect, 50.0, &config), Some(150.0));
        assert_eq!(reflect_on_hit(&EffectSet::default(), 50.0, &config), None);
    }

    #[test]
    fn test_burn_disabled_by_default() {
        let mut config = SimConfig::default();
        let burn = EffectSet::new([Effect::Burn]);
        assert!(burn_on_hit(&burn, &config).is_none());

        config.burn.enabled = true;
        let debuff = burn_on_hit(&burn, &config).unwrap();
        assert_eq!(debuff.reduction, 20.0);
        assert_eq!(debuff.remaining, 10.0);
    }
}
