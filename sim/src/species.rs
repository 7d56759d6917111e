//! Species templates and the table they are looked up from.
//!
//! The table is supplied by the caller (usually parsed from the monster data
//! file) and is only ever read by the simulation. Templates are shared behind
//! `Arc` so every combatant spawned from one species points at the same
//! record until its stats are copied in.

use crate::effects::EffectSet;
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which defensive stat mitigates a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    /// Mitigated by defense.
    #[serde(alias = "物理")]
    Physical,
    /// Mitigated by magic resist.
    #[serde(alias = "法术")]
    Magic,
}

impl Default for DamageType {
    fn default() -> Self {
        Self::Physical
    }
}

/// Skill gauge parameters. The ability the gauge triggers is not simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillProfile {
    pub max: f32,
    /// Gauge gained per simulated second.
    pub per_second: f32,
    /// Gauge gained per completed strike.
    pub per_strike: f32,
}

impl Default for SkillProfile {
    fn default() -> Self {
        Self {
            max: 100.0,
            per_second: 2.0,
            per_strike: 10.0,
        }
    }
}

fn default_windup_ratio() -> f32 {
    0.25
}

/// Static stat block defining one unit type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTemplate {
    #[serde(alias = "名字")]
    pub name: String,
    pub health: f32,
    pub attack: f32,
    #[serde(default)]
    pub defense: f32,
    #[serde(default)]
    pub magic_resist: f32,
    pub move_speed: f32,
    #[serde(alias = "attack_radius")]
    pub attack_range: f32,
    pub attack_interval: f32,
    #[serde(default, alias = "attack_type")]
    pub damage_type: DamageType,
    #[serde(default, alias = "effect")]
    pub effects: EffectSet,
    /// Share of `attack_interval` spent winding up; the rest is recovery.
    #[serde(default = "default_windup_ratio")]
    pub windup_ratio: f32,
    #[serde(default)]
    pub skill: SkillProfile,
}

impl SpeciesTemplate {
    /// Windup duration in seconds.
    pub fn windup(&self) -> f32 {
        self.attack_interval.max(0.0) * self.windup_ratio.clamp(0.0, 1.0)
    }

    /// Recovery duration in seconds.
    pub fn recovery(&self) -> f32 {
        (self.attack_interval.max(0.0) - self.windup()).max(0.0)
    }
}

impl Default for SpeciesTemplate {
    /// A plain physical melee unit with no effects.
    fn default() -> Self {
        Self {
            name: String::new(),
            health: 1000.0,
            attack: 100.0,
            defense: 0.0,
            magic_resist: 0.0,
            move_speed: 1.0,
            attack_range: 1.0,
            attack_interval: 1.0,
            damage_type: DamageType::Physical,
            effects: EffectSet::default(),
            windup_ratio: default_windup_ratio(),
            skill: SkillProfile::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpeciesDocument {
    Wrapped { monsters: Vec<SpeciesTemplate> },
    Bare(Vec<SpeciesTemplate>),
}

/// Name-keyed lookup of species templates.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    species: BTreeMap<String, Arc<SpeciesTemplate>>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from `{"monsters": [...]}` or a bare array of records.
    ///
    /// When a name appears twice the later record wins.
    pub fn from_json(json: &str) -> Result<Self> {
        let templates = match serde_json::from_str::<SpeciesDocument>(json)? {
            SpeciesDocument::Wrapped { monsters } => monsters,
            SpeciesDocument::Bare(list) => list,
        };
        Ok(templates.into_iter().collect())
    }

    pub fn insert(&mut self, template: SpeciesTemplate) {
        self.species
            .insert(template.name.clone(), Arc::new(template));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<SpeciesTemplate>> {
        self.species.get(name)
    }

    /// Look up a species, failing with a configuration error if it is missing.
    pub fn require(&self, name: &str) -> Result<&Arc<SpeciesTemplate>> {
        self.get(name)
            .ok_or_else(|| SimError::UnknownSpecies(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.species.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }
}

impl FromIterator<SpeciesTemplate> for SpeciesTable {
    fn from_iter<I: IntoIterator<Item = SpeciesTemplate>>(iter: I) -> Self {
        let mut table = Self::new();
        for template in iter {
            table.insert(template);
        }
        table
    }
}
