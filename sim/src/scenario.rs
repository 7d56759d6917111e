//! Recorded battles and headless replays of them.
//!
//! A scenario is the two army compositions plus, optionally, the side that
//! won when the battle was recorded:
//!
//! ```json
//! {"left": {"Grunt": 7}, "right": {"Mage": 5}, "result": "right"}
//! ```

use crate::army::Composition;
use crate::battlefield::{Battlefield, Outcome};
use crate::components::Faction;
use crate::config::SimConfig;
use crate::error::Result;
use crate::species::SpeciesTable;
use serde::{Deserialize, Serialize};

/// Side recorded as the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedResult {
    Left,
    Right,
    Draw,
}

impl ExpectedResult {
    pub fn matches(self, outcome: Outcome) -> bool {
        matches!(
            (self, outcome),
            (ExpectedResult::Left, Outcome::LeftWins)
                | (ExpectedResult::Right, Outcome::RightWins)
                | (ExpectedResult::Draw, Outcome::Draw)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleScenario {
    pub left: Composition,
    pub right: Composition,
    #[serde(default)]
    pub result: Option<ExpectedResult>,
}

impl BattleScenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What happened when a scenario was replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub outcome: Outcome,
    pub ticks: u64,
    /// Simulated seconds until the outcome (or the tick limit).
    pub elapsed: f32,
    pub left_survivors: usize,
    pub right_survivors: usize,
    /// `None` when the scenario carries no recorded result.
    pub matches_expected: Option<bool>,
}

/// Set up and run one scenario on a fresh battlefield.
///
/// Runs until decided or `max_ticks`; an undecided battle is reported as such
/// rather than treated as an error.
pub fn run_scenario(
    scenario: &BattleScenario,
    table: &SpeciesTable,
    config: SimConfig,
    max_ticks: u64,
) -> Result<ScenarioReport> {
    let mut field = Battlefield::with_config(config)?;
    field.setup_battle(&scenario.left, &scenario.right, table)?;
    let outcome = field.run_to_completion(max_ticks)?;

    let report = ScenarioReport {
        outcome,
        ticks: field.current_tick(),
        elapsed: field.elapsed(),
        left_survivors: field.alive_count(Faction::Left),
        right_survivors: field.alive_count(Faction::Right),
        matches_expected: scenario.result.map(|expected| expected.matches(outcome)),
    };
    tracing::info!(
        outcome = ?report.outcome,
        ticks = report.ticks,
        matches = ?report.matches_expected,
        "scenario finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesTemplate;

    #[test]
    fn test_parse_recorded_battle() {
        let scenario =
            BattleScenario::from_json(r#"{"left": {"镜神": 7}, "right": {"狂躁珊瑚": 5}, "result": "right"}"#)
                .unwrap();
        assert_eq!(scenario.left["镜神"], 7);
        assert_eq!(scenario.right["狂躁珊瑚"], 5);
        assert_eq!(scenario.result, Some(ExpectedResult::Right));
    }

    #[test]
    fn test_result_is_optional() {
        let scenario = BattleScenario::from_json(r#"{"left": {}, "right": {"A": 1}}"#).unwrap();
        assert!(scenario.result.is_none());
    }

    #[test]
    fn test_expected_result_matching() {
        assert!(ExpectedResult::Left.matches(Outcome::LeftWins));
        assert!(!ExpectedResult::Left.matches(Outcome::Draw));
        assert!(!ExpectedResult::Draw.matches(Outcome::Undecided));
    }

    #[test]
    fn test_run_one_sided_scenario() {
        let table: SpeciesTable = [SpeciesTemplate {
            name: "Grunt".into(),
            ..SpeciesTemplate::default()
        }]
        .into_iter()
        .collect();
        let scenario = BattleScenario {
            left: [("Grunt".to_string(), 2)].into_iter().collect(),
            right: Composition::new(),
            result: Some(ExpectedResult::Left),
        };

        let report = run_scenario(&scenario, &table, SimConfig::default(), 10).unwrap();
        assert_eq!(report.outcome, Outcome::LeftWins);
        assert_eq!(report.ticks, 1);
        assert_eq!(report.left_survivors, 2);
        assert_eq!(report.matches_expected, Some(true));
    }
}
