//! Scripted swap scenarios.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tokenswap_session::{SubmissionState, ValidationState};

/// A scripted sequence of user actions and expectations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// Refers to a token without knowing the catalog in advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TokenRef {
    /// The n-th symbol of the sorted catalog.
    Index(usize),
    /// Whatever is currently selected as "from".
    CurrentFrom,
    /// Whatever is currently selected as "to".
    CurrentTo,
    /// A literal symbol, which need not exist.
    Named(String),
}

/// A step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Pick the "from" token.
    SelectFrom(TokenRef),
    /// Pick the "to" token.
    SelectTo(TokenRef),
    /// Type an amount.
    Amount(String),
    /// Press the direction toggle.
    SwapDirection,
    /// Press the submit button.
    Submit,
    /// Wait until the in-flight submission completes.
    AwaitSettlement,
    /// Pause.
    Wait { millis: u64 },
    /// Check the current state.
    Expect(Expectation),
}

/// Conditions that can be checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expectation {
    /// Validation equals.
    Validation(ValidationState),
    /// Submission state equals.
    Submission(SubmissionState),
    /// An output value is shown.
    OutputAvailable,
    /// The amount field is empty.
    AmountCleared,
    /// "from" and "to" differ.
    DistinctTokens,
    /// The pair matches what it was at the start of the scenario.
    OriginalPair,
    /// Number of completed swaps in this run.
    CompletedSwaps(u64),
}

impl Scenario {
    /// Load a built-in scenario by name, or a JSON scenario from a path.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "quick-swap" => Ok(Self::quick_swap()),
            "collision" => Ok(Self::collision()),
            "unknown-token" => Ok(Self::unknown_token()),
            "double-submit" => Ok(Self::double_submit()),
            "flip" => Ok(Self::flip()),
            path if path.ends_with(".json") => Self::from_file(Path::new(path)),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Names of the built-in scenarios.
    pub fn builtin_names() -> &'static [&'static str] {
        &["quick-swap", "collision", "unknown-token", "double-submit", "flip"]
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Type an amount, submit and wait for the success flash.
    fn quick_swap() -> Self {
        Self {
            name: "quick-swap".to_string(),
            description: "Enter an amount and submit a swap".to_string(),
            steps: vec![
                ScenarioStep::Amount("2".to_string()),
                ScenarioStep::Expect(Expectation::Validation(ValidationState::Valid)),
                ScenarioStep::Expect(Expectation::OutputAvailable),
                ScenarioStep::Submit,
                ScenarioStep::Expect(Expectation::Submission(SubmissionState::Submitting)),
                ScenarioStep::AwaitSettlement,
                ScenarioStep::Expect(Expectation::AmountCleared),
                ScenarioStep::Expect(Expectation::CompletedSwaps(1)),
            ],
        }
    }

    /// Picking the same token on both sides moves the other side.
    fn collision() -> Self {
        Self {
            name: "collision".to_string(),
            description: "Select the current 'from' token as 'to'".to_string(),
            steps: vec![
                ScenarioStep::Amount("1".to_string()),
                ScenarioStep::SelectTo(TokenRef::CurrentFrom),
                ScenarioStep::Expect(Expectation::DistinctTokens),
                ScenarioStep::SelectFrom(TokenRef::CurrentTo),
                ScenarioStep::Expect(Expectation::DistinctTokens),
                ScenarioStep::Expect(Expectation::Validation(ValidationState::Valid)),
            ],
        }
    }

    /// A token with no price cannot be submitted.
    fn unknown_token() -> Self {
        Self {
            name: "unknown-token".to_string(),
            description: "Select a token that has no price".to_string(),
            steps: vec![
                ScenarioStep::Amount("1".to_string()),
                ScenarioStep::SelectTo(TokenRef::Named("XYZ".to_string())),
                ScenarioStep::Expect(Expectation::Validation(ValidationState::PriceUnavailable)),
                ScenarioStep::Submit,
                ScenarioStep::Expect(Expectation::Submission(SubmissionState::Idle)),
                ScenarioStep::SelectTo(TokenRef::Index(1)),
                ScenarioStep::Expect(Expectation::Validation(ValidationState::Valid)),
            ],
        }
    }

    /// A second submit while one is in flight is ignored.
    fn double_submit() -> Self {
        Self {
            name: "double-submit".to_string(),
            description: "Press submit twice in quick succession".to_string(),
            steps: vec![
                ScenarioStep::Amount("1".to_string()),
                ScenarioStep::Submit,
                ScenarioStep::Submit,
                ScenarioStep::AwaitSettlement,
                ScenarioStep::Wait { millis: 1500 },
                ScenarioStep::Expect(Expectation::CompletedSwaps(1)),
                ScenarioStep::Expect(Expectation::AmountCleared),
            ],
        }
    }

    /// Toggling direction twice restores the pair and clears the amount.
    fn flip() -> Self {
        Self {
            name: "flip".to_string(),
            description: "Swap direction twice".to_string(),
            steps: vec![
                ScenarioStep::Amount("5".to_string()),
                ScenarioStep::SwapDirection,
                ScenarioStep::Expect(Expectation::AmountCleared),
                ScenarioStep::Expect(Expectation::Validation(
                    ValidationState::EmptyOrNonPositiveAmount,
                )),
                ScenarioStep::SwapDirection,
                ScenarioStep::Expect(Expectation::OriginalPair),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_load() {
        for name in Scenario::builtin_names() {
            let scenario = Scenario::load(name).unwrap();
            assert_eq!(&scenario.name, name);
            assert!(!scenario.steps.is_empty());
        }
    }

    #[test]
    fn test_unknown_scenario() {
        assert!(Scenario::load("no-such-scenario").is_err());
    }

    #[test]
    fn test_scenario_from_json() {
        let json = r#"{
            "name": "custom",
            "description": "from a file",
            "steps": [
                { "Amount": "3" },
                { "SelectTo": { "Named": "USDC" } },
                "Submit",
                { "Expect": { "Validation": "Valid" } }
            ]
        }"#;

        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.steps.len(), 4);
        assert!(matches!(scenario.steps[2], ScenarioStep::Submit));
    }

    #[test]
    fn test_missing_scenario_file() {
        assert!(Scenario::load("/nonexistent/scenario.json").is_err());
    }
}
