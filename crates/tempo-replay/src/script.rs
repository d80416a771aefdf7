//! Feed scripts.
//!
//! A script is a JSON array of steps, each tagged by `"action"`. Steps run in
//! order against one oracle; a failing step is reported in its outcome and
//! the replay carries on.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tempo_oracle::{Principal, ScriptedSource, SourceError, TwapOracle};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Queue a sample and run an update at `now`.
    Update {
        now: u64,
        value: i64,
        timestamp: i64,
    },
    /// Queue a source failure and run an update at `now`.
    FailSource { now: u64, reason: String },
    SetMaxWindowSize { principal: String, value: u64 },
    SetStaleThreshold { principal: String, value: u64 },
    /// Strict and non-strict read at `now`.
    Read { now: u64 },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Update { .. } => "update",
            Step::FailSource { .. } => "fail_source",
            Step::SetMaxWindowSize { .. } => "set_max_window_size",
            Step::SetStaleThreshold { .. } => "set_stale_threshold",
            Step::Read { .. } => "read",
        }
    }
}

/// Result of one step, printed as a JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub action: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Load a script from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing script {}", path.display()))
}

/// Execute one step. `source` must be the oracle's current price source.
///
/// A sample queued for an update that was rejected before sampling (too soon)
/// is discarded so the next step starts from an empty queue.
pub fn execute(
    oracle: &mut TwapOracle,
    source: &ScriptedSource,
    index: usize,
    step: &Step,
) -> StepOutcome {
    let mut outcome = StepOutcome {
        step: index,
        action: step.name(),
        ok: true,
        value: None,
        valid: None,
        error: None,
    };

    let result = match step {
        Step::Update {
            now,
            value,
            timestamp,
        } => {
            source.push(i128::from(*value), *timestamp);
            oracle.update_result(*now).map(|avg| outcome.value = Some(avg))
        }
        Step::FailSource { now, reason } => {
            source.push_error(SourceError::Unreachable(reason.clone()));
            oracle.update_result(*now).map(|avg| outcome.value = Some(avg))
        }
        Step::SetMaxWindowSize { principal, value } => {
            oracle.set_max_window_size(&Principal::new(principal.as_str()), *value)
        }
        Step::SetStaleThreshold { principal, value } => {
            oracle.set_stale_threshold(&Principal::new(principal.as_str()), *value)
        }
        Step::Read { now } => {
            let (value, valid) = oracle.read_with_validity(*now);
            outcome.value = Some(value);
            outcome.valid = Some(valid);
            oracle.read(*now).map(|_| ())
        }
    };

    source.clear();

    if let Err(err) = result {
        tracing::debug!(step = index, action = outcome.action, error = %err, "step failed");
        outcome.ok = false;
        outcome.error = Some(err.to_string());
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempo_oracle::{AllowList, OracleParams};

    use super::*;

    const SCRIPT: &str = r#"[
        {"action": "update", "now": 1000, "value": 10, "timestamp": 1000},
        {"action": "update", "now": 1100, "value": 20, "timestamp": 1100},
        {"action": "update", "now": 1150, "value": 25, "timestamp": 1150},
        {"action": "update", "now": 1200, "value": 30, "timestamp": 1200},
        {"action": "fail_source", "now": 1300, "reason": "timeout"},
        {"action": "update", "now": 1300, "value": 40, "timestamp": 1300},
        {"action": "read", "now": 1300},
        {"action": "update", "now": 1400, "value": 50, "timestamp": 1400},
        {"action": "read", "now": 1400},
        {"action": "set_max_window_size", "principal": "mallory", "value": 900},
        {"action": "set_max_window_size", "principal": "ops", "value": 900},
        {"action": "set_stale_threshold", "principal": "ops", "value": 1}
    ]"#;

    fn run(script: &str) -> Vec<StepOutcome> {
        let steps: Vec<Step> = serde_json::from_str(script).expect("parse script");
        let source = Arc::new(ScriptedSource::new("replay"));
        let mut oracle = TwapOracle::new(
            OracleParams::new(400, 4, 800),
            source.clone(),
            Arc::new(AllowList::new(["ops"])),
        )
        .expect("valid oracle");
        steps
            .iter()
            .enumerate()
            .map(|(i, step)| execute(&mut oracle, &source, i, step))
            .collect()
    }

    #[test]
    fn test_replay_outcomes() {
        let outcomes = run(SCRIPT);
        let ok: Vec<bool> = outcomes.iter().map(|o| o.ok).collect();
        assert_eq!(
            ok,
            vec![true, true, false, true, false, true, false, true, true, false, true, false]
        );

        // Too soon at 1150.
        assert!(outcomes[2].error.as_deref().unwrap_or_default().contains("too soon"));
        // Four updates committed: read is valid only after the fifth.
        assert_eq!(outcomes[6].valid, Some(false));
        assert_eq!(outcomes[8].valid, Some(true));
        assert_eq!(outcomes[8].value, Some(35));
        assert!(outcomes[9].error.as_deref().unwrap_or_default().contains("mallory"));
    }

    #[test]
    fn test_outcome_json_line() {
        let outcomes = run(SCRIPT);
        let line = serde_json::to_string(&outcomes[8]).expect("serialize");
        assert_eq!(
            line,
            r#"{"step":8,"action":"read","ok":true,"value":35,"valid":true}"#
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = serde_json::from_str::<Vec<Step>>(r#"[{"action": "pause"}]"#);
        assert!(err.is_err());
    }
}
