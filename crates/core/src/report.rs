//! Scenario outcomes and the sink that renders them.

use std::fmt;

use serde::Serialize;

use crate::artifact::Artifact;
use crate::assertion::AssertionOutcome;
use crate::step::StepFailure;

/// Terminal state of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ScenarioStatus {
	/// Every assertion was evaluated; individual ones may have failed.
	Completed,
	/// Continuation stopped being meaningful.
	Aborted { reason: String },
}

impl ScenarioStatus {
	pub fn is_completed(&self) -> bool {
		matches!(self, ScenarioStatus::Completed)
	}
}

impl fmt::Display for ScenarioStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ScenarioStatus::Completed => f.write_str("completed"),
			ScenarioStatus::Aborted { reason } => write!(f, "aborted: {reason}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
	pub name: String,
	pub status: ScenarioStatus,
	pub assertions: Vec<AssertionOutcome>,
	pub steps_run: usize,
	pub step_failures: Vec<StepFailure>,
	pub artifacts: Vec<Artifact>,
	pub notes: Vec<String>,
	pub elapsed_ms: u64,
}

impl ScenarioReport {
	/// Report for a scenario that never got a session.
	pub fn aborted_before_start(name: &str, reason: String) -> Self {
		Self {
			name: name.to_string(),
			status: ScenarioStatus::Aborted { reason },
			assertions: Vec::new(),
			steps_run: 0,
			step_failures: Vec::new(),
			artifacts: Vec::new(),
			notes: Vec::new(),
			elapsed_ms: 0,
		}
	}

	pub fn passed(&self) -> usize {
		self.assertions.iter().filter(|a| a.passed).count()
	}

	pub fn failed(&self) -> usize {
		self.assertions.len() - self.passed()
	}

	/// Completed with every assertion passing.
	pub fn is_clean(&self) -> bool {
		self.status.is_completed() && self.failed() == 0
	}
}

/// Receives scenario progress as it happens.
///
/// Implementations print, collect, or forward events; they must not fail.
pub trait Reporter: Send + Sync {
	fn scenario_started(&self, scenario: &str, description: &str);
	fn note(&self, scenario: &str, message: &str);
	fn step_failed(&self, scenario: &str, failure: &StepFailure);
	fn assertion(&self, scenario: &str, outcome: &AssertionOutcome);
	fn artifact(&self, scenario: &str, artifact: &Artifact);
	fn scenario_finished(&self, report: &ScenarioReport);
}
