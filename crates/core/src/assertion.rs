//! Point-in-time UI assertions.
//!
//! Every check is evaluated once, at the moment of the call; there is no retry.
//! A failing check is reported before any diagnostic is captured, so the
//! labeled failure line always precedes the screenshot path.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::artifact::{Artifact, ArtifactStore};
use crate::driver::PageDriver;
use crate::locator::{Locator, resolve};
use crate::report::Reporter;

/// What the scenario does after an assertion fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnFailure {
	/// Record the failure and keep going.
	#[default]
	Continue,
	/// Record the failure and end the scenario as aborted.
	Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionOutcome {
	/// Human label, e.g. `TitleBar`.
	pub label: String,
	/// What was checked, e.g. `visible: text=SourceBridge`.
	pub condition: String,
	pub passed: bool,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub artifacts: Vec<PathBuf>,
}

/// Evaluates assertions for one scenario and keeps their outcomes in order.
pub struct AssertionRecorder<'r> {
	scenario: String,
	reporter: &'r dyn Reporter,
	dump_html: bool,
	outcomes: Vec<AssertionOutcome>,
	artifacts: Vec<Artifact>,
}

impl<'r> AssertionRecorder<'r> {
	pub fn new(scenario: &str, reporter: &'r dyn Reporter, dump_html: bool) -> Self {
		Self {
			scenario: scenario.to_string(),
			reporter,
			dump_html,
			outcomes: Vec::new(),
			artifacts: Vec::new(),
		}
	}

	/// Passes when the first element matched by `locator` is visible now.
	pub async fn assert_visible(
		&mut self,
		page: &dyn PageDriver,
		store: &mut ArtifactStore,
		locator: &Locator,
		label: &str,
	) -> AssertionOutcome {
		let visible = is_visible_now(page, locator).await;
		let condition = format!("visible: {locator}");
		self.record(page, store, label, condition, visible).await
	}

	/// Passes when any of `alternatives` is visible now.
	pub async fn assert_any_visible(
		&mut self,
		page: &dyn PageDriver,
		store: &mut ArtifactStore,
		alternatives: &[Locator],
		label: &str,
	) -> AssertionOutcome {
		let mut visible = false;
		for locator in alternatives {
			if is_visible_now(page, locator).await {
				visible = true;
				break;
			}
		}
		let names: Vec<_> = alternatives.iter().map(Locator::label).collect();
		let condition = format!("any visible: {}", names.join(" | "));
		self.record(page, store, label, condition, visible).await
	}

	/// Records a condition the caller has already evaluated.
	pub async fn assert_that(
		&mut self,
		page: &dyn PageDriver,
		store: &mut ArtifactStore,
		label: &str,
		condition: &str,
		holds: bool,
	) -> AssertionOutcome {
		self.record(page, store, label, condition.to_string(), holds).await
	}

	async fn record(
		&mut self,
		page: &dyn PageDriver,
		store: &mut ArtifactStore,
		label: &str,
		condition: String,
		passed: bool,
	) -> AssertionOutcome {
		let mut outcome = AssertionOutcome {
			label: label.to_string(),
			condition,
			passed,
			artifacts: Vec::new(),
		};
		self.reporter.assertion(&self.scenario, &outcome);

		if !passed {
			let artifacts = store.collect_failure(page, &format!("{label}_failure"), self.dump_html).await;
			for artifact in &artifacts {
				self.reporter.artifact(&self.scenario, artifact);
			}
			outcome.artifacts = artifacts.iter().map(|a| a.path.clone()).collect();
			self.artifacts.extend(artifacts);
		}

		self.outcomes.push(outcome.clone());
		outcome
	}

	pub fn outcomes(&self) -> &[AssertionOutcome] {
		&self.outcomes
	}

	pub fn into_outcomes(self) -> Vec<AssertionOutcome> {
		self.outcomes
	}

	/// Outcomes plus every diagnostic file captured for failures.
	pub fn into_parts(self) -> (Vec<AssertionOutcome>, Vec<Artifact>) {
		(self.outcomes, self.artifacts)
	}
}

async fn is_visible_now(page: &dyn PageDriver, locator: &Locator) -> bool {
	match resolve(page, locator).await.is_visible().await {
		Ok(visible) => visible,
		Err(err) => {
			debug!(target = "sbv", locator = %locator, error = %err, "visibility query failed");
			false
		}
	}
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;
	use crate::testing::{FakePage, RecordingReporter, ReportEvent};

	#[tokio::test]
	async fn passing_assertion_captures_nothing() {
		let dir = TempDir::new().unwrap();
		let page = FakePage::new();
		page.insert("text=SourceBridge");
		let reporter = RecordingReporter::new();
		let mut store = ArtifactStore::new(dir.path(), "app-shell");
		let mut recorder = AssertionRecorder::new("app-shell", &reporter, true);

		let outcome = recorder
			.assert_visible(&page, &mut store, &Locator::contains("SourceBridge"), "TitleBar")
			.await;
		assert!(outcome.passed);
		assert!(outcome.artifacts.is_empty());
		assert!(page.screenshots().is_empty());
		assert_eq!(recorder.outcomes().len(), 1);
	}

	#[tokio::test]
	async fn failure_is_reported_before_its_artifacts() {
		let dir = TempDir::new().unwrap();
		let page = FakePage::new();
		let reporter = RecordingReporter::new();
		let mut store = ArtifactStore::new(dir.path(), "app-shell");
		let mut recorder = AssertionRecorder::new("app-shell", &reporter, true);

		let outcome = recorder
			.assert_visible(&page, &mut store, &Locator::contains("SourceBridge"), "TitleBar")
			.await;
		assert!(!outcome.passed);
		assert_eq!(outcome.artifacts.len(), 2);

		let events = reporter.events();
		assert!(matches!(&events[0], ReportEvent::Assertion { outcome, .. } if !outcome.passed && outcome.artifacts.is_empty()));
		assert!(matches!(&events[1], ReportEvent::Artifact { .. }));
		assert!(matches!(&events[2], ReportEvent::Artifact { .. }));
	}

	#[tokio::test]
	async fn hidden_element_fails_visibility() {
		let dir = TempDir::new().unwrap();
		let page = FakePage::new();
		page.insert_hidden("text=Execution Logs");
		let reporter = RecordingReporter::new();
		let mut store = ArtifactStore::new(dir.path(), "sync");
		let mut recorder = AssertionRecorder::new("sync", &reporter, false);

		let outcome = recorder
			.assert_visible(&page, &mut store, &Locator::contains("Execution Logs"), "Log panel")
			.await;
		assert!(!outcome.passed);
		assert_eq!(outcome.artifacts.len(), 1);
	}

	#[tokio::test]
	async fn any_visible_accepts_either_alternative() {
		let dir = TempDir::new().unwrap();
		let page = FakePage::new();
		page.insert("text=No changes detected");
		let reporter = RecordingReporter::new();
		let mut store = ArtifactStore::new(dir.path(), "diff");
		let mut recorder = AssertionRecorder::new("diff", &reporter, true);

		let alternatives = [Locator::contains("No changes detected"), Locator::css("changed file", ".file-change-item")];
		let outcome = recorder.assert_any_visible(&page, &mut store, &alternatives, "Diff result").await;
		assert!(outcome.passed);
		assert_eq!(outcome.condition, "any visible: No changes detected | changed file");
	}

	#[tokio::test]
	async fn assert_that_records_composite_condition() {
		let dir = TempDir::new().unwrap();
		let page = FakePage::new();
		let reporter = RecordingReporter::new();
		let mut store = ArtifactStore::new(dir.path(), "diff");
		let mut recorder = AssertionRecorder::new("diff", &reporter, false);

		let outcome = recorder.assert_that(&page, &mut store, "Determinate", "indicator or entries", false).await;
		assert!(!outcome.passed);
		assert_eq!(recorder.into_outcomes(), vec![outcome]);
	}
}
