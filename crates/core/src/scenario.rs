//! Scenarios and the runner that owns their sessions.
//!
//! A scenario body is plain async code against a [`ScenarioContext`]. It
//! returns `Err(Abort)` when continuing would be meaningless; everything else,
//! including panics, is folded into a [`ScenarioReport`] by the
//! [`ScenarioRunner`], which releases the session on every path.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{info, warn};

use crate::artifact::{Artifact, ArtifactStore};
use crate::assertion::{AssertionOutcome, AssertionRecorder, OnFailure};
use crate::config::HarnessConfig;
use crate::driver::PageDriver;
use crate::error::VerifyError;
use crate::locator::{Locator, resolve};
use crate::report::{Reporter, ScenarioReport, ScenarioStatus};
use crate::session::SessionManager;
use crate::step::{Action, StepExecutor, StepFailure, StepResult};

/// Ends a scenario early with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
	pub reason: String,
}

impl Abort {
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into() }
	}
}

impl fmt::Display for Abort {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.reason)
	}
}

impl std::error::Error for Abort {}

impl From<VerifyError> for Abort {
	fn from(err: VerifyError) -> Self {
		Self::new(format!("{} error: {err}", err.kind()))
	}
}

impl From<StepFailure> for Abort {
	fn from(failure: StepFailure) -> Self {
		Self::new(failure.to_string())
	}
}

/// Result of probing for an entity a scenario depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
	Present,
	Missing,
}

impl Precondition {
	pub fn is_missing(self) -> bool {
		self == Precondition::Missing
	}
}

/// A named verification flow.
#[async_trait]
pub trait Scenario: Send + Sync {
	/// Stable name used on the command line and in artifact file names.
	fn name(&self) -> &'static str;

	fn description(&self) -> &'static str;

	async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Result<(), Abort>;
}

/// Everything a scenario body can do against its page.
pub struct ScenarioContext<'a> {
	name: &'static str,
	config: &'a HarnessConfig,
	page: &'a dyn PageDriver,
	reporter: &'a dyn Reporter,
	store: ArtifactStore,
	recorder: AssertionRecorder<'a>,
	steps_run: usize,
	step_failures: Vec<StepFailure>,
	artifacts: Vec<Artifact>,
	notes: Vec<String>,
}

impl<'a> ScenarioContext<'a> {
	pub fn new(name: &'static str, config: &'a HarnessConfig, page: &'a dyn PageDriver, reporter: &'a dyn Reporter) -> Self {
		Self {
			name,
			config,
			page,
			reporter,
			store: ArtifactStore::new(&config.artifacts_dir, name),
			recorder: AssertionRecorder::new(name, reporter, config.dump_html_on_failure),
			steps_run: 0,
			step_failures: Vec::new(),
			artifacts: Vec::new(),
			notes: Vec::new(),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn config(&self) -> &'a HarnessConfig {
		self.config
	}

	pub fn page(&self) -> &'a dyn PageDriver {
		self.page
	}

	fn executor(&self) -> StepExecutor<'a> {
		StepExecutor::new(self.page, self.config.settle())
	}

	/// Runs one action without ending the scenario on failure.
	///
	/// A failure is still reported and kept in the scenario report.
	pub async fn try_step(&mut self, action: Action) -> StepResult {
		self.steps_run += 1;
		let result = self.executor().execute(&action).await;
		if let StepResult::Failed(failure) = &result {
			self.reporter.step_failed(self.name, failure);
			self.step_failures.push(failure.clone());
		}
		result
	}

	/// Runs one action; any failure aborts the scenario after a diagnostic screenshot.
	pub async fn step(&mut self, action: Action) -> Result<(), Abort> {
		match self.try_step(action).await {
			StepResult::Succeeded => Ok(()),
			StepResult::Failed(failure) => {
				let checkpoint = format!("{}_failure", failure.kind);
				self.screenshot(&checkpoint).await;
				Err(failure.into())
			}
		}
	}

	/// Navigates to an application route and waits `settle`.
	pub async fn open(&mut self, route: &str, settle: Duration) -> Result<(), Abort> {
		let url = self.config.url_for(route)?;
		self.step(Action::Navigate(url)).await?;
		self.settle(settle).await;
		Ok(())
	}

	/// Opens `route`, waits `settle`, and captures the `initial` screenshot.
	pub async fn start(&mut self, route: &str, settle: Duration) -> Result<(), Abort> {
		self.open(route, settle).await?;
		self.screenshot("initial").await;
		Ok(())
	}

	pub async fn click(&mut self, locator: &Locator) -> Result<(), Abort> {
		self.step(Action::Click(locator.clone())).await
	}

	pub async fn fill(&mut self, locator: &Locator, text: &str) -> Result<(), Abort> {
		self.step(Action::Fill(locator.clone(), text.to_string())).await
	}

	/// Clicks when the target can be found; returns whether the click happened.
	pub async fn try_click(&mut self, locator: &Locator) -> bool {
		self.try_step(Action::Click(locator.clone())).await.is_success()
	}

	pub async fn settle(&mut self, duration: Duration) {
		if !duration.is_zero() {
			self.executor().execute(&Action::WaitSettle(duration)).await;
		}
	}

	pub async fn is_visible(&self, locator: &Locator) -> bool {
		resolve(self.page, locator).await.is_visible().await.unwrap_or(false)
	}

	pub async fn count(&self, locator: &Locator) -> usize {
		resolve(self.page, locator).await.count()
	}

	/// Probes for an entity and notes whether setup is needed.
	pub async fn precondition(&mut self, entity: &str, probe: &Locator) -> Precondition {
		if self.is_visible(probe).await {
			self.note(format!("{entity} already exists"));
			Precondition::Present
		} else {
			self.note(format!("{entity} not found, creating it"));
			Precondition::Missing
		}
	}

	pub async fn wait_for_any(&self, alternatives: &[Locator], timeout: Duration) -> Option<usize> {
		self.executor().wait_for_any(alternatives, timeout).await
	}

	pub async fn assert_visible(&mut self, locator: &Locator, label: &str, on_failure: OnFailure) -> Result<AssertionOutcome, Abort> {
		let outcome = self.recorder.assert_visible(self.page, &mut self.store, locator, label).await;
		enforce(outcome, on_failure)
	}

	pub async fn assert_any_visible(
		&mut self,
		alternatives: &[Locator],
		label: &str,
		on_failure: OnFailure,
	) -> Result<AssertionOutcome, Abort> {
		let outcome = self.recorder.assert_any_visible(self.page, &mut self.store, alternatives, label).await;
		enforce(outcome, on_failure)
	}

	pub async fn assert_that(
		&mut self,
		label: &str,
		condition: &str,
		holds: bool,
		on_failure: OnFailure,
	) -> Result<AssertionOutcome, Abort> {
		let outcome = self.recorder.assert_that(self.page, &mut self.store, label, condition, holds).await;
		enforce(outcome, on_failure)
	}

	/// Captures a checkpoint screenshot. A capture failure is noted, not fatal.
	pub async fn screenshot(&mut self, checkpoint: &str) -> Option<Artifact> {
		match self.store.screenshot(self.page, checkpoint).await {
			Ok(artifact) => {
				self.reporter.artifact(self.name, &artifact);
				self.artifacts.push(artifact.clone());
				Some(artifact)
			}
			Err(err) => {
				warn!(target = "sbv", scenario = self.name, checkpoint, error = %err, "screenshot failed");
				self.note(format!("screenshot {checkpoint} failed: {err}"));
				None
			}
		}
	}

	/// Writes the page HTML for `checkpoint`.
	pub async fn dump_html(&mut self, checkpoint: &str) -> Option<Artifact> {
		match self.store.dump_html(self.page, checkpoint).await {
			Ok(artifact) => {
				self.reporter.artifact(self.name, &artifact);
				self.artifacts.push(artifact.clone());
				Some(artifact)
			}
			Err(err) => {
				warn!(target = "sbv", scenario = self.name, checkpoint, error = %err, "page dump failed");
				None
			}
		}
	}

	pub fn note(&mut self, message: impl Into<String>) {
		let message = message.into();
		self.reporter.note(self.name, &message);
		self.notes.push(message);
	}

	fn into_report(self, status: ScenarioStatus, elapsed: Duration) -> ScenarioReport {
		let (assertions, failure_artifacts) = self.recorder.into_parts();
		let mut artifacts = self.artifacts;
		artifacts.extend(failure_artifacts);
		artifacts.sort_by(|a, b| a.path.cmp(&b.path));
		ScenarioReport {
			name: self.name.to_string(),
			status,
			assertions,
			steps_run: self.steps_run,
			step_failures: self.step_failures,
			artifacts,
			notes: self.notes,
			elapsed_ms: elapsed.as_millis() as u64,
		}
	}
}

fn enforce(outcome: AssertionOutcome, on_failure: OnFailure) -> Result<AssertionOutcome, Abort> {
	if !outcome.passed && on_failure == OnFailure::Abort {
		return Err(Abort::new(format!("assertion failed: {} ({})", outcome.label, outcome.condition)));
	}
	Ok(outcome)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(msg) = payload.downcast_ref::<&str>() {
		(*msg).to_string()
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.clone()
	} else {
		"non-string panic payload".to_string()
	}
}

/// Runs scenarios one after another, each in its own session.
pub struct ScenarioRunner<'r> {
	sessions: SessionManager,
	config: HarnessConfig,
	reporter: &'r dyn Reporter,
}

impl<'r> ScenarioRunner<'r> {
	pub fn new(sessions: SessionManager, config: HarnessConfig, reporter: &'r dyn Reporter) -> Self {
		Self {
			sessions,
			config,
			reporter,
		}
	}

	pub fn config(&self) -> &HarnessConfig {
		&self.config
	}

	/// Runs one scenario to a terminal state. Never fails and never panics
	/// because of the scenario body.
	pub async fn run(&self, scenario: &dyn Scenario) -> ScenarioReport {
		let name = scenario.name();
		self.reporter.scenario_started(name, scenario.description());
		info!(target = "sbv", scenario = name, "scenario started");
		let started = Instant::now();

		let session = match self.sessions.acquire().await {
			Ok(session) => session,
			Err(err) => {
				warn!(target = "sbv", scenario = name, error = %err, "could not start browser");
				let report = ScenarioReport::aborted_before_start(name, Abort::from(err).reason);
				self.reporter.scenario_finished(&report);
				return report;
			}
		};

		let mut ctx = ScenarioContext::new(name, &self.config, session.page(), self.reporter);
		let outcome = AssertUnwindSafe(scenario.run(&mut ctx)).catch_unwind().await;
		let status = match outcome {
			Ok(Ok(())) => ScenarioStatus::Completed,
			Ok(Err(abort)) => ScenarioStatus::Aborted { reason: abort.reason },
			Err(payload) => ScenarioStatus::Aborted {
				reason: format!("scenario panicked: {}", panic_message(payload.as_ref())),
			},
		};

		if let ScenarioStatus::Aborted { reason } = &status {
			ctx.note(format!("aborted: {reason}"));
			ctx.screenshot("aborted").await;
		}

		let mut report = ctx.into_report(status, started.elapsed());
		if let Err(err) = session.release().await {
			warn!(target = "sbv", scenario = name, error = %err, "session release failed");
			report.notes.push(format!("browser close failed: {err}"));
		}

		info!(target = "sbv", scenario = name, status = %report.status, "scenario finished");
		self.reporter.scenario_finished(&report);
		report
	}

	/// Runs every scenario in order; a failing one never stops the rest.
	pub async fn run_all(&self, scenarios: &[&dyn Scenario]) -> Vec<ScenarioReport> {
		let mut reports = Vec::with_capacity(scenarios.len());
		for scenario in scenarios {
			reports.push(self.run(*scenario).await);
		}
		reports
	}
}
