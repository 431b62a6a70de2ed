//! Single UI actions.
//!
//! [`StepExecutor::execute`] never returns an error: every failure is folded
//! into a [`StepResult::Failed`] carrying a classified cause, and the caller
//! decides whether the scenario can go on.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::driver::PageDriver;
use crate::error::{Result, VerifyError};
use crate::locator::{Locator, resolve};

const DEFAULT_POLL: Duration = Duration::from_millis(100);

/// A UI action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	Navigate(String),
	Click(Locator),
	Fill(Locator, String),
	WaitSettle(Duration),
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Navigate(url) => write!(f, "navigate {url}"),
			Action::Click(locator) => write!(f, "click {locator}"),
			Action::Fill(locator, text) => write!(f, "fill {locator} with {text:?}"),
			Action::WaitSettle(duration) => write!(f, "wait {}ms", duration.as_millis()),
		}
	}
}

/// Why a step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
	/// No strategy of the locator chain matched anything.
	Locate,
	/// The element was found but the action could not be applied.
	Interaction,
	/// The page could not be loaded.
	Navigation,
}

impl FailureKind {
	fn from_error(err: &VerifyError) -> Self {
		match err.kind() {
			"navigation" => FailureKind::Navigation,
			"locate" => FailureKind::Locate,
			_ => FailureKind::Interaction,
		}
	}
}

impl fmt::Display for FailureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FailureKind::Locate => f.write_str("locate"),
			FailureKind::Interaction => f.write_str("interaction"),
			FailureKind::Navigation => f.write_str("navigation"),
		}
	}
}

/// A failed step with a human-readable cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
	pub kind: FailureKind,
	pub action: String,
	pub reason: String,
}

impl fmt::Display for StepFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}: {}", self.kind, self.action, self.reason)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
	Succeeded,
	Failed(StepFailure),
}

impl StepResult {
	pub fn is_success(&self) -> bool {
		matches!(self, StepResult::Succeeded)
	}

	pub fn failure(&self) -> Option<&StepFailure> {
		match self {
			StepResult::Succeeded => None,
			StepResult::Failed(failure) => Some(failure),
		}
	}
}

/// Runs actions against one page, each followed by a fixed settle delay.
pub struct StepExecutor<'p> {
	page: &'p dyn PageDriver,
	settle: Duration,
}

impl<'p> StepExecutor<'p> {
	pub fn new(page: &'p dyn PageDriver, settle: Duration) -> Self {
		Self { page, settle }
	}

	pub fn settle(&self) -> Duration {
		self.settle
	}

	pub async fn execute(&self, action: &Action) -> StepResult {
		info!(target = "sbv", action = %action, "step");
		let outcome = match action {
			Action::Navigate(url) => self.page.goto(url).await.map_err(|e| fail(action, &e)),
			Action::Click(locator) => self.click(action, locator).await,
			Action::Fill(locator, text) => self.fill(action, locator, text).await,
			Action::WaitSettle(duration) => {
				tokio::time::sleep(*duration).await;
				return StepResult::Succeeded;
			}
		};

		match outcome {
			Ok(()) => {
				if !self.settle.is_zero() {
					tokio::time::sleep(self.settle).await;
				}
				StepResult::Succeeded
			}
			Err(failure) => {
				debug!(target = "sbv", kind = %failure.kind, reason = %failure.reason, "step failed");
				StepResult::Failed(failure)
			}
		}
	}

	async fn click(&self, action: &Action, locator: &Locator) -> std::result::Result<(), StepFailure> {
		let resolved = resolve(self.page, locator).await;
		if !resolved.found() {
			return Err(not_found(action, locator));
		}
		self.page.click(resolved.selector()).await.map_err(|e| fail(action, &e))
	}

	async fn fill(&self, action: &Action, locator: &Locator, text: &str) -> std::result::Result<(), StepFailure> {
		let resolved = resolve(self.page, locator).await;
		if !resolved.found() {
			return Err(not_found(action, locator));
		}
		self.page.fill(resolved.selector(), text).await.map_err(|e| fail(action, &e))
	}

	/// Polls until any of `locators` is visible, returning its index.
	///
	/// Returns `None` when `timeout` elapses first. Checks at least once.
	pub async fn wait_for_any(&self, locators: &[Locator], timeout: Duration) -> Option<usize> {
		let start = Instant::now();
		loop {
			for (index, locator) in locators.iter().enumerate() {
				if resolve(self.page, locator).await.is_visible().await.unwrap_or(false) {
					return Some(index);
				}
			}
			let elapsed = start.elapsed();
			if elapsed >= timeout {
				debug!(target = "sbv", alternatives = locators.len(), "no alternative became visible");
				return None;
			}
			tokio::time::sleep(DEFAULT_POLL.min(timeout - elapsed)).await;
		}
	}
}

/// Polls `predicate` every `poll` until it holds or `timeout` elapses.
///
/// This is the condition-based alternative to a fixed settle delay. Returns
/// the time waited.
pub async fn wait_until<F, Fut>(condition: &str, timeout: Duration, poll: Duration, mut predicate: F) -> Result<Duration>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = bool>,
{
	let start = Instant::now();
	loop {
		if predicate().await {
			return Ok(start.elapsed());
		}
		let elapsed = start.elapsed();
		if elapsed >= timeout {
			return Err(VerifyError::Timeout {
				ms: timeout.as_millis() as u64,
				condition: condition.to_string(),
			});
		}
		tokio::time::sleep(poll.min(timeout - elapsed)).await;
	}
}

fn fail(action: &Action, err: &VerifyError) -> StepFailure {
	StepFailure {
		kind: FailureKind::from_error(err),
		action: action.to_string(),
		reason: err.to_string(),
	}
}

fn not_found(action: &Action, locator: &Locator) -> StepFailure {
	let tried: Vec<_> = locator.strategies().iter().map(|s| s.selector()).collect();
	StepFailure {
		kind: FailureKind::Locate,
		action: action.to_string(),
		reason: format!("no element matched {} (tried: {})", locator.label(), tried.join(", ")),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::locator::LocatorSpec;
	use crate::testing::{FakeAction, FakePage};

	fn executor(page: &FakePage) -> StepExecutor<'_> {
		StepExecutor::new(page, Duration::ZERO)
	}

	#[tokio::test]
	async fn click_uses_fallback_strategy() {
		let page = FakePage::new();
		page.insert(".w-64 .p-4.border-b button >> nth=1");
		let add_route = Locator::titled_button("Add Route").or(LocatorSpec::Structural {
			path: ".w-64 .p-4.border-b button".into(),
			index: 1,
		});

		let result = executor(&page).execute(&Action::Click(add_route)).await;
		assert!(result.is_success());
		assert_eq!(page.clicks(), vec![".w-64 .p-4.border-b button >> nth=1".to_string()]);
	}

	#[tokio::test]
	async fn missing_target_is_a_locate_failure() {
		let page = FakePage::new();
		let result = executor(&page).execute(&Action::Click(Locator::text("Create"))).await;
		let failure = result.failure().unwrap();
		assert_eq!(failure.kind, FailureKind::Locate);
		assert!(failure.reason.contains("text=\"Create\""));
		assert!(page.clicks().is_empty());
	}

	#[tokio::test]
	async fn detached_target_is_an_interaction_failure() {
		let page = FakePage::new();
		page.detach("input[placeholder=\"Route Name\"]");
		let action = Action::Fill(Locator::placeholder("Route Name"), "Sync Group".into());
		let failure = executor(&page).execute(&action).await.failure().cloned().unwrap();
		assert_eq!(failure.kind, FailureKind::Interaction);
		assert_eq!(failure.action, "fill input 'Route Name' with \"Sync Group\"");
	}

	#[tokio::test]
	async fn failed_navigation_is_classified() {
		let page = FakePage::new();
		page.fail_goto("/tasks");
		let action = Action::Navigate("http://localhost:1420/tasks".into());
		let failure = executor(&page).execute(&action).await.failure().cloned().unwrap();
		assert_eq!(failure.kind, FailureKind::Navigation);
	}

	#[tokio::test]
	async fn fill_records_value() {
		let page = FakePage::new();
		page.insert("input[placeholder=\"My Task\"]");
		let action = Action::Fill(Locator::placeholder("My Task"), "Sync Task".into());
		assert!(executor(&page).execute(&action).await.is_success());
		assert_eq!(page.value("input[placeholder=\"My Task\"]").as_deref(), Some("Sync Task"));
		assert!(matches!(page.actions().last(), Some(FakeAction::Fill { .. })));
	}

	#[tokio::test]
	async fn wait_until_times_out() {
		let err = wait_until("never", Duration::from_millis(20), Duration::from_millis(5), || async { false })
			.await
			.unwrap_err();
		assert!(matches!(err, VerifyError::Timeout { ms: 20, .. }));
	}

	#[tokio::test]
	async fn wait_until_returns_once_predicate_holds() {
		let mut calls = 0;
		let waited = wait_until("third poll", Duration::from_secs(1), Duration::from_millis(1), || {
			calls += 1;
			let done = calls >= 3;
			async move { done }
		})
		.await;
		assert!(waited.is_ok());
		assert_eq!(calls, 3);
	}

	#[tokio::test]
	async fn wait_for_any_reports_the_visible_alternative() {
		let page = FakePage::new();
		page.insert(".file-change-item");
		let alternatives = [Locator::contains("No changes detected"), Locator::css("changed file", ".file-change-item")];
		let hit = executor(&page).wait_for_any(&alternatives, Duration::from_millis(50)).await;
		assert_eq!(hit, Some(1));

		let empty = FakePage::new();
		assert_eq!(executor(&empty).wait_for_any(&alternatives, Duration::from_millis(20)).await, None);
	}
}
