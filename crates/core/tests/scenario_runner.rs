//! Runner lifecycle tests against the scripted fake page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sbv::testing::{FakeLauncher, FakePage, RecordingReporter, ReportEvent};
use sbv::{
	Abort, HarnessConfig, LaunchConfig, Locator, LocatorSpec, OnFailure, Scenario, ScenarioContext, ScenarioRunner,
	ScenarioStatus, SessionManager,
};
use tempfile::TempDir;

fn config(dir: &TempDir) -> HarnessConfig {
	HarnessConfig {
		artifacts_dir: dir.path().join("verification"),
		initial_settle_ms: 0,
		settle_ms: 0,
		..Default::default()
	}
}

fn runner<'r>(launcher: &FakeLauncher, dir: &TempDir, reporter: &'r RecordingReporter) -> ScenarioRunner<'r> {
	let sessions = SessionManager::new(Arc::new(launcher.clone()), LaunchConfig::default());
	ScenarioRunner::new(sessions, config(dir), reporter)
}

/// Scenario built from a closure-free description of what to do.
enum Flow {
	Pass,
	ClickMissing,
	ClickDetached,
	SoftFailure,
	HardFailure,
	Panic,
	EnsureGroup,
}

struct Scripted(Flow);

#[async_trait]
impl Scenario for Scripted {
	fn name(&self) -> &'static str {
		"scripted"
	}

	fn description(&self) -> &'static str {
		"scripted test flow"
	}

	async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Result<(), Abort> {
		ctx.start("/", Duration::ZERO).await?;
		match self.0 {
			Flow::Pass => {
				ctx.assert_visible(&Locator::contains("SourceBridge"), "TitleBar", OnFailure::Continue)
					.await?;
			}
			Flow::ClickMissing => {
				ctx.click(&Locator::titled_button("Run Now")).await?;
				ctx.note("unreachable");
			}
			Flow::ClickDetached => {
				ctx.click(&Locator::titled_button("Logs")).await?;
			}
			Flow::SoftFailure => {
				ctx.assert_visible(&Locator::contains("Missing"), "Missing", OnFailure::Continue)
					.await?;
				ctx.assert_visible(&Locator::contains("SourceBridge"), "TitleBar", OnFailure::Continue)
					.await?;
			}
			Flow::HardFailure => {
				ctx.assert_visible(&Locator::contains("Missing"), "Missing", OnFailure::Abort)
					.await?;
				ctx.assert_visible(&Locator::contains("SourceBridge"), "TitleBar", OnFailure::Continue)
					.await?;
			}
			Flow::Panic => panic!("selector table corrupted"),
			Flow::EnsureGroup => {
				let group = Locator::text("Test Group");
				if ctx.precondition("Test Group", &group).await.is_missing() {
					let new_group = Locator::titled_button("New Group").or(LocatorSpec::Structural {
						path: ".w-64 .p-4.border-b button".into(),
						index: 0,
					});
					ctx.click(&new_group).await?;
					ctx.fill(&Locator::placeholder("Repository Name"), "Test Group").await?;
					ctx.click(&Locator::text("Create")).await?;
				}
				ctx.assert_visible(&group, "Test Group", OnFailure::Continue).await?;
			}
		}
		ctx.screenshot("final").await;
		Ok(())
	}
}

fn app() -> FakePage {
	let page = FakePage::new();
	page.insert("text=SourceBridge");
	page
}

#[tokio::test]
async fn completed_run_releases_session_once() {
	let dir = TempDir::new().unwrap();
	let launcher = FakeLauncher::new(app());
	let reporter = RecordingReporter::new();

	let report = runner(&launcher, &dir, &reporter).run(&Scripted(Flow::Pass)).await;

	assert_eq!(report.status, ScenarioStatus::Completed);
	assert_eq!(report.passed(), 1);
	assert_eq!(launcher.page().close_count(), 1);
	let names: Vec<_> = report
		.artifacts
		.iter()
		.map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
		.collect();
	assert_eq!(names, vec!["scripted_01_initial.png", "scripted_02_final.png"]);
	assert!(dir.path().join("verification/scripted_02_final.png").exists());
}

#[tokio::test]
async fn missing_click_target_aborts_and_releases() {
	let dir = TempDir::new().unwrap();
	let launcher = FakeLauncher::new(app());
	let reporter = RecordingReporter::new();

	let report = runner(&launcher, &dir, &reporter).run(&Scripted(Flow::ClickMissing)).await;

	match &report.status {
		ScenarioStatus::Aborted { reason } => assert!(reason.contains("[locate]"), "reason: {reason}"),
		other => panic!("expected abort, got {other:?}"),
	}
	assert_eq!(report.step_failures.len(), 1);
	assert!(!reporter.notes().contains(&"unreachable".to_string()));
	assert_eq!(launcher.page().close_count(), 1);
	assert!(report.artifacts.iter().any(|a| a.checkpoint == "aborted"));
}

#[tokio::test]
async fn detached_element_is_fatal_interaction() {
	let dir = TempDir::new().unwrap();
	let page = app();
	page.detach("button[title=\"Logs\"]");
	let launcher = FakeLauncher::new(page);
	let reporter = RecordingReporter::new();

	let report = runner(&launcher, &dir, &reporter).run(&Scripted(Flow::ClickDetached)).await;

	match &report.status {
		ScenarioStatus::Aborted { reason } => assert!(reason.contains("[interaction]"), "reason: {reason}"),
		other => panic!("expected abort, got {other:?}"),
	}
	assert_eq!(launcher.page().close_count(), 1);
}

#[tokio::test]
async fn continue_policy_keeps_evaluating() {
	let dir = TempDir::new().unwrap();
	let launcher = FakeLauncher::new(app());
	let reporter = RecordingReporter::new();

	let report = runner(&launcher, &dir, &reporter).run(&Scripted(Flow::SoftFailure)).await;

	assert_eq!(report.status, ScenarioStatus::Completed);
	assert_eq!(report.assertions.len(), 2);
	assert_eq!(report.failed(), 1);
	assert!(!report.is_clean());
}

#[tokio::test]
async fn abort_policy_stops_at_the_failed_assertion() {
	let dir = TempDir::new().unwrap();
	let launcher = FakeLauncher::new(app());
	let reporter = RecordingReporter::new();

	let report = runner(&launcher, &dir, &reporter).run(&Scripted(Flow::HardFailure)).await;

	assert!(matches!(report.status, ScenarioStatus::Aborted { .. }));
	assert_eq!(report.assertions.len(), 1);
	assert_eq!(launcher.page().close_count(), 1);
}

#[tokio::test]
async fn panicking_body_is_converted_to_abort() {
	let dir = TempDir::new().unwrap();
	let launcher = FakeLauncher::new(app());
	let reporter = RecordingReporter::new();

	let report = runner(&launcher, &dir, &reporter).run(&Scripted(Flow::Panic)).await;

	match &report.status {
		ScenarioStatus::Aborted { reason } => assert!(reason.contains("selector table corrupted")),
		other => panic!("expected abort, got {other:?}"),
	}
	assert_eq!(launcher.page().close_count(), 1);
}

#[tokio::test]
async fn launch_failure_aborts_without_session() {
	let dir = TempDir::new().unwrap();
	let launcher = FakeLauncher::failing();
	let reporter = RecordingReporter::new();

	let report = runner(&launcher, &dir, &reporter).run(&Scripted(Flow::Pass)).await;

	match &report.status {
		ScenarioStatus::Aborted { reason } => assert!(reason.contains("browser-launch")),
		other => panic!("expected abort, got {other:?}"),
	}
	assert_eq!(launcher.page().close_count(), 0);
	assert!(matches!(reporter.events().last(), Some(ReportEvent::Finished { .. })));
}

#[tokio::test]
async fn failing_scenario_does_not_stop_the_suite() {
	let dir = TempDir::new().unwrap();
	let launcher = FakeLauncher::new(app());
	let reporter = RecordingReporter::new();
	let failing = Scripted(Flow::Panic);
	let passing = Scripted(Flow::Pass);

	let reports = runner(&launcher, &dir, &reporter).run_all(&[&failing, &passing]).await;

	assert_eq!(reports.len(), 2);
	assert!(matches!(reports[0].status, ScenarioStatus::Aborted { .. }));
	assert_eq!(reports[1].status, ScenarioStatus::Completed);
	assert_eq!(launcher.launches(), 2);
	assert_eq!(launcher.page().close_count(), 2);
}

#[tokio::test]
async fn precondition_setup_runs_once_across_runs() {
	let dir = TempDir::new().unwrap();
	let page = app();
	page.insert(".w-64 .p-4.border-b button >> nth=0");
	page.insert("input[placeholder=\"Repository Name\"]");
	page.insert("text=\"Create\"");
	page.on_click("text=\"Create\"", |dom| dom.insert("text=\"Test Group\""));
	let launcher = FakeLauncher::new(page);
	let reporter = RecordingReporter::new();
	let runner = runner(&launcher, &dir, &reporter);

	let first = runner.run(&Scripted(Flow::EnsureGroup)).await;
	let second = runner.run(&Scripted(Flow::EnsureGroup)).await;

	assert!(first.is_clean());
	assert!(second.is_clean());
	assert_eq!(launcher.page().clicks().iter().filter(|s| *s == "text=\"Create\"").count(), 1);
	assert!(second.notes.contains(&"Test Group already exists".to_string()));
}

#[tokio::test]
async fn failure_line_precedes_its_screenshot() {
	let dir = TempDir::new().unwrap();
	let launcher = FakeLauncher::new(app());
	let reporter = RecordingReporter::new();

	runner(&launcher, &dir, &reporter).run(&Scripted(Flow::ClickMissing)).await;

	let events = reporter.events();
	let failed_at = events
		.iter()
		.position(|e| matches!(e, ReportEvent::StepFailed { .. }))
		.unwrap();
	let next_artifact = events
		.iter()
		.skip(failed_at)
		.position(|e| matches!(e, ReportEvent::Artifact { .. }));
	assert!(next_artifact.is_some());
	assert!(
		events[..failed_at]
			.iter()
			.filter(|e| matches!(e, ReportEvent::Artifact { .. }))
			.count()
			== 1,
		"only the initial screenshot precedes the failure"
	);
}
