//! Human-readable status lines on stdout.

use std::io::Write;
use std::sync::Mutex;

use colored::Colorize;
use sbv::{Artifact, AssertionOutcome, Reporter, ScenarioReport, ScenarioStatus, StepFailure};
use tracing::debug;

/// Prints progress lines as scenarios run.
///
/// Writes go through one lock so lines from one event never interleave.
pub struct ConsoleReporter<W: Write + Send> {
	out: Mutex<W>,
}

impl ConsoleReporter<std::io::Stdout> {
	pub fn stdout() -> Self {
		Self::new(std::io::stdout())
	}
}

impl<W: Write + Send> ConsoleReporter<W> {
	pub fn new(out: W) -> Self {
		Self { out: Mutex::new(out) }
	}

	pub fn into_inner(self) -> W {
		self.out.into_inner().unwrap_or_else(|e| e.into_inner())
	}

	fn line(&self, text: String) {
		let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
		if let Err(err) = writeln!(out, "{text}") {
			debug!(target = "sbv_cli", error = %err, "console write failed");
		}
	}
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
	fn scenario_started(&self, scenario: &str, description: &str) {
		self.line(format!("{} {} {}", "==>".cyan().bold(), scenario.bold(), description.dimmed()));
	}

	fn note(&self, _scenario: &str, message: &str) {
		self.line(format!("    {message}"));
	}

	fn step_failed(&self, _scenario: &str, failure: &StepFailure) {
		self.line(format!("  {} {failure}", "✗".red()));
	}

	fn assertion(&self, _scenario: &str, outcome: &AssertionOutcome) {
		if outcome.passed {
			self.line(format!("  {} {}", "PASS".green().bold(), outcome.label));
		} else {
			self.line(format!("  {} {} ({})", "FAIL".red().bold(), outcome.label, outcome.condition.dimmed()));
		}
	}

	fn artifact(&self, _scenario: &str, artifact: &Artifact) {
		self.line(format!("    {} {}", "saved".dimmed(), artifact.path.display()));
	}

	fn scenario_finished(&self, report: &ScenarioReport) {
		self.line(format!("{} {}", status_badge(&report.status), report.name));
	}
}

fn status_badge(status: &ScenarioStatus) -> String {
	match status {
		ScenarioStatus::Completed => "✓ completed".green().to_string(),
		ScenarioStatus::Aborted { reason } => format!("{} ({reason})", "✗ aborted".red()),
	}
}

/// One line per scenario: status, assertion counts, artifact count.
pub fn summary_lines(reports: &[ScenarioReport]) -> Vec<String> {
	let width = reports.iter().map(|r| r.name.len()).max().unwrap_or(0);
	reports
		.iter()
		.map(|r| {
			let state = match &r.status {
				ScenarioStatus::Completed if r.failed() == 0 => "ok".green().to_string(),
				ScenarioStatus::Completed => "failed".yellow().to_string(),
				ScenarioStatus::Aborted { .. } => "aborted".red().to_string(),
			};
			format!(
				"{:width$}  {state:>8}  {} passed, {} failed, {} artifact(s), {}ms",
				r.name,
				r.passed(),
				r.failed(),
				r.artifacts.len(),
				r.elapsed_ms
			)
		})
		.collect()
}

pub fn print_summary(reports: &[ScenarioReport]) {
	println!();
	println!("{}", "Summary".bold());
	for line in summary_lines(reports) {
		println!("  {line}");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn outcome(label: &str, passed: bool) -> AssertionOutcome {
		AssertionOutcome {
			label: label.into(),
			condition: format!("visible: {label}"),
			passed,
			artifacts: Vec::new(),
		}
	}

	#[test]
	fn assertion_lines_name_the_label() {
		colored::control::set_override(false);
		let reporter = ConsoleReporter::new(Vec::new());
		reporter.assertion("app-shell", &outcome("TitleBar", true));
		reporter.assertion("app-shell", &outcome("TitleBar", false));
		let text = String::from_utf8(reporter.into_inner()).unwrap();
		let lines: Vec<_> = text.lines().collect();
		assert_eq!(lines[0], "  PASS TitleBar");
		assert_eq!(lines[1], "  FAIL TitleBar (visible: TitleBar)");
	}

	/// Accepts one write, then behaves like a closed pipe.
	struct ClosedAfterOne {
		writes: usize,
		accepted: Vec<u8>,
	}

	impl Write for ClosedAfterOne {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.writes += 1;
			if self.writes > 1 {
				return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
			}
			self.accepted.extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn broken_output_does_not_stop_reporting() {
		colored::control::set_override(false);
		let reporter = ConsoleReporter::new(ClosedAfterOne {
			writes: 0,
			accepted: Vec::new(),
		});
		reporter.note("sync", "Sync Task already exists");
		reporter.note("sync", "running Sync Task");
		reporter.assertion("sync", &outcome("Execution Logs", true));

		let out = reporter.into_inner();
		assert!(out.writes >= 2);
		assert!(!String::from_utf8_lossy(&out.accepted).contains("running"));
	}

	#[test]
	fn summary_counts_assertions_and_artifacts() {
		colored::control::set_override(false);
		let mut report = ScenarioReport::aborted_before_start("routes", "x".into());
		report.status = ScenarioStatus::Completed;
		report.assertions = vec![outcome("Main Sync in tree", true), outcome("Test path matches rule", false)];
		let lines = summary_lines(&[report]);
		assert!(lines[0].starts_with("routes"));
		assert!(lines[0].contains("failed"));
		assert!(lines[0].contains("1 passed, 1 failed, 0 artifact(s)"));
	}
}
