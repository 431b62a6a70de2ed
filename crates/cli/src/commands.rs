use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use sbv::{BrowserLauncher, HarnessConfig, PlaywrightLauncher, Reporter, Scenario, ScenarioReport, ScenarioRunner, SessionManager};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::console::{ConsoleReporter, print_summary};
use crate::error::{CliError, Result};
use crate::scenarios;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let Cli {
		config,
		base_url,
		artifacts_dir,
		headed,
		command,
		..
	} = cli;

	match command {
		Commands::List => {
			list();
			Ok(())
		}
		Commands::Run { names, all, report } => {
			let selected = scenarios::select(&names, all)?;
			let config = resolve_config(config.as_deref(), base_url, artifacts_dir, headed)?;
			let reporter = ConsoleReporter::stdout();
			let reports = run_scenarios(&selected, config, Arc::new(PlaywrightLauncher), &reporter).await;
			print_summary(&reports);
			if let Some(path) = report {
				write_report(&path, &reports)?;
			}
			Ok(())
		}
	}
}

fn list() {
	let all = scenarios::all();
	let width = all.iter().map(|s| s.name().len()).max().unwrap_or(0);
	for scenario in &all {
		println!("{:width$}  {}", scenario.name().bold(), scenario.description());
	}
}

/// Config file (or defaults) with command-line overrides applied, validated.
pub fn resolve_config(
	file: Option<&Path>,
	base_url: Option<String>,
	artifacts_dir: Option<PathBuf>,
	headed: bool,
) -> Result<HarnessConfig> {
	let mut config = match file {
		Some(path) => HarnessConfig::from_file(path)?,
		None => HarnessConfig::default(),
	};
	if let Some(url) = base_url {
		config.base_url = url;
	}
	if let Some(dir) = artifacts_dir {
		config.artifacts_dir = dir;
	}
	if headed {
		config.headless = false;
	}
	config.validate()?;
	Ok(config)
}

/// Runs `scenarios` in order, one fresh browser session each.
pub async fn run_scenarios(
	scenarios: &[Box<dyn Scenario>],
	config: HarnessConfig,
	launcher: Arc<dyn BrowserLauncher>,
	reporter: &dyn Reporter,
) -> Vec<ScenarioReport> {
	info!(target = "sbv_cli", base_url = %config.base_url, count = scenarios.len(), "running scenarios");
	let sessions = SessionManager::new(launcher, config.launch_config());
	let runner = ScenarioRunner::new(sessions, config, reporter);
	let refs: Vec<&dyn Scenario> = scenarios.iter().map(|s| s.as_ref()).collect();
	runner.run_all(&refs).await
}

#[derive(Serialize)]
struct RunReport<'a> {
	scenarios: &'a [ScenarioReport],
}

pub fn write_report(path: &Path, reports: &[ScenarioReport]) -> Result<()> {
	let json = serde_json::to_string_pretty(&RunReport { scenarios: reports })?;
	std::fs::write(path, json).map_err(|source| CliError::Report {
		path: path.to_path_buf(),
		source,
	})?;
	info!(target = "sbv_cli", path = %path.display(), "report written");
	Ok(())
}
