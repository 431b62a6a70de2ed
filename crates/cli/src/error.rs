use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

/// Failures that stop the process before or after the scenarios run.
///
/// Scenario outcomes are never errors here; they end up in the reports.
#[derive(Debug, Error)]
pub enum CliError {
	#[error("unknown scenario '{name}' (available: {known})")]
	UnknownScenario { name: String, known: String },

	#[error("no scenario given; name one or pass --all")]
	NothingToRun,

	#[error(transparent)]
	Config(#[from] sbv::VerifyError),

	#[error("cannot write report {path}")]
	Report {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl CliError {
	/// Short code printed alongside the message.
	pub fn code(&self) -> &'static str {
		match self {
			CliError::UnknownScenario { .. } => "UNKNOWN_SCENARIO",
			CliError::NothingToRun => "NOTHING_TO_RUN",
			CliError::Config(_) => "CONFIG",
			CliError::Report { .. } => "REPORT",
			CliError::Json(_) => "JSON",
		}
	}
}
