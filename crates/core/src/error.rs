use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VerifyError>;

#[derive(Debug, Error)]
pub enum VerifyError {
	#[error("browser launch failed: {0}")]
	BrowserLaunch(String),

	#[error("navigation failed: {url}: {message}")]
	Navigation { url: String, message: String },

	#[error("element not found: {locator}")]
	ElementNotFound { locator: String },

	/// The element resolved but the action could not be applied to it.
	#[error("{action} on {selector} failed: {message}")]
	Interaction {
		action: &'static str,
		selector: String,
		message: String,
	},

	#[error("screenshot failed: {path}")]
	Screenshot {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("timeout after {ms}ms waiting for: {condition}")]
	Timeout { ms: u64, condition: String },

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("session already released")]
	SessionReleased,

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Playwright(#[from] playwright_rs::Error),
}

impl VerifyError {
	/// Short, stable label used in status lines and reports.
	pub fn kind(&self) -> &'static str {
		match self {
			VerifyError::BrowserLaunch(_) => "browser-launch",
			VerifyError::Navigation { .. } => "navigation",
			VerifyError::ElementNotFound { .. } => "locate",
			VerifyError::Interaction { .. } => "interaction",
			VerifyError::Screenshot { .. } => "screenshot",
			VerifyError::Timeout { .. } => "timeout",
			VerifyError::Config(_) => "config",
			VerifyError::SessionReleased => "session",
			VerifyError::Io(_) => "io",
			VerifyError::Json(_) => "json",
			VerifyError::Playwright(err) => classify_playwright_message(&err.to_string()),
		}
	}
}

/// Maps a raw Playwright message onto the harness failure taxonomy.
pub(crate) fn classify_playwright_message(msg: &str) -> &'static str {
	if msg.contains("Timeout") {
		"timeout"
	} else if msg.contains("not attached") || msg.contains("detached") || msg.contains("not visible") {
		"interaction"
	} else if msg.contains("not found") || msg.contains("no element") {
		"locate"
	} else if msg.contains("navigat") || msg.contains("net::") {
		"navigation"
	} else {
		"driver"
	}
}
