//! Harness configuration.
//!
//! Every field has a default so an empty JSON object (or no file at all) is a
//! valid configuration. The CLI layers its flags on top of whatever the file
//! provides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::driver::LaunchConfig;
use crate::error::{Result, VerifyError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:1420/";
pub const DEFAULT_ARTIFACTS_DIR: &str = "verification";

/// Fully owned harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct HarnessConfig {
	/// Address of the application under test.
	pub base_url: String,
	/// Directory screenshots and page dumps are written to.
	pub artifacts_dir: PathBuf,
	/// Whether the browser launches headless.
	pub headless: bool,
	/// Settle period after the first navigation of a scenario.
	pub initial_settle_ms: u64,
	/// Settle period after every DOM-touching action.
	pub settle_ms: u64,
	/// Write the page HTML next to the screenshot when an assertion fails.
	pub dump_html_on_failure: bool,
	/// Upper bound for a single navigation, driver default when unset.
	pub navigation_timeout_ms: Option<u64>,
}

impl Default for HarnessConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
			headless: true,
			initial_settle_ms: 3000,
			settle_ms: 500,
			dump_html_on_failure: true,
			navigation_timeout_ms: None,
		}
	}
}

impl HarnessConfig {
	/// Loads a JSON config file and validates it.
	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path)
			.map_err(|e| VerifyError::Config(format!("cannot read {}: {e}", path.display())))?;
		let config: HarnessConfig =
			serde_json::from_str(&raw).map_err(|e| VerifyError::Config(format!("{}: {e}", path.display())))?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects configurations that would only fail later inside a browser.
	pub fn validate(&self) -> Result<()> {
		let url = Url::parse(&self.base_url).map_err(|e| VerifyError::Config(format!("base URL {:?}: {e}", self.base_url)))?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(VerifyError::Config(format!("base URL must be http(s), got {}", url.scheme())));
		}
		if self.artifacts_dir.as_os_str().is_empty() {
			return Err(VerifyError::Config("artifacts directory must not be empty".into()));
		}
		Ok(())
	}

	/// Resolves an application route (e.g. `routes`) against the base URL.
	pub fn url_for(&self, route: &str) -> Result<String> {
		let mut base = Url::parse(&self.base_url).map_err(|e| VerifyError::Config(format!("base URL {:?}: {e}", self.base_url)))?;
		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());
			base.set_path(&path);
		}
		let joined = base
			.join(route.trim_start_matches('/'))
			.map_err(|e| VerifyError::Config(format!("route {route:?}: {e}")))?;
		Ok(joined.to_string())
	}

	pub fn settle(&self) -> Duration {
		Duration::from_millis(self.settle_ms)
	}

	pub fn initial_settle(&self) -> Duration {
		Duration::from_millis(self.initial_settle_ms)
	}

	pub fn launch_config(&self) -> LaunchConfig {
		LaunchConfig {
			headless: self.headless,
			navigation_timeout_ms: self.navigation_timeout_ms,
		}
	}
}
