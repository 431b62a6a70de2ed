//! Browser driver seam.
//!
//! The engine only ever talks to a page through [`PageDriver`], and only ever
//! obtains one through [`BrowserLauncher`]. Selectors passed across this seam
//! are Playwright selector strings (`text="..."`, CSS, `>> nth=N` chains);
//! see [`crate::locator`] for how they are built.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Options applied when launching a browser for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
	pub headless: bool,
	pub navigation_timeout_ms: Option<u64>,
}

impl Default for LaunchConfig {
	fn default() -> Self {
		Self {
			headless: true,
			navigation_timeout_ms: None,
		}
	}
}

/// The subset of page operations the verification flow needs.
///
/// Element operations act on the first match of `selector`.
#[async_trait]
pub trait PageDriver: Send + Sync {
	/// Returns the current URL of the page.
	fn url(&self) -> String;

	/// Navigates the page to `url`.
	async fn goto(&self, url: &str) -> Result<()>;

	/// Returns the number of elements matching `selector`.
	async fn count(&self, selector: &str) -> Result<usize>;

	/// Returns whether the first element matching `selector` is visible.
	async fn is_visible(&self, selector: &str) -> Result<bool>;

	/// Clicks the first element matching `selector`.
	async fn click(&self, selector: &str) -> Result<()>;

	/// Replaces the value of the first input matching `selector` with `text`.
	async fn fill(&self, selector: &str, text: &str) -> Result<()>;

	/// Returns the full page HTML.
	async fn content(&self) -> Result<String>;

	/// Writes a PNG screenshot of the viewport to `path`.
	async fn screenshot(&self, path: &Path) -> Result<()>;

	/// Closes the page and the browser process behind it.
	async fn close(&self) -> Result<()>;
}

/// Produces a fresh browser + page for each session.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
	async fn launch(&self, config: &LaunchConfig) -> Result<Box<dyn PageDriver>>;
}
