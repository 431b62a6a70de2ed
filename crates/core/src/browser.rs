//! Playwright-backed implementation of the driver seam.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use playwright_rs::{Browser, GotoOptions, LaunchOptions, Page, Playwright};
use tracing::debug;

use crate::driver::{BrowserLauncher, LaunchConfig, PageDriver};
use crate::error::{Result, VerifyError};

const OUTER_HTML: &str = "document.documentElement.outerHTML";

/// Evaluated values may come back JSON-encoded; string results are unwrapped.
fn decode_evaluated(raw: String) -> String {
	serde_json::from_str::<String>(&raw).unwrap_or(raw)
}

/// Launches Chromium through a fresh Playwright driver for every session.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaywrightLauncher;

#[async_trait]
impl BrowserLauncher for PlaywrightLauncher {
	async fn launch(&self, config: &LaunchConfig) -> Result<Box<dyn PageDriver>> {
		debug!(target = "sbv", browser = "chromium", headless = config.headless, "starting Playwright...");

		let playwright = Playwright::launch().await.map_err(|e| VerifyError::BrowserLaunch(e.to_string()))?;
		let launch_options = LaunchOptions {
			headless: Some(config.headless),
			..Default::default()
		};
		let browser = playwright
			.chromium()
			.launch_with_options(launch_options)
			.await
			.map_err(|e| VerifyError::BrowserLaunch(e.to_string()))?;
		let page = browser.new_page().await.map_err(|e| VerifyError::BrowserLaunch(e.to_string()))?;

		Ok(Box::new(PlaywrightPage {
			_playwright: playwright,
			browser,
			page,
			navigation_timeout: config.navigation_timeout_ms.map(Duration::from_millis),
		}))
	}
}

/// One browser process with exactly one page.
pub struct PlaywrightPage {
	_playwright: Playwright,
	browser: Browser,
	page: Page,
	navigation_timeout: Option<Duration>,
}

/// Narrows a selector to its first match, the way page-level actions behave.
fn first_match(selector: &str) -> String {
	format!("{selector} >> nth=0")
}

#[async_trait]
impl PageDriver for PlaywrightPage {
	fn url(&self) -> String {
		self.page.url()
	}

	async fn goto(&self, url: &str) -> Result<()> {
		let options = GotoOptions {
			timeout: self.navigation_timeout,
			..Default::default()
		};
		self.page.goto(url, Some(options)).await.map(|_| ()).map_err(|e| VerifyError::Navigation {
			url: url.to_string(),
			message: e.to_string(),
		})
	}

	async fn count(&self, selector: &str) -> Result<usize> {
		let locator = self.page.locator(selector).await;
		Ok(locator.count().await?)
	}

	async fn is_visible(&self, selector: &str) -> Result<bool> {
		let locator = self.page.locator(&first_match(selector)).await;
		Ok(locator.is_visible().await?)
	}

	async fn click(&self, selector: &str) -> Result<()> {
		let locator = self.page.locator(&first_match(selector)).await;
		locator.click(None).await.map_err(|e| VerifyError::Interaction {
			action: "click",
			selector: selector.to_string(),
			message: e.to_string(),
		})
	}

	async fn fill(&self, selector: &str, text: &str) -> Result<()> {
		let locator = self.page.locator(&first_match(selector)).await;
		locator.fill(text, None).await.map_err(|e| VerifyError::Interaction {
			action: "fill",
			selector: selector.to_string(),
			message: e.to_string(),
		})
	}

	async fn content(&self) -> Result<String> {
		let raw = self.page.evaluate_value(OUTER_HTML).await?;
		Ok(decode_evaluated(raw))
	}

	async fn screenshot(&self, path: &Path) -> Result<()> {
		self.page.screenshot_to_file(path, None).await.map(|_| ()).map_err(|e| VerifyError::Screenshot {
			path: path.to_path_buf(),
			source: std::io::Error::other(e.to_string()),
		})
	}

	async fn close(&self) -> Result<()> {
		debug!(target = "sbv", url = %self.page.url(), "closing browser");
		self.browser.close().await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn evaluated_markup_is_unquoted() {
		assert_eq!(decode_evaluated(r#""<html><body>\"x\"</body></html>""#.to_string()), r#"<html><body>"x"</body></html>"#);
		assert_eq!(decode_evaluated("<html></html>".to_string()), "<html></html>");
	}

	#[test]
	fn first_match_appends_nth_zero() {
		assert_eq!(first_match("text=\"Create\""), "text=\"Create\" >> nth=0");
		assert_eq!(first_match(".w-64 .p-4.border-b button >> nth=1"), ".w-64 .p-4.border-b button >> nth=1 >> nth=0");
	}
}
