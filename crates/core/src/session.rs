//! Browser session lifecycle.
//!
//! One [`Session`] is one browser process with one page. Sessions are never
//! pooled or reused: every scenario launches its own and closes it on every
//! exit path.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::driver::{BrowserLauncher, LaunchConfig, PageDriver};
use crate::error::Result;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// An acquired browser page that must be handed back through [`Session::release`].
pub struct Session {
	id: u64,
	page: Box<dyn PageDriver>,
	released: bool,
}

impl Session {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn page(&self) -> &dyn PageDriver {
		self.page.as_ref()
	}

	/// Closes the browser. Consuming `self` makes a second release impossible.
	pub async fn release(mut self) -> Result<()> {
		self.released = true;
		debug!(target = "sbv", session = self.id, "releasing session");
		self.page.close().await
	}
}

impl Drop for Session {
	fn drop(&mut self) {
		if !self.released {
			warn!(target = "sbv", session = self.id, url = %self.page.url(), "session dropped without release; browser may be left running");
		}
	}
}

/// Launches sessions with one fixed launch configuration.
#[derive(Clone)]
pub struct SessionManager {
	launcher: Arc<dyn BrowserLauncher>,
	launch: LaunchConfig,
}

impl SessionManager {
	pub fn new(launcher: Arc<dyn BrowserLauncher>, launch: LaunchConfig) -> Self {
		Self { launcher, launch }
	}

	pub fn launch_config(&self) -> &LaunchConfig {
		&self.launch
	}

	/// Launches a browser and opens its page.
	pub async fn acquire(&self) -> Result<Session> {
		let page = self.launcher.launch(&self.launch).await?;
		let id = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
		info!(target = "sbv", session = id, headless = self.launch.headless, "session acquired");
		Ok(Session {
			id,
			page,
			released: false,
		})
	}

	/// Runs `f` against a fresh session and releases it afterwards.
	///
	/// The session is released exactly once whether `f` returns or panics; a
	/// panic is resumed after the release.
	pub async fn with_session<T>(
		&self,
		f: impl for<'s> FnOnce(&'s Session) -> Pin<Box<dyn Future<Output = T> + Send + 's>>,
	) -> Result<T> {
		let session = self.acquire().await?;
		let outcome = AssertUnwindSafe(f(&session)).catch_unwind().await;
		let released = session.release().await;

		match outcome {
			Ok(value) => {
				released?;
				Ok(value)
			}
			Err(panic) => {
				if let Err(e) = released {
					warn!(target = "sbv", error = %e, "release after panic failed");
				}
				std::panic::resume_unwind(panic)
			}
		}
	}
}
