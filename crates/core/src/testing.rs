//! Test doubles for the driver seam and the reporter.
//!
//! [`FakePage`] models the page as a set of selector strings, each with a match
//! count and a visibility flag. Selectors are compared verbatim, so tests
//! insert exactly the strings the locator chain renders. Clicks can be scripted
//! to mutate the page, which is enough to play an application's dialogs
//! forward without a browser.
//!
//! # Example
//!
//! ```ignore
//! use sbv::testing::FakePage;
//!
//! let page = FakePage::new();
//! page.insert("text=\"Create\"");
//! page.on_click("text=\"Create\"", |dom| dom.insert("text=\"Sync Group\""));
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::artifact::Artifact;
use crate::assertion::AssertionOutcome;
use crate::driver::{BrowserLauncher, LaunchConfig, PageDriver};
use crate::error::{Result, VerifyError};
use crate::report::{Reporter, ScenarioReport};
use crate::step::StepFailure;

/// PNG signature written as the body of fake screenshots.
pub const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// One selector's state in the fake page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeElement {
	pub count: usize,
	pub visible: bool,
	/// Clicks and fills fail as if the node left the DOM mid-action.
	pub detached: bool,
}

/// Mutable page state handed to scripted reactions.
#[derive(Debug, Default)]
pub struct FakeDom {
	elements: HashMap<String, FakeElement>,
	values: HashMap<String, String>,
}

impl FakeDom {
	/// Adds a single visible match for `selector`.
	pub fn insert(&mut self, selector: &str) {
		self.set(
			selector,
			FakeElement {
				count: 1,
				visible: true,
				detached: false,
			},
		);
	}

	pub fn insert_hidden(&mut self, selector: &str) {
		self.set(
			selector,
			FakeElement {
				count: 1,
				visible: false,
				detached: false,
			},
		);
	}

	pub fn set(&mut self, selector: &str, element: FakeElement) {
		self.elements.insert(selector.to_string(), element);
	}

	pub fn remove(&mut self, selector: &str) {
		self.elements.remove(selector);
	}

	pub fn contains(&self, selector: &str) -> bool {
		self.elements.get(selector).is_some_and(|e| e.count > 0)
	}

	/// Last value filled into `selector`.
	pub fn value(&self, selector: &str) -> Option<&str> {
		self.values.get(selector).map(String::as_str)
	}
}

/// Action recorded by [`FakePage`] for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeAction {
	Goto { url: String },
	Click { selector: String },
	Fill { selector: String, text: String },
	Screenshot { path: PathBuf },
	Content,
	Close,
}

type Reaction = Arc<dyn Fn(&mut FakeDom) + Send + Sync>;

#[derive(Default)]
struct FakeInner {
	url: Mutex<String>,
	dom: Mutex<FakeDom>,
	click_reactions: Mutex<HashMap<String, Vec<Reaction>>>,
	goto_reactions: Mutex<Vec<(String, Reaction)>>,
	failing_urls: Mutex<Vec<String>>,
	failing_queries: Mutex<Vec<String>>,
	actions: Mutex<Vec<FakeAction>>,
	closes: AtomicUsize,
}

/// Scriptable in-memory page. Clones share state.
#[derive(Clone, Default)]
pub struct FakePage {
	inner: Arc<FakeInner>,
}

impl FakePage {
	pub fn new() -> Self {
		let page = Self::default();
		*page.inner.url.lock().unwrap() = "about:blank".to_string();
		page
	}

	pub fn insert(&self, selector: &str) {
		self.inner.dom.lock().unwrap().insert(selector);
	}

	pub fn insert_hidden(&self, selector: &str) {
		self.inner.dom.lock().unwrap().insert_hidden(selector);
	}

	pub fn set(&self, selector: &str, element: FakeElement) {
		self.inner.dom.lock().unwrap().set(selector, element);
	}

	pub fn remove(&self, selector: &str) {
		self.inner.dom.lock().unwrap().remove(selector);
	}

	/// Makes every count query for `selector` fail.
	pub fn fail_count(&self, selector: &str) {
		self.inner.failing_queries.lock().unwrap().push(selector.to_string());
	}

	/// Marks `selector` as present but detached for interactions.
	pub fn detach(&self, selector: &str) {
		self.set(
			selector,
			FakeElement {
				count: 1,
				visible: true,
				detached: true,
			},
		);
	}

	pub fn contains(&self, selector: &str) -> bool {
		self.inner.dom.lock().unwrap().contains(selector)
	}

	pub fn value(&self, selector: &str) -> Option<String> {
		self.inner.dom.lock().unwrap().value(selector).map(str::to_string)
	}

	/// Runs `reaction` after every successful click on `selector`.
	pub fn on_click(&self, selector: &str, reaction: impl Fn(&mut FakeDom) + Send + Sync + 'static) {
		self.inner
			.click_reactions
			.lock()
			.unwrap()
			.entry(selector.to_string())
			.or_default()
			.push(Arc::new(reaction));
	}

	/// Runs `reaction` after navigating to any URL ending with `suffix`.
	pub fn on_goto(&self, suffix: &str, reaction: impl Fn(&mut FakeDom) + Send + Sync + 'static) {
		self.inner.goto_reactions.lock().unwrap().push((suffix.to_string(), Arc::new(reaction)));
	}

	/// Makes navigation to any URL ending with `suffix` fail.
	pub fn fail_goto(&self, suffix: &str) {
		self.inner.failing_urls.lock().unwrap().push(suffix.to_string());
	}

	pub fn actions(&self) -> Vec<FakeAction> {
		self.inner.actions.lock().unwrap().clone()
	}

	pub fn clicks(&self) -> Vec<String> {
		self.actions()
			.into_iter()
			.filter_map(|a| match a {
				FakeAction::Click { selector } => Some(selector),
				_ => None,
			})
			.collect()
	}

	pub fn screenshots(&self) -> Vec<PathBuf> {
		self.actions()
			.into_iter()
			.filter_map(|a| match a {
				FakeAction::Screenshot { path } => Some(path),
				_ => None,
			})
			.collect()
	}

	/// How many times [`PageDriver::close`] has been called across all clones.
	pub fn close_count(&self) -> usize {
		self.inner.closes.load(Ordering::SeqCst)
	}

	fn record(&self, action: FakeAction) {
		self.inner.actions.lock().unwrap().push(action);
	}

	fn element(&self, selector: &str) -> Option<FakeElement> {
		self.inner.dom.lock().unwrap().elements.get(selector).copied()
	}

	fn interactable(&self, action: &'static str, selector: &str) -> Result<()> {
		match self.element(selector) {
			Some(element) if element.count > 0 && element.detached => Err(VerifyError::Interaction {
				action,
				selector: selector.to_string(),
				message: "Element is not attached to the DOM".into(),
			}),
			Some(element) if element.count > 0 => Ok(()),
			_ => Err(VerifyError::ElementNotFound {
				locator: selector.to_string(),
			}),
		}
	}
}

#[async_trait]
impl PageDriver for FakePage {
	fn url(&self) -> String {
		self.inner.url.lock().unwrap().clone()
	}

	async fn goto(&self, url: &str) -> Result<()> {
		self.record(FakeAction::Goto { url: url.to_string() });
		let failing = self.inner.failing_urls.lock().unwrap().iter().any(|s| url.ends_with(s.as_str()));
		if failing {
			return Err(VerifyError::Navigation {
				url: url.to_string(),
				message: "net::ERR_CONNECTION_REFUSED".into(),
			});
		}

		*self.inner.url.lock().unwrap() = url.to_string();
		let reactions: Vec<Reaction> = self
			.inner
			.goto_reactions
			.lock()
			.unwrap()
			.iter()
			.filter(|(suffix, _)| url.ends_with(suffix.as_str()))
			.map(|(_, r)| Arc::clone(r))
			.collect();
		let mut dom = self.inner.dom.lock().unwrap();
		for reaction in reactions {
			reaction(&mut *dom);
		}
		Ok(())
	}

	async fn count(&self, selector: &str) -> Result<usize> {
		if self.inner.failing_queries.lock().unwrap().iter().any(|s| s == selector) {
			return Err(VerifyError::Interaction {
				action: "count",
				selector: selector.to_string(),
				message: "unsupported selector".to_string(),
			});
		}
		Ok(self.element(selector).map_or(0, |e| e.count))
	}

	async fn is_visible(&self, selector: &str) -> Result<bool> {
		Ok(self.element(selector).is_some_and(|e| e.count > 0 && e.visible))
	}

	async fn click(&self, selector: &str) -> Result<()> {
		self.interactable("click", selector)?;
		self.record(FakeAction::Click {
			selector: selector.to_string(),
		});

		let reactions = self.inner.click_reactions.lock().unwrap().get(selector).cloned().unwrap_or_default();
		let mut dom = self.inner.dom.lock().unwrap();
		for reaction in reactions {
			reaction(&mut *dom);
		}
		Ok(())
	}

	async fn fill(&self, selector: &str, text: &str) -> Result<()> {
		self.interactable("fill", selector)?;
		self.record(FakeAction::Fill {
			selector: selector.to_string(),
			text: text.to_string(),
		});
		self.inner.dom.lock().unwrap().values.insert(selector.to_string(), text.to_string());
		Ok(())
	}

	async fn content(&self) -> Result<String> {
		self.record(FakeAction::Content);
		let dom = self.inner.dom.lock().unwrap();
		let mut selectors: Vec<_> = dom.elements.keys().cloned().collect();
		selectors.sort();
		let body: String = selectors.iter().map(|s| format!("<!-- {s} -->\n")).collect();
		Ok(format!("<html><body>\n{body}</body></html>"))
	}

	async fn screenshot(&self, path: &Path) -> Result<()> {
		std::fs::write(path, PNG_MAGIC).map_err(|source| VerifyError::Screenshot {
			path: path.to_path_buf(),
			source,
		})?;
		self.record(FakeAction::Screenshot { path: path.to_path_buf() });
		Ok(())
	}

	async fn close(&self) -> Result<()> {
		self.record(FakeAction::Close);
		self.inner.closes.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

/// Launcher handing out clones of one [`FakePage`].
///
/// Because clones share state, whatever one session leaves on the page is
/// still there for the next, like data persisted by a real application.
#[derive(Clone, Default)]
pub struct FakeLauncher {
	page: FakePage,
	launches: Arc<AtomicUsize>,
	fail: bool,
}

impl FakeLauncher {
	pub fn new(page: FakePage) -> Self {
		Self {
			page,
			launches: Arc::new(AtomicUsize::new(0)),
			fail: false,
		}
	}

	/// A launcher whose every launch fails.
	pub fn failing() -> Self {
		Self {
			fail: true,
			..Self::new(FakePage::new())
		}
	}

	pub fn page(&self) -> &FakePage {
		&self.page
	}

	pub fn launches(&self) -> usize {
		self.launches.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
	async fn launch(&self, _config: &LaunchConfig) -> Result<Box<dyn PageDriver>> {
		if self.fail {
			return Err(VerifyError::BrowserLaunch("chromium executable not found".into()));
		}
		self.launches.fetch_add(1, Ordering::SeqCst);
		Ok(Box::new(self.page.clone()))
	}
}

/// Reporter event captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
	Started { scenario: String },
	Note { scenario: String, message: String },
	StepFailed { scenario: String, failure: StepFailure },
	Assertion { scenario: String, outcome: AssertionOutcome },
	Artifact { scenario: String, artifact: Artifact },
	Finished { report: ScenarioReport },
}

/// Reporter that keeps every event in order.
#[derive(Default)]
pub struct RecordingReporter {
	events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<ReportEvent> {
		self.events.lock().unwrap().clone()
	}

	pub fn notes(&self) -> Vec<String> {
		self.events()
			.into_iter()
			.filter_map(|e| match e {
				ReportEvent::Note { message, .. } => Some(message),
				_ => None,
			})
			.collect()
	}

	fn push(&self, event: ReportEvent) {
		self.events.lock().unwrap().push(event);
	}
}

impl Reporter for RecordingReporter {
	fn scenario_started(&self, scenario: &str, _description: &str) {
		self.push(ReportEvent::Started {
			scenario: scenario.to_string(),
		});
	}

	fn note(&self, scenario: &str, message: &str) {
		self.push(ReportEvent::Note {
			scenario: scenario.to_string(),
			message: message.to_string(),
		});
	}

	fn step_failed(&self, scenario: &str, failure: &StepFailure) {
		self.push(ReportEvent::StepFailed {
			scenario: scenario.to_string(),
			failure: failure.clone(),
		});
	}

	fn assertion(&self, scenario: &str, outcome: &AssertionOutcome) {
		self.push(ReportEvent::Assertion {
			scenario: scenario.to_string(),
			outcome: outcome.clone(),
		});
	}

	fn artifact(&self, scenario: &str, artifact: &Artifact) {
		self.push(ReportEvent::Artifact {
			scenario: scenario.to_string(),
			artifact: artifact.clone(),
		});
	}

	fn scenario_finished(&self, report: &ScenarioReport) {
		self.push(ReportEvent::Finished { report: report.clone() });
	}
}
