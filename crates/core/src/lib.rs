//! sbv: verification-flow engine for scripted end-to-end UI checks.
//!
//! A [`Scenario`] drives one browser page through navigate / locate / act /
//! assert steps. The [`ScenarioRunner`] owns the session for the duration of
//! the scenario and always turns it into a [`ScenarioReport`], whatever the
//! scenario body does.
//!
//! # Example
//!
//! ```ignore
//! use sbv::{
//!     Abort, HarnessConfig, Locator, OnFailure, PlaywrightLauncher, Scenario, ScenarioContext,
//!     ScenarioRunner, SessionManager,
//! };
//!
//! struct Smoke;
//!
//! #[async_trait::async_trait]
//! impl Scenario for Smoke {
//!     fn name(&self) -> &'static str { "smoke" }
//!     fn description(&self) -> &'static str { "dashboard renders" }
//!
//!     async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Result<(), Abort> {
//!         ctx.open("/", ctx.config().initial_settle()).await?;
//!         ctx.assert_visible(&Locator::contains("SourceBridge"), "TitleBar", OnFailure::Continue).await?;
//!         Ok(())
//!     }
//! }
//! ```

pub mod artifact;
pub mod assertion;
pub mod browser;
pub mod config;
pub mod driver;
pub mod error;
pub mod locator;
pub mod report;
pub mod scenario;
pub mod session;
pub mod step;
pub mod testing;

pub use artifact::{Artifact, ArtifactKind, ArtifactStore};
pub use assertion::{AssertionOutcome, AssertionRecorder, OnFailure};
pub use browser::PlaywrightLauncher;
pub use config::HarnessConfig;
pub use driver::{BrowserLauncher, LaunchConfig, PageDriver};
pub use error::{Result, VerifyError};
pub use locator::{Locator, LocatorSpec, Resolved, resolve};
pub use report::{Reporter, ScenarioReport, ScenarioStatus};
pub use scenario::{Abort, Precondition, Scenario, ScenarioContext, ScenarioRunner};
pub use session::{Session, SessionManager};
pub use step::{Action, FailureKind, StepExecutor, StepFailure, StepResult, wait_until};
