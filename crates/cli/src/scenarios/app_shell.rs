use std::time::Duration;

use async_trait::async_trait;
use sbv::{Abort, OnFailure, Scenario, ScenarioContext};

use crate::ui;

/// The shell needs less time to render than the data views.
const SHELL_SETTLE: Duration = Duration::from_millis(2000);

/// Dashboard loads and shows the title bar.
pub struct AppShell;

#[async_trait]
impl Scenario for AppShell {
	fn name(&self) -> &'static str {
		"app-shell"
	}

	fn description(&self) -> &'static str {
		"dashboard renders with the SourceBridge title bar"
	}

	async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Result<(), Abort> {
		let settle = ctx.config().initial_settle().min(SHELL_SETTLE);
		ctx.start(ui::route::DASHBOARD, settle).await?;

		ctx.assert_visible(&ui::title_marker(), "TitleBar", OnFailure::Continue).await?;

		ctx.screenshot("dashboard").await;
		Ok(())
	}
}
