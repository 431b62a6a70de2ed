use async_trait::async_trait;
use sbv::{Abort, OnFailure, Scenario, ScenarioContext};

use crate::ui;

pub const SYNC_TASK: &str = "Sync Task";
pub const ROUTE_ID: &str = "route-123";

/// Sync task: log console opens, the task runs, logs reopen afterwards.
pub struct SyncTask;

#[async_trait]
impl Scenario for SyncTask {
	fn name(&self) -> &'static str {
		"sync"
	}

	fn description(&self) -> &'static str {
		"run the Sync Task and inspect its execution logs"
	}

	async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Result<(), Abort> {
		ctx.start(ui::route::TASKS, ctx.config().initial_settle()).await?;

		if ctx.precondition(SYNC_TASK, &ui::label(SYNC_TASK)).await.is_missing() {
			ctx.click(&ui::new_task_button()).await?;
			ctx.fill(&ui::task_name_input(), SYNC_TASK).await?;
			ctx.click(&ui::sync_route_step()).await?;
			ctx.fill(&ui::route_id_input(), ROUTE_ID).await?;
			ctx.click(&ui::save_button()).await?;
		}

		let card = ui::task_card(SYNC_TASK);
		ctx.click(&ui::logs_button(&card)).await?;
		ctx.assert_visible(&ui::log_console(), "Log console open", OnFailure::Continue)
			.await?;
		ctx.screenshot("sync_logs").await;
		ctx.click(&ui::close_button()).await?;

		ctx.click(&ui::run_now_button(&card)).await?;
		ctx.note(format!("running {SYNC_TASK}"));
		let run_time = ctx.config().settle() * 4;
		ctx.settle(run_time).await;

		ctx.click(&ui::logs_button(&card)).await?;
		ctx.screenshot("sync_logs_after").await;
		Ok(())
	}
}
