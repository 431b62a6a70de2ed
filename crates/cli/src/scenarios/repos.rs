use async_trait::async_trait;
use sbv::{Abort, OnFailure, Scenario, ScenarioContext};

use crate::ui;

pub const TEST_GROUP: &str = "Test Group";

/// Repository tree shows the "Test Group" group, creating it when absent.
pub struct Repos;

#[async_trait]
impl Scenario for Repos {
	fn name(&self) -> &'static str {
		"repos"
	}

	fn description(&self) -> &'static str {
		"repository tree holds the Test Group group"
	}

	async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Result<(), Abort> {
		ctx.start(ui::route::REPOS, ctx.config().initial_settle()).await?;

		let group = ui::label(TEST_GROUP);
		if ctx.precondition(TEST_GROUP, &group).await.is_missing() {
			ctx.click(&ui::new_group_button()).await?;
			ctx.fill(&ui::group_name_input(), TEST_GROUP).await?;
			ctx.click(&ui::create_button()).await?;
		}

		ctx.assert_visible(&group, "Test Group in tree", OnFailure::Continue).await?;
		ctx.screenshot("repos_tree").await;
		Ok(())
	}
}
