use async_trait::async_trait;
use sbv::{Abort, OnFailure, Scenario, ScenarioContext};

use crate::ui;

pub const ROUTE_GROUP: &str = "Sync Group";
pub const ROUTE: &str = "Main Sync";
pub const MAPPING_SOURCE: &str = "src/*.ts";
pub const MAPPING_TARGET: &str = "dest/";
pub const TEST_PATH: &str = "src/test.ts";

/// Makes sure the "Sync Group" group and its "Main Sync" route exist.
///
/// Expects the routes view to be open.
pub(crate) async fn ensure_route(ctx: &mut ScenarioContext<'_>) -> Result<(), Abort> {
	if ctx.precondition(ROUTE, &ui::label(ROUTE)).await.is_missing() {
		if ctx.precondition(ROUTE_GROUP, &ui::label(ROUTE_GROUP)).await.is_missing() {
			ctx.click(&ui::new_route_group_button()).await?;
			ctx.fill(&ui::route_name_input(), ROUTE_GROUP).await?;
			ctx.click(&ui::create_button()).await?;
		}

		ctx.click(&ui::add_route_button()).await?;
		ctx.fill(&ui::route_name_input(), ROUTE).await?;
		ctx.click(&ui::create_button()).await?;
	}
	Ok(())
}

/// Route editor: create a route, add a mapping rule, test a path against it.
pub struct Routes;

#[async_trait]
impl Scenario for Routes {
	fn name(&self) -> &'static str {
		"routes"
	}

	fn description(&self) -> &'static str {
		"create the Main Sync route and match src/test.ts against a src/*.ts rule"
	}

	async fn run(&self, ctx: &mut ScenarioContext<'_>) -> Result<(), Abort> {
		ctx.start(ui::route::ROUTES, ctx.config().initial_settle()).await?;

		let header_timeout = ctx.config().initial_settle();
		if ctx.wait_for_any(&[ui::sidebar_header()], header_timeout).await.is_none() {
			ctx.note("sidebar header not rendered yet");
		}

		ensure_route(ctx).await?;

		let route = ui::label(ROUTE);
		ctx.assert_visible(&route, "Main Sync in tree", OnFailure::Abort).await?;
		ctx.click(&route).await?;
		ctx.click(&ui::mappings_tab()).await?;

		ctx.click(&ui::add_rule_button()).await?;
		ctx.fill(&ui::mapping_input(0), MAPPING_SOURCE).await?;
		ctx.fill(&ui::mapping_input(1), MAPPING_TARGET).await?;
		ctx.click(&ui::save_button()).await?;

		ctx.fill(&ui::test_path_input(), TEST_PATH).await?;
		ctx.click(&ui::check_button()).await?;
		ctx.assert_visible(&ui::match_result(), "Test path matches rule", OnFailure::Continue)
			.await?;

		ctx.screenshot("routes_verified").await;
		Ok(())
	}
}
