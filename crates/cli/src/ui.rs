//! The SourceBridge UI contract: routes, labels, and the locator chains the
//! scenarios use to reach them.
//!
//! Labels are the English strings. Where a label depends on translations
//! being loaded, the chain falls back to the element's position in the
//! template.

use sbv::locator::quote;
use sbv::{Locator, LocatorSpec};

pub const TITLE_MARKER: &str = "SourceBridge";

pub mod route {
	pub const DASHBOARD: &str = "/";
	pub const REPOS: &str = "/repos";
	pub const ROUTES: &str = "/routes";
	pub const TASKS: &str = "/tasks";
}

/// Buttons in the sidebar header, in template order.
const SIDEBAR_HEADER_BUTTONS: &str = ".w-64 .p-4.border-b button";
const MAPPING_TOOLBAR_BUTTON: &str = ".flex.justify-between.mb-4 button";
const MAPPING_ROWS: &str = "tbody tr";

/// Exact text first, then a case-insensitive substring of it.
pub fn label(text: &str) -> Locator {
	Locator::text(text).or(LocatorSpec::Text {
		text: text.to_string(),
		exact: false,
	})
}

fn sidebar_button(title: &str, index: usize) -> Locator {
	Locator::titled_button(title).or(LocatorSpec::Structural {
		path: SIDEBAR_HEADER_BUTTONS.to_string(),
		index,
	})
}

pub fn title_marker() -> Locator {
	Locator::contains(TITLE_MARKER).with_label("TitleBar")
}

pub fn sidebar_header() -> Locator {
	Locator::css("sidebar header", ".w-64 .p-4.border-b")
}

pub fn new_group_button() -> Locator {
	sidebar_button("New Group", 0)
}

pub fn new_route_group_button() -> Locator {
	sidebar_button("New Route Group", 0)
}

pub fn add_route_button() -> Locator {
	sidebar_button("Add Route", 1)
}

pub fn create_button() -> Locator {
	label("Create")
}

pub fn save_button() -> Locator {
	label("Save")
}

pub fn close_button() -> Locator {
	label("Close")
}

pub fn mappings_tab() -> Locator {
	label("Mappings")
}

pub fn preview_diff_button() -> Locator {
	label("Preview Diff")
}

/// "+ Add Rule" in English; the toolbar button when the label is missing.
pub fn add_rule_button() -> Locator {
	Locator::css("button 'Add Rule'", "button:has-text('Add Rule')").or(LocatorSpec::Css(MAPPING_TOOLBAR_BUTTON.to_string()))
}

pub fn check_button() -> Locator {
	label("Check").or(LocatorSpec::Css("button:has-text('Check')".to_string()))
}

/// Input `column` of the first mapping row.
pub fn mapping_input(column: usize) -> Locator {
	Locator::css(
		format!("mapping row 1 input {}", column + 1),
		&format!("{MAPPING_ROWS} >> nth=0 >> input >> nth={column}"),
	)
}

pub fn group_name_input() -> Locator {
	Locator::placeholder("Repository Name")
}

pub fn route_name_input() -> Locator {
	Locator::placeholder("Route Name")
}

pub fn test_path_input() -> Locator {
	Locator::placeholder("Test Path (e.g. src/main.ts)")
}

pub fn task_name_input() -> Locator {
	Locator::placeholder("My Task")
}

pub fn route_id_input() -> Locator {
	Locator::placeholder("Route ID (Use Select in real app)")
}

pub fn new_task_button() -> Locator {
	label("+ New Task")
}

pub fn sync_route_step() -> Locator {
	label("Sync Route")
}

/// The innermost card that shows `task` and carries its action buttons.
pub fn task_card(task: &str) -> Locator {
	Locator::css(
		format!("task card '{task}'"),
		&format!("div:has-text({}):has(button[title=\"Logs\"]) >> nth=-1", quote(task)),
	)
}

pub fn logs_button(card: &Locator) -> Locator {
	Locator::titled_button("Logs").within(card)
}

pub fn run_now_button(card: &Locator) -> Locator {
	Locator::titled_button("Run Now").within(card)
}

pub fn log_console() -> Locator {
	Locator::contains("Execution Logs")
}

pub fn diff_modal() -> Locator {
	Locator::contains("Diff Preview:")
}

pub fn no_changes_indicator() -> Locator {
	Locator::contains("No changes detected")
}

pub fn changed_file_entry() -> Locator {
	Locator::css("changed file entry", ".file-change-item")
}

pub fn match_result() -> Locator {
	Locator::contains("Matches Rule")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sidebar_buttons_fall_back_to_template_position() {
		let selectors: Vec<_> = add_route_button().strategies().iter().map(LocatorSpec::selector).collect();
		assert_eq!(selectors, vec!["button[title=\"Add Route\"]", ".w-64 .p-4.border-b button >> nth=1"]);
	}

	#[test]
	fn labels_try_exact_before_substring() {
		let selectors: Vec<_> = create_button().strategies().iter().map(LocatorSpec::selector).collect();
		assert_eq!(selectors, vec!["text=\"Create\"", "text=Create"]);
	}

	#[test]
	fn card_buttons_are_scoped_to_the_card() {
		let card = task_card("Sync Task");
		assert_eq!(
			logs_button(&card).primary().selector(),
			"div:has-text(\"Sync Task\"):has(button[title=\"Logs\"]) >> nth=-1 >> nth=0 >> button[title=\"Logs\"]"
		);
	}

	#[test]
	fn task_names_are_escaped_in_card_selectors() {
		let card = task_card("Nightly \"main\"");
		assert_eq!(
			card.primary().selector(),
			"div:has-text(\"Nightly \\\"main\\\"\"):has(button[title=\"Logs\"]) >> nth=-1"
		);
	}

	#[test]
	fn mapping_inputs_index_the_first_row() {
		assert_eq!(mapping_input(1).primary().selector(), "tbody tr >> nth=0 >> input >> nth=1");
	}
}
