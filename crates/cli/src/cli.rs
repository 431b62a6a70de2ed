use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};

/// Help colors in cargo's style.
fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
}

#[derive(Parser, Debug)]
#[command(name = "sbv")]
#[command(about = "SourceBridge verification - scripted UI checks against a running app")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// JSON configuration file
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Address of the app under test (overrides the config file)
	#[arg(long, global = true, value_name = "URL")]
	pub base_url: Option<String>,

	/// Where screenshots and page dumps are written (overrides the config file)
	#[arg(long, global = true, value_name = "DIR")]
	pub artifacts_dir: Option<PathBuf>,

	/// Show the browser window
	#[arg(long, global = true)]
	pub headed: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List available scenarios
	List,

	/// Run scenarios by name, or the whole suite
	Run {
		/// Scenario names, run in the order given
		names: Vec<String>,

		/// Run every scenario in suite order
		#[arg(long, conflicts_with = "names")]
		all: bool,

		/// Write every scenario report as JSON to FILE
		#[arg(long, value_name = "FILE")]
		report: Option<PathBuf>,
	},
}
