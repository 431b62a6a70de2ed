use clap::Parser;
use sbv_cli::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	// Scenario failures are reported, not returned; only harness errors reach here.
	commands::dispatch(cli).await.map_err(|err| {
		let code = err.code();
		anyhow::Error::new(err).context(format!("sbv failed [{code}]"))
	})
}
