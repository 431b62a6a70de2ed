use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter used when `RUST_LOG` is unset.
///
/// Status lines go to stdout, so the default keeps stderr to errors only.
fn default_filter(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "error",
		1 => "warn,sbv=info,sbv_cli=info",
		_ => "debug",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr.with_max_level(tracing::Level::DEBUG))
		.with_target(true)
		.compact()
		.init();
}
