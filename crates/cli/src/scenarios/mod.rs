//! The SourceBridge verification scenarios and their registry.

mod app_shell;
mod diff;
mod repos;
mod routes;
mod sync;

use sbv::Scenario;

pub use app_shell::AppShell;
pub use diff::DiffPreview;
pub use repos::Repos;
pub use routes::Routes;
pub use sync::SyncTask;

use crate::error::{CliError, Result};

/// Every scenario in suite order. Later scenarios reuse what earlier ones create.
pub fn all() -> Vec<Box<dyn Scenario>> {
	vec![
		Box::new(AppShell),
		Box::new(Repos),
		Box::new(Routes),
		Box::new(DiffPreview),
		Box::new(SyncTask),
	]
}

pub fn find(name: &str) -> Option<Box<dyn Scenario>> {
	all().into_iter().find(|s| s.name() == name)
}

pub fn names() -> Vec<&'static str> {
	all().iter().map(|s| s.name()).collect()
}

/// Resolves command-line names to scenarios, keeping the order given.
pub fn select(names: &[String], everything: bool) -> Result<Vec<Box<dyn Scenario>>> {
	if everything {
		return Ok(all());
	}
	if names.is_empty() {
		return Err(CliError::NothingToRun);
	}
	names
		.iter()
		.map(|name| {
			find(name).ok_or_else(|| CliError::UnknownScenario {
				name: name.clone(),
				known: self::names().join(", "),
			})
		})
		.collect()
}
