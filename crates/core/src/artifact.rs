//! Screenshot and page-dump persistence.
//!
//! Files are named `<scenario>_<NN>_<checkpoint>.<ext>` inside the artifacts
//! directory, `NN` counting checkpoints within one scenario run. Reruns
//! overwrite the previous run's files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::driver::PageDriver;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
	Screenshot,
	Html,
}

impl ArtifactKind {
	fn extension(self) -> &'static str {
		match self {
			ArtifactKind::Screenshot => "png",
			ArtifactKind::Html => "html",
		}
	}
}

/// A file written as evidence for a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
	pub kind: ArtifactKind,
	pub path: PathBuf,
	pub checkpoint: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size_bytes: Option<u64>,
}

/// Names and writes the artifacts of one scenario run.
#[derive(Debug)]
pub struct ArtifactStore {
	dir: PathBuf,
	scenario: String,
	next: u32,
}

impl ArtifactStore {
	pub fn new(dir: impl Into<PathBuf>, scenario: &str) -> Self {
		Self {
			dir: dir.into(),
			scenario: sanitize(scenario),
			next: 1,
		}
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Reserves the next checkpoint number.
	fn reserve(&mut self) -> u32 {
		let index = self.next;
		self.next += 1;
		index
	}

	fn path_for(&self, index: u32, checkpoint: &str, kind: ArtifactKind) -> PathBuf {
		self.dir
			.join(format!("{}_{index:02}_{}.{}", self.scenario, sanitize(checkpoint), kind.extension()))
	}

	/// Captures a full screenshot for `checkpoint`.
	pub async fn screenshot(&mut self, page: &dyn PageDriver, checkpoint: &str) -> Result<Artifact> {
		let index = self.reserve();
		self.write_screenshot(page, index, checkpoint).await
	}

	/// Writes the current page HTML for `checkpoint`.
	pub async fn dump_html(&mut self, page: &dyn PageDriver, checkpoint: &str) -> Result<Artifact> {
		let index = self.reserve();
		self.write_html(page, index, checkpoint).await
	}

	/// Captures a screenshot and optionally the page HTML under one number.
	///
	/// Collection failures are logged and skipped so the failure that caused
	/// the capture stays the one reported.
	pub async fn collect_failure(&mut self, page: &dyn PageDriver, checkpoint: &str, dump_html: bool) -> Vec<Artifact> {
		let index = self.reserve();
		let mut collected = Vec::new();

		match self.write_screenshot(page, index, checkpoint).await {
			Ok(artifact) => collected.push(artifact),
			Err(e) => warn!(target = "sbv", checkpoint, error = %e, "failed to capture failure screenshot"),
		}

		if dump_html {
			match self.write_html(page, index, checkpoint).await {
				Ok(artifact) => collected.push(artifact),
				Err(e) => warn!(target = "sbv", checkpoint, error = %e, "failed to dump page HTML"),
			}
		}

		debug!(target = "sbv", count = collected.len(), dir = %self.dir.display(), "collected failure artifacts");
		collected
	}

	async fn write_screenshot(&self, page: &dyn PageDriver, index: u32, checkpoint: &str) -> Result<Artifact> {
		std::fs::create_dir_all(&self.dir)?;
		let path = self.path_for(index, checkpoint, ArtifactKind::Screenshot);
		page.screenshot(&path).await?;
		let size_bytes = std::fs::metadata(&path).ok().map(|m| m.len());
		debug!(target = "sbv", path = %path.display(), "screenshot saved");
		Ok(Artifact {
			kind: ArtifactKind::Screenshot,
			path,
			checkpoint: checkpoint.to_string(),
			size_bytes,
		})
	}

	async fn write_html(&self, page: &dyn PageDriver, index: u32, checkpoint: &str) -> Result<Artifact> {
		std::fs::create_dir_all(&self.dir)?;
		let html = page.content().await?;
		let path = self.path_for(index, checkpoint, ArtifactKind::Html);
		std::fs::write(&path, &html)?;
		debug!(target = "sbv", path = %path.display(), "page HTML saved");
		Ok(Artifact {
			kind: ArtifactKind::Html,
			path,
			checkpoint: checkpoint.to_string(),
			size_bytes: Some(html.len() as u64),
		})
	}
}

/// Reduces a checkpoint name to `[a-z0-9_-]`, collapsing other runs to `_`.
fn sanitize(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	for c in name.trim().chars() {
		if c.is_ascii_alphanumeric() || c == '-' {
			out.push(c.to_ascii_lowercase());
		} else if !out.ends_with('_') {
			out.push('_');
		}
	}
	let trimmed = out.trim_matches('_');
	if trimmed.is_empty() { "checkpoint".to_string() } else { trimmed.to_string() }
}
