use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TileSourceConfig {
	/// Identifier used in the URL: tiles are served under `/tiles/{name}/...`.
	/// Defaults to the file name without extension (e.g. "osm" for "osm.versatiles").
	pub name: Option<String>,

	/// Path or http(s) URL of the container.
	pub src: String,

	/// The container stores tiles in TMS order (y axis flipped).
	#[serde(default)]
	pub flip_y: bool,
}

impl TileSourceConfig {
	pub fn new(name: Option<&str>, src: &str) -> TileSourceConfig {
		TileSourceConfig {
			name: name.map(str::to_owned),
			src: src.to_owned(),
			flip_y: false,
		}
	}

	pub fn is_url(&self) -> bool {
		self.src.starts_with("http://") || self.src.starts_with("https://")
	}

	/// The configured name, or the file stem of `src`.
	pub fn name(&self) -> Result<String> {
		if let Some(name) = &self.name {
			return Ok(name.clone());
		}
		let last = self.src.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
		let last = last.split(['?', '#']).next().unwrap_or_default();
		let stem = match last.split_once('.') {
			Some((stem, _)) => stem,
			None => last,
		};
		if stem.is_empty() {
			bail!("cannot derive a name from '{}'", self.src);
		}
		Ok(stem.to_owned())
	}

	/// Makes a relative file path relative to `base` instead of the working directory.
	pub fn resolve_paths(&mut self, base: &Path) {
		if self.is_url() || Path::new(&self.src).is_absolute() {
			return;
		}
		self.src = base.join(&self.src).to_string_lossy().into_owned();
	}
}
