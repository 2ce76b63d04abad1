use super::{ServerConfig, TileSourceConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};
use vtiles_derive::context;

/// Everything the server needs at startup.
///
/// ```yaml
/// server:
///   ip: 127.0.0.1
///   port: 8080
///   base_url: https://tiles.example.org
///   minimal_recompression: false
/// tiles:
///   - name: osm
///     src: https://download.versatiles.org/osm.versatiles
///   - src: ./berlin.versatiles
///     flip_y: true
/// ```
#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	#[serde(default)]
	pub server: ServerConfig,

	#[serde(default, rename = "tiles")]
	pub tile_sources: Vec<TileSourceConfig>,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Parses a YAML file. Relative tile source paths are resolved against its directory.
	#[context("reading config file {path:?}")]
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path)?;
		let mut config = Config::from_reader(BufReader::new(file))?;

		let base = path.parent().context("config file has no parent directory")?;
		for tile_source in &mut config.tile_sources {
			tile_source.resolve_paths(base);
		}
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{NamedTempFile, prelude::*};
	use pretty_assertions::assert_eq;

	#[test]
	fn parse_full_config() {
		let config = Config::from_string(
			"server:\n  ip: 127.0.0.1\n  port: 51234\n  base_url: https://tiles.example.org\n  minimal_recompression: true\ntiles:\n  - name: osm\n    src: https://download.versatiles.org/osm.versatiles\n  - src: berlin.versatiles\n    flip_y: true\n",
		)
		.unwrap();

		assert_eq!(
			config,
			Config {
				server: ServerConfig {
					ip: Some("127.0.0.1".into()),
					port: Some(51234),
					base_url: Some("https://tiles.example.org".into()),
					minimal_recompression: Some(true),
				},
				tile_sources: vec![
					TileSourceConfig::new(Some("osm"), "https://download.versatiles.org/osm.versatiles"),
					TileSourceConfig {
						name: None,
						src: "berlin.versatiles".into(),
						flip_y: true,
					},
				],
			}
		);
	}

	#[test]
	fn parse_empty_config() {
		assert_eq!(Config::from_string("").unwrap(), Config::default());
	}

	#[test]
	fn unknown_fields_are_rejected() {
		let err = Config::from_string("server:\n  pi: 3.14\n").unwrap_err();
		assert!(err.to_string().contains("unknown field `pi`"));

		assert!(Config::from_string("tiles:\n  - src: a.versatiles\n    swap_xy: true\n").is_err());
	}

	#[test]
	fn from_path_resolves_relative_sources() -> Result<()> {
		let file = NamedTempFile::new("server.yml")?;
		file.write_str("tiles:\n  - src: berlin.versatiles\n")?;

		let config = Config::from_path(file.path())?;
		let expected = file.path().parent().unwrap().join("berlin.versatiles");
		assert_eq!(config.tile_sources[0].src, expected.to_string_lossy());
		Ok(())
	}

	#[test]
	fn missing_file() {
		let err = Config::from_path(Path::new("/does/not/exist.yml")).unwrap_err();
		assert!(err.to_string().starts_with("reading config file"));
	}
}
