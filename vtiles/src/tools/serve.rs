use anyhow::{Result, bail};
use regex::Regex;
use std::path::PathBuf;
use tokio::time::{Duration, sleep};
use vtiles::{Config, TileSourceConfig, server::TileServer};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true, verbatim_doc_comment)]
pub struct Subcommand {
	/// One or more VersaTiles containers you want to serve.
	/// Containers can be local files or http://... and https://... URLs.
	/// The name used in the url (/tiles/$name/) is generated from the file name:
	///    e.g. ".../ukraine.versatiles" will be served at url "/tiles/ukraine/..."
	/// You can also configure a different name for each container using:
	///    "[name]file", "file[name]" or "file#name"
	#[arg(num_args = 0.., verbatim_doc_comment)]
	pub tile_sources: Vec<String>,

	/// Path to a configuration file (YAML format) with server settings and tile sources.
	/// Command line arguments will override configuration file settings.
	#[arg(short = 'c', long, value_name = "FILE", display_order = 0)]
	pub config: Option<PathBuf>,

	/// Serve via socket ip. Default: 0.0.0.0
	#[arg(short = 'i', long, display_order = 0)]
	pub ip: Option<String>,

	/// Serve via port. Default: 8080
	#[arg(short, long, display_order = 0)]
	pub port: Option<u16>,

	/// Public base url used in info.json, e.g. "https://tiles.example.org"
	#[arg(short, long, display_order = 0)]
	pub base_url: Option<String>,

	/// Use minimal recompression to reduce server response time
	#[arg(short, long, display_order = 1)]
	pub fast: bool,

	/// The containers given on the command line store tiles in TMS order (flipped y axis)
	#[arg(short, long, display_order = 1)]
	pub tms: bool,

	/// Shutdown server automatically after x milliseconds.
	#[arg(long, display_order = 4)]
	pub auto_shutdown: Option<u64>,
}

const SOURCE_PATTERNS: [&str; 4] = [
	r"^\[(?P<name>[^\]]+?)\](?P<src>.*)$",
	r"^(?P<src>.*)\[(?P<name>[^\]]+?)\]$",
	r"^(?P<src>.*)#(?P<name>[^\]]+?)$",
	r"^(?P<src>.*)$",
];

/// Parses `path`, `[name]path`, `path[name]` or `path#name`.
fn parse_source_argument(argument: &str, flip_y: bool) -> Result<TileSourceConfig> {
	for pattern in SOURCE_PATTERNS {
		let Some(capture) = Regex::new(pattern)?.captures(argument) else {
			continue;
		};
		let Some(src) = capture.name("src") else {
			continue;
		};
		let mut tile_config = TileSourceConfig::new(capture.name("name").map(|m| m.as_str()), src.as_str());
		if tile_config.src.is_empty() {
			bail!("tile source argument '{argument}' has no path");
		}
		tile_config.flip_y = flip_y;
		return Ok(tile_config);
	}
	bail!("failed to parse tile source argument: {argument}")
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let mut config = if let Some(config_path) = &arguments.config {
		Config::from_path(config_path)?
	} else {
		Config::default()
	};

	config.server.override_optional_ip(&arguments.ip);
	config.server.override_optional_port(&arguments.port);
	config.server.override_optional_base_url(&arguments.base_url);
	config
		.server
		.override_optional_minimal_recompression(&arguments.fast.then_some(true));

	for argument in &arguments.tile_sources {
		config.tile_sources.push(parse_source_argument(argument, arguments.tms)?);
	}
	if config.tile_sources.is_empty() {
		bail!("no tile sources given, neither as arguments nor in a config file");
	}

	let mut server = TileServer::from_config(&config).await?;

	for (url, source) in server.get_url_mapping() {
		eprintln!("   {:30}  <-  {source}", url + "*");
	}

	server.start().await?;

	if let Some(milliseconds) = arguments.auto_shutdown {
		sleep(Duration::from_millis(milliseconds)).await;
	} else {
		tokio::signal::ctrl_c().await?;
	}

	server.stop().await;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::run_command;
	use assert_fs::{TempDir, prelude::*};
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use vtiles_container::{testing::ContainerBuilder, types::FormatVersion};

	#[rstest]
	#[case("berlin.versatiles", None, "berlin.versatiles")]
	#[case("[city]berlin.versatiles", Some("city"), "berlin.versatiles")]
	#[case("berlin.versatiles[city]", Some("city"), "berlin.versatiles")]
	#[case("berlin.versatiles#city", Some("city"), "berlin.versatiles")]
	#[case("[osm]https://example.org/planet.versatiles", Some("osm"), "https://example.org/planet.versatiles")]
	fn source_arguments(#[case] argument: &str, #[case] name: Option<&str>, #[case] src: &str) -> Result<()> {
		let tile_config = parse_source_argument(argument, true)?;
		assert_eq!(tile_config.name.as_deref(), name);
		assert_eq!(tile_config.src, src);
		assert!(tile_config.flip_y);
		Ok(())
	}

	#[test]
	fn empty_source_argument() {
		assert_eq!(
			parse_source_argument("[name]", false).unwrap_err().to_string(),
			"tile source argument '[name]' has no path"
		);
	}

	#[test]
	fn serve_local_file() -> Result<()> {
		let dir = TempDir::new()?;
		let file = dir.child("berlin.versatiles");
		file.write_binary(
			ContainerBuilder::new(FormatVersion::V02)
				.tile(0, 0, 0, "tile")
				.build()?
				.as_slice(),
		)?;

		run_command(vec![
			"vtiles",
			"serve",
			"-i",
			"127.0.0.1",
			"-p",
			"0",
			"--fast",
			"--auto-shutdown",
			"200",
			&format!("{}[test]", file.path().display()),
		])?;
		Ok(())
	}

	#[test]
	fn serve_without_sources() {
		let err = run_command(vec!["vtiles", "serve", "-p", "0", "--auto-shutdown", "10"]).unwrap_err();
		assert_eq!(
			err.to_string(),
			"no tile sources given, neither as arguments nor in a config file"
		);
	}

	#[test]
	fn serve_missing_file() {
		let err = run_command(vec!["vtiles", "serve", "-p", "0", "/does/not/exist.versatiles"]).unwrap_err();
		assert!(err.to_string().starts_with("opening tile source"));
	}
}
