use anyhow::Result;
use vtiles_container::{ReaderOptions, VersaTilesReader, types::Metadata};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// VersaTiles container you want to probe
	/// can be a local file or an http://... or https://... URL
	#[arg(required = true, verbatim_doc_comment)]
	source: String,

	/// deep scan: reads every tile index and summarizes each zoom level
	#[arg(long, short)]
	deep: bool,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.source);
	println!("{}", probe(arguments).await?);
	Ok(())
}

async fn probe(arguments: &Subcommand) -> Result<String> {
	let reader = VersaTilesReader::open(&arguments.source, ReaderOptions::default()).await?;
	let mut text = reader.probe(arguments.deep).await?;

	match reader.get_metadata().await {
		Ok(Metadata::Json(value)) => text.push_str(&format!("metadata: {value}\n")),
		Ok(Metadata::Absent) => text.push_str("metadata: none\n"),
		Err(err) => {
			log::warn!("{err:?}");
			text.push_str(&format!("metadata: unreadable ({err})\n"));
		}
	}
	Ok(text)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::run_command;
	use assert_fs::{NamedTempFile, prelude::*};
	use vtiles_container::{testing::ContainerBuilder, types::FormatVersion};
	use vtiles_core::assert_wildcard;

	fn container_file(builder: &ContainerBuilder) -> Result<NamedTempFile> {
		let file = NamedTempFile::new("berlin.versatiles")?;
		file.write_binary(builder.build()?.as_slice())?;
		Ok(file)
	}

	#[tokio::test]
	async fn probe_summary() -> Result<()> {
		let file = container_file(
			&ContainerBuilder::new(FormatVersion::V01)
				.metadata(r#"{"name":"berlin"}"#)
				.tile(2, 1, 1, "a")
				.tile(2, 1, 2, "b"),
		)?;
		let arguments = Subcommand {
			source: file.path().to_string_lossy().into_owned(),
			deep: true,
		};
		let text = probe(&arguments).await?;
		assert!(text.contains("format: versatiles_v01\n"));
		assert!(text.contains("zoom range: 2-2\n"));
		assert!(text.contains("  level 2: 1 blocks, 2 tiles, "));
		assert!(text.ends_with("metadata: {\"name\":\"berlin\"}\n"));
		Ok(())
	}

	#[tokio::test]
	async fn probe_with_broken_metadata() -> Result<()> {
		let file = container_file(&ContainerBuilder::new(FormatVersion::V02).metadata("{broken").tile(0, 0, 0, "a"))?;
		let arguments = Subcommand {
			source: file.path().to_string_lossy().into_owned(),
			deep: false,
		};
		let text = probe(&arguments).await?;
		assert!(!text.contains("blocks:"));
		assert_wildcard!(text.lines().last().unwrap_or_default(), "metadata: unreadable (*)");
		Ok(())
	}

	#[test]
	fn probe_command() -> Result<()> {
		let file = container_file(&ContainerBuilder::new(FormatVersion::Legacy).tile(0, 0, 0, "a"))?;
		run_command(vec!["vtiles", "probe", "-d", &file.path().to_string_lossy()])?;
		Ok(())
	}

	#[test]
	fn probe_missing_file() {
		let err = run_command(vec!["vtiles", "probe", "/does/not/exist.versatiles"]).unwrap_err();
		assert_wildcard!(err, "opening container '/does/not/exist.versatiles'");
	}
}
