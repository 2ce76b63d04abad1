use anyhow::{Result, bail};
use vtiles_derive::context;

#[context("parsing level {level}")]
fn parse_level(level: u8) -> Result<u8> {
	if level > 30 {
		bail!("level too high");
	}
	Ok(level)
}

#[context("loading block {name}")]
async fn load_block(name: &str) -> Result<usize> {
	if name.is_empty() {
		bail!("empty name");
	}
	Ok(name.len())
}

#[test]
fn sync_function_keeps_ok_value() {
	assert_eq!(parse_level(12).unwrap(), 12);
}

#[test]
fn sync_function_adds_context() {
	let err = parse_level(31).unwrap_err();
	let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
	assert_eq!(chain, ["parsing level 31", "level too high"]);
}

#[tokio::test]
async fn async_function_adds_context() {
	assert_eq!(load_block("abc").await.unwrap(), 3);
	let err = load_block("").await.unwrap_err();
	assert_eq!(format!("{err:#}"), "loading block : empty name");
}
