//! Compression algorithms a tile (or a metadata document) can be stored with.

use anyhow::{Result, bail};
use enumset::EnumSetType;
use std::fmt::Display;

#[derive(Debug, EnumSetType, PartialOrd, Ord)]
pub enum TileCompression {
	Uncompressed,
	Gzip,
	Brotli,
}

impl TileCompression {
	pub fn as_str(&self) -> &'static str {
		match self {
			TileCompression::Uncompressed => "none",
			TileCompression::Gzip => "gzip",
			TileCompression::Brotli => "brotli",
		}
	}

	/// Token used in `content-encoding` headers. `None` means identity.
	pub fn as_content_encoding(&self) -> Option<&'static str> {
		match self {
			TileCompression::Uncompressed => None,
			TileCompression::Gzip => Some("gzip"),
			TileCompression::Brotli => Some("br"),
		}
	}

	pub fn parse_str(value: &str) -> Result<Self> {
		Ok(match value.to_lowercase().trim() {
			"br" | "brotli" => TileCompression::Brotli,
			"gz" | "gzip" => TileCompression::Gzip,
			"none" | "raw" | "identity" => TileCompression::Uncompressed,
			_ => bail!("Unknown tile compression '{value}'. Expected brotli, gzip or none"),
		})
	}
}

impl Display for TileCompression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
