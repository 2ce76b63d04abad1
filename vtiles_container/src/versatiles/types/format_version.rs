//! The format families a container header can announce, and what differs between them.
//!
//! | family | magic            | bbox encoding       | block record | tile format table      |
//! |--------|------------------|---------------------|--------------|------------------------|
//! | legacy | `versatiles_c01` | IEEE754 f32         | 29 bytes     | png, jpeg, webp, pbf=16|
//! | v01    | `versatiles_v01` | IEEE754 f32         | 29 bytes     | png, jpeg, webp, pbf   |
//! | v02    | `versatiles_v02` | i32 scaled by 1e7   | 33 bytes     | grouped by type        |

use crate::ContainerError;
use anyhow::Result;
use vtiles_core::TileFormat;

/// Length of the magic string at the start of every container.
pub const MAGIC_LENGTH: usize = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatVersion {
	Legacy,
	V01,
	V02,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BBoxEncoding {
	Float32,
	ScaledInt32,
}

impl FormatVersion {
	pub fn from_magic(magic: &[u8]) -> Result<FormatVersion> {
		Ok(match magic {
			b"versatiles_v02" => FormatVersion::V02,
			b"versatiles_v01" => FormatVersion::V01,
			b"versatiles_c01" => FormatVersion::Legacy,
			_ => {
				return Err(ContainerError::InvalidContainer(format!(
					"unknown magic '{}'",
					String::from_utf8_lossy(magic).escape_debug()
				))
				.into());
			}
		})
	}

	pub fn magic(&self) -> &'static str {
		match self {
			FormatVersion::Legacy => "versatiles_c01",
			FormatVersion::V01 => "versatiles_v01",
			FormatVersion::V02 => "versatiles_v02",
		}
	}

	pub fn bbox_encoding(&self) -> BBoxEncoding {
		match self {
			FormatVersion::Legacy | FormatVersion::V01 => BBoxEncoding::Float32,
			FormatVersion::V02 => BBoxEncoding::ScaledInt32,
		}
	}

	/// Size of one record in the decompressed block index.
	pub fn block_record_length(&self) -> usize {
		match self {
			FormatVersion::Legacy | FormatVersion::V01 => 29,
			FormatVersion::V02 => 33,
		}
	}

	/// Looks up the stored tile format code. Unknown codes resolve to `bin`.
	pub fn tile_format(&self, code: u8) -> TileFormat {
		let format = self.lookup_tile_format(code);
		if format.is_none() {
			log::warn!("unknown tile format code {code} in {} container, treating tiles as bin", self.magic());
		}
		format.unwrap_or(TileFormat::BIN)
	}

	fn lookup_tile_format(&self, code: u8) -> Option<TileFormat> {
		use TileFormat::*;
		match self {
			FormatVersion::Legacy => match code {
				0 => Some(PNG),
				1 => Some(JPG),
				2 => Some(WEBP),
				16 => Some(MVT),
				_ => None,
			},
			FormatVersion::V01 => match code {
				0 => Some(PNG),
				1 => Some(JPG),
				2 => Some(WEBP),
				3 => Some(MVT),
				_ => None,
			},
			FormatVersion::V02 => match code {
				0x00 => Some(BIN),
				0x10 => Some(PNG),
				0x11 => Some(JPG),
				0x12 => Some(WEBP),
				0x13 => Some(AVIF),
				0x14 => Some(SVG),
				0x20 => Some(MVT),
				0x21 => Some(GEOJSON),
				0x22 => Some(TOPOJSON),
				0x23 => Some(JSON),
				_ => None,
			},
		}
	}

	/// Reverse of [`FormatVersion::tile_format`], `None` if this family cannot store the format.
	pub fn tile_format_code(&self, format: TileFormat) -> Option<u8> {
		(0..=u8::MAX).find(|code| self.lookup_tile_format(*code) == Some(format))
	}
}
