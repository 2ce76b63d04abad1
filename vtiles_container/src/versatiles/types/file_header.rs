//! The fixed 66-byte header at the start of every container.
//!
//! ```text
//!  0..14  magic              14 bytes ASCII
//! 14      tile format        u8, family specific table
//! 15      tile compression   u8, 0 = none, 1 = gzip, 2 = brotli
//! 16      zoom min           u8
//! 17      zoom max           u8
//! 18..34  bbox               4 × f32 (c01, v01) or 4 × i32 / 1e7 (v02)
//! 34..50  metadata range     u64 offset, u64 length
//! 50..66  block index range  u64 offset, u64 length
//! ```

use super::{BBoxEncoding, FormatVersion, MAGIC_LENGTH};
use crate::ContainerError;
use anyhow::{Result, ensure};
use vtiles_core::{Blob, ByteRange, GeoBBox, TileCompression, TileFormat, io::ValueReaderSlice};
use vtiles_derive::context;

pub const HEADER_LENGTH: u64 = 66;

#[derive(Clone, Debug, PartialEq)]
pub struct FileHeader {
	pub version: FormatVersion,
	pub tile_format: TileFormat,
	pub compression: TileCompression,
	pub zoom_range: [u8; 2],
	pub bbox: GeoBBox,
	pub meta_range: ByteRange,
	pub blocks_range: ByteRange,
}

impl FileHeader {
	#[context("parsing container header")]
	pub fn from_blob(blob: &Blob) -> Result<FileHeader> {
		ensure!(
			blob.len() == HEADER_LENGTH,
			ContainerError::InvalidContainer(format!(
				"header must be {HEADER_LENGTH} bytes, got {}",
				blob.len()
			))
		);

		let mut reader = ValueReaderSlice::new_be(blob.as_slice());
		let mut magic = [0u8; MAGIC_LENGTH];
		for byte in &mut magic {
			*byte = reader.read_u8()?;
		}
		let version = FormatVersion::from_magic(&magic)?;

		let tile_format = version.tile_format(reader.read_u8()?);
		let compression = match reader.read_u8()? {
			0 => TileCompression::Uncompressed,
			1 => TileCompression::Gzip,
			2 => TileCompression::Brotli,
			code => {
				return Err(ContainerError::InvalidContainer(format!("unknown tile compression code {code}")).into());
			}
		};
		let zoom_range = [reader.read_u8()?, reader.read_u8()?];

		let mut bbox = [0f64; 4];
		for value in &mut bbox {
			*value = match version.bbox_encoding() {
				BBoxEncoding::Float32 => f64::from(reader.read_f32()?),
				BBoxEncoding::ScaledInt32 => f64::from(reader.read_i32()?) / 1e7,
			};
		}

		let meta_range = reader.read_range()?;
		let blocks_range = reader.read_range()?;

		Ok(FileHeader {
			version,
			tile_format,
			compression,
			zoom_range,
			bbox: GeoBBox::new(bbox[0], bbox[1], bbox[2], bbox[3]),
			meta_range,
			blocks_range,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn header_bytes(magic: &str, bbox: &[u8; 16]) -> Blob {
		let mut bytes = magic.as_bytes().to_vec();
		bytes.extend_from_slice(&[0x20, 2, 3, 14]);
		bytes.extend_from_slice(bbox);
		bytes.extend_from_slice(&66u64.to_be_bytes());
		bytes.extend_from_slice(&1234u64.to_be_bytes());
		bytes.extend_from_slice(&0x0001_0000_0000u64.to_be_bytes());
		bytes.extend_from_slice(&u64::MAX.to_be_bytes());
		Blob::from(bytes)
	}

	#[test]
	fn v02_header() -> Result<()> {
		let mut bbox = Vec::new();
		for value in [-1_800_000_000i32, -850_511_287, 1_800_000_000, 850_511_287] {
			bbox.extend_from_slice(&value.to_be_bytes());
		}
		let blob = header_bytes("versatiles_v02", bbox.as_slice().try_into()?);

		assert_eq!(
			FileHeader::from_blob(&blob)?,
			FileHeader {
				version: FormatVersion::V02,
				tile_format: TileFormat::MVT,
				compression: TileCompression::Brotli,
				zoom_range: [3, 14],
				bbox: GeoBBox::new(-180.0, -85.051_128_7, 180.0, 85.051_128_7),
				meta_range: ByteRange::new(66, 1234),
				blocks_range: ByteRange::new(0x0001_0000_0000, u64::MAX),
			}
		);
		Ok(())
	}

	#[test]
	fn v01_header_uses_floats() -> Result<()> {
		let mut bbox = Vec::new();
		for value in [13.0f32, 52.25, 13.75, 52.5] {
			bbox.extend_from_slice(&value.to_be_bytes());
		}
		let blob = header_bytes("versatiles_v01", bbox.as_slice().try_into()?);
		let header = FileHeader::from_blob(&blob)?;

		assert_eq!(header.version, FormatVersion::V01);
		assert_eq!(header.tile_format, TileFormat::BIN);
		assert_eq!(header.bbox, GeoBBox::new(13.0, 52.25, 13.75, 52.5));
		assert_eq!(header.zoom_range, [3, 14]);
		assert_eq!(header.meta_range, ByteRange::new(66, 1234));
		Ok(())
	}

	#[test]
	fn corrupt_magic() {
		let blob = header_bytes("xversatiles_v01", &[0; 16]);
		let blob = Blob::from(&blob.as_slice()[..66]);
		let err = FileHeader::from_blob(&blob).unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ContainerError>(),
			Some(ContainerError::InvalidContainer(_))
		));
	}

	#[test]
	fn unknown_compression() {
		let mut bytes = header_bytes("versatiles_v02", &[0; 16]).into_vec();
		bytes[15] = 3;
		let err = FileHeader::from_blob(&Blob::from(bytes)).unwrap_err();
		assert_eq!(
			format!("{err:#}"),
			"parsing container header: invalid container: unknown tile compression code 3"
		);
	}

	#[test]
	fn wrong_length() {
		let err = FileHeader::from_blob(&Blob::from("versatiles_v02")).unwrap_err();
		assert_eq!(
			err.downcast_ref::<ContainerError>(),
			Some(&ContainerError::InvalidContainer("header must be 66 bytes, got 14".into()))
		);
	}
}
