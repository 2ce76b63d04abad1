//! One entry of the block index: a 256×256 tile region at one zoom level.
//!
//! Record layout after the common 13-byte prefix
//! (`level u8, column u32, row u32, col_min u8, row_min u8, col_max u8, row_max u8`):
//!
//! - c01, v01 (29 bytes): `tile_index_offset u64` (absolute), `tile_index_length u64`.
//!   Tile offsets are absolute, so the block offset is 0.
//! - v02 (33 bytes): `block_offset u64`, `tiles_length u64`, `tile_index_length u32`.
//!   The tile index directly follows the tiles, at `block_offset + tiles_length`.

use super::{FormatVersion, TileIndex};
use crate::ContainerError;
use anyhow::{Result, ensure};
use std::fmt;
use vtiles_core::{ByteRange, TileCoord, cache::MemoCell, io::ValueReaderSlice};

pub struct BlockDefinition {
	pub level: u8,
	pub column: u32,
	pub row: u32,
	pub col_min: u8,
	pub row_min: u8,
	pub col_max: u8,
	pub row_max: u8,
	/// Base offset added to every tile offset in the tile index.
	pub block_offset: u64,
	pub index_range: ByteRange,
	tile_index: MemoCell<TileIndex>,
}

impl BlockDefinition {
	pub fn new(
		coord: TileCoord,
		[col_min, row_min, col_max, row_max]: [u8; 4],
		block_offset: u64,
		index_range: ByteRange,
	) -> Result<BlockDefinition> {
		ensure!(
			col_min <= col_max && row_min <= row_max,
			ContainerError::CorruptBlockIndex(format!(
				"block {coord:?} has an empty tile rectangle [{col_min},{row_min},{col_max},{row_max}]"
			))
		);
		Ok(BlockDefinition {
			level: coord.level,
			column: coord.x,
			row: coord.y,
			col_min,
			row_min,
			col_max,
			row_max,
			block_offset,
			index_range,
			tile_index: MemoCell::new(),
		})
	}

	/// Parses one block index record of the given family.
	pub fn from_record(version: FormatVersion, record: &[u8]) -> Result<BlockDefinition> {
		ensure!(
			record.len() == version.block_record_length(),
			ContainerError::CorruptBlockIndex(format!(
				"block record must be {} bytes, got {}",
				version.block_record_length(),
				record.len()
			))
		);

		let mut reader = ValueReaderSlice::new_be(record);
		let coord = TileCoord {
			level: reader.read_u8()?,
			x: reader.read_u32()?,
			y: reader.read_u32()?,
		};
		let rect = [reader.read_u8()?, reader.read_u8()?, reader.read_u8()?, reader.read_u8()?];

		let (block_offset, index_range) = match version {
			FormatVersion::Legacy | FormatVersion::V01 => (0, reader.read_range()?),
			FormatVersion::V02 => {
				let block_offset = reader.read_u64()?;
				let tiles_length = reader.read_u64()?;
				let index_length = u64::from(reader.read_u32()?);
				let index_offset = block_offset.checked_add(tiles_length).ok_or_else(|| {
					ContainerError::CorruptBlockIndex(format!(
						"tile index offset overflows: block offset {block_offset} + tiles length {tiles_length}"
					))
				})?;
				(block_offset, ByteRange::new(index_offset, index_length))
			}
		};

		BlockDefinition::new(coord, rect, block_offset, index_range)
	}

	/// Block coordinate: zoom level plus tile coordinate `>> 8`.
	pub fn coord(&self) -> TileCoord {
		TileCoord {
			level: self.level,
			x: self.column,
			y: self.row,
		}
	}

	pub fn width(&self) -> u64 {
		u64::from(self.col_max - self.col_min) + 1
	}

	pub fn height(&self) -> u64 {
		u64::from(self.row_max - self.row_min) + 1
	}

	pub fn tile_count(&self) -> u64 {
		self.width() * self.height()
	}

	/// Row-major slot of a local tile coordinate, `None` outside the present rectangle.
	pub fn slot_of(&self, tx: u8, ty: u8) -> Option<usize> {
		if tx < self.col_min || tx > self.col_max || ty < self.row_min || ty > self.row_max {
			return None;
		}
		let slot = u64::from(ty - self.row_min) * self.width() + u64::from(tx - self.col_min);
		Some(slot as usize)
	}

	pub(crate) fn tile_index_cell(&self) -> &MemoCell<TileIndex> {
		&self.tile_index
	}

	/// The tile index, if it has been loaded already.
	pub fn tile_index(&self) -> Option<&TileIndex> {
		self.tile_index.get()
	}
}

impl fmt::Debug for BlockDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Block({}, [{}, {}], [{},{},{},{}], offset: {}, index: {:?})",
			self.level,
			self.column,
			self.row,
			self.col_min,
			self.row_min,
			self.col_max,
			self.row_max,
			self.block_offset,
			self.index_range
		)
	}
}
