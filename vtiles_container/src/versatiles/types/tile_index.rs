//! Per-block table mapping a slot to the byte range of its tile.
//!
//! Each decompressed record is 12 bytes: `offset u64` relative to the block offset and
//! `length u32`. A length of 0 marks an empty slot.

use crate::ContainerError;
use anyhow::{Result, ensure};
use vtiles_core::{Blob, ByteRange, io::ValueReaderSlice};

pub const TILE_INDEX_RECORD_LENGTH: u64 = 12;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileIndex {
	offsets: Vec<u64>,
	lengths: Vec<u32>,
}

impl TileIndex {
	/// Parses `tile_count` records, shifting every offset by `block_offset`.
	pub fn from_blob(blob: &Blob, tile_count: u64, block_offset: u64) -> Result<TileIndex> {
		ensure!(
			blob.len() == tile_count * TILE_INDEX_RECORD_LENGTH,
			ContainerError::CorruptTileIndex(format!(
				"expected {tile_count} records of {TILE_INDEX_RECORD_LENGTH} bytes, got {} bytes",
				blob.len()
			))
		);

		let count = tile_count as usize;
		let mut offsets = Vec::with_capacity(count);
		let mut lengths = Vec::with_capacity(count);
		let mut reader = ValueReaderSlice::new_be(blob.as_slice());
		for _ in 0..count {
			let offset = reader.read_u64()?;
			offsets.push(offset.checked_add(block_offset).ok_or_else(|| {
				ContainerError::CorruptTileIndex(format!("tile offset {offset} + block offset {block_offset} overflows"))
			})?);
			lengths.push(reader.read_u32()?);
		}

		Ok(TileIndex { offsets, lengths })
	}

	pub fn len(&self) -> usize {
		self.offsets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.offsets.is_empty()
	}

	/// Byte range of the tile in `slot`. Empty slots and slots past the end are `None`.
	pub fn get(&self, slot: usize) -> Option<ByteRange> {
		let length = *self.lengths.get(slot)?;
		if length == 0 {
			return None;
		}
		Some(ByteRange::new(self.offsets[slot], u64::from(length)))
	}

	/// Sum of all tile lengths.
	pub fn tiles_size(&self) -> u64 {
		self.lengths.iter().map(|l| u64::from(*l)).sum()
	}
}
