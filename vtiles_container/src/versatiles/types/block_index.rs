use super::{BlockDefinition, FormatVersion};
use crate::ContainerError;
use anyhow::{Result, ensure};
use std::collections::HashMap;
use vtiles_core::{Blob, TileCoord, compression::decompress_brotli};

/// All blocks of a container, keyed by block coordinate.
#[derive(Debug, Default)]
pub struct BlockIndex {
	blocks: HashMap<TileCoord, BlockDefinition>,
}

impl BlockIndex {
	/// Parses a decompressed block index.
	pub fn from_blob(version: FormatVersion, blob: &Blob) -> Result<BlockIndex> {
		let record_length = version.block_record_length();
		let length = blob.as_slice().len();
		ensure!(
			length % record_length == 0,
			ContainerError::CorruptBlockIndex(format!(
				"{length} bytes is not a multiple of the {record_length}-byte record size of {}",
				version.magic()
			))
		);

		let mut blocks = HashMap::with_capacity(length / record_length);
		for record in blob.as_slice().chunks_exact(record_length) {
			let block = BlockDefinition::from_record(version, record)?;
			let coord = block.coord();
			ensure!(
				!blocks.contains_key(&coord),
				ContainerError::CorruptBlockIndex(format!("duplicate block {coord:?}"))
			);
			blocks.insert(coord, block);
		}

		log::debug!("parsed block index with {} blocks", blocks.len());
		Ok(BlockIndex { blocks })
	}

	/// Parses a block index as stored in the container: always brotli compressed.
	pub fn from_brotli_blob(version: FormatVersion, blob: &Blob) -> Result<BlockIndex> {
		let blob = decompress_brotli(blob)
			.map_err(|err| ContainerError::CorruptBlockIndex(format!("{err:#}")))?;
		Self::from_blob(version, &blob)
	}

	/// The block containing tile `coord`, if the container has one.
	pub fn get_block_of_tile(&self, coord: &TileCoord) -> Option<&BlockDefinition> {
		self.blocks.get(&TileCoord {
			level: coord.level,
			x: coord.x >> 8,
			y: coord.y >> 8,
		})
	}

	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &BlockDefinition> {
		self.blocks.values()
	}
}
