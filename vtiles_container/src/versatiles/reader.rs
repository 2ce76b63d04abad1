//! Lazy, cached access to a VersaTiles container.
//!
//! Nothing is read when a reader is constructed. The header, the metadata, the block index
//! and each block's tile index are loaded on first use and kept afterwards; concurrent
//! first uses share a single load. Tile payloads are never cached.
//!
//! A tile lookup needs at most the header, the block index, one tile index and the tile
//! itself, each fetched with a single range read.

use crate::ContainerError;
use super::types::{BlockDefinition, BlockIndex, FileHeader, HEADER_LENGTH, Metadata, TileIndex};
use anyhow::{Context, Result};
use std::{fmt, fmt::Write, path::Path};
use vtiles_core::{
	Blob, ByteRange, TileCompression, TileCoord, TileFormat,
	cache::MemoCell,
	compression::{decompress, decompress_brotli},
	io::{DataReader, DataReaderFile, open_data_reader},
};
use vtiles_derive::context;

/// Settings fixed for the lifetime of a reader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReaderOptions {
	/// Interpret requested `y` coordinates in TMS order (y axis flipped).
	pub flip_y: bool,
}

pub struct VersaTilesReader {
	reader: DataReader,
	options: ReaderOptions,
	header: MemoCell<FileHeader>,
	metadata: MemoCell<Metadata>,
	block_index: MemoCell<BlockIndex>,
}

impl VersaTilesReader {
	/// Wraps a byte source without reading from it.
	pub fn open_reader(reader: DataReader, options: ReaderOptions) -> VersaTilesReader {
		VersaTilesReader {
			reader,
			options,
			header: MemoCell::new(),
			metadata: MemoCell::new(),
			block_index: MemoCell::new(),
		}
	}

	/// Opens a file path or an HTTP(S) URL and validates the header.
	#[context("opening container '{source}'")]
	pub async fn open(source: &str, options: ReaderOptions) -> Result<VersaTilesReader> {
		let reader = VersaTilesReader::open_reader(open_data_reader(source)?, options);
		reader.get_header().await?;
		Ok(reader)
	}

	/// Opens a local file and validates the header.
	#[context("opening container {path:?}")]
	pub async fn open_path(path: &Path, options: ReaderOptions) -> Result<VersaTilesReader> {
		let reader = VersaTilesReader::open_reader(DataReaderFile::open(path)?, options);
		reader.get_header().await?;
		Ok(reader)
	}

	pub fn get_name(&self) -> &str {
		self.reader.get_name()
	}

	pub fn options(&self) -> &ReaderOptions {
		&self.options
	}

	async fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		if range.is_empty() {
			return Ok(Blob::new_empty());
		}
		self.reader.read_range(range).await
	}

	/// Reads and validates the 66-byte header. Loaded once, later calls return the cached value.
	///
	/// # Returns
	///
	/// The parsed [`FileHeader`]. A source shorter than a header, an unknown magic or an
	/// unknown compression code fail with [`ContainerError::InvalidContainer`].
	pub async fn get_header(&self) -> Result<&FileHeader> {
		self
			.header
			.get_or_try_load(|| async {
				if let Some(size) = self.reader.size()
					&& size < HEADER_LENGTH
				{
					return Err(ContainerError::InvalidContainer(format!(
						"source has {size} bytes, a header needs {HEADER_LENGTH}"
					))
					.into());
				}
				let blob = self.read_range(&ByteRange::new(0, HEADER_LENGTH)).await?;
				let header = FileHeader::from_blob(&blob)?;
				log::debug!("read header of '{}': {header:?}", self.get_name());
				Ok(header)
			})
			.await
			.with_context(|| format!("reading header of '{}'", self.get_name()))
	}

	/// The metadata document, or [`Metadata::Absent`] if the container has none.
	pub async fn get_metadata(&self) -> Result<&Metadata> {
		self
			.metadata
			.get_or_try_load(|| async {
				let header = self.get_header().await?;
				if header.meta_range.is_empty() {
					return Ok(Metadata::Absent);
				}
				let blob = self.read_range(&header.meta_range).await?;
				let blob = decompress(blob, header.compression)?;
				Metadata::from_blob(&blob)
			})
			.await
			.with_context(|| format!("reading metadata of '{}'", self.get_name()))
	}

	/// The block index: every block of the pyramid with its tile rectangle and the location
	/// of its tile index. Loaded once on first use, together with the header if needed.
	///
	/// # Returns
	///
	/// The parsed [`BlockIndex`], or [`ContainerError::CorruptBlockIndex`] if the region is not
	/// brotli compressed or holds malformed records.
	pub async fn get_block_index(&self) -> Result<&BlockIndex> {
		self
			.block_index
			.get_or_try_load(|| async {
				let header = self.get_header().await?;
				let blob = self.read_range(&header.blocks_range).await?;
				BlockIndex::from_brotli_blob(header.version, &blob)
			})
			.await
			.with_context(|| format!("reading block index of '{}'", self.get_name()))
	}

	/// The tile index of `block`, loaded on first access and kept in the block.
	pub async fn get_tile_index<'a>(&'a self, block: &'a BlockDefinition) -> Result<&'a TileIndex> {
		block
			.tile_index_cell()
			.get_or_try_load(|| async {
				let blob = self.read_range(&block.index_range).await?;
				let blob = decompress_brotli(&blob).map_err(|err| {
					ContainerError::CorruptTileIndex(format!("{block:?} is not brotli compressed: {err:#}"))
				})?;
				log::trace!("loaded tile index of {block:?}");
				TileIndex::from_blob(&blob, block.tile_count(), block.block_offset)
			})
			.await
			.with_context(|| format!("reading tile index of {block:?}"))
	}

	/// Raw tile bytes, still compressed as stored. `Ok(None)` if the container has no such tile.
	#[context("reading tile {coord:?} from '{}'", self.get_name())]
	pub async fn get_tile(&self, coord: &TileCoord) -> Result<Option<Blob>> {
		if !coord.is_valid() {
			log::trace!("{coord:?} is not a valid tile coordinate");
			return Ok(None);
		}
		let coord = if self.options.flip_y { coord.flipped_y() } else { *coord };

		let block_index = self.get_block_index().await?;
		let Some(block) = block_index.get_block_of_tile(&coord) else {
			return Ok(None);
		};
		let Some(slot) = block.slot_of((coord.x & 0xFF) as u8, (coord.y & 0xFF) as u8) else {
			log::trace!("{coord:?} lies outside of {block:?}");
			return Ok(None);
		};

		let tile_index = self.get_tile_index(block).await?;
		let Some(range) = tile_index.get(slot) else {
			return Ok(None);
		};

		Ok(Some(self.read_range(&range).await?))
	}

	/// Tile bytes decompressed according to the header's tile compression.
	pub async fn get_tile_uncompressed(&self, coord: &TileCoord) -> Result<Option<Blob>> {
		let Some(blob) = self.get_tile(coord).await? else {
			return Ok(None);
		};
		let compression = self.get_tile_compression().await?;
		Ok(Some(decompress(blob, compression)?))
	}

	pub async fn get_tile_format(&self) -> Result<TileFormat> {
		Ok(self.get_header().await?.tile_format)
	}

	pub async fn get_tile_compression(&self) -> Result<TileCompression> {
		Ok(self.get_header().await?.compression)
	}

	pub async fn get_tile_mime(&self) -> Result<&'static str> {
		Ok(self.get_tile_format().await?.as_mime_str())
	}

	/// Human readable summary of the container. `deep` adds per-level block statistics,
	/// which loads the block index and every tile index.
	pub async fn probe(&self, deep: bool) -> Result<String> {
		let header = self.get_header().await?;
		let mut text = String::new();
		writeln!(text, "source: {}", self.get_name())?;
		writeln!(text, "format: {}", header.version.magic())?;
		writeln!(text, "tile format: {}", header.tile_format)?;
		writeln!(text, "tile compression: {}", header.compression)?;
		writeln!(text, "zoom range: {}-{}", header.zoom_range[0], header.zoom_range[1])?;
		writeln!(text, "bbox: {:?}", header.bbox)?;
		writeln!(text, "metadata range: {:?}", header.meta_range)?;
		writeln!(text, "block index range: {:?}", header.blocks_range)?;

		if deep {
			let block_index = self.get_block_index().await?;
			let mut blocks: Vec<&BlockDefinition> = block_index.iter().collect();
			blocks.sort_by_key(|block| (block.level, block.row, block.column));

			let mut levels: Vec<(u8, usize, u64, u64)> = Vec::new();
			for block in blocks {
				let tile_index = self.get_tile_index(block).await?;
				let tiles = (0..tile_index.len()).filter(|slot| tile_index.get(*slot).is_some()).count();
				match levels.last_mut() {
					Some(entry) if entry.0 == block.level => {
						entry.1 += 1;
						entry.2 += tiles as u64;
						entry.3 += tile_index.tiles_size();
					}
					_ => levels.push((block.level, 1, tiles as u64, tile_index.tiles_size())),
				}
			}

			writeln!(text, "blocks: {}", block_index.len())?;
			for (level, blocks, tiles, size) in levels {
				writeln!(text, "  level {level}: {blocks} blocks, {tiles} tiles, {size} bytes")?;
			}
		}
		Ok(text)
	}
}

impl fmt::Debug for VersaTilesReader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VersaTilesReader")
			.field("name", &self.get_name())
			.field("options", &self.options)
			.field("header", &self.header)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		ContainerError,
		testing::{ContainerBuilder, CountingReader},
		types::FormatVersion,
	};
	use futures::future::join_all;
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use std::sync::Arc;
	use vtiles_core::{GeoBBox, assert_wildcard, io::DataReaderBlob};

	fn coord(level: u8, x: u32, y: u32) -> TileCoord {
		TileCoord::new(level, x, y).unwrap()
	}

	fn sample(version: FormatVersion, compression: TileCompression) -> ContainerBuilder {
		ContainerBuilder::new(version)
			.compression(compression)
			.metadata(r#"{"vector_layers":[]}"#)
			.tile(0, 0, 0, "tile 0/0/0")
			.tile(4, 3, 5, "tile 4/3/5")
			.tile(9, 300, 20, "tile 9/300/20")
			.tile(9, 511, 511, "tile 9/511/511")
	}

	#[rstest]
	#[case(FormatVersion::V01)]
	#[case(FormatVersion::V02)]
	#[case(FormatVersion::Legacy)]
	#[tokio::test]
	async fn reads_tiles_of_every_family(#[case] version: FormatVersion) -> Result<()> {
		let reader = sample(version, TileCompression::Gzip).build_reader(ReaderOptions::default())?;

		assert_eq!(reader.get_header().await?.version, version);
		for (level, x, y) in [(0, 0, 0), (4, 3, 5), (9, 300, 20), (9, 511, 511)] {
			let tile = reader.get_tile_uncompressed(&coord(level, x, y)).await?.unwrap();
			assert_eq!(tile.as_str(), format!("tile {level}/{x}/{y}"));
		}
		assert_eq!(reader.get_tile(&coord(4, 3, 6)).await?, None);
		assert_eq!(reader.get_tile(&coord(5, 3, 5)).await?, None);
		Ok(())
	}

	#[tokio::test]
	async fn raw_tiles_stay_compressed() -> Result<()> {
		let reader = sample(FormatVersion::V02, TileCompression::Brotli).build_reader(ReaderOptions::default())?;
		let raw = reader.get_tile(&coord(4, 3, 5)).await?.unwrap();
		assert_eq!(decompress_brotli(&raw)?.as_str(), "tile 4/3/5");
		assert_eq!(reader.get_tile_compression().await?, TileCompression::Brotli);
		Ok(())
	}

	#[tokio::test]
	async fn addressing_inside_a_partial_block() -> Result<()> {
		let reader = ContainerBuilder::new(FormatVersion::V02)
			.compression(TileCompression::Uncompressed)
			.tile(12, 258, 1, "first slot")
			.tile(12, 261, 3, "last slot")
			.build_reader(ReaderOptions::default())?;

		let block_index = reader.get_block_index().await?;
		let block = block_index.get_block_of_tile(&coord(12, 258, 1)).unwrap();
		assert_eq!([block.col_min, block.row_min, block.col_max, block.row_max], [2, 1, 5, 3]);
		assert_eq!(block.tile_count(), 12);

		assert_eq!(reader.get_tile(&coord(12, 258, 1)).await?.unwrap().as_str(), "first slot");
		assert_eq!(reader.get_tile(&coord(12, 261, 3)).await?.unwrap().as_str(), "last slot");
		// outside of the present rectangle
		assert_eq!(reader.get_tile(&coord(12, 262, 1)).await?, None);
		// inside the rectangle, but an empty slot
		assert_eq!(reader.get_tile(&coord(12, 259, 2)).await?, None);
		Ok(())
	}

	#[tokio::test]
	async fn tms_order_flips_y() -> Result<()> {
		let builder = sample(FormatVersion::V02, TileCompression::Uncompressed);
		let xyz = builder.build_reader(ReaderOptions::default())?;
		let tms = builder.build_reader(ReaderOptions { flip_y: true })?;

		for y in 0..16 {
			assert_eq!(
				tms.get_tile(&coord(4, 3, y)).await?,
				xyz.get_tile(&coord(4, 3, 16 - y - 1)).await?
			);
		}
		assert_eq!(tms.get_tile(&coord(4, 3, 10)).await?.unwrap().as_str(), "tile 4/3/5");
		Ok(())
	}

	#[tokio::test]
	async fn invalid_coordinates_are_absent() -> Result<()> {
		let reader = sample(FormatVersion::V02, TileCompression::Uncompressed).build_reader(ReaderOptions::default())?;
		let outside = TileCoord { level: 4, x: 3, y: 16 };
		assert_eq!(reader.get_tile(&outside).await?, None);
		Ok(())
	}

	#[tokio::test]
	async fn header_fields() -> Result<()> {
		let reader = ContainerBuilder::new(FormatVersion::V02)
			.tile_format(TileFormat::WEBP)
			.compression(TileCompression::Uncompressed)
			.zoom_range(2, 9)
			.bbox(GeoBBox::new(-10.5, 40.25, 12.0, 60.125))
			.tile(2, 1, 1, "x")
			.build_reader(ReaderOptions::default())?;

		let header = reader.get_header().await?;
		assert_eq!(header.tile_format, TileFormat::WEBP);
		assert_eq!(header.zoom_range, [2, 9]);
		assert_eq!(header.bbox, GeoBBox::new(-10.5, 40.25, 12.0, 60.125));
		assert_eq!(reader.get_tile_mime().await?, "image/webp");
		Ok(())
	}

	#[tokio::test]
	async fn metadata_present_absent_and_corrupt() -> Result<()> {
		let reader = sample(FormatVersion::V02, TileCompression::Brotli).build_reader(ReaderOptions::default())?;
		let metadata = reader.get_metadata().await?;
		assert_eq!(metadata.as_json().unwrap()["vector_layers"], serde_json::json!([]));

		let reader = ContainerBuilder::new(FormatVersion::V01)
			.tile(1, 0, 0, "x")
			.build_reader(ReaderOptions::default())?;
		assert_eq!(reader.get_metadata().await?, &Metadata::Absent);

		let reader = ContainerBuilder::new(FormatVersion::V02)
			.compression(TileCompression::Gzip)
			.metadata("{not json")
			.tile(1, 0, 0, "tile")
			.build_reader(ReaderOptions::default())?;
		let err = reader.get_metadata().await.unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ContainerError>(),
			Some(ContainerError::CorruptMetadata(_))
		));
		// tiles are still served
		assert_eq!(reader.get_tile_uncompressed(&coord(1, 0, 0)).await?.unwrap().as_str(), "tile");
		Ok(())
	}

	#[tokio::test]
	async fn corrupt_magic_is_invalid_container() {
		let mut bytes = sample(FormatVersion::V01, TileCompression::Gzip).build().unwrap().into_vec();
		bytes.insert(0, b'x');
		let reader = VersaTilesReader::open_reader(DataReaderBlob::new("x.versatiles", Blob::from(bytes)), ReaderOptions::default());

		let err = reader.get_header().await.unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ContainerError>(),
			Some(ContainerError::InvalidContainer(_))
		));
		assert_wildcard!(err, "reading header of 'x.versatiles'");
		assert!(reader.get_tile(&coord(0, 0, 0)).await.is_err());
	}

	#[rstest]
	#[case("", 0)]
	#[case("versatiles", 10)]
	#[tokio::test]
	async fn sources_shorter_than_a_header_are_invalid(#[case] content: &str, #[case] size: u64) {
		let (reader, reads) = CountingReader::new(DataReaderBlob::new("short", Blob::from(content)));
		let reader = VersaTilesReader::open_reader(Box::new(reader), ReaderOptions::default());

		let err = reader.get_header().await.unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ContainerError>(),
			Some(ContainerError::InvalidContainer(_))
		));
		assert_eq!(
			format!("{err:#}"),
			format!("reading header of 'short': invalid container: source has {size} bytes, a header needs 66")
		);
		assert_eq!(reads.get(), 0);
	}

	#[tokio::test]
	async fn malformed_block_index_is_corrupt() {
		let reader = ContainerBuilder::new(FormatVersion::V01)
			.custom_block_index(Blob::from(vec![0; 30]))
			.build_reader(ReaderOptions::default())
			.unwrap();

		let err = reader.get_tile(&coord(0, 0, 0)).await.unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ContainerError>(),
			Some(ContainerError::CorruptBlockIndex(_))
		));
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn concurrent_header_loads_read_once() -> Result<()> {
		let blob = sample(FormatVersion::V02, TileCompression::Brotli).build()?;
		let (counting, reads) = CountingReader::new(DataReaderBlob::new("memory", blob));
		let reader = Arc::new(VersaTilesReader::open_reader(Box::new(counting), ReaderOptions::default()));

		let tasks = (0..32).map(|_| {
			let reader = reader.clone();
			tokio::spawn(async move { reader.get_header().await.map(|header| header.version) })
		});
		for result in join_all(tasks).await {
			assert_eq!(result??, FormatVersion::V02);
		}
		assert_eq!(reads.get(), 1);

		for _ in 0..5 {
			reader.get_header().await?;
		}
		assert_eq!(reads.get(), 1);
		Ok(())
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn indexes_are_read_once_and_tiles_every_time() -> Result<()> {
		let blob = sample(FormatVersion::V02, TileCompression::Brotli).build()?;
		let (counting, reads) = CountingReader::new(DataReaderBlob::new("memory", blob));
		let reader = Arc::new(VersaTilesReader::open_reader(Box::new(counting), ReaderOptions::default()));

		let tasks = (0..16).map(|_| {
			let reader = reader.clone();
			tokio::spawn(async move { reader.get_tile(&TileCoord { level: 9, x: 300, y: 20 }).await })
		});
		for result in join_all(tasks).await {
			assert!(result??.is_some());
		}
		// header + block index + one tile index + 16 tiles
		assert_eq!(reads.get(), 3 + 16);
		Ok(())
	}

	#[tokio::test]
	async fn failed_loads_are_retried() -> Result<()> {
		let blob = sample(FormatVersion::V02, TileCompression::Gzip).build()?;
		let (counting, reads) = CountingReader::new(DataReaderBlob::new("memory", blob));
		counting.fail_next(1);
		let reader = VersaTilesReader::open_reader(Box::new(counting), ReaderOptions::default());

		assert!(reader.get_header().await.is_err());
		assert_eq!(reader.get_header().await?.version, FormatVersion::V02);
		assert_eq!(reads.get(), 2);
		Ok(())
	}

	#[tokio::test]
	async fn probe_summary() -> Result<()> {
		let reader = sample(FormatVersion::V02, TileCompression::Brotli).build_reader(ReaderOptions::default())?;
		let text = reader.probe(true).await?;
		assert!(text.contains("format: versatiles_v02\n"));
		assert!(text.contains("tile compression: brotli\n"));
		assert!(text.contains("blocks: 4\n"));
		assert!(text.contains("  level 9: 2 blocks, 2 tiles, "));
		Ok(())
	}

	#[tokio::test]
	async fn open_path_validates_header() -> Result<()> {
		use assert_fs::{NamedTempFile, prelude::*};

		let file = NamedTempFile::new("berlin.versatiles")?;
		file.write_binary(sample(FormatVersion::V02, TileCompression::Gzip).build()?.as_slice())?;
		let reader = VersaTilesReader::open_path(file.path(), ReaderOptions::default()).await?;
		assert!(reader.get_tile(&coord(0, 0, 0)).await?.is_some());

		let broken = NamedTempFile::new("broken.versatiles")?;
		broken.write_binary(&[0u8; 100])?;
		let err = VersaTilesReader::open(broken.path().to_str().unwrap(), ReaderOptions::default())
			.await
			.unwrap_err();
		assert_wildcard!(err, "opening container '*broken.versatiles'");

		let short = NamedTempFile::new("short.versatiles")?;
		short.write_binary(b"versatiles")?;
		let err = VersaTilesReader::open_path(short.path(), ReaderOptions::default())
			.await
			.unwrap_err();
		assert!(matches!(
			err.downcast_ref::<ContainerError>(),
			Some(ContainerError::InvalidContainer(_))
		));
		Ok(())
	}
}
