//! Helpers for tests: an in-memory container writer and an instrumented byte source.

use crate::{
	ReaderOptions, VersaTilesReader,
	types::{FormatVersion, HEADER_LENGTH},
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use byteorder::{BigEndian as BE, WriteBytesExt};
use std::{
	collections::BTreeMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
use vtiles_core::{
	Blob, ByteRange, GeoBBox, TileCompression, TileCoord, TileFormat,
	compression::{compress, compress_brotli},
	io::{DataReader, DataReaderBlob, DataReaderTrait},
};

/// Writes a complete container of any format family into memory.
///
/// Tiles are compressed with the configured tile compression, grouped into 256×256 blocks
/// and laid out as header, metadata, then per block the tiles followed by their tile index,
/// then the block index. Each block's tile rectangle is the bounding box of its tiles unless
/// set with [`ContainerBuilder::block_rect`].
#[derive(Clone, Debug)]
pub struct ContainerBuilder {
	version: FormatVersion,
	tile_format: TileFormat,
	compression: TileCompression,
	zoom_range: Option<[u8; 2]>,
	bbox: GeoBBox,
	metadata: Option<Blob>,
	tiles: BTreeMap<(u8, u32, u32), Blob>,
	block_rects: BTreeMap<(u8, u32, u32), [u8; 4]>,
	custom_block_index: Option<Blob>,
}

impl ContainerBuilder {
	pub fn new(version: FormatVersion) -> ContainerBuilder {
		ContainerBuilder {
			version,
			tile_format: TileFormat::MVT,
			compression: TileCompression::Gzip,
			zoom_range: None,
			bbox: GeoBBox::new(-180.0, -85.0, 180.0, 85.0),
			metadata: None,
			tiles: BTreeMap::new(),
			block_rects: BTreeMap::new(),
			custom_block_index: None,
		}
	}

	pub fn tile_format(mut self, tile_format: TileFormat) -> Self {
		self.tile_format = tile_format;
		self
	}

	pub fn compression(mut self, compression: TileCompression) -> Self {
		self.compression = compression;
		self
	}

	pub fn zoom_range(mut self, min: u8, max: u8) -> Self {
		self.zoom_range = Some([min, max]);
		self
	}

	pub fn bbox(mut self, bbox: GeoBBox) -> Self {
		self.bbox = bbox;
		self
	}

	/// Metadata text, compressed like the tiles.
	pub fn metadata(mut self, json: &str) -> Self {
		self.metadata = Some(Blob::from(json));
		self
	}

	/// Uncompressed tile content, compressed on [`ContainerBuilder::build`].
	pub fn tile(mut self, level: u8, x: u32, y: u32, content: impl Into<Blob>) -> Self {
		self.tiles.insert((level, y, x), content.into());
		self
	}

	/// Tile rectangle `[col_min, row_min, col_max, row_max]` of the block at `column`/`row`.
	/// Slots inside the rectangle without a tile are written as empty.
	pub fn block_rect(mut self, level: u8, column: u32, row: u32, rect: [u8; 4]) -> Self {
		self.block_rects.insert((level, row, column), rect);
		self
	}

	/// Replaces the generated block index records with arbitrary bytes (brotli compressed on build).
	pub fn custom_block_index(mut self, bytes: Blob) -> Self {
		self.custom_block_index = Some(bytes);
		self
	}

	pub fn build(&self) -> Result<Blob> {
		let version = self.version;
		let mut body: Vec<u8> = Vec::new();
		let position = |body: &Vec<u8>| HEADER_LENGTH + body.len() as u64;

		let meta_range = match &self.metadata {
			Some(metadata) => {
				let blob = compress(metadata.clone(), self.compression)?;
				let range = ByteRange::new(position(&body), blob.len());
				body.extend_from_slice(blob.as_slice());
				range
			}
			None => ByteRange::new(HEADER_LENGTH, 0),
		};

		let mut blocks: BTreeMap<(u8, u32, u32), Vec<(u8, u8, &Blob)>> = BTreeMap::new();
		for ((level, y, x), content) in &self.tiles {
			let coord = TileCoord::new(*level, *x, *y)?;
			blocks
				.entry((coord.level, coord.y >> 8, coord.x >> 8))
				.or_default()
				.push(((coord.x & 0xFF) as u8, (coord.y & 0xFF) as u8, content));
		}

		let mut records: Vec<u8> = Vec::new();
		for ((level, row, column), tiles) in blocks {
			let [col_min, row_min, col_max, row_max] = match self.block_rects.get(&(level, row, column)) {
				Some(rect) => *rect,
				None => [
					tiles.iter().map(|t| t.0).min().unwrap_or(0),
					tiles.iter().map(|t| t.1).min().unwrap_or(0),
					tiles.iter().map(|t| t.0).max().unwrap_or(0),
					tiles.iter().map(|t| t.1).max().unwrap_or(0),
				],
			};
			if tiles
				.iter()
				.any(|(tx, ty, _)| *tx < col_min || *tx > col_max || *ty < row_min || *ty > row_max)
			{
				bail!("block ({level}, {column}, {row}) has tiles outside of its rectangle");
			}
			let width = usize::from(col_max - col_min) + 1;
			let height = usize::from(row_max - row_min) + 1;

			let block_start = position(&body);
			let mut slots = vec![(0u64, 0u32); width * height];
			for (tx, ty, content) in tiles {
				let blob = compress(content.clone(), self.compression)?;
				let offset = match version {
					FormatVersion::V02 => position(&body) - block_start,
					FormatVersion::V01 | FormatVersion::Legacy => position(&body),
				};
				let slot = usize::from(ty - row_min) * width + usize::from(tx - col_min);
				slots[slot] = (offset, u32::try_from(blob.len())?);
				body.extend_from_slice(blob.as_slice());
			}
			let tiles_length = position(&body) - block_start;

			let mut tile_index = Vec::with_capacity(slots.len() * 12);
			for (offset, length) in slots {
				tile_index.write_u64::<BE>(offset)?;
				tile_index.write_u32::<BE>(length)?;
			}
			let tile_index = compress_brotli(&Blob::from(tile_index))?;
			let index_offset = position(&body);
			body.extend_from_slice(tile_index.as_slice());

			records.write_u8(level)?;
			records.write_u32::<BE>(column)?;
			records.write_u32::<BE>(row)?;
			records.extend_from_slice(&[col_min, row_min, col_max, row_max]);
			match version {
				FormatVersion::V02 => {
					records.write_u64::<BE>(block_start)?;
					records.write_u64::<BE>(tiles_length)?;
					records.write_u32::<BE>(u32::try_from(tile_index.len())?)?;
				}
				FormatVersion::V01 | FormatVersion::Legacy => {
					records.write_u64::<BE>(index_offset)?;
					records.write_u64::<BE>(tile_index.len())?;
				}
			}
		}

		let records = match &self.custom_block_index {
			Some(custom) => custom.clone(),
			None => Blob::from(records),
		};
		let block_index = compress_brotli(&records)?;
		let blocks_range = ByteRange::new(position(&body), block_index.len());
		body.extend_from_slice(block_index.as_slice());

		let mut header = Vec::with_capacity(HEADER_LENGTH as usize);
		header.extend_from_slice(version.magic().as_bytes());
		header.write_u8(
			version
				.tile_format_code(self.tile_format)
				.with_context(|| format!("{} cannot store {} tiles", version.magic(), self.tile_format))?,
		)?;
		header.write_u8(match self.compression {
			TileCompression::Uncompressed => 0,
			TileCompression::Gzip => 1,
			TileCompression::Brotli => 2,
		})?;
		let [zoom_min, zoom_max] = self.zoom_range.unwrap_or_else(|| {
			let levels = self.tiles.keys().map(|key| key.0);
			[levels.clone().min().unwrap_or(0), levels.max().unwrap_or(0)]
		});
		header.write_u8(zoom_min)?;
		header.write_u8(zoom_max)?;
		for value in self.bbox.as_array() {
			match version {
				FormatVersion::V02 => header.write_i32::<BE>((value * 1e7).round() as i32)?,
				FormatVersion::V01 | FormatVersion::Legacy => header.write_f32::<BE>(value as f32)?,
			}
		}
		for range in [meta_range, blocks_range] {
			header.write_u64::<BE>(range.offset)?;
			header.write_u64::<BE>(range.length)?;
		}
		if header.len() as u64 != HEADER_LENGTH {
			bail!("generated header has {} bytes", header.len());
		}

		header.append(&mut body);
		Ok(Blob::from(header))
	}

	/// Builds the container and opens it from memory, without reading anything yet.
	pub fn build_reader(&self, options: ReaderOptions) -> Result<VersaTilesReader> {
		let name = format!("memory.{}", self.version.magic());
		Ok(VersaTilesReader::open_reader(DataReaderBlob::new(&name, self.build()?), options))
	}
}

/// Shared count of the reads that reached a [`CountingReader`].
#[derive(Clone, Debug, Default)]
pub struct ReadCounter(Arc<AtomicUsize>);

impl ReadCounter {
	pub fn get(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}

/// Wraps a byte source, counts every read and can fail or slow down on demand.
#[derive(Debug)]
pub struct CountingReader {
	inner: DataReader,
	reads: ReadCounter,
	failures: AtomicUsize,
	delay: Duration,
}

impl CountingReader {
	pub fn new(inner: DataReader) -> (CountingReader, ReadCounter) {
		let reads = ReadCounter::default();
		let reader = CountingReader {
			inner,
			reads: reads.clone(),
			failures: AtomicUsize::new(0),
			delay: Duration::from_millis(10),
		};
		(reader, reads)
	}

	/// The next `count` reads fail.
	pub fn fail_next(&self, count: usize) {
		self.failures.store(count, Ordering::SeqCst);
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}
}

#[async_trait]
impl DataReaderTrait for CountingReader {
	async fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		self.reads.0.fetch_add(1, Ordering::SeqCst);
		tokio::time::sleep(self.delay).await;
		let failing = self
			.failures
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok();
		if failing {
			bail!("simulated failure reading {range:?} from '{}'", self.get_name());
		}
		self.inner.read_range(range).await
	}

	async fn read_all(&self) -> Result<Blob> {
		self.reads.0.fetch_add(1, Ordering::SeqCst);
		self.inner.read_all().await
	}

	fn size(&self) -> Option<u64> {
		self.inner.size()
	}

	fn get_name(&self) -> &str {
		self.inner.get_name()
	}
}
