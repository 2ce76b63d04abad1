use super::{SourceResponse, TileRequest};
use crate::config::TileSourceConfig;
use anyhow::Result;
use std::{fmt::Debug, sync::Arc};
use vtiles_container::{ReaderOptions, VersaTilesReader, types::Metadata};
use vtiles_core::{Blob, TileCompression, TileCoord};
use vtiles_derive::context;

/// One container served under `/tiles/{name}/`.
///
/// The reader is shared between requests without a lock; its caches are single-flight.
#[derive(Clone)]
pub struct TileSource {
	pub name: String,
	pub prefix: String,
	reader: Arc<VersaTilesReader>,
	pub tile_mime: String,
	pub compression: TileCompression,
}

impl TileSource {
	#[context("opening tile source {config:?}")]
	pub async fn open(config: &TileSourceConfig) -> Result<TileSource> {
		let name = config.name()?;
		let options = ReaderOptions { flip_y: config.flip_y };
		let reader = VersaTilesReader::open(&config.src, options).await?;
		TileSource::from_reader(reader, &name).await
	}

	/// Wraps an opened reader. Reads the header if that has not happened yet.
	pub async fn from_reader(reader: VersaTilesReader, name: &str) -> Result<TileSource> {
		let tile_mime = reader.get_tile_mime().await?.to_owned();
		let compression = reader.get_tile_compression().await?;

		Ok(TileSource {
			name: name.to_owned(),
			prefix: format!("/tiles/{name}/"),
			reader: Arc::new(reader),
			tile_mime,
			compression,
		})
	}

	pub fn get_source_name(&self) -> &str {
		self.reader.get_name()
	}

	/// `Ok(None)` if the container has no such tile or no metadata.
	pub async fn get_data(&self, request: &TileRequest, base_url: &str) -> Result<Option<SourceResponse>> {
		match request {
			TileRequest::Tile(coord) => self.get_tile(coord).await,
			TileRequest::Meta => self.get_meta().await,
			TileRequest::Info => Ok(SourceResponse::new_some(
				self.build_info_json(base_url).await?,
				TileCompression::Uncompressed,
				"application/json",
			)),
		}
	}

	async fn get_tile(&self, coord: &TileCoord) -> Result<Option<SourceResponse>> {
		log::debug!("get tile, prefix: {}, coord: {coord:?}", self.prefix);

		Ok(match self.reader.get_tile(coord).await? {
			Some(blob) => SourceResponse::new_some(blob, self.compression, &self.tile_mime),
			None => None,
		})
	}

	async fn get_meta(&self) -> Result<Option<SourceResponse>> {
		Ok(match self.reader.get_metadata().await? {
			Metadata::Absent => None,
			Metadata::Json(value) => SourceResponse::new_some(
				Blob::from(serde_json::to_vec(value)?),
				TileCompression::Uncompressed,
				"application/json",
			),
		})
	}

	async fn build_info_json(&self, base_url: &str) -> Result<Blob> {
		let header = self.reader.get_header().await?;
		let info = serde_json::json!({
			"name": self.name,
			"container": header.version.magic(),
			"tile_format": header.tile_format.as_str(),
			"tile_compression": header.compression.as_str(),
			"tile_mime": self.tile_mime,
			"zoom_min": header.zoom_range[0],
			"zoom_max": header.zoom_range[1],
			"bbox": header.bbox.as_array(),
			"flip_y": self.reader.options().flip_y,
			"tiles": [format!("{base_url}{}{{z}}/{{x}}/{{y}}", self.prefix)],
		});
		Ok(Blob::from(serde_json::to_vec(&info)?))
	}
}

impl Debug for TileSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TileSource")
			.field("name", &self.name)
			.field("reader", &self.reader)
			.field("tile_mime", &self.tile_mime)
			.field("compression", &self.compression)
			.finish()
	}
}
