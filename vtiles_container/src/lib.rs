//! Reading VersaTiles containers.
//!
//! A container is a single file holding a header, optional metadata, a brotli-compressed
//! block index, one brotli-compressed tile index per block and the tile payloads. Only
//! the structures needed for a request are fetched, each with one range read, and the
//! structural parts are cached for the lifetime of a [`VersaTilesReader`].
//!
//! ```no_run
//! use vtiles_container::{ReaderOptions, VersaTilesReader};
//! use vtiles_core::TileCoord;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let reader = VersaTilesReader::open("https://example.org/osm.versatiles", ReaderOptions::default()).await?;
//! if let Some(tile) = reader.get_tile(&TileCoord::new(14, 8800, 5373)?).await? {
//! 	println!("{} bytes", tile.len());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
#[cfg(any(test, feature = "test"))]
pub mod testing;
mod versatiles;

pub use error::ContainerError;
pub use versatiles::*;
