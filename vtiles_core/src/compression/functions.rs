//! Compression dispatch by [`TileCompression`].
//!
//! ```rust
//! use vtiles_core::{compression::*, Blob, TileCompression};
//!
//! let data = Blob::from("a tile, a tile, a tile");
//! let stored = compress(data.clone(), TileCompression::Brotli)?;
//! assert_eq!(decompress(stored, TileCompression::Brotli)?, data);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::{compress_brotli, compress_gzip, decompress_brotli, decompress_gzip};
use crate::{Blob, TileCompression};
use anyhow::Result;
use vtiles_derive::context;

#[context("compressing blob with {compression}")]
pub fn compress(blob: Blob, compression: TileCompression) -> Result<Blob> {
	match compression {
		TileCompression::Uncompressed => Ok(blob),
		TileCompression::Gzip => compress_gzip(&blob),
		TileCompression::Brotli => compress_brotli(&blob),
	}
}

#[context("decompressing blob with {compression}")]
pub fn decompress(blob: Blob, compression: TileCompression) -> Result<Blob> {
	match compression {
		TileCompression::Uncompressed => Ok(blob),
		TileCompression::Gzip => decompress_gzip(&blob),
		TileCompression::Brotli => decompress_brotli(&blob),
	}
}
