use crate::Blob;
use anyhow::{Context, Result};
use flate2::bufread::{GzDecoder, GzEncoder};
use std::io::Read;
use vtiles_derive::context;

#[context("compressing {} bytes with gzip", blob.len())]
pub fn compress_gzip(blob: &Blob) -> Result<Blob> {
	let mut encoder = GzEncoder::new(blob.as_slice(), flate2::Compression::best());
	let mut compressed = Vec::new();
	encoder.read_to_end(&mut compressed)?;
	Ok(Blob::from(compressed))
}

#[context("decompressing {} bytes with gzip", blob.len())]
pub fn decompress_gzip(blob: &Blob) -> Result<Blob> {
	let mut decoder = GzDecoder::new(blob.as_slice());
	let mut decompressed = Vec::new();
	decoder
		.read_to_end(&mut decompressed)
		.context("input is not valid gzip")?;
	Ok(Blob::from(decompressed))
}
