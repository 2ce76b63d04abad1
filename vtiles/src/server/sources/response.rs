use vtiles_core::{Blob, TileCompression};

/// Bytes ready to be negotiated and sent, with their stored compression and MIME type.
#[derive(Debug)]
pub struct SourceResponse {
	pub blob: Blob,
	pub compression: TileCompression,
	pub mime: String,
}

impl SourceResponse {
	pub fn new_some(blob: Blob, compression: TileCompression, mime: &str) -> Option<SourceResponse> {
		Some(SourceResponse {
			blob,
			compression,
			mime: mime.to_owned(),
		})
	}
}
