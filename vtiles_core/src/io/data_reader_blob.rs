use super::DataReaderTrait;
use crate::{Blob, ByteRange};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Serves reads from a buffer held in memory.
#[derive(Debug)]
pub struct DataReaderBlob {
	name: String,
	blob: Blob,
}

impl DataReaderBlob {
	pub fn new(name: &str, blob: Blob) -> Box<DataReaderBlob> {
		Box::new(DataReaderBlob {
			name: name.to_owned(),
			blob,
		})
	}
}

#[async_trait]
impl DataReaderTrait for DataReaderBlob {
	async fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		if range.is_empty() {
			return Ok(Blob::new_empty());
		}
		self
			.blob
			.read_range(range)
			.with_context(|| format!("reading {range:?} from '{}'", self.name))
	}

	async fn read_all(&self) -> Result<Blob> {
		Ok(self.blob.clone())
	}

	fn size(&self) -> Option<u64> {
		Some(self.blob.len())
	}

	fn get_name(&self) -> &str {
		&self.name
	}
}
