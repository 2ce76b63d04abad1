use crate::{Blob, ByteRange};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

pub type DataReader = Box<dyn DataReaderTrait>;

/// Random-access reads from a file, a remote object or memory.
///
/// Implementations must return exactly `range.length` bytes or fail, and must answer
/// zero-length ranges with an empty blob without touching the underlying source.
#[async_trait]
pub trait DataReaderTrait: Debug + Send + Sync {
	async fn read_range(&self, range: &ByteRange) -> Result<Blob>;

	async fn read_all(&self) -> Result<Blob>;

	/// Total size in bytes, if known without a request. Remote sources return `None`.
	fn size(&self) -> Option<u64> {
		None
	}

	/// Path, URL or label identifying the source in logs and error messages.
	fn get_name(&self) -> &str;
}
