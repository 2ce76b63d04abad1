//! Range reads from a local file.
//!
//! Reads are positioned (`pread` on Unix, `seek_read` on Windows) and run on the blocking
//! thread pool. They never move a shared file cursor, so any number of them can run at once.

use super::DataReaderTrait;
use crate::{Blob, ByteRange};
use anyhow::{Context, Result, ensure};
use async_trait::async_trait;
use std::{fs::File, path::Path, sync::Arc};

#[derive(Debug)]
pub struct DataReaderFile {
	name: String,
	file: Arc<File>,
	size: u64,
}

impl DataReaderFile {
	/// Opens an existing regular file for range reads.
	///
	/// # Arguments
	///
	/// * `path` - Path of the file. It is canonicalized and used as the reader name.
	///
	/// # Returns
	///
	/// A boxed reader, ready to be used as a [`DataReader`](super::DataReader).
	/// Fails if the path does not exist or is not a file.
	pub fn open(path: &Path) -> Result<Box<DataReaderFile>> {
		ensure!(path.exists(), "file {path:?} does not exist");
		ensure!(path.is_file(), "path {path:?} must be a file");

		let path = path.canonicalize()?;
		let file = File::open(&path).with_context(|| format!("opening file {path:?}"))?;
		let size = file.metadata()?.len();

		Ok(Box::new(DataReaderFile {
			name: path.to_string_lossy().into_owned(),
			file: Arc::new(file),
			size,
		}))
	}

	async fn read_blocking(&self, range: ByteRange) -> Result<Blob> {
		let file = Arc::clone(&self.file);

		let buffer = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
			let mut buffer = vec![0; range.length as usize];
			read_exact_at(&file, &mut buffer, range.offset)?;
			Ok(buffer)
		})
		.await?
		.with_context(|| format!("failed to read {range:?} from file '{}'", self.name))?;

		Ok(Blob::from(buffer))
	}
}

#[cfg(unix)]
fn read_exact_at(file: &File, buffer: &mut [u8], offset: u64) -> std::io::Result<()> {
	use std::os::unix::fs::FileExt;
	file.read_exact_at(buffer, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buffer: &mut [u8], mut offset: u64) -> std::io::Result<()> {
	use std::{io::ErrorKind, os::windows::fs::FileExt};
	while !buffer.is_empty() {
		match file.seek_read(buffer, offset) {
			Ok(0) => return Err(ErrorKind::UnexpectedEof.into()),
			Ok(n) => {
				buffer = &mut buffer[n..];
				offset += n as u64;
			}
			Err(err) if err.kind() == ErrorKind::Interrupted => {}
			Err(err) => return Err(err),
		}
	}
	Ok(())
}

#[async_trait]
impl DataReaderTrait for DataReaderFile {
	async fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		if range.is_empty() {
			return Ok(Blob::new_empty());
		}
		ensure!(
			range.end() <= self.size,
			"{range:?} exceeds size of file '{}' ({} bytes)",
			self.name,
			self.size
		);
		log::trace!("read {range:?} from '{}'", self.name);
		self.read_blocking(*range).await
	}

	async fn read_all(&self) -> Result<Blob> {
		self.read_blocking(ByteRange::new(0, self.size)).await
	}

	fn size(&self) -> Option<u64> {
		Some(self.size)
	}

	fn get_name(&self) -> &str {
		&self.name
	}
}
