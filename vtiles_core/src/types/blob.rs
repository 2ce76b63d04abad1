//! `Blob` is an owned byte buffer used for tiles, index buffers and metadata.
//!
//! ```
//! use vtiles_core::{Blob, ByteRange};
//!
//! let blob = Blob::from("versatiles_v02");
//! assert_eq!(blob.len(), 14);
//! assert_eq!(blob.read_range(&ByteRange::new(11, 3)).unwrap().as_str(), "v02");
//! ```

use crate::ByteRange;
use anyhow::{Result, ensure};
use std::fmt::Debug;

/// An owned, contiguous sequence of bytes.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Blob(Vec<u8>);

impl Blob {
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Copies the bytes covered by `range` into a new blob.
	pub fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		ensure!(
			range.end() <= self.len(),
			"{range:?} is outside of blob with {} bytes",
			self.len()
		);
		Ok(Blob::from(&self.0[range.as_range_usize()]))
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Interprets the bytes as UTF-8. Invalid sequences yield an empty string.
	pub fn as_str(&self) -> &str {
		std::str::from_utf8(&self.0).unwrap_or("")
	}

	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<u8>> for Blob {
	fn from(value: Vec<u8>) -> Self {
		Blob(value)
	}
}

impl From<&[u8]> for Blob {
	fn from(value: &[u8]) -> Self {
		Blob(value.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(value: &[u8; N]) -> Self {
		Blob(value.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(value: &str) -> Self {
		Blob(value.as_bytes().to_vec())
	}
}

impl From<String> for Blob {
	fn from(value: String) -> Self {
		Blob(value.into_bytes())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Blob({}): {:?}", self.0.len(), &self.0[..self.0.len().min(16)])
	}
}
