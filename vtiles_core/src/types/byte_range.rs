//! A contiguous range of bytes inside a container, given as offset and length.

use std::fmt;
use std::ops::Range;

#[derive(Clone, Copy, Eq, Hash, PartialEq, Default)]
pub struct ByteRange {
	pub offset: u64,
	pub length: u64,
}

impl ByteRange {
	pub fn new(offset: u64, length: u64) -> Self {
		Self { offset, length }
	}

	pub fn empty() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.length == 0
	}

	/// Exclusive end of the range. Saturates, so a range read from corrupt bytes still fails
	/// the bounds checks of the readers instead of overflowing.
	pub fn end(&self) -> u64 {
		self.offset.saturating_add(self.length)
	}

	pub fn as_range_usize(&self) -> Range<usize> {
		Range {
			start: self.offset as usize,
			end: self.end() as usize,
		}
	}
}

impl fmt::Debug for ByteRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ByteRange[{},{}]", self.offset, self.length)
	}
}

impl fmt::Display for ByteRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..{}", self.offset, self.end())
	}
}
