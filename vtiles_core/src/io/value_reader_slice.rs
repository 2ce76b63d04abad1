//! Sequential decoding of fixed-width values from a byte slice.
//!
//! ```rust
//! use vtiles_core::io::ValueReaderSlice;
//!
//! let mut reader = ValueReaderSlice::new_be(&[0x01, 0x02, 0x03, 0x04, 0xff]);
//! assert_eq!(reader.read_u32().unwrap(), 0x01020304);
//! assert_eq!(reader.read_u8().unwrap(), 0xff);
//! assert!(reader.read_u8().is_err());
//! ```

use crate::ByteRange;
use anyhow::{Context, Result};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::{io::Cursor, marker::PhantomData};

pub struct ValueReaderSlice<'a, E: ByteOrder> {
	_phantom: PhantomData<E>,
	cursor: Cursor<&'a [u8]>,
}

impl<'a, E: ByteOrder> ValueReaderSlice<'a, E> {
	pub fn new(slice: &'a [u8]) -> ValueReaderSlice<'a, E> {
		ValueReaderSlice {
			_phantom: PhantomData,
			cursor: Cursor::new(slice),
		}
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		self.cursor.read_u8().context("reading u8")
	}

	pub fn read_u32(&mut self) -> Result<u32> {
		self.cursor.read_u32::<E>().context("reading u32")
	}

	pub fn read_u64(&mut self) -> Result<u64> {
		self.cursor.read_u64::<E>().context("reading u64")
	}

	pub fn read_i32(&mut self) -> Result<i32> {
		self.cursor.read_i32::<E>().context("reading i32")
	}

	pub fn read_f32(&mut self) -> Result<f32> {
		self.cursor.read_f32::<E>().context("reading f32")
	}

	/// Reads an offset followed by a length, both u64.
	pub fn read_range(&mut self) -> Result<ByteRange> {
		Ok(ByteRange::new(self.read_u64()?, self.read_u64()?))
	}
}

impl<'a> ValueReaderSlice<'a, BigEndian> {
	pub fn new_be(slice: &'a [u8]) -> ValueReaderSlice<'a, BigEndian> {
		ValueReaderSlice::new(slice)
	}
}
