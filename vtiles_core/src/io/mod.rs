//! Random-access byte sources and binary value decoding.
//!
//! A container is never loaded as a whole; every structure is fetched with a
//! `read_range` call on a [`DataReader`]. [`open_data_reader`] picks the
//! implementation from the source string.

mod data_reader;
mod data_reader_blob;
mod data_reader_file;
mod data_reader_http;
mod value_reader_slice;

pub use data_reader::*;
pub use data_reader_blob::*;
pub use data_reader_file::*;
pub use data_reader_http::*;
pub use value_reader_slice::*;

use anyhow::Result;
use reqwest::Url;
use std::path::Path;

/// Opens `source` as an HTTP(S) reader when it looks like a URL, otherwise as a local file.
pub fn open_data_reader(source: &str) -> Result<DataReader> {
	if source.starts_with("http://") || source.starts_with("https://") {
		Ok(DataReaderHttp::from_url(Url::parse(source)?)?)
	} else {
		Ok(DataReaderFile::open(Path::new(source))?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{NamedTempFile, prelude::*};

	#[test]
	fn dispatches_on_scheme() {
		let reader = open_data_reader("https://example.org/tiles.versatiles").unwrap();
		assert_eq!(reader.get_name(), "https://example.org/tiles.versatiles");

		let file = NamedTempFile::new("tiles.versatiles").unwrap();
		file.write_binary(b"abc").unwrap();
		let reader = open_data_reader(file.path().to_str().unwrap()).unwrap();
		assert!(reader.get_name().ends_with("tiles.versatiles"));

		assert!(open_data_reader("/does/not/exist.versatiles").is_err());
	}
}
