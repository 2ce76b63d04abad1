//! Parsing of the HTTP `Accept-Encoding` header into the set of allowed tile compressions.
//!
//! Only `gzip` and `br` are recognised; a wildcard `*` stands for both. A token with `q=0`
//! is disabled, every other quality value enables it. Unknown tokens are ignored.
//! Identity is always allowed, since every client can read uncompressed bytes.
//!
//! ```
//! use axum::http::{HeaderMap, header};
//! use enumset::enum_set;
//! use vtiles::server::encoding::get_encoding;
//! use vtiles_core::{TileCompression as TC, compression::TargetCompression};
//!
//! let mut headers = HeaderMap::new();
//! assert_eq!(get_encoding(&headers), TargetCompression::from_none());
//!
//! headers.insert(header::ACCEPT_ENCODING, "gzip, br;q=0".parse().unwrap());
//! assert_eq!(get_encoding(&headers), TargetCompression::from_set(enum_set!(TC::Gzip)));
//! ```

use axum::http::{HeaderMap, header};
use vtiles_core::{TileCompression, compression::TargetCompression};

/// Converts `Accept-Encoding` into a [`TargetCompression`].
///
/// A missing header or one that is not valid visible ASCII allows identity only.
/// A `q` value that cannot be parsed counts as `1.0`.
pub fn get_encoding(headers: &HeaderMap) -> TargetCompression {
	let mut target = TargetCompression::from_none();

	let Some(accept) = headers.get(header::ACCEPT_ENCODING).and_then(|v| v.to_str().ok()) else {
		return target;
	};

	for (coding, quality) in accept.split(',').filter_map(parse_coding) {
		if quality <= 0.0 {
			continue;
		}
		if coding.eq_ignore_ascii_case("gzip") {
			target.insert(TileCompression::Gzip);
		} else if coding.eq_ignore_ascii_case("br") {
			target.insert(TileCompression::Brotli);
		} else if coding == "*" {
			target.insert(TileCompression::Gzip);
			target.insert(TileCompression::Brotli);
		}
	}

	target
}

/// Splits `name;q=0.5;other=x` into the coding name and its quality. The last valid `q` wins.
fn parse_coding(item: &str) -> Option<(&str, f32)> {
	let mut parts = item.split(';');
	let coding = parts.next()?.trim();
	if coding.is_empty() {
		return None;
	}
	let quality = parts
		.filter_map(|param| param.trim().strip_prefix("q="))
		.filter_map(|value| value.trim().parse::<f32>().ok())
		.next_back()
		.unwrap_or(1.0);
	Some((coding, quality))
}
