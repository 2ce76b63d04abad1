//! Choosing the response encoding for a stored tile.
//!
//! | stored | client accepts        | best compression   | fast            |
//! |--------|-----------------------|--------------------|-----------------|
//! | brotli | br                    | pass through       | pass through    |
//! | brotli | gzip, no br           | gzip               | identity        |
//! | brotli | neither               | identity           | identity        |
//! | gzip   | gzip                  | pass through       | pass through    |
//! | gzip   | no gzip               | identity           | identity        |
//! | none   | br                    | brotli             | identity        |
//! | none   | gzip, no br           | gzip               | identity        |
//! | none   | neither               | identity           | identity        |
//!
//! Gzip tiles are never upgraded to brotli: the stored encoding is good enough when the
//! client can read it.

use super::{TargetCompression, compress_brotli, compress_gzip, decompress_brotli, decompress_gzip};
use crate::{Blob, TileCompression};
use anyhow::Result;
use vtiles_derive::context;

/// Converts `blob`, stored with `stored`, into an encoding `target` accepts.
///
/// Returns the (possibly transformed) bytes and the encoding they are now in.
/// Any codec failure is returned as an error; corrupt bytes are never passed on.
#[context("negotiating compression for {stored} tile with {target:?}")]
pub fn negotiate_compression(
	blob: Blob,
	stored: TileCompression,
	target: &TargetCompression,
) -> Result<(Blob, TileCompression)> {
	use TileCompression::*;

	let may_encode = !target.is_fast();

	let result = match stored {
		Brotli => {
			if target.contains(Brotli) {
				(blob, Brotli)
			} else {
				let raw = decompress_brotli(&blob)?;
				if may_encode && target.contains(Gzip) {
					(compress_gzip(&raw)?, Gzip)
				} else {
					(raw, Uncompressed)
				}
			}
		}
		Gzip => {
			if target.contains(Gzip) {
				(blob, Gzip)
			} else {
				(decompress_gzip(&blob)?, Uncompressed)
			}
		}
		Uncompressed => {
			if may_encode && target.contains(Brotli) {
				(compress_brotli(&blob)?, Brotli)
			} else if may_encode && target.contains(Gzip) {
				(compress_gzip(&blob)?, Gzip)
			} else {
				(blob, Uncompressed)
			}
		}
	};

	log::trace!("negotiated {stored} -> {} for {target:?}", result.1);
	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::super::{compress, decompress, test_utils::generate_test_data};
	use super::*;
	use TileCompression::*;
	use enumset::{EnumSet, enum_set};
	use rstest::rstest;

	fn target(accepted: EnumSet<TileCompression>, fast: bool) -> TargetCompression {
		let mut target = TargetCompression::from_set(accepted);
		if fast {
			target.set_fast_compression();
		}
		target
	}

	#[rstest]
	#[case(Brotli, enum_set!(Brotli), false, Brotli)]
	#[case(Brotli, enum_set!(Brotli | Gzip), true, Brotli)]
	#[case(Brotli, enum_set!(Gzip), false, Gzip)]
	#[case(Brotli, enum_set!(Gzip), true, Uncompressed)]
	#[case(Brotli, enum_set!(), false, Uncompressed)]
	#[case(Gzip, enum_set!(Gzip), false, Gzip)]
	#[case(Gzip, enum_set!(Gzip | Brotli), false, Gzip)]
	#[case(Gzip, enum_set!(Brotli), false, Uncompressed)]
	#[case(Gzip, enum_set!(), true, Uncompressed)]
	#[case(Uncompressed, enum_set!(Brotli | Gzip), false, Brotli)]
	#[case(Uncompressed, enum_set!(Gzip), false, Gzip)]
	#[case(Uncompressed, enum_set!(Brotli | Gzip), true, Uncompressed)]
	#[case(Uncompressed, enum_set!(), false, Uncompressed)]
	fn decision_table(
		#[case] stored: TileCompression,
		#[case] accepted: EnumSet<TileCompression>,
		#[case] fast: bool,
		#[case] expected: TileCompression,
	) -> Result<()> {
		let raw = generate_test_data(2_000);
		let blob = compress(raw.clone(), stored)?;

		let (output, compression) = negotiate_compression(blob.clone(), stored, &target(accepted, fast))?;

		assert_eq!(compression, expected);
		assert_eq!(decompress(output.clone(), compression)?, raw);
		if compression == stored {
			assert_eq!(output, blob, "pass-through must not touch the bytes");
		}
		Ok(())
	}

	#[test]
	fn brotli_to_gzip_for_gzip_only_client() -> Result<()> {
		let raw = generate_test_data(3_000);
		let stored = compress_brotli(&raw)?;
		let (output, compression) = negotiate_compression(stored, Brotli, &target(enum_set!(Gzip), false))?;
		assert_eq!(compression, Gzip);
		assert_eq!(decompress_gzip(&output)?, raw);
		Ok(())
	}

	#[test]
	fn corrupt_input_is_an_error() {
		let err = negotiate_compression(Blob::from("not gzip"), Gzip, &TargetCompression::from_none()).unwrap_err();
		assert!(err.to_string().starts_with("negotiating compression for gzip tile"));
	}
}
