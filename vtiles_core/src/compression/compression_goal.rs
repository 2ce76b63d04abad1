use std::fmt::{self, Debug};

/// How much CPU the server may spend on re-encoding a response.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionGoal {
	/// Recompress whenever the client accepts a better encoding than the stored one.
	#[default]
	UseBestCompression,
	/// Never re-encode; only decompress when the client cannot read the stored encoding.
	UseFastCompression,
}

impl Debug for CompressionGoal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UseBestCompression => write!(f, "Use Best Compression"),
			Self::UseFastCompression => write!(f, "Use Fast Compression"),
		}
	}
}
