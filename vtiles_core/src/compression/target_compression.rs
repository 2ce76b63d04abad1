use super::CompressionGoal;
use crate::TileCompression;
use enumset::EnumSet;
use std::fmt::{self, Debug};

/// Encodings a client accepts, together with the server's [`CompressionGoal`].
///
/// `Uncompressed` is always part of the set: identity is the fallback every client can read.
#[derive(Clone, PartialEq)]
pub struct TargetCompression {
	pub compressions: EnumSet<TileCompression>,
	pub compression_goal: CompressionGoal,
}

impl TargetCompression {
	pub fn from_set(mut compressions: EnumSet<TileCompression>) -> Self {
		compressions.insert(TileCompression::Uncompressed);
		TargetCompression {
			compressions,
			compression_goal: CompressionGoal::UseBestCompression,
		}
	}

	pub fn from(compression: TileCompression) -> Self {
		Self::from_set(EnumSet::only(compression))
	}

	pub fn from_none() -> Self {
		Self::from(TileCompression::Uncompressed)
	}

	pub fn set_fast_compression(&mut self) {
		self.compression_goal = CompressionGoal::UseFastCompression;
	}

	pub fn is_fast(&self) -> bool {
		self.compression_goal == CompressionGoal::UseFastCompression
	}

	pub fn contains(&self, compression: TileCompression) -> bool {
		self.compressions.contains(compression)
	}

	pub fn insert(&mut self, compression: TileCompression) {
		self.compressions.insert(compression);
	}
}

impl Debug for TargetCompression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TargetCompression")
			.field("allowed_compressions", &self.compressions)
			.field("compression_goal", &self.compression_goal)
			.finish()
	}
}
