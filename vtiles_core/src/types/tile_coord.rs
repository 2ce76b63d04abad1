//! Global tile coordinates (`z/x/y`) in XYZ order.

use anyhow::{Result, ensure};
use std::fmt;

/// Deepest zoom level a coordinate may have.
pub const MAX_ZOOM_LEVEL: u8 = 30;

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		let coord = TileCoord { level, x, y };
		ensure!(level <= MAX_ZOOM_LEVEL, "zoom level {level} is above {MAX_ZOOM_LEVEL}");
		ensure!(coord.is_valid(), "tile {coord:?} lies outside of zoom level {level}");
		Ok(coord)
	}

	/// Number of tiles along one axis at this zoom level.
	pub fn size(&self) -> u64 {
		1u64 << self.level.min(63)
	}

	pub fn is_valid(&self) -> bool {
		self.level <= MAX_ZOOM_LEVEL && u64::from(self.x) < self.size() && u64::from(self.y) < self.size()
	}

	/// Same tile with the y axis flipped (XYZ ↔ TMS).
	pub fn flipped_y(&self) -> TileCoord {
		TileCoord {
			level: self.level,
			x: self.x,
			y: (self.size() - 1 - u64::from(self.y)) as u32,
		}
	}
}

impl fmt::Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}
