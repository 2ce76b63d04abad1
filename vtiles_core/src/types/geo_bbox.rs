//! Geographic bounding box in degrees.

use std::fmt;

/// West, south, east and north bounds.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct GeoBBox {
	pub west: f64,
	pub south: f64,
	pub east: f64,
	pub north: f64,
}

impl GeoBBox {
	pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
		Self {
			west,
			south,
			east,
			north,
		}
	}

	pub fn as_array(&self) -> [f64; 4] {
		[self.west, self.south, self.east, self.north]
	}
}

impl fmt::Debug for GeoBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}, {}, {}]", self.west, self.south, self.east, self.north)
	}
}
