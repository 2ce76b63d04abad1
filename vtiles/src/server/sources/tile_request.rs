use anyhow::{Context, Result};
use vtiles_core::TileCoord;

/// What a path below `/tiles/{name}/` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileRequest {
	Tile(TileCoord),
	Meta,
	Info,
}

impl TileRequest {
	/// Parses the path segments after the source name.
	///
	/// `Ok(None)` for paths that do not exist, an error for tile paths with malformed numbers.
	/// Anything after the digits of `y` (like `.pbf`) is ignored. Coordinates are not range
	/// checked here; out-of-range tiles are simply absent.
	pub fn parse(parts: &[&str]) -> Result<Option<TileRequest>> {
		Ok(Some(match parts {
			["meta.json" | "tiles.json"] => TileRequest::Meta,
			["info.json"] => TileRequest::Info,
			[z, x, y] => {
				let y: &str = y.split_once('.').map_or(*y, |(digits, _)| digits);
				TileRequest::Tile(TileCoord {
					level: z.parse().with_context(|| format!("value for z is not a number: '{z}'"))?,
					x: x.parse().with_context(|| format!("value for x is not a number: '{x}'"))?,
					y: y.parse().with_context(|| format!("value for y is not a number: '{y}'"))?,
				})
			}
			_ => return Ok(None),
		}))
	}
}
