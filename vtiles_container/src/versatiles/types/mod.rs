//! On-disk structures of a VersaTiles container.

mod block_definition;
mod block_index;
mod file_header;
mod format_version;
mod metadata;
mod tile_index;

pub use block_definition::BlockDefinition;
pub use block_index::BlockIndex;
pub use file_header::{FileHeader, HEADER_LENGTH};
pub use format_version::{BBoxEncoding, FormatVersion, MAGIC_LENGTH};
pub use metadata::Metadata;
pub use tile_index::{TILE_INDEX_RECORD_LENGTH, TileIndex};
