mod response;
mod tile_request;
mod tile_source;

pub use response::SourceResponse;
pub use tile_request::TileRequest;
pub use tile_source::TileSource;
