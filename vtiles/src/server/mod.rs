//! HTTP tile server.
//!
//! Tiles are served at `/tiles/{name}/{z}/{x}/{y}`, container metadata at
//! `/tiles/{name}/meta.json` and a source summary at `/tiles/{name}/info.json`.

pub mod encoding;
mod handlers;
mod routes;
mod sources;
mod tile_server;

pub use sources::TileSource;
pub use tile_server::TileServer;
