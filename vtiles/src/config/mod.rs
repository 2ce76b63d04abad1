//! Server configuration.
//!
//! - [`Config`](crate::config::Config): top-level value and YAML loader
//! - [`ServerConfig`](crate::config::ServerConfig): network and negotiation settings
//! - [`TileSourceConfig`](crate::config::TileSourceConfig): one served container
//!
//! A config file is optional. Command line flags override what it sets, and the result is
//! passed to [`TileServer::from_config`](crate::server::TileServer::from_config) once at startup.

mod main;
mod server;
mod tile_source;

pub use main::Config;
pub use server::ServerConfig;
pub use tile_source::TileSourceConfig;
