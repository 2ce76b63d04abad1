//! # vtiles
//!
//! Serves the tiles of VersaTiles containers over HTTP.
//!
//! Containers are read from the local filesystem or from `http(s)://` URLs with range requests.
//! Tiles are re-encoded on the fly to match what each client accepts.
//!
//! ## Usage Example
//!
//! ```no_run
//! use vtiles::{Config, server::TileServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_string("tiles:\n  - src: ./berlin.versatiles\n")?;
//!     let mut server = TileServer::from_config(&config).await?;
//!     server.start().await?;
//!     server.stop().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod server;

pub use config::{Config, ServerConfig, TileSourceConfig};
pub use vtiles_container as container;
pub use vtiles_core as core;
