//! Building blocks shared by the vtiles crates.
//!
//! - [`types`]: blobs, byte ranges, tile coordinates, tile formats and compressions
//! - [`io`]: random-access byte sources (file, HTTP, memory) and a big-endian value reader
//! - [`compression`]: gzip/brotli codecs and `accept-encoding` negotiation
//! - [`cache`]: single-flight memo cells for lazily loaded structures

pub mod cache;
pub mod compression;
mod concurrency;
pub mod io;
mod macros;
pub mod types;

pub use concurrency::ConcurrencyLimits;
pub use types::*;
