//! Codecs for tile payloads and the negotiation between stored and accepted encodings.

mod compression_goal;
mod functions;
mod method_brotli;
mod method_gzip;
mod negotiate;
mod target_compression;
#[cfg(test)]
pub(crate) mod test_utils;

pub use compression_goal::*;
pub use functions::*;
pub use method_brotli::*;
pub use method_gzip::*;
pub use negotiate::*;
pub use target_compression::*;
