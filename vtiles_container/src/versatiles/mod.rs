mod reader;
pub mod types;

pub use reader::*;
