use crate::ContainerError;
use anyhow::Result;
use serde_json::Value;
use vtiles_core::Blob;

/// The optional JSON document stored next to the tiles.
#[derive(Clone, Debug, PartialEq)]
pub enum Metadata {
	/// The container has no metadata section.
	Absent,
	Json(Value),
}

impl Metadata {
	/// Parses decompressed metadata bytes.
	pub fn from_blob(blob: &Blob) -> Result<Metadata> {
		let value: Value = serde_json::from_slice(blob.as_slice())
			.map_err(|err| ContainerError::CorruptMetadata(err.to_string()))?;
		Ok(Metadata::Json(value))
	}

	pub fn as_json(&self) -> Option<&Value> {
		match self {
			Metadata::Absent => None,
			Metadata::Json(value) => Some(value),
		}
	}

	pub fn is_absent(&self) -> bool {
		matches!(self, Metadata::Absent)
	}
}
