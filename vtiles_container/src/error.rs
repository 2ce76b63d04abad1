use thiserror::Error;

/// Faults that make a container (or a part of it) unreadable.
///
/// These travel inside `anyhow::Error`; use `err.downcast_ref::<ContainerError>()` to tell
/// them apart from I/O faults. A tile that simply does not exist is not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
	#[error("invalid container: {0}")]
	InvalidContainer(String),
	#[error("corrupt block index: {0}")]
	CorruptBlockIndex(String),
	#[error("corrupt tile index: {0}")]
	CorruptTileIndex(String),
	#[error("corrupt metadata: {0}")]
	CorruptMetadata(String),
}
