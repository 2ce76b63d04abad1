//! A lazily computed value that is loaded at most once, even under concurrent access.
//!
//! The cell moves from *unloaded* to *loading* when the first caller starts the loader.
//! Callers arriving while a load is in flight wait for that load instead of starting their
//! own. A successful load moves the cell to *ready* for good. A failed load is returned to
//! the caller that ran it and the cell falls back to *unloaded*, so the next caller retries.

use anyhow::Result;
use std::{fmt, future::Future};
use tokio::sync::OnceCell;

pub struct MemoCell<T> {
	cell: OnceCell<T>,
}

impl<T> MemoCell<T> {
	pub fn new() -> Self {
		Self { cell: OnceCell::new() }
	}

	/// Returns the loaded value, running `load` only if no value is stored yet.
	pub async fn get_or_try_load<F, Fut>(&self, load: F) -> Result<&T>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		self.cell.get_or_try_init(load).await
	}

	/// The value, if a load has already succeeded.
	pub fn get(&self) -> Option<&T> {
		self.cell.get()
	}

	pub fn is_ready(&self) -> bool {
		self.cell.initialized()
	}
}

impl<T> Default for MemoCell<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: fmt::Debug> fmt::Debug for MemoCell<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.get() {
			Some(value) => f.debug_tuple("MemoCell").field(value).finish(),
			None => f.write_str("MemoCell(<unloaded>)"),
		}
	}
}
