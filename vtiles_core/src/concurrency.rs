//! Concurrency limits derived from the number of available CPUs.
//!
//! ```
//! use vtiles_core::ConcurrencyLimits;
//!
//! let limits = ConcurrencyLimits::default();
//! assert!(limits.io_bound > limits.cpu_bound);
//! ```

/// Upper bounds for parallel work, split by workload type.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyLimits {
	/// Outstanding I/O operations (range requests, file reads). 3× CPU count.
	pub io_bound: usize,
	/// CPU heavy work such as recompression. 1× CPU count.
	pub cpu_bound: usize,
}

impl ConcurrencyLimits {
	pub fn new(io_bound: usize, cpu_bound: usize) -> Self {
		Self {
			io_bound: io_bound.max(1),
			cpu_bound: cpu_bound.max(1),
		}
	}
}

impl Default for ConcurrencyLimits {
	fn default() -> Self {
		let cpus = num_cpus::get();
		Self::new(cpus * 3, cpus)
	}
}
