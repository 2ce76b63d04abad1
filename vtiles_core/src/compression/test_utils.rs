use crate::Blob;

/// Deterministic, moderately compressible bytes.
pub fn generate_test_data(size: usize) -> Blob {
	let data: Vec<u8> = (0..size)
		.map(|i| {
			let v = (i as f64 + 1.0).sin() * 1_000_000.0 + i as f64;
			(v % 256.0) as u8
		})
		.collect();
	Blob::from(data)
}
