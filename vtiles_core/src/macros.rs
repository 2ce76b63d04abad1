/// Asserts that the `Display` output of an expression matches a wildcard pattern.
///
/// ```
/// use vtiles_core::assert_wildcard;
/// assert_wildcard!("corrupt tile index: 13 bytes", "corrupt tile index: *");
/// ```
#[macro_export]
macro_rules! assert_wildcard {
	($expression:expr, $wildcard:expr) => {
		let expression = format!("{}", $expression);
		if !wildmatch::WildMatch::new($wildcard).matches(&expression) {
			panic!(
				"assertion failed: expression \"{expression:?}\" does not match wildcard \"{}\"",
				$wildcard
			)
		}
	};
}
