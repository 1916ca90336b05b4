//! Library-wide settings.
//!
//! The only setting is the tag key used to resolve a field's attribute
//! name. A blueprint reads the key once, when it is declared.

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Tag key used until [`set_tag_name`] is called.
pub const DEFAULT_TAG_NAME: &str = "factory";

static TAG_NAME: Lazy<RwLock<String>> = Lazy::new(|| RwLock::new(DEFAULT_TAG_NAME.to_string()));

/// Returns the current tag key.
pub fn tag_name() -> String {
	TAG_NAME.read().clone()
}

/// Changes the tag key for blueprints declared from now on.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::config;
///
/// config::set_tag_name("fixture");
/// assert_eq!(config::tag_name(), "fixture");
/// config::reset_tag_name();
/// assert_eq!(config::tag_name(), config::DEFAULT_TAG_NAME);
/// ```
pub fn set_tag_name(name: impl Into<String>) {
	let name = name.into();
	tracing::debug!(tag = %name, "factory tag key changed");
	*TAG_NAME.write() = name;
}

/// Restores [`DEFAULT_TAG_NAME`].
pub fn reset_tag_name() {
	set_tag_name(DEFAULT_TAG_NAME);
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	// Changing the key is covered in tests/tag_name_tests.rs; unit tests in
	// this crate declare blueprints concurrently and rely on the default.
	#[rstest]
	fn test_default_tag_name() {
		assert_eq!(tag_name(), DEFAULT_TAG_NAME);
		assert_eq!(DEFAULT_TAG_NAME, "factory");
	}
}
