//! Per-build field overrides.

use std::any::Any;
use std::fmt;

use crate::value::Value;

/// Override map from attribute name or dotted path to a raw value.
///
/// A top-level key (`"Name"`) replaces the field outright and suppresses its
/// generator. A dotted key (`"Group.Name"`) is applied after every field has
/// been resolved, walking into nested records.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::Options;
///
/// let options = Options::new()
///     .set("Name", "programmer")
///     .set("Group2.Name", "web");
/// assert_eq!(options.len(), 2);
/// assert!(options.contains_key("Group2.Name"));
/// ```
#[derive(Default)]
pub struct Options {
	entries: Vec<(String, Value)>,
}

impl Options {
	/// Creates an empty override map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn set<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
		self.insert(key, Value::new(value));
		self
	}

	/// Adds an override, replacing any earlier one for the same key.
	pub fn insert(&mut self, key: impl Into<String>, value: Value) {
		let key = key.into();
		match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((key, value)),
		}
	}

	/// Number of overrides.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if there are no overrides.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns true if `key` has an override.
	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.iter().any(|(existing, _)| existing == key)
	}

	/// Keys in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(key, _)| key.as_str())
	}

	pub(crate) fn take(&mut self, key: &str) -> Option<Value> {
		let position = self.entries.iter().position(|(existing, _)| existing == key)?;
		Some(self.entries.remove(position).1)
	}

	pub(crate) fn into_entries(self) -> impl Iterator<Item = (String, Value)> {
		self.entries.into_iter()
	}
}

impl<K: Into<String>> FromIterator<(K, Value)> for Options {
	fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
		let mut options = Self::new();
		for (key, value) in iter {
			options.insert(key, value);
		}
		options
	}
}

impl fmt::Debug for Options {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map()
			.entries(self.entries.iter().map(|(key, value)| (key, value)))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_set_replaces_same_key() {
		let mut options = Options::new().set("Name", "a").set("Name", "b");
		assert_eq!(options.len(), 1);
		assert_eq!(options.take("Name").unwrap().downcast::<&str>().unwrap(), "b");
		assert!(options.is_empty());
	}

	#[rstest]
	fn test_take_missing_key() {
		let mut options = Options::new().set("ID", 1i32);
		assert!(options.take("Name").is_none());
		assert_eq!(options.len(), 1);
	}

	#[rstest]
	fn test_collect_keeps_insertion_order() {
		let options: Options = [
			("Group2.Name", Value::new("web")),
			("Name", Value::new("foo")),
			("Group1.Name", Value::new("programmer")),
		]
		.into_iter()
		.collect();
		assert_eq!(
			options.keys().collect::<Vec<_>>(),
			vec!["Group2.Name", "Name", "Group1.Name"]
		);
	}
}
