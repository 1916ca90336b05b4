//! Ambient context shared by every build in a tree.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// Type-keyed bag of values handed unchanged to every generator and
/// callback of a build, including nested sub-builds.
///
/// Clones share storage, so a value set by one generator is visible to
/// the rest of the tree.
#[derive(Clone, Default)]
pub struct Context {
	values: Arc<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl Context {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style [`set`](Self::set).
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::Context;
	///
	/// struct Tenant(&'static str);
	///
	/// let context = Context::new().with(Tenant("acme"));
	/// assert_eq!(context.get::<Tenant>().unwrap().0, "acme");
	/// ```
	pub fn with<T: Any + Send + Sync>(self, value: T) -> Self {
		self.set(value);
		self
	}

	/// Retrieves the value stored for `T`.
	pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.values
			.read()
			.get(&TypeId::of::<T>())
			.and_then(|value| value.clone().downcast::<T>().ok())
	}

	/// Stores a value, replacing any previous value of the same type.
	pub fn set<T: Any + Send + Sync>(&self, value: T) {
		self.set_arc(Arc::new(value));
	}

	/// Stores a pre-wrapped `Arc<T>`.
	pub fn set_arc<T: Any + Send + Sync>(&self, value: Arc<T>) {
		self.values.write().insert(TypeId::of::<T>(), value);
	}

	/// Returns true if a value of type `T` is stored.
	pub fn contains<T: Any + Send + Sync>(&self) -> bool {
		self.values.read().contains_key(&TypeId::of::<T>())
	}

	/// Number of stored values.
	pub fn len(&self) -> usize {
		self.values.read().len()
	}

	/// Returns true if nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl fmt::Debug for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context").field("len", &self.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Debug, PartialEq)]
	struct TxHandle(u32);

	#[rstest]
	fn test_context_set_and_get() {
		let context = Context::new();
		assert!(context.is_empty());
		context.set(TxHandle(7));
		context.set("hyuti from ctx".to_string());

		assert_eq!(*context.get::<TxHandle>().unwrap(), TxHandle(7));
		assert_eq!(context.get::<String>().unwrap().as_str(), "hyuti from ctx");
		assert_eq!(context.len(), 2);
	}

	#[rstest]
	fn test_context_missing_value() {
		let context = Context::new();
		assert!(context.get::<TxHandle>().is_none());
		assert!(!context.contains::<TxHandle>());
	}

	#[rstest]
	fn test_context_clones_share_values() {
		let context = Context::new();
		let shared = context.clone();
		shared.set_arc(Arc::new(TxHandle(1)));
		assert!(context.contains::<TxHandle>());
	}

	#[rstest]
	fn test_context_replaces_same_type() {
		let context = Context::new().with(TxHandle(1)).with(TxHandle(2));
		assert_eq!(*context.get::<TxHandle>().unwrap(), TxHandle(2));
		assert_eq!(context.len(), 1);
	}
}
