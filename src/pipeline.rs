//! Per-build-tree recursion bookkeeping.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::args::AnyArgs;

/// Identifies a recursive field: the model that declares it and its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterKey {
	model: TypeId,
	index: usize,
}

impl CounterKey {
	/// Key for field `index` of model `M`.
	pub fn of<M: 'static>(index: usize) -> Self {
		Self {
			model: TypeId::of::<M>(),
			index,
		}
	}
}

/// Recursion counters and the link to the parent build.
///
/// A root pipeline is created for every top-level build. Each sub-build
/// receives a [`branch`](Pipeline::branch): a deep copy of the counters, so
/// sibling sub-builds count down independently.
pub struct Pipeline<'a> {
	counters: RefCell<HashMap<CounterKey, i64>>,
	parent: Option<&'a dyn AnyArgs>,
	depth: usize,
}

impl<'a> Pipeline<'a> {
	pub(crate) fn root() -> Self {
		Self {
			counters: RefCell::new(HashMap::new()),
			parent: None,
			depth: 0,
		}
	}

	/// Copies the counters for a sub-build whose parent context is `parent`.
	pub(crate) fn branch<'b>(&self, parent: &'b dyn AnyArgs) -> Pipeline<'b> {
		Pipeline {
			counters: RefCell::new(self.counters.borrow().clone()),
			parent: Some(parent),
			depth: self.depth + 1,
		}
	}

	/// Context of the build that started this one.
	pub fn parent(&self) -> Option<&'a dyn AnyArgs> {
		self.parent
	}

	/// Number of sub-build levels above this pipeline.
	pub fn depth(&self) -> usize {
		self.depth
	}

	/// Remaining depth for a recursive field, `None` until first visited.
	pub fn remaining(&self, key: CounterKey) -> Option<i64> {
		self.counters.borrow().get(&key).copied()
	}

	/// Sets the counter on first visit only.
	pub(crate) fn ensure_counter(&self, key: CounterKey, limit: impl FnOnce() -> usize) {
		self.counters
			.borrow_mut()
			.entry(key)
			.or_insert_with(|| i64::try_from(limit()).unwrap_or(i64::MAX));
	}

	/// Spends one level of depth; true while the counter has not gone negative.
	pub(crate) fn advance(&self, key: CounterKey) -> bool {
		let mut counters = self.counters.borrow_mut();
		let counter = counters.entry(key).or_insert(0);
		*counter -= 1;
		*counter >= 0
	}
}

impl fmt::Debug for Pipeline<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pipeline")
			.field("counters", &self.counters.borrow())
			.field("has_parent", &self.parent.is_some())
			.field("depth", &self.depth)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct Friend;

	#[rstest]
	fn test_counter_initialized_once() {
		let pipeline = Pipeline::root();
		let key = CounterKey::of::<Friend>(2);
		assert_eq!(pipeline.remaining(key), None);

		pipeline.ensure_counter(key, || 2);
		pipeline.ensure_counter(key, || 10);
		assert_eq!(pipeline.remaining(key), Some(2));
	}

	#[rstest]
	fn test_advance_counts_down_to_zero() {
		let pipeline = Pipeline::root();
		let key = CounterKey::of::<Friend>(0);
		pipeline.ensure_counter(key, || 2);

		assert!(pipeline.advance(key));
		assert!(pipeline.advance(key));
		assert!(!pipeline.advance(key));
		assert_eq!(pipeline.remaining(key), Some(-1));
	}

	#[rstest]
	fn test_keys_differ_by_model() {
		struct Other;
		assert_ne!(CounterKey::of::<Friend>(1), CounterKey::of::<Other>(1));
		assert_eq!(CounterKey::of::<Friend>(1), CounterKey::of::<Friend>(1));
	}
}
