//! Atomic sequence counters.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonic counter whose first value is 1.
///
/// Clones share the counter. Numbers handed out by a build that later
/// fails are not returned to the sequence.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
	counter: Arc<AtomicI64>,
}

impl Sequence {
	/// Creates a sequence that has not issued anything yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Issues the next number.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::Sequence;
	///
	/// let seq = Sequence::new();
	/// assert_eq!(seq.next(), 1);
	/// assert_eq!(seq.next(), 2);
	/// ```
	pub fn next(&self) -> i64 {
		self.counter.fetch_add(1, Ordering::Relaxed) + 1
	}

	/// Last number issued, 0 if none.
	pub fn peek(&self) -> i64 {
		self.counter.load(Ordering::Relaxed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashSet;

	#[rstest]
	fn test_sequence_starts_at_one() {
		let seq = Sequence::new();
		assert_eq!(seq.peek(), 0);
		assert_eq!(seq.next(), 1);
		assert_eq!(seq.peek(), 1);
	}

	#[rstest]
	fn test_sequence_clones_share_counter() {
		let seq = Sequence::new();
		let other = seq.clone();
		seq.next();
		assert_eq!(other.next(), 2);
	}

	#[rstest]
	fn test_sequence_unique_across_threads() {
		let seq = Sequence::new();
		let issued: Vec<i64> = std::thread::scope(|scope| {
			let handles: Vec<_> = (0..8)
				.map(|_| {
					let seq = seq.clone();
					scope.spawn(move || (0..250).map(|_| seq.next()).collect::<Vec<_>>())
				})
				.collect();
			handles
				.into_iter()
				.flat_map(|handle| handle.join().unwrap())
				.collect()
		});

		let unique: HashSet<i64> = issued.iter().copied().collect();
		assert_eq!(unique.len(), 2000);
		assert_eq!(unique.iter().min(), Some(&1));
		assert_eq!(unique.iter().max(), Some(&2000));
	}
}
