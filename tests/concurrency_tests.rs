//! Concurrent build integration tests
//!
//! A frozen blueprint is shared between threads; each build owns its
//! instance and recursion counters, and only sequences are shared.

use reinhardt_factory::prelude::*;
use rstest::{fixture, rstest};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Model)]
struct User {
	#[factory(rename = "ID")]
	id: usize,
	#[factory(rename = "Name")]
	name: String,
	#[factory(rename = "Friend")]
	friend: Option<Box<User>>,
}

#[fixture]
fn users() -> Blueprint<User> {
	Blueprint::builder(User::default())
		.seq_int("ID", |n| Ok(n))
		.attr("Name", |args| Ok(format!("user-{}", args.instance().id)))
		.must_build()
}

/// Tests that 1000 builds on the blocking pool never repeat a sequence number
#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_builds_unique(users: Blueprint<User>) {
	let mut handles = Vec::with_capacity(1000);
	for _ in 0..1000 {
		let users = users.clone();
		handles.push(tokio::task::spawn_blocking(move || users.create()));
	}

	let mut ids = HashSet::new();
	for handle in handles {
		let user = handle.await.unwrap().unwrap();
		assert_eq!(user.name, format!("user-{}", user.id));
		assert!(ids.insert(user.id), "duplicate id {}", user.id);
	}
	assert_eq!(ids.len(), 1000);
	assert_eq!(ids.iter().copied().max(), Some(1000));
}

/// Tests that recursion counters are not shared between concurrent builds
#[rstest]
fn test_concurrent_recursive_builds() {
	let users = Arc::new(
		Blueprint::builder(User::default())
			.seq_int("ID", |n| Ok(n))
			.sub_recursive_factory("Friend", || 2)
			.must_build(),
	);

	std::thread::scope(|scope| {
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let users = Arc::clone(&users);
				scope.spawn(move || {
					(0..50)
						.map(|_| users.must_create())
						.collect::<Vec<_>>()
				})
			})
			.collect();

		let mut ids = HashSet::new();
		for handle in handles {
			for user in handle.join().unwrap() {
				let friend = user.friend.as_deref().unwrap();
				let last = friend.friend.as_deref().unwrap();
				assert!(last.friend.is_none());
				for id in [user.id, friend.id, last.id] {
					assert!(ids.insert(id));
				}
			}
		}
		assert_eq!(ids.len(), 8 * 50 * 3);
	});
}
