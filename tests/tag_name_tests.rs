//! Tag key integration tests
//!
//! The tag key is global state, so every test here is serialized and
//! restores the default before returning.

use reinhardt_factory::config;
use reinhardt_factory::prelude::*;
use rstest::{fixture, rstest};
use serial_test::serial;

#[derive(Debug, Clone, Default, PartialEq, Model)]
struct Account {
	#[factory(rename = "ID", tag(db = "account_id"))]
	id: usize,
	#[factory(tag(db = "display_name"))]
	name: String,
	#[factory(rename = "Email")]
	email: String,
}

struct TagGuard;

impl Drop for TagGuard {
	fn drop(&mut self) {
		config::reset_tag_name();
	}
}

#[fixture]
fn db_tag() -> TagGuard {
	config::set_tag_name("db");
	TagGuard
}

/// Tests that attribute names come from the configured tag key
#[rstest]
#[serial(tag_name)]
fn test_custom_tag_key(db_tag: TagGuard) {
	let accounts = Blueprint::builder(Account::default())
		.seq_int("account_id", |n| Ok(n))
		.attr("display_name", |args| Ok(format!("account-{}", args.instance().id)))
		.attr("email", |_| Ok("a@example.com".to_string()))
		.must_build();
	drop(db_tag);

	assert_eq!(accounts.tag_name(), "db");
	assert_eq!(accounts.application_order(), ["account_id", "display_name", "email"]);

	let account = accounts
		.create_with_options(Options::new().set("display_name", "root"))
		.unwrap();
	assert_eq!(account.id, 1);
	assert_eq!(account.name, "root");
	assert_eq!(account.email, "a@example.com");
}

/// Tests that names under another key are not recognized
#[rstest]
#[serial(tag_name)]
fn test_default_names_rejected_under_custom_key(_db_tag: TagGuard) {
	let error = Blueprint::builder(Account::default())
		.attr("ID", |_| Ok(1usize))
		.build()
		.unwrap_err();
	assert_eq!(error.to_string(), "No such attribute name: Account.ID");
}

/// Tests that a blueprint keeps the key it was declared with
#[rstest]
#[serial(tag_name)]
fn test_key_captured_at_declaration() {
	config::reset_tag_name();
	let accounts = Blueprint::builder(Account::default())
		.attr("ID", |_| Ok(7usize))
		.must_build();

	config::set_tag_name("db");
	let _guard = TagGuard;
	let account = accounts
		.create_with_options(Options::new().set("Email", "b@example.com"))
		.unwrap();
	assert_eq!(accounts.tag_name(), config::DEFAULT_TAG_NAME);
	assert_eq!(account.id, 7);
	assert_eq!(account.email, "b@example.com");
	assert_eq!(accounts.application_order(), ["ID", "name", "Email"]);
}
