//! Declarative object factories for test fixtures and seed data.
//!
//! This crate lets test and fixture code describe once how to build a valid
//! instance of a model, then stamp out as many instances as needed:
//!
//! - **Blueprints**: per-field generators, static defaults taken from a
//!   prototype instance, and a post-build callback
//! - **Sequences**: atomic counters for unique ids and names
//! - **Sub-factories**: nested instances, lists of them, and bounded
//!   self-referential chains
//! - **Overrides**: per-build values for any field, including nested
//!   fields addressed by dotted paths (`"Group.Name"`)
//! - **Context**: caller-defined values visible to every generator in a
//!   build tree
//!
//! # Quick Start
//!
//! ```
//! use reinhardt_factory::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Model)]
//! struct Group {
//!     #[factory(rename = "Name")]
//!     name: String,
//! }
//!
//! #[derive(Debug, Clone, Default, Model)]
//! struct User {
//!     #[factory(rename = "ID")]
//!     id: i64,
//!     #[factory(rename = "Name")]
//!     name: String,
//!     #[factory(rename = "Location")]
//!     location: String,
//!     #[factory(rename = "Group")]
//!     group: Option<Box<Group>>,
//! }
//!
//! let users = Blueprint::builder(User { location: "Tokyo".into(), ..Default::default() })
//!     .seq_int64("ID", |n| Ok(n))
//!     .attr("Name", |args| Ok(format!("user-{}", args.instance().id)))
//!     .must_build();
//!
//! let user = users.must_create();
//! assert_eq!((user.id, user.name.as_str(), user.location.as_str()), (1, "user-1", "Tokyo"));
//!
//! let user = users.must_create_with_options(
//!     Options::new().set("Name", "admin").set("Group.Name", "staff"),
//! );
//! assert_eq!(user.name, "admin");
//! assert_eq!(user.group.unwrap().name, "staff");
//! ```
//!
//! # Architecture
//!
//! - [`Model`] - Field descriptor table, usually derived
//! - [`FieldValue`] - Per-type assignment contract for field values
//! - [`Blueprint`] / [`BlueprintBuilder`] - Declaration and the build algorithm
//! - [`Args`] - What a generator sees: the instance so far, its parent, the context
//! - [`Sequence`], [`AttributeGenerator`], [`Formatter`] - Value production
//! - [`registry`] - Process-wide lookup of blueprints by model name or type
//! - [`config`] - The tag key used to resolve attribute names
//!
//! A blueprint is frozen before use, so the same blueprint can be built from
//! any number of threads at once; only sequence counters are shared between
//! builds.

#![warn(missing_docs)]

extern crate self as reinhardt_factory;

pub mod args;
pub mod blueprint;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod prelude;
pub mod registry;
pub mod sequence;
pub mod value;

pub use args::{AnyArgs, Args};
pub use blueprint::{Blueprint, BlueprintBuilder};
pub use context::Context;
pub use error::{BoxError, ConfigError, ConfigResult, FactoryError, FactoryResult};
pub use generator::{AttributeGenerator, Formatter};
pub use model::{Field, Model, Record};
pub use options::Options;
pub use pipeline::{CounterKey, Pipeline};
pub use registry::{AnyBlueprint, BlueprintRegistry};
pub use sequence::Sequence;
pub use value::{FieldValue, Value};

pub use reinhardt_factory_macros::{FieldValue, Model};
