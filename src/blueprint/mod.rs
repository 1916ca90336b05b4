//! Blueprints: the declared shape of one model and the build algorithm.
//!
//! A blueprint is declared through a [`BlueprintBuilder`] and frozen by
//! [`BlueprintBuilder::build`]. Freezing computes the application order
//! once: every field bound to a generator, in first-declaration order,
//! followed by every remaining field in struct order. A frozen blueprint
//! never changes, so any number of threads may build from it at once.
//!
//! ## Example
//!
//! ```
//! use reinhardt_factory::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Model)]
//! struct Group {
//!     #[factory(rename = "ID")]
//!     id: i64,
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
//! let groups = Blueprint::builder(Group::default())
//!     .seq_int64("ID", |n| Ok(n))
//!     .seq_string("Name", |n| Ok(format!("group-{n}")))
//!     .must_build();
//!
//! let users = Blueprint::builder(User { location: "Tokyo".into(), ..Default::default() })
//!     .seq_int64("ID", |n| Ok(n))
//!     .attr("Name", |args| Ok(format!("user-{}", args.instance().id)))
//!     .sub_factory("Group", &groups)
//!     .must_build();
//!
//! let user = users.must_create();
//! assert_eq!(user.name, "user-1");
//! assert_eq!(user.location, "Tokyo");
//! assert_eq!(user.group.unwrap().name, "group-1");
//! assert_eq!(users.application_order(), ["ID", "Name", "Group", "Location"]);
//! ```

mod build;
mod builder;
mod path;

pub use builder::BlueprintBuilder;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::args::Args;
use crate::error::FactoryResult;
use crate::generator::AttributeGenerator;
use crate::model::{Field, Model};

pub(crate) type OnCreate<M> = Arc<dyn Fn(&Args<'_, M>) -> FactoryResult<()> + Send + Sync>;

/// One field of the model as the blueprint sees it.
pub(crate) struct FieldSpec<M> {
	pub(crate) field: Field<M>,
	pub(crate) attr: &'static str,
	/// Empty reference in the prototype: nothing to copy as a default.
	pub(crate) unset: bool,
}

impl<M> Clone for FieldSpec<M> {
	fn clone(&self) -> Self {
		Self {
			field: self.field.clone(),
			attr: self.attr,
			unset: self.unset,
		}
	}
}

struct Inner<M: Model> {
	prototype: M,
	tag: String,
	fields: Vec<FieldSpec<M>>,
	index: HashMap<&'static str, usize>,
	generators: Vec<Option<AttributeGenerator<M>>>,
	order: Vec<usize>,
	on_create: Option<OnCreate<M>>,
}

/// Frozen, shareable description of how to build an `M`.
pub struct Blueprint<M: Model> {
	inner: Arc<Inner<M>>,
}

impl<M: Model> Blueprint<M> {
	/// Starts declaring a blueprint.
	///
	/// Fields of `prototype` that are not bound to a generator are copied into
	/// every built instance. Fields holding `None` are left at their zero value
	/// instead.
	pub fn builder(prototype: M) -> BlueprintBuilder<M> {
		BlueprintBuilder::new(prototype)
	}

	/// Name of the model this blueprint builds.
	pub fn model_name(&self) -> &'static str {
		M::model_name()
	}

	/// Number of fields in the model.
	pub fn field_count(&self) -> usize {
		self.inner.fields.len()
	}

	/// Tag key the attribute names were resolved with.
	pub fn tag_name(&self) -> &str {
		&self.inner.tag
	}

	/// Attribute names in the order their values are resolved during a build.
	pub fn application_order(&self) -> Vec<&'static str> {
		self.inner
			.order
			.iter()
			.map(|&index| self.inner.fields[index].attr)
			.collect()
	}

	/// Returns true if `attr` is bound to a generator.
	pub fn has_generator(&self, attr: &str) -> bool {
		self.inner
			.index
			.get(attr)
			.is_some_and(|&index| self.inner.generators[index].is_some())
	}

	/// Reopens a copy of this blueprint for further declarations.
	///
	/// Existing generators are shared with the copy, sequence counters included.
	pub fn to_builder(&self) -> BlueprintBuilder<M>
	where
		M: Clone,
	{
		let inner = &*self.inner;
		BlueprintBuilder::from_parts(
			inner.prototype.clone(),
			inner.tag.clone(),
			inner.fields.clone(),
			inner.index.clone(),
			inner.generators.clone(),
			inner
				.order
				.iter()
				.copied()
				.filter(|&index| inner.generators[index].is_some())
				.collect(),
			inner.on_create.clone(),
		)
	}
}

impl<M: Model> Clone for Blueprint<M> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<M: Model> fmt::Debug for Blueprint<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Blueprint")
			.field("model", &M::model_name())
			.field("order", &self.application_order())
			.field("on_create", &self.inner.on_create.is_some())
			.finish()
	}
}
