//! Generation context passed to generators and callbacks.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;

use crate::blueprint::Blueprint;
use crate::context::Context;
use crate::model::Model;
use crate::pipeline::Pipeline;

/// What a generator sees while one instance of `M` is being built.
///
/// `instance` reflects every field assigned so far, in application order.
pub struct Args<'a, M: Model> {
	blueprint: &'a Blueprint<M>,
	instance: &'a RefCell<M>,
	context: &'a Context,
	pipeline: &'a Pipeline<'a>,
}

impl<'a, M: Model> Args<'a, M> {
	pub(crate) fn new(
		blueprint: &'a Blueprint<M>,
		instance: &'a RefCell<M>,
		context: &'a Context,
		pipeline: &'a Pipeline<'a>,
	) -> Self {
		Self {
			blueprint,
			instance,
			context,
			pipeline,
		}
	}

	/// Borrows the instance under construction.
	///
	/// # Panics
	///
	/// Panics if a mutable borrow from [`instance_mut`](Self::instance_mut) is still alive.
	pub fn instance(&self) -> Ref<'a, M> {
		self.instance.borrow()
	}

	/// Mutably borrows the instance under construction.
	///
	/// # Panics
	///
	/// Panics if any other borrow of the instance is still alive.
	pub fn instance_mut(&self) -> RefMut<'a, M> {
		self.instance.borrow_mut()
	}

	/// Context of the build that requested this one as a sub-build.
	pub fn parent(&self) -> Option<&'a dyn AnyArgs> {
		self.pipeline.parent()
	}

	/// Ambient context given to the top-level build.
	pub fn context(&self) -> &'a Context {
		self.context
	}

	/// Blueprint running this build.
	pub fn blueprint(&self) -> &'a Blueprint<M> {
		self.blueprint
	}

	/// Number of sub-build levels above this build; 0 at the top.
	pub fn depth(&self) -> usize {
		self.pipeline.depth()
	}

	/// Recursion bookkeeping for this build.
	pub fn pipeline(&self) -> &'a Pipeline<'a> {
		self.pipeline
	}
}

impl<M: Model + fmt::Debug> fmt::Debug for Args<'_, M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Args")
			.field("model", &M::model_name())
			.field("instance", &self.instance.try_borrow().ok())
			.field("depth", &self.depth())
			.finish()
	}
}

/// Type-erased [`Args`], used to look up the parent chain.
pub trait AnyArgs {
	/// Borrows the instance under construction.
	fn instance_any(&self) -> Ref<'_, dyn Any>;

	/// Context of the build one level further up.
	fn parent(&self) -> Option<&dyn AnyArgs>;

	/// Ambient context.
	fn context(&self) -> &Context;

	/// Name of the model being built.
	fn model_name(&self) -> &'static str;

	/// Number of sub-build levels above this build.
	fn depth(&self) -> usize;
}

impl dyn AnyArgs + '_ {
	/// Borrows the instance under construction as a `T`.
	///
	/// # Examples
	///
	/// ```
	/// # use reinhardt_factory::prelude::*;
	/// # #[derive(Debug, Clone, Default, Model)]
	/// # struct Group { name: String }
	/// # #[derive(Debug, Clone, Default, Model)]
	/// # struct User { group_name: String }
	/// let users = Blueprint::builder(User::default())
	///     .attr("group_name", |args| {
	///         Ok(args
	///             .parent()
	///             .and_then(|parent| parent.instance::<Group>().map(|group| group.name.clone()))
	///             .unwrap_or_default())
	///     })
	///     .must_build();
	/// assert_eq!(users.must_create().group_name, "");
	/// ```
	pub fn instance<T: Any>(&self) -> Option<Ref<'_, T>> {
		Ref::filter_map(self.instance_any(), |instance| instance.downcast_ref::<T>()).ok()
	}

	/// Returns true if the instance under construction is a `T`.
	pub fn is<T: Any>(&self) -> bool {
		self.instance_any().is::<T>()
	}
}

impl<M: Model> AnyArgs for Args<'_, M> {
	fn instance_any(&self) -> Ref<'_, dyn Any> {
		Ref::map(self.instance.borrow(), |instance| instance as &dyn Any)
	}

	fn parent(&self) -> Option<&dyn AnyArgs> {
		self.pipeline.parent()
	}

	fn context(&self) -> &Context {
		self.context
	}

	fn model_name(&self) -> &'static str {
		M::model_name()
	}

	fn depth(&self) -> usize {
		self.pipeline.depth()
	}
}

