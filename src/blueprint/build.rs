use std::cell::RefCell;

use super::path::apply_path;
use super::{Blueprint, FieldSpec};
use crate::args::Args;
use crate::context::Context;
use crate::error::{FactoryError, FactoryResult};
use crate::model::Model;
use crate::options::Options;
use crate::pipeline::Pipeline;
use crate::value::Value;

impl<M: Model> Blueprint<M> {
	/// Builds an instance.
	pub fn create(&self) -> FactoryResult<M> {
		self.create_with_context_and_options(&Context::new(), Options::new())
	}

	/// Builds an instance with field overrides.
	pub fn create_with_options(&self, options: Options) -> FactoryResult<M> {
		self.create_with_context_and_options(&Context::new(), options)
	}

	/// Builds an instance whose generators see `context`.
	pub fn create_with_context(&self, context: &Context) -> FactoryResult<M> {
		self.create_with_context_and_options(context, Options::new())
	}

	/// Builds an instance with a context and field overrides.
	///
	/// The first error raised by a generator, a formatter or the `on_create`
	/// callback aborts the build and is returned as is. Sequence numbers
	/// drawn before the failure stay consumed.
	pub fn create_with_context_and_options(
		&self,
		context: &Context,
		options: Options,
	) -> FactoryResult<M> {
		self.produce(context, options, &Pipeline::root())
	}

	/// [`create`](Self::create), panicking on error.
	///
	/// # Panics
	///
	/// Panics with the build error's message.
	pub fn must_create(&self) -> M {
		self.must_create_with_context_and_options(&Context::new(), Options::new())
	}

	/// [`create_with_options`](Self::create_with_options), panicking on error.
	pub fn must_create_with_options(&self, options: Options) -> M {
		self.must_create_with_context_and_options(&Context::new(), options)
	}

	/// [`create_with_context`](Self::create_with_context), panicking on error.
	pub fn must_create_with_context(&self, context: &Context) -> M {
		self.must_create_with_context_and_options(context, Options::new())
	}

	/// [`create_with_context_and_options`](Self::create_with_context_and_options),
	/// panicking on error.
	pub fn must_create_with_context_and_options(&self, context: &Context, options: Options) -> M {
		match self.create_with_context_and_options(context, options) {
			Ok(instance) => instance,
			Err(error) => panic!("{error}"),
		}
	}

	/// Builds `count` instances, stopping at the first error.
	pub fn create_batch(&self, count: usize) -> FactoryResult<Vec<M>> {
		self.create_batch_with_context(&Context::new(), count)
	}

	/// [`create_batch`](Self::create_batch) with a shared context.
	pub fn create_batch_with_context(&self, context: &Context, count: usize) -> FactoryResult<Vec<M>> {
		(0..count)
			.map(|_| self.create_with_context(context))
			.collect()
	}

	/// Runs the build against an instance the caller already owns.
	pub fn construct(&self, target: &mut M) -> FactoryResult<()> {
		self.construct_with_context_and_options(&Context::new(), target, Options::new())
	}

	/// [`construct`](Self::construct) with field overrides.
	pub fn construct_with_options(&self, target: &mut M, options: Options) -> FactoryResult<()> {
		self.construct_with_context_and_options(&Context::new(), target, options)
	}

	/// [`construct`](Self::construct) with a context and field overrides.
	///
	/// Fields the build does not assign keep their current value. On error
	/// `target` holds whatever was assigned before the failure.
	pub fn construct_with_context_and_options(
		&self,
		context: &Context,
		target: &mut M,
		options: Options,
	) -> FactoryResult<()> {
		let instance = RefCell::new(std::mem::take(target));
		let result = self.assemble(&instance, context, options, &Pipeline::root());
		*target = instance.into_inner();
		result
	}

	pub(crate) fn produce(
		&self,
		context: &Context,
		options: Options,
		pipeline: &Pipeline<'_>,
	) -> FactoryResult<M> {
		let instance = RefCell::new(M::default());
		self.assemble(&instance, context, options, pipeline)?;
		Ok(instance.into_inner())
	}

	fn assemble(
		&self,
		instance: &RefCell<M>,
		context: &Context,
		mut options: Options,
		pipeline: &Pipeline<'_>,
	) -> FactoryResult<()> {
		let inner = &*self.inner;
		tracing::debug!(
			model = M::model_name(),
			overrides = options.len(),
			depth = pipeline.depth(),
			"building instance"
		);

		let args = Args::new(self, instance, context, pipeline);
		for &index in &inner.order {
			let spec = &inner.fields[index];
			if let Some(value) = options.take(spec.attr) {
				tracing::trace!(field = spec.attr, source = "override");
				assign(instance, spec, value)?;
			} else if let Some(generator) = &inner.generators[index] {
				tracing::trace!(field = spec.attr, source = "generator");
				if let Some(value) = generator.apply(&args)? {
					assign(instance, spec, value)?;
				}
			} else if spec.unset {
				tracing::trace!(field = spec.attr, source = "skip");
			} else {
				tracing::trace!(field = spec.attr, source = "default");
				spec.field
					.copy_from(&inner.prototype, &mut instance.borrow_mut());
			}
		}

		for (path, value) in options.into_entries() {
			apply_path(&mut *instance.borrow_mut(), &inner.tag, &path, value)?;
		}

		if let Some(on_create) = &inner.on_create {
			on_create(&args)?;
		}
		Ok(())
	}
}

fn assign<M: Model>(instance: &RefCell<M>, spec: &FieldSpec<M>, value: Value) -> FactoryResult<()> {
	let mut instance = instance.borrow_mut();
	spec.field
		.value_mut(&mut instance)
		.assign(value)
		.map_err(|rejected| {
			FactoryError::mismatch(
				format!("field `{}`", spec.attr),
				spec.field.type_name(),
				rejected.type_name(),
			)
		})
}
