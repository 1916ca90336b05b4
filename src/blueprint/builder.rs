use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Blueprint, FieldSpec, Inner, OnCreate};
use crate::args::Args;
use crate::config;
use crate::error::{ConfigError, ConfigResult, FactoryError, FactoryResult};
use crate::generator::{AttributeGenerator, Formatter};
use crate::model::Model;
use crate::options::Options;
use crate::pipeline::CounterKey;
use crate::sequence::Sequence;
use crate::value::Value;

/// Declares the generators of a [`Blueprint`].
///
/// Every method takes and returns the builder so declarations chain. The
/// first declaration error is kept and reported by [`build`](Self::build);
/// declarations after it are ignored.
pub struct BlueprintBuilder<M: Model> {
	prototype: M,
	tag: String,
	fields: Vec<FieldSpec<M>>,
	index: HashMap<&'static str, usize>,
	generators: Vec<Option<AttributeGenerator<M>>>,
	declared: Vec<usize>,
	on_create: Option<OnCreate<M>>,
	error: Option<ConfigError>,
}

impl<M: Model> BlueprintBuilder<M> {
	pub(crate) fn new(prototype: M) -> Self {
		let tag = config::tag_name();
		let fields: Vec<FieldSpec<M>> = M::fields()
			.into_iter()
			.map(|field| FieldSpec {
				attr: field.attr_name_for(&tag),
				unset: field.value(&prototype).is_unset(),
				field,
			})
			.collect();

		let mut error = None;
		if fields.is_empty() {
			error = Some(ConfigError::NoFields {
				model: M::model_name(),
			});
		}

		let mut index = HashMap::with_capacity(fields.len());
		for (position, spec) in fields.iter().enumerate() {
			if index.insert(spec.attr, position).is_some() && error.is_none() {
				error = Some(ConfigError::DuplicateAttribute {
					model: M::model_name(),
					name: spec.attr.to_string(),
				});
			}
		}

		let generators = vec![None; fields.len()];
		Self {
			prototype,
			tag,
			fields,
			index,
			generators,
			declared: Vec::new(),
			on_create: None,
			error,
		}
	}

	pub(super) fn from_parts(
		prototype: M,
		tag: String,
		fields: Vec<FieldSpec<M>>,
		index: HashMap<&'static str, usize>,
		generators: Vec<Option<AttributeGenerator<M>>>,
		declared: Vec<usize>,
		on_create: Option<OnCreate<M>>,
	) -> Self {
		Self {
			prototype,
			tag,
			fields,
			index,
			generators,
			declared,
			on_create,
			error: None,
		}
	}

	fn lookup(&mut self, name: &str) -> Option<usize> {
		if self.error.is_some() {
			return None;
		}
		let index = self.index.get(name).copied();
		if index.is_none() {
			self.error = Some(ConfigError::UnknownAttribute {
				model: M::model_name(),
				name: name.to_string(),
			});
		}
		index
	}

	// A redeclared attribute keeps the application slot of its first declaration.
	fn bind(mut self, name: &str, make: impl FnOnce(usize) -> AttributeGenerator<M>) -> Self {
		if let Some(index) = self.lookup(name) {
			self.generators[index] = Some(make(index));
			if !self.declared.contains(&index) {
				self.declared.push(index);
			}
		}
		self
	}

	/// Binds a prepared generator to an attribute.
	pub fn declare(self, name: &str, generator: AttributeGenerator<M>) -> Self {
		self.bind(name, |_| generator)
	}

	/// Binds a generator function to an attribute.
	///
	/// The function sees every field assigned before this one through
	/// [`Args::instance`].
	pub fn attr<V, F>(self, name: &str, produce: F) -> Self
	where
		V: Any + Send + Sync,
		F: Fn(&Args<'_, M>) -> FactoryResult<V> + Send + Sync + 'static,
	{
		self.declare(name, AttributeGenerator::new(produce))
	}

	/// Appends a formatter to the generator already bound to `name`.
	pub fn formatter(mut self, name: &str, formatter: Formatter) -> Self {
		let Some(index) = self.lookup(name) else {
			return self;
		};
		match self.generators[index].take() {
			Some(generator) => self.generators[index] = Some(generator.with_formatter(formatter)),
			None => {
				self.error = Some(ConfigError::MissingGenerator {
					model: M::model_name(),
					name: name.to_string(),
				});
			}
		}
		self
	}

	/// Binds a sequence whose numbers start at 1 and are mapped by `produce`.
	pub fn seq_int<V, F>(self, name: &str, produce: F) -> Self
	where
		V: Any + Send + Sync,
		F: Fn(usize) -> FactoryResult<V> + Send + Sync + 'static,
	{
		self.seq_with(name, &Sequence::new(), move |n| {
			produce(usize::try_from(n).map_err(FactoryError::generator)?)
		})
	}

	/// [`seq_int`](Self::seq_int) over `i64`.
	pub fn seq_int64<V, F>(self, name: &str, produce: F) -> Self
	where
		V: Any + Send + Sync,
		F: Fn(i64) -> FactoryResult<V> + Send + Sync + 'static,
	{
		self.seq_with(name, &Sequence::new(), produce)
	}

	/// [`seq_int`](Self::seq_int) over the decimal form of the number.
	pub fn seq_string<V, F>(self, name: &str, produce: F) -> Self
	where
		V: Any + Send + Sync,
		F: Fn(String) -> FactoryResult<V> + Send + Sync + 'static,
	{
		self.seq_with(name, &Sequence::new(), move |n| produce(n.to_string()))
	}

	/// Binds a generator driven by a sequence that may be shared with other
	/// attributes or blueprints.
	pub fn seq_with<V, F>(self, name: &str, sequence: &Sequence, produce: F) -> Self
	where
		V: Any + Send + Sync,
		F: Fn(i64) -> FactoryResult<V> + Send + Sync + 'static,
	{
		let sequence = sequence.clone();
		self.attr(name, move |_| produce(sequence.next()))
	}

	/// Builds the attribute with another blueprint.
	///
	/// The nested build sees this build through [`Args::parent`] and shares
	/// its context.
	pub fn sub_factory<S: Model>(self, name: &str, sub: &Blueprint<S>) -> Self {
		let sub = sub.clone();
		self.attr(name, move |args| {
			let pipeline = args.pipeline().branch(args);
			sub.produce(args.context(), Options::new(), &pipeline)
		})
	}

	/// Builds the attribute as a list of `size()` instances of another blueprint.
	pub fn sub_slice_factory<S, F>(self, name: &str, sub: &Blueprint<S>, size: F) -> Self
	where
		S: Model,
		F: Fn() -> usize + Send + Sync + 'static,
	{
		let sub = sub.clone();
		self.attr(name, move |args| build_slice(&sub, args, size()))
	}

	/// Builds the attribute with this same blueprint, at most `limit()` levels deep.
	///
	/// The deepest level holds nothing.
	pub fn sub_recursive_factory<F>(self, name: &str, limit: F) -> Self
	where
		F: Fn() -> usize + Send + Sync + 'static,
	{
		self.recursive(name, limit, |args| {
			let pipeline = args.pipeline().branch(args);
			args.blueprint()
				.produce(args.context(), Options::new(), &pipeline)
				.map(Value::new)
		})
	}

	/// [`sub_recursive_factory`](Self::sub_recursive_factory) for a recursion
	/// that passes through another blueprint.
	pub fn sub_recursive_factory_of<S, F>(self, name: &str, sub: &Blueprint<S>, limit: F) -> Self
	where
		S: Model,
		F: Fn() -> usize + Send + Sync + 'static,
	{
		let sub = sub.clone();
		self.recursive(name, limit, move |args| {
			let pipeline = args.pipeline().branch(args);
			sub.produce(args.context(), Options::new(), &pipeline)
				.map(Value::new)
		})
	}

	/// Builds the attribute with this same blueprint as a list of `size()`
	/// instances per level, at most `limit()` levels deep.
	pub fn sub_recursive_slice_factory<Z, F>(self, name: &str, size: Z, limit: F) -> Self
	where
		Z: Fn() -> usize + Send + Sync + 'static,
		F: Fn() -> usize + Send + Sync + 'static,
	{
		self.recursive(name, limit, move |args| {
			build_slice(args.blueprint(), args, size()).map(Value::new)
		})
	}

	/// [`sub_recursive_slice_factory`](Self::sub_recursive_slice_factory) for a
	/// recursion that passes through another blueprint.
	pub fn sub_recursive_slice_factory_of<S, Z, F>(
		self,
		name: &str,
		sub: &Blueprint<S>,
		size: Z,
		limit: F,
	) -> Self
	where
		S: Model,
		Z: Fn() -> usize + Send + Sync + 'static,
		F: Fn() -> usize + Send + Sync + 'static,
	{
		let sub = sub.clone();
		self.recursive(name, limit, move |args| {
			build_slice(&sub, args, size()).map(Value::new)
		})
	}

	// Counts down a per-pipeline counter and builds with `nested` while it stays >= 0.
	fn recursive<F, B>(self, name: &str, limit: F, nested: B) -> Self
	where
		F: Fn() -> usize + Send + Sync + 'static,
		B: Fn(&Args<'_, M>) -> FactoryResult<Value> + Send + Sync + 'static,
	{
		self.bind(name, move |index| {
			let key = CounterKey::of::<M>(index);
			AttributeGenerator::optional(move |args| {
				let pipeline = args.pipeline();
				pipeline.ensure_counter(key, &limit);
				if !pipeline.advance(key) {
					tracing::debug!(
						model = M::model_name(),
						field = index,
						depth = args.depth(),
						"recursion limit reached"
					);
					return Ok(None);
				}
				nested(args).map(Some)
			})
		})
	}

	/// Registers a callback that runs after every field has been assigned.
	///
	/// An error from the callback fails the build.
	pub fn on_create<F>(mut self, callback: F) -> Self
	where
		F: Fn(&Args<'_, M>) -> FactoryResult<()> + Send + Sync + 'static,
	{
		self.on_create = Some(Arc::new(callback));
		self
	}

	/// Freezes the blueprint.
	///
	/// Fields without a generator are appended to the application order in
	/// struct order.
	pub fn build(self) -> ConfigResult<Blueprint<M>> {
		if let Some(error) = self.error {
			return Err(error);
		}
		let mut order = self.declared;
		order.extend((0..self.fields.len()).filter(|index| self.generators[*index].is_none()));

		Ok(Blueprint {
			inner: Arc::new(Inner {
				prototype: self.prototype,
				tag: self.tag,
				fields: self.fields,
				index: self.index,
				generators: self.generators,
				order,
				on_create: self.on_create,
			}),
		})
	}

	/// [`build`](Self::build), panicking on a declaration error.
	///
	/// # Panics
	///
	/// Panics with the [`ConfigError`] message.
	pub fn must_build(self) -> Blueprint<M> {
		match self.build() {
			Ok(blueprint) => blueprint,
			Err(error) => panic!("{error}"),
		}
	}
}

// Each element gets its own branch of the pipeline.
fn build_slice<S: Model, M: Model>(
	sub: &Blueprint<S>,
	args: &Args<'_, M>,
	size: usize,
) -> FactoryResult<Vec<Value>> {
	(0..size)
		.map(|_| {
			let pipeline = args.pipeline().branch(args);
			sub.produce(args.context(), Options::new(), &pipeline)
				.map(Value::new)
		})
		.collect()
}
