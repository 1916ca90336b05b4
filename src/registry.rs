//! Blueprint registry for dynamic blueprint discovery.
//!
//! This module provides a global registry of blueprints, enabling lookup
//! by model name or type and building without knowing the model type at
//! the call site.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::blueprint::Blueprint;
use crate::context::Context;
use crate::error::{FactoryError, FactoryResult};
use crate::model::Model;
use crate::options::Options;
use crate::value::Value;

/// Type-erased blueprint.
pub trait AnyBlueprint: Send + Sync {
	/// Name the blueprint is registered under.
	fn model_name(&self) -> &str;

	/// Type of the model the blueprint builds.
	fn model_type(&self) -> TypeId;

	/// Rust type name of the model the blueprint builds.
	fn model_type_name(&self) -> &'static str;

	/// Builds an instance and boxes it.
	fn create_any(&self, context: &Context, options: Options) -> FactoryResult<Value>;

	/// Runs the build against `target`, which must be the blueprint's model.
	fn construct_any(
		&self,
		context: &Context,
		target: &mut dyn Any,
		options: Options,
	) -> FactoryResult<()>;

	/// Returns the blueprint as an Any reference for downcasting.
	fn as_any(&self) -> &dyn Any;
}

impl dyn AnyBlueprint {
	/// Builds an instance and unboxes it as a `T`.
	pub fn create_as<T: Any>(&self, context: &Context, options: Options) -> FactoryResult<T> {
		self.create_any(context, options)?
			.downcast::<T>()
			.map_err(|value| FactoryError::mismatch("build output", type_name::<T>(), value.type_name()))
	}

	/// Runs the build against a `T` owned by the caller.
	pub fn construct_as<T: Any>(
		&self,
		context: &Context,
		target: &mut T,
		options: Options,
	) -> FactoryResult<()> {
		if self.model_type() != TypeId::of::<T>() {
			return Err(FactoryError::mismatch(
				"construct target",
				self.model_type_name(),
				type_name::<T>(),
			));
		}
		self.construct_any(context, target, options)
	}

	/// Recovers the typed blueprint.
	pub fn downcast_ref<M: Model>(&self) -> Option<&Blueprint<M>> {
		self.as_any().downcast_ref::<Blueprint<M>>()
	}
}

/// Wrapper to store blueprints with their registered name.
struct BlueprintEntry<M: Model> {
	name: String,
	blueprint: Blueprint<M>,
}

impl<M: Model> AnyBlueprint for BlueprintEntry<M> {
	fn model_name(&self) -> &str {
		&self.name
	}

	fn model_type(&self) -> TypeId {
		TypeId::of::<M>()
	}

	fn model_type_name(&self) -> &'static str {
		type_name::<M>()
	}

	fn create_any(&self, context: &Context, options: Options) -> FactoryResult<Value> {
		self.blueprint
			.create_with_context_and_options(context, options)
			.map(Value::new)
	}

	fn construct_any(
		&self,
		context: &Context,
		target: &mut dyn Any,
		options: Options,
	) -> FactoryResult<()> {
		let Some(target) = target.downcast_mut::<M>() else {
			return Err(FactoryError::mismatch(
				"construct target",
				self.model_type_name(),
				"another type",
			));
		};
		self.blueprint
			.construct_with_context_and_options(context, target, options)
	}

	fn as_any(&self) -> &dyn Any {
		&self.blueprint
	}
}

/// Global blueprint registry.
static BLUEPRINT_REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn AnyBlueprint>>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Type ID to registered name mapping.
static TYPE_BLUEPRINT_MAP: Lazy<RwLock<HashMap<TypeId, String>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a blueprint under its model's name.
///
/// # Example
///
/// ```
/// use reinhardt_factory::prelude::*;
/// use reinhardt_factory::registry;
///
/// #[derive(Debug, Clone, Default, Model)]
/// struct Tag {
///     label: String,
/// }
///
/// registry::register_blueprint(
///     Blueprint::builder(Tag::default())
///         .seq_string("label", |n| Ok(format!("tag-{n}")))
///         .must_build(),
/// );
///
/// let tags = registry::get_blueprint("Tag").unwrap();
/// let tag: Tag = tags.create_as(&Context::new(), Options::new()).unwrap();
/// assert_eq!(tag.label, "tag-1");
/// ```
pub fn register_blueprint<M: Model>(blueprint: Blueprint<M>) {
	register_blueprint_as(M::model_name(), blueprint);
}

/// Registers a blueprint under an explicit name.
///
/// The name also becomes the one [`get_blueprint_for_type`] resolves for `M`.
pub fn register_blueprint_as<M: Model>(name: impl Into<String>, blueprint: Blueprint<M>) {
	let name = name.into();
	tracing::debug!(name = %name, model = M::model_name(), "blueprint registered");
	TYPE_BLUEPRINT_MAP
		.write()
		.insert(TypeId::of::<M>(), name.clone());
	let entry = BlueprintEntry {
		name: name.clone(),
		blueprint,
	};
	BLUEPRINT_REGISTRY.write().insert(name, Arc::new(entry));
}

/// Gets a blueprint by registered name.
pub fn get_blueprint(name: &str) -> Option<Arc<dyn AnyBlueprint>> {
	BLUEPRINT_REGISTRY.read().get(name).cloned()
}

/// Gets the typed blueprint registered for `M`.
pub fn get_blueprint_for_type<M: Model>() -> Option<Blueprint<M>> {
	let name = TYPE_BLUEPRINT_MAP.read().get(&TypeId::of::<M>()).cloned()?;
	let entry = get_blueprint(&name)?;
	entry.downcast_ref::<M>().cloned()
}

/// Builds an instance with the blueprint registered under `name`.
pub fn create_registered(name: &str, context: &Context, options: Options) -> FactoryResult<Value> {
	get_blueprint(name)
		.ok_or_else(|| FactoryError::NotRegistered(name.to_string()))?
		.create_any(context, options)
}

/// Checks if a blueprint is registered under the name.
pub fn has_blueprint(name: &str) -> bool {
	BLUEPRINT_REGISTRY.read().contains_key(name)
}

/// Returns all registered names, sorted.
pub fn blueprint_model_names() -> Vec<String> {
	let mut names: Vec<String> = BLUEPRINT_REGISTRY.read().keys().cloned().collect();
	names.sort();
	names
}

/// Clears all registered blueprints.
///
/// This is primarily useful for testing.
pub fn clear_blueprints() {
	BLUEPRINT_REGISTRY.write().clear();
	TYPE_BLUEPRINT_MAP.write().clear();
}

/// Returns the number of registered blueprints.
pub fn blueprint_count() -> usize {
	BLUEPRINT_REGISTRY.read().len()
}

/// Blueprint registry handle for scoped operations.
#[derive(Debug, Default)]
pub struct BlueprintRegistry;

impl BlueprintRegistry {
	/// Creates a new registry handle.
	pub fn new() -> Self {
		Self
	}

	/// Registers a blueprint under its model's name.
	pub fn register<M: Model>(&self, blueprint: Blueprint<M>) {
		register_blueprint(blueprint);
	}

	/// Gets a blueprint by registered name.
	pub fn get(&self, name: &str) -> Option<Arc<dyn AnyBlueprint>> {
		get_blueprint(name)
	}

	/// Gets the typed blueprint registered for `M`.
	pub fn get_for_type<M: Model>(&self) -> Option<Blueprint<M>> {
		get_blueprint_for_type::<M>()
	}

	/// Builds an instance with the blueprint registered under `name`.
	pub fn create(&self, name: &str, context: &Context, options: Options) -> FactoryResult<Value> {
		create_registered(name, context, options)
	}

	/// Checks if a blueprint is registered.
	pub fn has(&self, name: &str) -> bool {
		has_blueprint(name)
	}

	/// Returns all registered names.
	pub fn model_names(&self) -> Vec<String> {
		blueprint_model_names()
	}

	/// Returns the number of registered blueprints.
	pub fn len(&self) -> usize {
		blueprint_count()
	}

	/// Returns true if no blueprints are registered.
	pub fn is_empty(&self) -> bool {
		blueprint_count() == 0
	}

	/// Clears all blueprints (primarily for testing).
	pub fn clear(&self) {
		clear_blueprints();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_factory_macros::Model;
	use rstest::rstest;
	use serial_test::serial;

	#[derive(Debug, Clone, Default, PartialEq, Model)]
	struct TestModel {
		name: String,
	}

	fn test_blueprint(name: &'static str) -> Blueprint<TestModel> {
		Blueprint::builder(TestModel::default())
			.attr("name", move |_| Ok(name.to_string()))
			.must_build()
	}

	#[rstest]
	#[serial(registry)]
	fn test_register_and_get_blueprint() {
		clear_blueprints();

		register_blueprint(test_blueprint("test"));

		assert!(has_blueprint("TestModel"));
		assert!(!has_blueprint("OtherModel"));

		let blueprint = get_blueprint("TestModel").unwrap();
		assert_eq!(blueprint.model_name(), "TestModel");
		assert_eq!(blueprint.model_type(), TypeId::of::<TestModel>());
	}

	#[rstest]
	#[serial(registry)]
	fn test_register_for_type() {
		clear_blueprints();

		register_blueprint_as("typed.Model", test_blueprint("typed"));

		let blueprint = get_blueprint_for_type::<TestModel>().unwrap();
		assert_eq!(blueprint.must_create().name, "typed");
	}

	#[rstest]
	#[serial(registry)]
	fn test_blueprint_model_names() {
		clear_blueprints();

		register_blueprint_as("app1.Model", test_blueprint("1"));
		register_blueprint_as("app2.Model", test_blueprint("2"));

		let names = blueprint_model_names();
		assert_eq!(names.len(), 2);
		assert!(names.contains(&"app1.Model".to_string()));
		assert!(names.contains(&"app2.Model".to_string()));
	}

	#[rstest]
	#[serial(registry)]
	fn test_blueprint_registry_handle() {
		clear_blueprints();

		let registry = BlueprintRegistry::new();
		assert!(registry.is_empty());

		registry.register(test_blueprint("handle"));

		assert!(!registry.is_empty());
		assert_eq!(registry.len(), 1);
		assert!(registry.has("TestModel"));
		let built = registry
			.create("TestModel", &Context::new(), Options::new())
			.unwrap();
		assert_eq!(built.downcast::<TestModel>().unwrap().name, "handle");
	}

	#[rstest]
	#[serial(registry)]
	fn test_create_unregistered() {
		clear_blueprints();

		let error = create_registered("missing.Model", &Context::new(), Options::new()).unwrap_err();
		assert!(matches!(error, FactoryError::NotRegistered(ref name) if name == "missing.Model"));
	}

	#[rstest]
	#[serial(registry)]
	fn test_typed_entry_points_check_type() {
		clear_blueprints();

		register_blueprint(test_blueprint("typed"));
		let blueprint = get_blueprint("TestModel").unwrap();

		let error = blueprint
			.create_as::<String>(&Context::new(), Options::new())
			.unwrap_err();
		assert!(matches!(error, FactoryError::TypeMismatch { ref target, .. } if target == "build output"));

		let mut wrong = 0u8;
		let error = blueprint
			.construct_as(&Context::new(), &mut wrong, Options::new())
			.unwrap_err();
		assert!(matches!(error, FactoryError::TypeMismatch { found: "u8", .. }));

		let mut target = TestModel::default();
		blueprint
			.construct_as(&Context::new(), &mut target, Options::new())
			.unwrap();
		assert_eq!(target.name, "typed");
	}

	#[rstest]
	#[serial(registry)]
	fn test_clear_blueprints() {
		clear_blueprints();

		register_blueprint(test_blueprint("clear"));
		assert!(has_blueprint("TestModel"));

		clear_blueprints();
		assert!(!has_blueprint("TestModel"));
		assert_eq!(blueprint_count(), 0);
	}
}
