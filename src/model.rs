//! Field descriptor tables.
//!
//! A [`Model`] describes its fields once, in declaration order, as a table
//! of [`Field`] accessors. Blueprints read the table when they are
//! declared; the dotted-path resolver walks nested models through the
//! object-safe [`Record`] view.
//!
//! The table is normally generated by `#[derive(Model)]`, but it can be
//! written by hand:
//!
//! ```
//! use reinhardt_factory::{Field, FieldValue, Model, impl_field_value};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Tag {
//!     label: String,
//! }
//!
//! impl_field_value!(Tag);
//!
//! fn label(tag: &Tag) -> &dyn FieldValue {
//!     &tag.label
//! }
//! fn label_mut(tag: &mut Tag) -> &mut dyn FieldValue {
//!     &mut tag.label
//! }
//! fn copy_label(src: &Tag, dst: &mut Tag) {
//!     dst.label = src.label.clone();
//! }
//!
//! impl Model for Tag {
//!     fn model_name() -> &'static str {
//!         "Tag"
//!     }
//!
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![Field::new::<String>("label", label, label_mut, copy_label).tag("factory", "Label")]
//!     }
//! }
//!
//! assert_eq!(Tag::fields()[0].attr_name_for("factory"), "Label");
//! ```

use std::any::type_name;
use std::fmt;

use crate::config;
use crate::value::FieldValue;

/// Accessors and metadata for one model field.
pub struct Field<M> {
	name: &'static str,
	type_name: &'static str,
	tags: Vec<(&'static str, &'static str)>,
	get: fn(&M) -> &dyn FieldValue,
	get_mut: fn(&mut M) -> &mut dyn FieldValue,
	copy: fn(&M, &mut M),
}

impl<M> Field<M> {
	/// Creates a descriptor for a field of type `T`.
	///
	/// `copy` clones the field from a prototype instance into a target
	/// instance; it is how static defaults are applied.
	pub fn new<T: FieldValue>(
		name: &'static str,
		get: fn(&M) -> &dyn FieldValue,
		get_mut: fn(&mut M) -> &mut dyn FieldValue,
		copy: fn(&M, &mut M),
	) -> Self {
		Self {
			name,
			type_name: type_name::<T>(),
			tags: Vec::new(),
			get,
			get_mut,
			copy,
		}
	}

	/// Attaches a `key = value` tag to the field.
	pub fn tag(mut self, key: &'static str, value: &'static str) -> Self {
		self.tags.push((key, value));
		self
	}

	/// Field name as written in the struct.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Declared type of the field.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Value of the tag stored under `key`, if any.
	pub fn tag_value(&self, key: &str) -> Option<&'static str> {
		self.tags
			.iter()
			.find(|(tag, _)| *tag == key)
			.map(|(_, value)| *value)
	}

	/// Attribute name under the library-wide tag key.
	pub fn attr_name(&self) -> &'static str {
		self.attr_name_for(&config::tag_name())
	}

	/// Attribute name under `key`: the tag value when present, else the field name.
	pub fn attr_name_for(&self, key: &str) -> &'static str {
		self.tag_value(key).unwrap_or(self.name)
	}

	/// Borrows the field on an instance.
	pub fn value<'m>(&self, model: &'m M) -> &'m dyn FieldValue {
		(self.get)(model)
	}

	/// Mutably borrows the field on an instance.
	pub fn value_mut<'m>(&self, model: &'m mut M) -> &'m mut dyn FieldValue {
		(self.get_mut)(model)
	}

	/// Clones the field from `src` into `dst`.
	pub fn copy_from(&self, src: &M, dst: &mut M) {
		(self.copy)(src, dst)
	}
}

impl<M> Clone for Field<M> {
	fn clone(&self) -> Self {
		Self {
			name: self.name,
			type_name: self.type_name,
			tags: self.tags.clone(),
			get: self.get,
			get_mut: self.get_mut,
			copy: self.copy,
		}
	}
}

impl<M> fmt::Debug for Field<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("type_name", &self.type_name)
			.field("tags", &self.tags)
			.finish()
	}
}

/// A struct a blueprint can build.
///
/// `Default` supplies the zero instance every build starts from.
pub trait Model: FieldValue + Default {
	/// Name used in errors, logs and the registry.
	fn model_name() -> &'static str;

	/// Field table in declaration order.
	fn fields() -> Vec<Field<Self>>;
}

/// Object-safe view of a model used to walk nested fields by name.
pub trait Record: Send + Sync {
	/// Name of the model behind the record.
	fn record_name(&self) -> &'static str;

	/// Field whose attribute name under tag key `key` is `attr`.
	fn field_mut_for(&mut self, key: &str, attr: &str) -> Option<&mut dyn FieldValue>;

	/// Field whose attribute name under the library-wide tag key is `attr`.
	fn field_mut(&mut self, attr: &str) -> Option<&mut dyn FieldValue> {
		self.field_mut_for(&config::tag_name(), attr)
	}

	/// True if the dotted `segments` lead to a field, under tag key `key`.
	///
	/// Empty references along the way are not allocated.
	fn path_resolves(&mut self, key: &str, segments: &[&str]) -> bool {
		let Some((segment, rest)) = segments.split_first() else {
			return false;
		};
		match self.field_mut_for(key, segment) {
			Some(field) => rest.is_empty() || field.nested_path_resolves(key, rest),
			None => false,
		}
	}
}

impl<M: Model> Record for M {
	fn record_name(&self) -> &'static str {
		M::model_name()
	}

	fn field_mut_for(&mut self, key: &str, attr: &str) -> Option<&mut dyn FieldValue> {
		let field = M::fields()
			.into_iter()
			.find(|field| field.attr_name_for(key) == attr)?;
		Some(field.value_mut(self))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::Value;
	use rstest::rstest;

	#[derive(Debug, Clone, Default, PartialEq)]
	struct Point {
		x: i32,
		label: Option<String>,
	}

	fn x(point: &Point) -> &dyn FieldValue {
		&point.x
	}
	fn x_mut(point: &mut Point) -> &mut dyn FieldValue {
		&mut point.x
	}
	fn copy_x(src: &Point, dst: &mut Point) {
		dst.x = src.x;
	}
	fn label(point: &Point) -> &dyn FieldValue {
		&point.label
	}
	fn label_mut(point: &mut Point) -> &mut dyn FieldValue {
		&mut point.label
	}
	fn copy_label(src: &Point, dst: &mut Point) {
		dst.label = src.label.clone();
	}

	crate::impl_field_value!(Point);

	impl Model for Point {
		fn model_name() -> &'static str {
			"Point"
		}

		fn fields() -> Vec<Field<Self>> {
			vec![
				Field::new::<i32>("x", x, x_mut, copy_x).tag("json", "X"),
				Field::new::<Option<String>>("label", label, label_mut, copy_label),
			]
		}
	}

	#[rstest]
	fn test_field_metadata() {
		let fields = Point::fields();
		assert_eq!(fields[0].name(), "x");
		assert_eq!(fields[0].type_name(), "i32");
		assert_eq!(fields[0].tag_value("json"), Some("X"));
		assert_eq!(fields[0].tag_value("db"), None);
		assert!(fields[1].type_name().contains("Option"));
	}

	#[rstest]
	fn test_attr_name_prefers_tag() {
		let fields = Point::fields();
		assert_eq!(fields[0].attr_name_for("json"), "X");
		assert_eq!(fields[0].attr_name_for("factory"), "x");
		assert_eq!(fields[1].attr_name_for("json"), "label");
	}

	#[rstest]
	fn test_field_accessors() {
		let fields = Point::fields();
		let prototype = Point {
			x: 4,
			label: Some("origin".to_string()),
		};
		let mut point = Point::default();

		assert!(fields[1].value(&point).is_unset());
		fields[0].copy_from(&prototype, &mut point);
		fields[1].value_mut(&mut point).assign(Value::new("moved")).unwrap();

		assert_eq!(point.x, 4);
		assert_eq!(point.label.as_deref(), Some("moved"));
	}

	#[rstest]
	fn test_record_field_lookup() {
		let mut point = Point::default();
		{
			let record: &mut dyn Record = &mut point;
			assert_eq!(record.record_name(), "Point");
			assert!(record.field_mut_for("factory", "missing").is_none());
			assert!(record.field_mut_for("json", "x").is_none());
			record
				.field_mut_for("factory", "x")
				.unwrap()
				.assign(Value::new(9i32))
				.unwrap();
		}
		assert_eq!(point.x, 9);

		let record: &mut dyn Record = &mut point;
		record
			.field_mut_for("json", "X")
			.unwrap()
			.assign(Value::new(3i32))
			.unwrap();
		assert_eq!(point.x, 3);
	}
}
