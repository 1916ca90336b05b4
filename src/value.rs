//! Dynamically typed values and the per-type assignment contract.
//!
//! Generators, formatters and override maps all traffic in [`Value`], a
//! boxed value tagged with its type name. A field accepts a value through
//! its type's [`FieldValue`] implementation, which downcasts and, where it
//! makes sense, lifts the value into the field's shape (`T` into
//! `Option<Box<T>>`, a list of built values into `Vec<T>`, and so on).

use std::any::{Any, type_name};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::model::Record;

/// A boxed value of any `Send + Sync` type.
pub struct Value {
	inner: Box<dyn Any + Send + Sync>,
	type_name: &'static str,
}

impl Value {
	/// Boxes a value. Wrapping a `Value` again returns it unchanged.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::Value;
	///
	/// let value = Value::new(42i64);
	/// assert!(value.is::<i64>());
	/// assert_eq!(value.downcast::<i64>().ok(), Some(42));
	/// ```
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
		match boxed.downcast::<Value>() {
			Ok(value) => *value,
			Err(inner) => Self {
				inner,
				type_name: type_name::<T>(),
			},
		}
	}

	/// Name of the boxed value's type.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Returns true if the boxed value is a `T`.
	pub fn is<T: Any>(&self) -> bool {
		(*self.inner).is::<T>()
	}

	/// Borrows the boxed value as a `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		(*self.inner).downcast_ref::<T>()
	}

	/// Unboxes the value as a `T`, handing it back untouched on mismatch.
	pub fn downcast<T: Any>(self) -> Result<T, Value> {
		let type_name = self.type_name;
		match self.inner.downcast::<T>() {
			Ok(value) => Ok(*value),
			Err(inner) => Err(Self { inner, type_name }),
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Value").field(&self.type_name).finish()
	}
}

/// A type that can be stored in a model field.
///
/// `assign` is the host's field-assignment contract: it either stores the
/// value or hands it back so the caller can report a type mismatch.
/// Models get this trait from `#[derive(Model)]`; leaf types such as enums
/// get it from `#[derive(FieldValue)]` or [`impl_field_value!`](crate::impl_field_value).
pub trait FieldValue: Any + Send + Sync {
	/// Converts a value into `Self`.
	fn from_value(value: Value) -> Result<Self, Value>
	where
		Self: Sized,
	{
		value.downcast::<Self>()
	}

	/// Replaces `self` with the value.
	fn assign(&mut self, value: Value) -> Result<(), Value>;

	/// Name of the implementing type, resolved through a trait object.
	fn field_type_name(&self) -> &'static str {
		type_name::<Self>()
	}

	/// True for an empty reference (`None`).
	fn is_unset(&self) -> bool {
		false
	}

	/// Nested record behind this value, allocating empty references on the way.
	fn record_mut(&mut self) -> Option<&mut dyn Record> {
		None
	}

	/// True if `segments` name a field inside the record behind this value.
	///
	/// Never allocates or changes `self`.
	fn nested_path_resolves(&mut self, _key: &str, _segments: &[&str]) -> bool {
		false
	}

	/// A fresh zero value that can host a nested record.
	fn allocate() -> Option<Self>
	where
		Self: Sized,
	{
		None
	}
}

/// Implements [`FieldValue`] for leaf types that are only ever assigned whole.
///
/// # Examples
///
/// ```
/// use reinhardt_factory::impl_field_value;
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// pub struct Email(String);
///
/// impl_field_value!(Email);
/// ```
#[macro_export]
macro_rules! impl_field_value {
	($($ty:ty),* $(,)?) => {
		$(
			impl $crate::FieldValue for $ty {
				fn assign(&mut self, value: $crate::Value) -> ::core::result::Result<(), $crate::Value> {
					*self = <Self as $crate::FieldValue>::from_value(value)?;
					::core::result::Result::Ok(())
				}
			}
		)*
	};
}

impl_field_value!(
	(),
	bool,
	char,
	i8,
	i16,
	i32,
	i64,
	i128,
	isize,
	u8,
	u16,
	u32,
	u64,
	u128,
	usize,
	f32,
	f64,
);

impl FieldValue for String {
	fn from_value(value: Value) -> Result<Self, Value> {
		match value.downcast::<String>() {
			Ok(value) => Ok(value),
			Err(value) => value.downcast::<&'static str>().map(str::to_owned),
		}
	}

	fn assign(&mut self, value: Value) -> Result<(), Value> {
		*self = Self::from_value(value)?;
		Ok(())
	}
}

impl<T: FieldValue> FieldValue for Option<T> {
	fn from_value(value: Value) -> Result<Self, Value> {
		match value.downcast::<Option<T>>() {
			Ok(value) => Ok(value),
			Err(value) => T::from_value(value).map(Some),
		}
	}

	fn assign(&mut self, value: Value) -> Result<(), Value> {
		*self = Self::from_value(value)?;
		Ok(())
	}

	fn is_unset(&self) -> bool {
		self.is_none()
	}

	fn record_mut(&mut self) -> Option<&mut dyn Record> {
		if self.is_none() {
			*self = Some(T::allocate()?);
		}
		self.as_mut()?.record_mut()
	}

	// An empty reference is checked against a scratch value.
	fn nested_path_resolves(&mut self, key: &str, segments: &[&str]) -> bool {
		match self {
			Some(value) => value.nested_path_resolves(key, segments),
			None => T::allocate().is_some_and(|mut value| value.nested_path_resolves(key, segments)),
		}
	}
}

impl<T: FieldValue> FieldValue for Box<T> {
	fn from_value(value: Value) -> Result<Self, Value> {
		match value.downcast::<Box<T>>() {
			Ok(value) => Ok(value),
			Err(value) => T::from_value(value).map(Box::new),
		}
	}

	fn assign(&mut self, value: Value) -> Result<(), Value> {
		*self = Self::from_value(value)?;
		Ok(())
	}

	fn record_mut(&mut self) -> Option<&mut dyn Record> {
		(**self).record_mut()
	}

	fn nested_path_resolves(&mut self, key: &str, segments: &[&str]) -> bool {
		(**self).nested_path_resolves(key, segments)
	}

	fn allocate() -> Option<Self> {
		T::allocate().map(Box::new)
	}
}

impl<T: FieldValue> FieldValue for Arc<T> {
	fn from_value(value: Value) -> Result<Self, Value> {
		match value.downcast::<Arc<T>>() {
			Ok(value) => Ok(value),
			Err(value) => T::from_value(value).map(Arc::new),
		}
	}

	fn assign(&mut self, value: Value) -> Result<(), Value> {
		*self = Self::from_value(value)?;
		Ok(())
	}

	// Shared records are only reachable while this handle is the sole owner.
	fn record_mut(&mut self) -> Option<&mut dyn Record> {
		Arc::get_mut(self)?.record_mut()
	}

	fn nested_path_resolves(&mut self, key: &str, segments: &[&str]) -> bool {
		Arc::get_mut(self).is_some_and(|value| value.nested_path_resolves(key, segments))
	}

	fn allocate() -> Option<Self> {
		T::allocate().map(Arc::new)
	}
}

impl<T: FieldValue> FieldValue for Vec<T> {
	fn from_value(value: Value) -> Result<Self, Value> {
		let items = match value.downcast::<Vec<T>>() {
			Ok(value) => return Ok(value),
			Err(value) => value.downcast::<Vec<Value>>()?,
		};
		items.into_iter().map(T::from_value).collect()
	}

	fn assign(&mut self, value: Value) -> Result<(), Value> {
		*self = Self::from_value(value)?;
		Ok(())
	}
}

impl<K, V> FieldValue for HashMap<K, V>
where
	K: Eq + Hash + Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	fn assign(&mut self, value: Value) -> Result<(), Value> {
		*self = Self::from_value(value)?;
		Ok(())
	}
}

impl<K, V> FieldValue for BTreeMap<K, V>
where
	K: Ord + Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	fn assign(&mut self, value: Value) -> Result<(), Value> {
		*self = Self::from_value(value)?;
		Ok(())
	}
}

impl<T> FieldValue for HashSet<T>
where
	T: Eq + Hash + Send + Sync + 'static,
{
	fn assign(&mut self, value: Value) -> Result<(), Value> {
		*self = Self::from_value(value)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_value_downcast_roundtrip() {
		let value = Value::new("hyuti".to_string());
		assert!(value.is::<String>());
		assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("hyuti"));
		assert_eq!(value.downcast::<String>().unwrap(), "hyuti");
	}

	#[rstest]
	fn test_value_downcast_mismatch_returns_value() {
		let value = Value::new(3i32);
		let rejected = value.downcast::<String>().unwrap_err();
		assert_eq!(rejected.type_name(), "i32");
		assert_eq!(rejected.downcast::<i32>().unwrap(), 3);
	}

	#[rstest]
	fn test_value_new_does_not_nest() {
		let value = Value::new(Value::new(7u8));
		assert!(value.is::<u8>());
		assert_eq!(value.type_name(), "u8");
	}

	#[rstest]
	fn test_string_accepts_static_str() {
		let mut name = String::new();
		name.assign(Value::new("tokyo")).unwrap();
		assert_eq!(name, "tokyo");
	}

	#[rstest]
	fn test_scalar_rejects_other_type() {
		let mut id = 0i64;
		let rejected = id.assign(Value::new(1i32)).unwrap_err();
		assert_eq!(rejected.type_name(), "i32");
		assert_eq!(id, 0);
	}

	#[rstest]
	fn test_option_box_lifts_inner_value() {
		let mut slot: Option<Box<u32>> = None;
		assert!(slot.is_unset());
		slot.assign(Value::new(5u32)).unwrap();
		assert_eq!(slot.as_deref(), Some(&5));
		assert!(!slot.is_unset());
	}

	#[rstest]
	fn test_option_accepts_explicit_none() {
		let mut slot: Option<String> = Some("x".to_string());
		slot.assign(Value::new(None::<String>)).unwrap();
		assert!(slot.is_none());
	}

	#[rstest]
	fn test_vec_lifts_value_list() {
		let mut items: Vec<Box<i32>> = Vec::new();
		let list = vec![Value::new(1i32), Value::new(2i32), Value::new(3i32)];
		items.assign(Value::new(list)).unwrap();
		assert_eq!(items.iter().map(|i| **i).collect::<Vec<_>>(), vec![1, 2, 3]);
	}

	#[rstest]
	fn test_vec_rejects_mixed_list() {
		let mut items: Vec<i32> = vec![9];
		let list = vec![Value::new(1i32), Value::new("two")];
		let rejected = items.assign(Value::new(list)).unwrap_err();
		assert_eq!(rejected.type_name(), "&str");
		assert_eq!(items, vec![9]);
	}

	#[rstest]
	fn test_map_assign() {
		let mut ext: HashMap<String, String> = HashMap::new();
		let mut replacement = HashMap::new();
		replacement.insert("test".to_string(), "ok".to_string());
		ext.assign(Value::new(replacement)).unwrap();
		assert_eq!(ext.get("test").map(String::as_str), Some("ok"));
	}

	#[rstest]
	fn test_leaf_option_has_no_record() {
		let mut slot: Option<i32> = None;
		assert!(slot.record_mut().is_none());
		assert!(slot.is_none());
	}
}
