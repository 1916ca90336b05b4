//! Attribute generators and formatters.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::args::Args;
use crate::error::{FactoryError, FactoryResult};
use crate::model::Model;
use crate::value::Value;

type Produce<M> = dyn Fn(&Args<'_, M>) -> FactoryResult<Option<Value>> + Send + Sync;

/// Rule producing one field's value.
///
/// The produced value is threaded through the formatters in order; the
/// first failing formatter aborts the build. A generator may also produce
/// nothing, which leaves the field as it is.
pub struct AttributeGenerator<M: Model> {
	produce: Arc<Produce<M>>,
	formatters: Vec<Formatter>,
}

impl<M: Model> AttributeGenerator<M> {
	/// Generator that always produces a value.
	pub fn new<V, F>(produce: F) -> Self
	where
		V: Any + Send + Sync,
		F: Fn(&Args<'_, M>) -> FactoryResult<V> + Send + Sync + 'static,
	{
		Self::optional(move |args| produce(args).map(|value| Some(Value::new(value))))
	}

	/// Generator that may produce nothing.
	pub fn optional<F>(produce: F) -> Self
	where
		F: Fn(&Args<'_, M>) -> FactoryResult<Option<Value>> + Send + Sync + 'static,
	{
		Self {
			produce: Arc::new(produce),
			formatters: Vec::new(),
		}
	}

	/// Appends a formatter.
	pub fn with_formatter(mut self, formatter: Formatter) -> Self {
		self.formatters.push(formatter);
		self
	}

	/// Formatters in application order.
	pub fn formatters(&self) -> &[Formatter] {
		&self.formatters
	}

	/// Runs the generator and its formatters.
	pub fn apply(&self, args: &Args<'_, M>) -> FactoryResult<Option<Value>> {
		let Some(mut value) = (self.produce)(args)? else {
			return Ok(None);
		};
		for formatter in &self.formatters {
			value = formatter.apply(value)?;
		}
		Ok(Some(value))
	}
}

impl<M: Model> Clone for AttributeGenerator<M> {
	fn clone(&self) -> Self {
		Self {
			produce: Arc::clone(&self.produce),
			formatters: self.formatters.clone(),
		}
	}
}

impl<M: Model> fmt::Debug for AttributeGenerator<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AttributeGenerator")
			.field("formatters", &self.formatters.len())
			.finish()
	}
}

/// Post-processing step applied to a generated value.
#[derive(Clone)]
pub struct Formatter {
	format: Arc<dyn Fn(Value) -> FactoryResult<Value> + Send + Sync>,
}

impl Formatter {
	/// Formatter over untyped values.
	pub fn new<F>(format: F) -> Self
	where
		F: Fn(Value) -> FactoryResult<Value> + Send + Sync + 'static,
	{
		Self {
			format: Arc::new(format),
		}
	}

	/// Formatter from `A` to `B`; any other input is a type mismatch.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_factory::{Formatter, Value};
	///
	/// let suffix = Formatter::map(|name: String| Ok(format!("{name}bar")));
	/// let value = suffix.apply(Value::new("foo".to_string())).unwrap();
	/// assert_eq!(value.downcast::<String>().unwrap(), "foobar");
	///
	/// assert!(suffix.apply(Value::new(1u8)).is_err());
	/// ```
	pub fn map<A, B, F>(format: F) -> Self
	where
		A: Any + Send + Sync,
		B: Any + Send + Sync,
		F: Fn(A) -> FactoryResult<B> + Send + Sync + 'static,
	{
		Self::new(move |value| {
			let input = value.downcast::<A>().map_err(|rejected| {
				FactoryError::mismatch("formatter input", type_name::<A>(), rejected.type_name())
			})?;
			format(input).map(Value::new)
		})
	}

	/// Applies the formatter.
	pub fn apply(&self, value: Value) -> FactoryResult<Value> {
		(self.format)(value)
	}
}

impl fmt::Debug for Formatter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Formatter")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_formatter_map() {
		let double = Formatter::map(|n: i32| Ok(n * 2));
		let value = double.apply(Value::new(21i32)).unwrap();
		assert_eq!(value.downcast::<i32>().unwrap(), 42);
	}

	#[rstest]
	fn test_formatter_map_rejects_wrong_input() {
		let double = Formatter::map(|n: i32| Ok(n * 2));
		let error = double.apply(Value::new("21")).unwrap_err();
		assert!(matches!(
			error,
			FactoryError::TypeMismatch { ref target, expected: "i32", found: "&str" } if target == "formatter input"
		));
	}

	#[rstest]
	fn test_formatter_error_propagates() {
		let failing = Formatter::new(|_| Err(FactoryError::generator("bad format")));
		let error = failing.apply(Value::new(())).unwrap_err();
		assert_eq!(error.to_string(), "Generator error: bad format");
	}

	#[rstest]
	fn test_formatter_may_change_type() {
		let describe = Formatter::map(|n: u8| Ok(format!("#{n}")));
		let value = describe.apply(Value::new(3u8)).unwrap();
		assert_eq!(value.type_name(), std::any::type_name::<String>());
	}
}
