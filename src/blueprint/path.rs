//! Dotted-path overrides (`"Group.Name"`).

use crate::error::{FactoryError, FactoryResult};
use crate::model::Record;
use crate::value::{FieldValue, Value};

/// Assigns `value` to the field addressed by `path`.
///
/// The whole path is checked first; empty references met along the way are
/// allocated only once it is known to lead to a field. Returns `Ok(false)`,
/// with `record` untouched, when it does not; only a value of the wrong type
/// at the final field is an error.
pub(super) fn apply_path(
	record: &mut dyn Record,
	tag: &str,
	path: &str,
	value: Value,
) -> FactoryResult<bool> {
	let model = record.record_name();
	let segments: Vec<&str> = path.split('.').collect();
	if !record.path_resolves(tag, &segments) {
		tracing::debug!(model, path, "override path does not resolve; skipped");
		return Ok(false);
	}
	let Some(field) = resolve(record, tag, &segments) else {
		tracing::debug!(model, path, "override path does not resolve; skipped");
		return Ok(false);
	};

	let expected = field.field_type_name();
	field.assign(value).map_err(|rejected| {
		FactoryError::mismatch(format!("path `{path}`"), expected, rejected.type_name())
	})?;
	tracing::trace!(model, path, "override path applied");
	Ok(true)
}

fn resolve<'r>(
	record: &'r mut dyn Record,
	tag: &str,
	segments: &[&str],
) -> Option<&'r mut dyn FieldValue> {
	let (segment, rest) = segments.split_first()?;
	let field = record.field_mut_for(tag, segment)?;
	if rest.is_empty() {
		return Some(field);
	}
	resolve(field.record_mut()?, tag, rest)
}
