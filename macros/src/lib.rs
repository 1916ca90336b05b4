//! Derive macros for reinhardt-factory.
//!
//! - `#[derive(Model)]` generates the field descriptor table of a struct
//! - `#[derive(FieldValue)]` lets a leaf type (an enum, a newtype) be stored
//!   in a model field

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod model_derive;

/// Derive macro for the `Model` trait.
///
/// Every named field becomes an entry of the descriptor table, in
/// declaration order. Field types must implement `FieldValue` and `Clone`;
/// the struct itself must implement `Default`.
///
/// # Struct Attributes
///
/// - `#[factory(name = "...")]` - Model name used in errors, logs and the
///   registry (defaults to the struct name)
///
/// # Field Attributes
///
/// - `#[factory(rename = "...")]` - Attribute name under the default
///   `factory` tag key
/// - `#[factory(tag(key = "..."))]` - Tag under any key, for use with
///   `config::set_tag_name`
/// - `#[factory(skip)]` - Leave the field out of the table; built instances
///   keep its `Default` value
///
/// # Example
///
/// ```ignore
/// use reinhardt_factory::prelude::*;
///
/// #[derive(Debug, Clone, Default, Model)]
/// #[factory(name = "auth.User")]
/// struct User {
///     #[factory(rename = "ID", tag(db = "id"))]
///     id: i64,
///     #[factory(rename = "Name")]
///     name: String,
///     #[factory(skip)]
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Model, attributes(factory))]
pub fn derive_model(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	model_derive::derive_model_impl(input)
		.unwrap_or_else(|err| err.to_compile_error())
		.into()
}

/// Derive macro for the `FieldValue` trait.
///
/// The generated implementation accepts a value of exactly the derived
/// type. Nested field overrides cannot reach inside such a value.
///
/// # Example
///
/// ```ignore
/// use reinhardt_factory::prelude::*;
///
/// #[derive(Debug, Clone, Default, PartialEq, FieldValue)]
/// enum Role {
///     #[default]
///     Member,
///     Admin,
/// }
/// ```
#[proc_macro_derive(FieldValue)]
pub fn derive_field_value(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	model_derive::derive_field_value_impl(input)
		.unwrap_or_else(|err| err.to_compile_error())
		.into()
}
