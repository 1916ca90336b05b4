//! Parsing of `#[factory(...)]` attributes.

use syn::ext::IdentExt;
use syn::{Attribute, LitStr};

/// Tag key `rename` writes under.
pub(crate) const FACTORY_TAG: &str = "factory";

/// Struct-level options.
#[derive(Default)]
pub(crate) struct ContainerAttrs {
	/// Overrides the model name reported by `Model::model_name`.
	pub(crate) name: Option<LitStr>,
}

/// Field-level options.
#[derive(Default)]
pub(crate) struct FieldAttrs {
	pub(crate) skip: bool,
	/// `(key, value)` tags in declaration order.
	pub(crate) tags: Vec<(String, LitStr)>,
}

pub(crate) fn container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
	let mut parsed = ContainerAttrs::default();
	for attr in attrs.iter().filter(|attr| attr.path().is_ident("factory")) {
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("name") {
				parsed.name = Some(meta.value()?.parse()?);
				Ok(())
			} else {
				Err(meta.error("unsupported factory attribute, expected `name`"))
			}
		})?;
	}
	Ok(parsed)
}

pub(crate) fn field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
	let mut parsed = FieldAttrs::default();
	for attr in attrs.iter().filter(|attr| attr.path().is_ident("factory")) {
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("rename") {
				let value: LitStr = meta.value()?.parse()?;
				parsed.tags.push((FACTORY_TAG.to_string(), value));
				Ok(())
			} else if meta.path.is_ident("skip") {
				parsed.skip = true;
				Ok(())
			} else if meta.path.is_ident("tag") {
				meta.parse_nested_meta(|tag| {
					let key = tag
						.path
						.get_ident()
						.ok_or_else(|| tag.error("tag key must be an identifier"))?
						.unraw()
						.to_string();
					let value: LitStr = tag.value()?.parse()?;
					parsed.tags.push((key, value));
					Ok(())
				})
			} else {
				Err(meta.error("unsupported factory attribute, expected `rename`, `tag` or `skip`"))
			}
		})?;
		if parsed.skip && !parsed.tags.is_empty() {
			return Err(syn::Error::new_spanned(attr, "a skipped field cannot carry tags"));
		}
	}
	Ok(parsed)
}
