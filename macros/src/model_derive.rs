//! Derive macros for the `Model` and `FieldValue` traits.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields};

use crate::attrs::{container_attrs, field_attrs};

/// Implementation of the Model derive macro
pub(crate) fn derive_model_impl(input: DeriveInput) -> syn::Result<TokenStream> {
	let struct_name = &input.ident;

	if !input.generics.params.is_empty() {
		return Err(syn::Error::new_spanned(
			&input.generics,
			"Model cannot be derived for generic structs",
		));
	}

	// Only support structs with named fields
	let fields = match &input.data {
		Data::Struct(data_struct) => match &data_struct.fields {
			Fields::Named(fields) => &fields.named,
			_ => {
				return Err(syn::Error::new_spanned(
					struct_name,
					"Model can only be derived for structs with named fields",
				));
			}
		},
		_ => {
			return Err(syn::Error::new_spanned(
				struct_name,
				"Model can only be derived for structs",
			));
		}
	};

	let container = container_attrs(&input.attrs)?;
	let model_name = match container.name {
		Some(name) => name.value(),
		None => struct_name.unraw().to_string(),
	};

	let mut accessors = Vec::new();
	let mut descriptors = Vec::new();
	for field in fields {
		let attrs = field_attrs(&field.attrs)?;
		if attrs.skip {
			continue;
		}

		// Named fields always carry an identifier
		let Some(ident) = &field.ident else {
			continue;
		};
		let ty = &field.ty;
		let name = ident.unraw().to_string();
		let get = format_ident!("__factory_get_{}", name);
		let get_mut = format_ident!("__factory_get_mut_{}", name);
		let copy = format_ident!("__factory_copy_{}", name);
		let tags = attrs.tags.iter().map(|(key, value)| quote! { .tag(#key, #value) });

		accessors.push(quote! {
			fn #get(model: &#struct_name) -> &dyn ::reinhardt_factory::FieldValue {
				&model.#ident
			}
			fn #get_mut(model: &mut #struct_name) -> &mut dyn ::reinhardt_factory::FieldValue {
				&mut model.#ident
			}
			fn #copy(src: &#struct_name, dst: &mut #struct_name) {
				dst.#ident = ::core::clone::Clone::clone(&src.#ident);
			}
		});
		descriptors.push(quote! {
			::reinhardt_factory::Field::new::<#ty>(#name, #get, #get_mut, #copy) #(#tags)*
		});
	}

	Ok(quote! {
		impl ::reinhardt_factory::FieldValue for #struct_name {
			fn assign(
				&mut self,
				value: ::reinhardt_factory::Value,
			) -> ::core::result::Result<(), ::reinhardt_factory::Value> {
				*self = <Self as ::reinhardt_factory::FieldValue>::from_value(value)?;
				::core::result::Result::Ok(())
			}

			fn record_mut(&mut self) -> ::core::option::Option<&mut dyn ::reinhardt_factory::Record> {
				::core::option::Option::Some(self)
			}

			fn nested_path_resolves(&mut self, key: &str, segments: &[&str]) -> bool {
				<Self as ::reinhardt_factory::Record>::path_resolves(self, key, segments)
			}

			fn allocate() -> ::core::option::Option<Self> {
				::core::option::Option::Some(<Self as ::core::default::Default>::default())
			}
		}

		impl ::reinhardt_factory::Model for #struct_name {
			fn model_name() -> &'static str {
				#model_name
			}

			#[allow(non_snake_case)]
			fn fields() -> ::std::vec::Vec<::reinhardt_factory::Field<Self>> {
				#(#accessors)*
				::std::vec![#(#descriptors),*]
			}
		}
	})
}

/// Implementation of the FieldValue derive macro
pub(crate) fn derive_field_value_impl(input: DeriveInput) -> syn::Result<TokenStream> {
	let name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	Ok(quote! {
		impl #impl_generics ::reinhardt_factory::FieldValue for #name #ty_generics #where_clause {
			fn assign(
				&mut self,
				value: ::reinhardt_factory::Value,
			) -> ::core::result::Result<(), ::reinhardt_factory::Value> {
				*self = <Self as ::reinhardt_factory::FieldValue>::from_value(value)?;
				::core::result::Result::Ok(())
			}
		}
	})
}
