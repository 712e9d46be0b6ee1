//! Implementation of the `#[derive(Options)]` macro.
//!
//! Generates an `Options` implementation that registers every named field
//! with the flag set, in declaration order.

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result, Type};

use super::attrs::parse_option_attrs;

/// Field types that bind directly to a built-in flag kind.
const BUILTIN_TYPES: &[&str] = &["bool", "isize", "i64", "usize", "u64", "f64", "String"];

/// Main implementation of the Options derive macro.
pub fn options_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Options can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Options can only be derived for structs",
            ))
        }
    };

    let mut registrations: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_option_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let ident = field_name.to_string();
        let ident = ident.strip_prefix("r#").unwrap_or(&ident).to_string();

        // Unknown types go through FlagValue so the error points at the field type
        let ty = &field.ty;
        let slot = if !attrs.value && is_builtin(ty) {
            quote! { ::commando::Slot::from(&mut self.#field_name) }
        } else {
            let ctor = quote_spanned! {ty.span()=> ::commando::Slot::value};
            quote! { #ctor(&mut self.#field_name) }
        };

        let name = attrs.name.map(|name| quote! { .name(#name) });
        let help = attrs.help.map(|help| quote! { .help(#help) });

        registrations.push(quote! {
            flags.field(#ident, #slot) #name #help;
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::commando::Options for #struct_name #ty_generics #where_clause {
            fn bind<'__a>(&'__a mut self, flags: &mut ::commando::FlagSet<'__a>) {
                #(#registrations)*
            }
        }
    })
}

/// Whether `ty` names one of the built-in flag types.
///
/// Only the last path segment is inspected, so `std::string::String` is
/// recognised as well.
fn is_builtin(ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .map(|segment| {
                segment.arguments.is_none()
                    && BUILTIN_TYPES.iter().any(|name| segment.ident == *name)
            })
            .unwrap_or(false),
        Type::Group(group) => is_builtin(&group.elem),
        Type::Paren(paren) => is_builtin(&paren.elem),
        _ => false,
    }
}
