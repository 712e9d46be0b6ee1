//! Attribute parsing for the Options derive macro.
//!
//! Parses the `#[option(...)]` field attributes:
//!
//! - `name = "..."`: flag name, instead of the one derived from the field
//! - `help = "..."`: help text
//! - `skip`: the field is not a flag
//! - `value`: bind through `FlagValue` even if the type looks built-in

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta, Result, Token,
};

/// Field-level attributes from `#[option(...)]`.
#[derive(Debug, Clone)]
pub struct OptionAttr {
    pub name: Option<String>,
    pub help: Option<String>,
    pub skip: bool,
    pub value: bool,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for OptionAttr {
    fn default() -> Self {
        OptionAttr {
            name: None,
            help: None,
            skip: false,
            value: false,
            span: Span::call_site(),
        }
    }
}

impl Parse for OptionAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = OptionAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) if p.is_ident("value") => attr.value = true,

                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    let name = string_value(&nv.value, "name")?;
                    if name.value().is_empty() {
                        return Err(Error::new(name.span(), "flag name cannot be empty"));
                    }
                    if name.value().starts_with('-') || name.value().contains('=') {
                        return Err(Error::new(
                            name.span(),
                            "flag name cannot start with '-' or contain '='",
                        ));
                    }
                    attr.span = name.span();
                    attr.name = Some(name.value());
                }

                Meta::NameValue(nv) if nv.path.is_ident("help") => {
                    attr.help = Some(string_value(&nv.value, "help")?.value());
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown option attribute. Expected: name = \"...\", help = \"...\", skip, or value",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

fn string_value<'e>(expr: &'e Expr, key: &str) -> Result<&'e LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(Error::new(
            other.span(),
            format!("{key} must be a string literal"),
        )),
    }
}

/// Extract the `#[option(...)]` attribute from a field's attributes.
pub fn parse_option_attrs(attrs: &[Attribute]) -> Result<OptionAttr> {
    for attr in attrs {
        if attr.path().is_ident("option") {
            return attr.parse_args::<OptionAttr>();
        }
    }
    Ok(OptionAttr::default())
}
