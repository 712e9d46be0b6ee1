//! Proc macros for commando.
//!
//! # Available Macros
//!
//! - [`Options`] - Generate the flag bindings of an option block from its
//!   struct fields
//!
//! # Examples
//!
//! For working examples, see `commando/tests/derive_options.rs`.

mod options;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Options` trait for a struct with named fields.
///
/// Every field becomes a flag. The flag name is the field name in kebab case
/// (`dry_run` becomes `dry-run`) and the default shown in help is the value
/// the field holds when the command line is parsed.
///
/// # Supported Field Types
///
/// `bool`, `isize`, `i64`, `usize`, `u64`, `f64` and `String` bind directly.
/// Any other type must implement `commando::FlagValue`.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `name = "..."` | Flag name (single characters are also accepted as `-x`) |
/// | `help = "..."` | Help text for the flag |
/// | `skip` | Do not expose the field as a flag |
/// | `value` | Bind through `FlagValue` even for a built-in type |
///
/// # Example
///
/// ```ignore
/// use commando::Options;
///
/// #[derive(Default, Options)]
/// struct SyncOptions {
///     #[option(name = "n", help = "Only print what would change")]
///     dry_run: bool,
///
///     #[option(help = "Parallel transfers")]
///     jobs: usize,
///
///     #[option(skip)]
///     cache: Vec<String>,
/// }
/// ```
///
/// # Compile-Time Errors
///
/// - Enums, unions and tuple structs
/// - Unknown keys in `#[option(...)]`
/// - An empty `name`, or one starting with `-` or containing `=`
/// - A field type that is neither built-in nor a `FlagValue`
#[proc_macro_derive(Options, attributes(option))]
pub fn options_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    options::options_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
