//! Option blocks and flag binding.
//!
//! An option block is a plain struct whose fields become command-line flags.
//! Binding walks the struct through [`Options::bind`], which registers every
//! field with a [`FlagSet`] together with a mutable borrow of the field
//! itself. Parsing later writes straight into those borrows, so the host
//! reads the parsed values back from its own struct once dispatch is done.
//!
//! Most blocks derive the implementation:
//!
//! ```rust
//! use commando::{FlagSet, Options};
//!
//! #[derive(Debug, Default, Options)]
//! struct GreetOptions {
//!     #[option(help = "Shout the greeting")]
//!     loud: bool,
//!     #[option(name = "n", help = "How many times to greet")]
//!     times: usize,
//! }
//!
//! let mut options = GreetOptions { loud: false, times: 1 };
//! let flags = FlagSet::bind(&mut options).unwrap().flags();
//! assert_eq!(flags[0].name, "loud");
//! assert_eq!(flags[1].default, "1");
//! ```
//!
//! Writing the implementation by hand is equally supported and is what the
//! derive expands to:
//!
//! ```rust
//! use commando::{FlagSet, Options};
//!
//! struct Limits {
//!     max_depth: i64,
//! }
//!
//! impl Options for Limits {
//!     fn bind<'a>(&'a mut self, flags: &mut FlagSet<'a>) {
//!         flags.field("max_depth", &mut self.max_depth).help("Maximum depth");
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signature::TypeSpec;

/// A custom flag type, parsed from its string form.
///
/// Implement this for option fields whose type is not one of the built-in
/// kinds (`bool`, `i64`, `isize`, `u64`, `usize`, `f64`, `String`).
/// `Display` provides the default shown in help and in the JSON dump.
#[diagnostic::on_unimplemented(
    message = "invalid option type `{Self}`",
    label = "option fields must be bool, i64, isize, u64, usize, f64, String or implement `FlagValue`"
)]
pub trait FlagValue: fmt::Display {
    /// Replaces the current value with the parsed form of `raw`.
    fn set(&mut self, raw: &str) -> anyhow::Result<()>;

    /// Type label shown in help output.
    fn type_name(&self) -> &str {
        "string"
    }
}

/// Upcasting support for option blocks.
///
/// Blanket-implemented for every `'static` type; it lets the dispatcher hand
/// a `&dyn Options` to a handler expecting the concrete block type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn type_spec(&self) -> TypeSpec;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_spec(&self) -> TypeSpec {
        TypeSpec::of::<T>()
    }
}

/// A struct whose fields are exposed as flags.
pub trait Options: AsAny {
    /// Registers every field of `self` with `flags`.
    fn bind<'a>(&'a mut self, flags: &mut FlagSet<'a>);
}

/// A mutable borrow of one option field, tagged by kind.
pub enum Slot<'a> {
    Bool(&'a mut bool),
    Int(&'a mut isize),
    Int64(&'a mut i64),
    Uint(&'a mut usize),
    Uint64(&'a mut u64),
    Float64(&'a mut f64),
    String(&'a mut String),
    Value(&'a mut dyn FlagValue),
}

impl<'a> Slot<'a> {
    /// Binds a field through its [`FlagValue`] implementation.
    pub fn value<V: FlagValue + 'a>(value: &'a mut V) -> Self {
        Slot::Value(value)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Slot::Bool(_))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Slot::Bool(_) => "bool",
            Slot::Int(_) => "isize",
            Slot::Int64(_) => "i64",
            Slot::Uint(_) => "usize",
            Slot::Uint64(_) => "u64",
            Slot::Float64(_) => "f64",
            Slot::String(_) => "string",
            Slot::Value(v) => v.type_name(),
        }
    }

    /// The current value of the field, in its string form.
    pub fn current(&self) -> String {
        match self {
            Slot::Bool(v) => v.to_string(),
            Slot::Int(v) => v.to_string(),
            Slot::Int64(v) => v.to_string(),
            Slot::Uint(v) => v.to_string(),
            Slot::Uint64(v) => v.to_string(),
            Slot::Float64(v) => v.to_string(),
            Slot::String(v) => (**v).clone(),
            Slot::Value(v) => v.to_string(),
        }
    }

    /// Parses `raw` and stores it in the field.
    pub fn set(&mut self, raw: &str) -> Result<(), String> {
        match self {
            Slot::Bool(v) => **v = parse_bool(raw)?,
            Slot::Int(v) => **v = raw.parse().map_err(|e| format!("{e}"))?,
            Slot::Int64(v) => **v = raw.parse().map_err(|e| format!("{e}"))?,
            Slot::Uint(v) => **v = raw.parse().map_err(|e| format!("{e}"))?,
            Slot::Uint64(v) => **v = raw.parse().map_err(|e| format!("{e}"))?,
            Slot::Float64(v) => **v = raw.parse().map_err(|e| format!("{e}"))?,
            Slot::String(v) => **v = raw.to_string(),
            Slot::Value(v) => v.set(raw).map_err(|e| format!("{e:#}"))?,
        }
        Ok(())
    }
}

impl fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("type", &self.type_name())
            .field("current", &self.current())
            .finish()
    }
}

macro_rules! slot_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a mut $ty> for Slot<'a> {
                fn from(value: &'a mut $ty) -> Self {
                    Slot::$variant(value)
                }
            }
        )*
    };
}

slot_from! {
    bool => Bool,
    isize => Int,
    i64 => Int64,
    usize => Uint,
    u64 => Uint64,
    f64 => Float64,
    String => String,
}

/// Accepts the spellings `1 t T TRUE true True` and `0 f F FALSE false False`.
pub(crate) fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {raw:?}")),
    }
}

/// Description of one flag, as shown in help and in the JSON dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    #[serde(default)]
    pub help: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub default: String,
}

impl Flag {
    /// Whether the default is the zero value of its kind.
    pub fn has_zero_default(&self) -> bool {
        matches!(self.default.as_str(), "" | "0" | "false")
    }
}

/// Construction-time defects in an option block.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("field {field} has an empty flag name")]
    EmptyName { field: String },

    #[error("flag {name} is defined twice (field {field})")]
    Duplicate { name: String, field: String },

    #[error("field {field} has an invalid flag name {name:?}")]
    InvalidName { name: String, field: String },
}

pub(crate) struct Binding<'a> {
    pub(crate) field: String,
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) default: String,
    pub(crate) slot: Slot<'a>,
}

/// The flags of one option block, each bound to its field.
#[derive(Default)]
pub struct FlagSet<'a> {
    pub(crate) bindings: Vec<Binding<'a>>,
}

impl<'a> FlagSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `options` and checks the resulting flag names.
    pub fn bind(options: &'a mut dyn Options) -> Result<Self, BindError> {
        let mut flags = FlagSet::new();
        options.bind(&mut flags);
        flags.check()?;
        Ok(flags)
    }

    /// Registers the field called `ident`.
    ///
    /// The flag name defaults to [`flag_name`] of the identifier and the
    /// default is the field's value at this moment.
    pub fn field(&mut self, ident: &str, slot: impl Into<Slot<'a>>) -> FlagSpec<'_, 'a> {
        let slot = slot.into();
        let index = self.bindings.len();
        self.bindings.push(Binding {
            field: ident.to_string(),
            name: flag_name(ident),
            help: String::new(),
            default: slot.current(),
            slot,
        });
        FlagSpec {
            binding: &mut self.bindings[index],
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| b.name == name)
    }

    /// Describes every registered flag, in field order.
    pub fn flags(&self) -> Vec<Flag> {
        self.bindings
            .iter()
            .map(|b| Flag {
                name: b.name.clone(),
                help: b.help.clone(),
                kind: b.slot.type_name().to_string(),
                default: b.default.clone(),
            })
            .collect()
    }

    /// Verifies that every flag name is usable and unique.
    pub fn check(&self) -> Result<(), BindError> {
        for (i, binding) in self.bindings.iter().enumerate() {
            if binding.name.is_empty() {
                return Err(BindError::EmptyName {
                    field: binding.field.clone(),
                });
            }
            if binding.name.starts_with('-') || binding.name.contains('=') {
                return Err(BindError::InvalidName {
                    name: binding.name.clone(),
                    field: binding.field.clone(),
                });
            }
            if self.bindings[..i].iter().any(|b| b.name == binding.name) {
                return Err(BindError::Duplicate {
                    name: binding.name.clone(),
                    field: binding.field.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FlagSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|b| (&b.name, &b.slot)))
            .finish()
    }
}

/// Overrides for a field registered with [`FlagSet::field`].
pub struct FlagSpec<'s, 'a> {
    binding: &'s mut Binding<'a>,
}

impl FlagSpec<'_, '_> {
    pub fn name(self, name: impl Into<String>) -> Self {
        self.binding.name = name.into();
        self
    }

    pub fn help(self, help: impl Into<String>) -> Self {
        self.binding.help = help.into();
        self
    }
}

/// Derives a flag name from a field identifier.
///
/// Lowercases the identifier and turns word boundaries (underscores and
/// lower-to-upper case transitions) into hyphens.
pub fn flag_name(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let mut name = String::with_capacity(ident.len() + 2);
    let mut after_lower = false;
    for c in ident.chars() {
        if c == '_' || c == '-' {
            if !name.is_empty() && !name.ends_with('-') {
                name.push('-');
            }
            after_lower = false;
        } else if c.is_uppercase() {
            if after_lower {
                name.push('-');
            }
            name.extend(c.to_lowercase());
            after_lower = false;
        } else {
            name.push(c);
            after_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    while name.ends_with('-') {
        name.pop();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Level(u8);

    impl fmt::Display for Level {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "level-{}", self.0)
        }
    }

    impl FlagValue for Level {
        fn set(&mut self, raw: &str) -> anyhow::Result<()> {
            let raw = raw.strip_prefix("level-").unwrap_or(raw);
            self.0 = raw.parse()?;
            Ok(())
        }

        fn type_name(&self) -> &str {
            "level"
        }
    }

    struct Sample {
        verbose: bool,
        max_depth: i64,
        name: String,
        ratio: f64,
        level: Level,
    }

    impl Options for Sample {
        fn bind<'a>(&'a mut self, flags: &mut FlagSet<'a>) {
            flags.field("verbose", &mut self.verbose).help("Talk more");
            flags.field("max_depth", &mut self.max_depth);
            flags.field("name", &mut self.name).name("n");
            flags.field("ratio", &mut self.ratio);
            flags.field("level", Slot::value(&mut self.level));
        }
    }

    fn sample() -> Sample {
        Sample {
            verbose: true,
            max_depth: 3,
            name: "ada".into(),
            ratio: 0.5,
            level: Level(2),
        }
    }

    #[test]
    fn test_flag_name_conversion() {
        assert_eq!(flag_name("loud"), "loud");
        assert_eq!(flag_name("max_depth"), "max-depth");
        assert_eq!(flag_name("MaxDepth"), "max-depth");
        assert_eq!(flag_name("dryRun2"), "dry-run2");
        assert_eq!(flag_name("HTTP"), "http");
        assert_eq!(flag_name("_private_"), "private");
        assert_eq!(flag_name("r#type"), "type");
    }

    #[test]
    fn test_bind_reports_initial_values_as_defaults() {
        let mut options = sample();
        let flags = FlagSet::bind(&mut options).unwrap().flags();

        let summary: Vec<_> = flags
            .iter()
            .map(|f| (f.name.as_str(), f.kind.as_str(), f.default.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("verbose", "bool", "true"),
                ("max-depth", "i64", "3"),
                ("n", "string", "ada"),
                ("ratio", "f64", "0.5"),
                ("level", "level", "level-2"),
            ]
        );
        assert_eq!(flags[0].help, "Talk more");
        assert_eq!(flags[1].help, "");
    }

    #[test]
    fn test_slot_set_writes_through() {
        let mut options = sample();
        {
            let mut flags = FlagSet::bind(&mut options).unwrap();
            for binding in &mut flags.bindings {
                let raw = match binding.name.as_str() {
                    "verbose" => "F",
                    "max-depth" => "-7",
                    "n" => "grace",
                    "ratio" => "1.25",
                    _ => "level-9",
                };
                binding.slot.set(raw).unwrap();
            }
        }
        assert!(!options.verbose);
        assert_eq!(options.max_depth, -7);
        assert_eq!(options.name, "grace");
        assert_eq!(options.ratio, 1.25);
        assert_eq!(options.level, Level(9));
    }

    #[test]
    fn test_slot_set_rejects_bad_input() {
        let mut count = 0u64;
        let mut slot = Slot::from(&mut count);
        assert!(slot.set("-1").is_err());
        assert!(slot.set("many").is_err());

        let mut flag = false;
        let mut slot = Slot::from(&mut flag);
        assert_eq!(slot.set("yes"), Err("invalid boolean \"yes\"".to_string()));
    }

    #[test]
    fn test_parse_bool_spellings() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(raw), Ok(true), "{raw}");
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(raw), Ok(false), "{raw}");
        }
        assert!(parse_bool("tRuE").is_err());
    }

    struct Clashing {
        first: bool,
        second: bool,
    }

    impl Options for Clashing {
        fn bind<'a>(&'a mut self, flags: &mut FlagSet<'a>) {
            flags.field("first", &mut self.first).name("x");
            flags.field("second", &mut self.second).name("x");
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut options = Clashing {
            first: false,
            second: false,
        };
        let err = FlagSet::bind(&mut options).unwrap_err();
        assert_eq!(
            err,
            BindError::Duplicate {
                name: "x".into(),
                field: "second".into()
            }
        );
    }

    #[test]
    fn test_malformed_names_rejected() {
        let mut flag = false;
        let mut flags = FlagSet::new();
        flags.field("value", &mut flag).name("--value");
        assert!(matches!(
            flags.check(),
            Err(BindError::InvalidName { .. })
        ));

        let mut flag = false;
        let mut flags = FlagSet::new();
        flags.field("value", &mut flag).name("");
        assert_eq!(
            flags.check(),
            Err(BindError::EmptyName {
                field: "value".into()
            })
        );
    }

    #[test]
    fn test_zero_default_detection() {
        let flag = |default: &str| Flag {
            name: "x".into(),
            help: String::new(),
            kind: "string".into(),
            default: default.into(),
        };
        assert!(flag("").has_zero_default());
        assert!(flag("0").has_zero_default());
        assert!(flag("false").has_zero_default());
        assert!(!flag("1").has_zero_default());
        assert!(!flag("true").has_zero_default());
    }
}
