//! Positional arguments.
//!
//! A command declares its positional arguments through an [`Arguments`]
//! contract. The tokens left over after flag parsing are validated against
//! it and handed to the handler as [`Args`], which resolves declared names
//! to positions.

use std::num::ParseIntError;

use serde::Serialize;
use thiserror::Error;

/// One declared positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Argument {
    pub name: String,
    pub help: String,
    pub optional: bool,
}

impl Argument {
    /// A required argument.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            optional: false,
        }
    }

    /// An optional argument. Every argument after it must be optional too.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::new(name)
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

/// The positional-argument contract of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Arguments {
    /// Nothing declared; any tokens are accepted.
    #[default]
    Unchecked,
    /// No positional arguments are allowed.
    None,
    /// Ordered named arguments.
    List(Vec<Argument>),
}

impl Arguments {
    /// The declared arguments, empty unless this is a list.
    pub fn declared(&self) -> &[Argument] {
        match self {
            Arguments::List(list) => list,
            _ => &[],
        }
    }

    /// Whether at least one named argument is declared.
    pub fn has_named(&self) -> bool {
        !self.declared().is_empty()
    }

    /// Number of required arguments.
    pub fn required(&self) -> usize {
        self.declared().iter().filter(|a| !a.optional).count()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.declared().iter().position(|a| a.name == name)
    }

    /// Checks the declaration itself: no required argument may follow an
    /// optional one.
    pub fn check(&self) -> Result<(), ArgumentError> {
        let mut seen_optional = false;
        for argument in self.declared() {
            if argument.optional {
                seen_optional = true;
            } else if seen_optional {
                return Err(ArgumentError::RequiredAfterOptional {
                    name: argument.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Validates the leftover `tokens` against this contract.
    pub fn validate(&self, tokens: &[String]) -> Result<(), ArgumentError> {
        if *self == Arguments::None && !tokens.is_empty() {
            return Err(ArgumentError::Unused);
        }
        self.check()?;
        let required = self.required();
        if tokens.len() < required {
            return Err(ArgumentError::Insufficient {
                required,
                provided: tokens.len(),
            });
        }
        Ok(())
    }
}

/// Positional argument failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("arguments provided but not used")]
    Unused,

    #[error("not enough arguments: {required} required, {provided} provided")]
    Insufficient { required: usize, provided: usize },

    #[error("required argument {name:?} comes after optional arguments")]
    RequiredAfterOptional { name: String },

    #[error("no argument named {0:?} is declared")]
    Undeclared(String),

    #[error("argument {name} is not an integer: {value:?}")]
    InvalidInt {
        name: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// The positional tokens passed to a handler.
#[derive(Debug, Clone)]
pub struct Args<'c> {
    values: Vec<String>,
    arguments: &'c Arguments,
}

impl<'c> Args<'c> {
    pub fn new(values: Vec<String>, arguments: &'c Arguments) -> Self {
        Self { values, arguments }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn arguments(&self) -> &'c Arguments {
        self.arguments
    }

    /// The token at `position`, or `""` when fewer were provided.
    pub fn string_at(&self, position: usize) -> &str {
        self.values.get(position).map(String::as_str).unwrap_or("")
    }

    /// The token for the declared argument `name`, or `""` if it was not
    /// provided.
    pub fn string(&self, name: &str) -> Result<&str, ArgumentError> {
        let position = self
            .arguments
            .position(name)
            .ok_or_else(|| ArgumentError::Undeclared(name.to_string()))?;
        Ok(self.string_at(position))
    }

    /// The token for `name`, when it is declared and was provided.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.arguments
            .position(name)
            .and_then(|position| self.values.get(position))
            .map(String::as_str)
    }

    /// The token for `name` parsed as an integer.
    ///
    /// Fails when the argument is undeclared, missing or not a number.
    pub fn int(&self, name: &str) -> Result<i64, ArgumentError> {
        let value = self.string(name)?;
        value.parse().map_err(|source| ArgumentError::InvalidInt {
            name: name.to_string(),
            value: value.to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ArgumentError> {
        self.arguments.validate(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn list(arguments: Vec<Argument>) -> Arguments {
        Arguments::List(arguments)
    }

    #[test]
    fn test_no_args_marker() {
        assert_eq!(Arguments::None.validate(&[]), Ok(()));
        assert_eq!(
            Arguments::None.validate(&tokens(&["stray"])),
            Err(ArgumentError::Unused)
        );
    }

    #[test]
    fn test_unchecked_accepts_anything() {
        assert_eq!(Arguments::Unchecked.validate(&[]), Ok(()));
        assert_eq!(Arguments::Unchecked.validate(&tokens(&["a", "b"])), Ok(()));
    }

    #[test]
    fn test_required_count() {
        let arguments = list(vec![
            Argument::new("src"),
            Argument::new("dst"),
            Argument::optional("mode"),
        ]);
        assert_eq!(
            arguments.validate(&tokens(&["a"])),
            Err(ArgumentError::Insufficient {
                required: 2,
                provided: 1
            })
        );
        assert_eq!(arguments.validate(&tokens(&["a", "b"])), Ok(()));
        assert_eq!(arguments.validate(&tokens(&["a", "b", "c", "d"])), Ok(()));
        assert_eq!(
            arguments.validate(&[]).unwrap_err().to_string(),
            "not enough arguments: 2 required, 0 provided"
        );
    }

    #[test]
    fn test_required_after_optional_always_fails() {
        let arguments = list(vec![Argument::optional("a"), Argument::new("b")]);
        for count in 0..4 {
            let provided: Vec<String> = (0..count).map(|i| i.to_string()).collect();
            assert_eq!(
                arguments.validate(&provided),
                Err(ArgumentError::RequiredAfterOptional { name: "b".into() }),
                "with {count} tokens"
            );
        }
        assert!(arguments.check().is_err());
    }

    #[test]
    fn test_named_access() {
        let arguments = list(vec![Argument::new("name"), Argument::optional("count")]);
        let args = Args::new(tokens(&["ada", "3"]), &arguments);
        assert_eq!(args.string("name"), Ok("ada"));
        assert_eq!(args.int("count"), Ok(3));
        assert_eq!(args.get("count"), Some("3"));
        assert_eq!(
            args.string("missing"),
            Err(ArgumentError::Undeclared("missing".into()))
        );

        let short = Args::new(tokens(&["ada"]), &arguments);
        assert_eq!(short.string("count"), Ok(""));
        assert_eq!(short.get("count"), None);
        assert!(matches!(
            short.int("count"),
            Err(ArgumentError::InvalidInt { ref value, .. }) if value.is_empty()
        ));
    }

    #[test]
    fn test_int_rejects_garbage() {
        let arguments = list(vec![Argument::new("n")]);
        let args = Args::new(tokens(&["twelve"]), &arguments);
        let err = args.int("n").unwrap_err();
        assert_eq!(err.to_string(), "argument n is not an integer: \"twelve\"");
    }

    #[test]
    fn test_positional_access() {
        let args = Args::new(tokens(&["x", "y"]), &Arguments::Unchecked);
        assert_eq!(args.string_at(1), "y");
        assert_eq!(args.string_at(5), "");
        assert_eq!(args.len(), 2);
        assert!(!args.is_empty());
        assert_eq!(args.values(), ["x", "y"]);
    }
}
