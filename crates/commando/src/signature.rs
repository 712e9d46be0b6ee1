//! Handler signature validation.
//!
//! Every handler and hook records, when it is registered, which parameters
//! it accepts. Before a handler runs, its [`Signature`] is checked against
//! the [`Contract`] its command implies: a command declaring named
//! arguments must have a handler that receives [`Args`](crate::Args), and a
//! command with an option block must have a handler receiving exactly that
//! block type. A mismatch is a defect in the command table, so the
//! dispatcher panics with the message of the returned [`SignatureError`].

use std::any::{Any, TypeId};
use std::fmt;

use thiserror::Error;

use crate::args::Arguments;

/// A runtime handle on a concrete type: its `TypeId` plus a readable name.
#[derive(Debug, Clone, Copy)]
pub struct TypeSpec {
    id: TypeId,
    name: &'static str,
}

impl TypeSpec {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeSpec {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeSpec {}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// `()`, the handler cannot fail.
    Unit,
    /// `Result<(), E>`.
    Result,
}

/// The parameter list and return shape of a registered handler or hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub takes_args: bool,
    pub options: Option<TypeSpec>,
    pub returns: ReturnShape,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        if self.takes_args {
            f.write_str("&Args")?;
        }
        if let Some(options) = &self.options {
            if self.takes_args {
                f.write_str(", ")?;
            }
            write!(f, "&{options}")?;
        }
        f.write_str(")")?;
        if self.returns == ReturnShape::Result {
            f.write_str(" -> Result<(), _>")?;
        }
        Ok(())
    }
}

/// The parameters a command (or hook) requires of its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contract {
    pub takes_args: bool,
    pub options: Option<TypeSpec>,
}

impl Contract {
    /// A command's contract: named arguments require the `Args` carrier.
    pub fn command(arguments: &Arguments, options: Option<TypeSpec>) -> Self {
        Self {
            takes_args: arguments.has_named(),
            options,
        }
    }

    /// Hooks never receive positional arguments.
    pub fn hook(options: Option<TypeSpec>) -> Self {
        Self {
            takes_args: false,
            options,
        }
    }

    fn options_position(&self, signature: &Signature) -> &'static str {
        if signature.takes_args || self.takes_args {
            "second"
        } else {
            "first"
        }
    }
}

/// A handler whose parameters do not fit its command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("{function} must accept &Args as its first parameter, found {actual}")]
    MissingArgs { function: String, actual: String },

    #[error("{function} must accept &{expected} as its {position} parameter, found {actual}")]
    MissingOptions {
        function: String,
        expected: &'static str,
        position: &'static str,
        actual: String,
    },

    #[error("{function} must accept &{expected} as its {position} parameter, not &{found}")]
    OptionsMismatch {
        function: String,
        expected: &'static str,
        found: &'static str,
        position: &'static str,
    },

    #[error("{function} accepts &{found} but no options are declared")]
    UnexpectedOptions {
        function: String,
        found: &'static str,
    },
}

/// Checks `signature` against `contract`.
///
/// `function` names the handler in the error.
pub fn validate(
    function: &str,
    contract: &Contract,
    signature: &Signature,
) -> Result<(), SignatureError> {
    if contract.takes_args && !signature.takes_args {
        return Err(SignatureError::MissingArgs {
            function: function.to_string(),
            actual: signature.to_string(),
        });
    }
    match (&contract.options, &signature.options) {
        (None, None) => Ok(()),
        (Some(expected), None) => Err(SignatureError::MissingOptions {
            function: function.to_string(),
            expected: expected.name(),
            position: contract.options_position(signature),
            actual: signature.to_string(),
        }),
        (None, Some(found)) => Err(SignatureError::UnexpectedOptions {
            function: function.to_string(),
            found: found.name(),
        }),
        (Some(expected), Some(found)) if expected != found => {
            Err(SignatureError::OptionsMismatch {
                function: function.to_string(),
                expected: expected.name(),
                found: found.name(),
                position: contract.options_position(signature),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Argument;

    struct Alpha;
    struct Beta;

    fn signature(takes_args: bool, options: Option<TypeSpec>) -> Signature {
        Signature {
            takes_args,
            options,
            returns: ReturnShape::Unit,
        }
    }

    #[test]
    fn test_bare_handler_fits_unchecked_command() {
        let contract = Contract::command(&Arguments::Unchecked, None);
        assert_eq!(validate("run", &contract, &signature(false, None)), Ok(()));
        assert_eq!(validate("run", &contract, &signature(true, None)), Ok(()));
    }

    #[test]
    fn test_named_arguments_require_args_carrier() {
        let arguments = Arguments::List(vec![Argument::new("name")]);
        let contract = Contract::command(&arguments, None);
        let err = validate("greet", &contract, &signature(false, None)).unwrap_err();
        assert!(matches!(err, SignatureError::MissingArgs { .. }));
        assert_eq!(
            err.to_string(),
            "greet must accept &Args as its first parameter, found fn()"
        );
    }

    #[test]
    fn test_no_args_marker_does_not_require_carrier() {
        let contract = Contract::command(&Arguments::None, None);
        assert_eq!(validate("list", &contract, &signature(false, None)), Ok(()));
    }

    #[test]
    fn test_options_type_must_match_exactly() {
        let contract = Contract::command(&Arguments::Unchecked, Some(TypeSpec::of::<Alpha>()));
        assert_eq!(
            validate(
                "run",
                &contract,
                &signature(false, Some(TypeSpec::of::<Alpha>()))
            ),
            Ok(())
        );

        let err = validate(
            "run",
            &contract,
            &signature(true, Some(TypeSpec::of::<Beta>())),
        )
        .unwrap_err();
        match err {
            SignatureError::OptionsMismatch {
                expected,
                found,
                position,
                ..
            } => {
                assert!(expected.ends_with("Alpha"));
                assert!(found.ends_with("Beta"));
                assert_eq!(position, "second");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_and_unexpected_options() {
        let with_options =
            Contract::command(&Arguments::Unchecked, Some(TypeSpec::of::<Alpha>()));
        assert!(matches!(
            validate("run", &with_options, &signature(false, None)),
            Err(SignatureError::MissingOptions {
                position: "first",
                ..
            })
        ));

        let without = Contract::hook(None);
        assert!(matches!(
            validate("before", &without, &signature(false, Some(TypeSpec::of::<Beta>()))),
            Err(SignatureError::UnexpectedOptions { .. })
        ));
    }

    #[test]
    fn test_signature_display() {
        let sig = Signature {
            takes_args: true,
            options: Some(TypeSpec::of::<u8>()),
            returns: ReturnShape::Result,
        };
        assert_eq!(sig.to_string(), "fn(&Args, &u8) -> Result<(), _>");
        assert_eq!(signature(false, None).to_string(), "fn()");
    }
}
