//! Command handlers.
//!
//! A handler is the function a command runs. It comes in one of four
//! shapes, chosen when it is registered:
//!
//! | Shape | Parameters |
//! |-------|------------|
//! | bare | none |
//! | args | `&Args` |
//! | options | `&T` where `T` is the command's option block |
//! | args + options | `&Args, &T` |
//!
//! and returns either `()` or `Result<(), E>` for any `E` convertible into
//! [`anyhow::Error`] (see [`HandlerReturn`]). The shape is recorded as a
//! [`Signature`] so the dispatcher can check it against the command before
//! the first call.
//!
//! ```rust
//! use commando::{Args, Command, Argument};
//!
//! fn greet(args: &Args) -> anyhow::Result<()> {
//!     println!("hello {}", args.string("name")?);
//!     Ok(())
//! }
//!
//! let command = Command::new("greet")
//!     .arg(Argument::new("name"))
//!     .run_args(greet);
//! ```

use std::any::{type_name, Any};
use std::fmt;

use anyhow::anyhow;

use crate::args::Args;
use crate::options::Options;
use crate::signature::{ReturnShape, Signature, TypeSpec};

/// Return types a handler may have.
pub trait HandlerReturn {
    const SHAPE: ReturnShape;

    fn into_result(self) -> anyhow::Result<()>;
}

impl HandlerReturn for () {
    const SHAPE: ReturnShape = ReturnShape::Unit;

    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E> HandlerReturn for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    const SHAPE: ReturnShape = ReturnShape::Result;

    fn into_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

type BareFn<'a> = Box<dyn FnMut() -> anyhow::Result<()> + 'a>;
type ArgsFn<'a> = Box<dyn FnMut(&Args<'_>) -> anyhow::Result<()> + 'a>;
type OptionsFn<'a> = Box<dyn FnMut(&dyn Any) -> anyhow::Result<()> + 'a>;
type ArgsOptionsFn<'a> = Box<dyn FnMut(&Args<'_>, &dyn Any) -> anyhow::Result<()> + 'a>;

enum Shape<'a> {
    Bare(BareFn<'a>),
    Args(ArgsFn<'a>),
    Options(OptionsFn<'a>),
    ArgsOptions(ArgsOptionsFn<'a>),
}

/// A type-erased handler together with its signature.
pub struct Handler<'a> {
    name: &'static str,
    signature: Signature,
    shape: Shape<'a>,
}

impl<'a> Handler<'a> {
    /// A handler taking no parameters.
    pub fn bare<F, R>(mut f: F) -> Self
    where
        F: FnMut() -> R + 'a,
        R: HandlerReturn,
    {
        Self {
            name: type_name::<F>(),
            signature: Signature {
                takes_args: false,
                options: None,
                returns: R::SHAPE,
            },
            shape: Shape::Bare(Box::new(move || f().into_result())),
        }
    }

    /// A handler receiving the positional arguments.
    pub fn args<F, R>(mut f: F) -> Self
    where
        F: FnMut(&Args<'_>) -> R + 'a,
        R: HandlerReturn,
    {
        Self {
            name: type_name::<F>(),
            signature: Signature {
                takes_args: true,
                options: None,
                returns: R::SHAPE,
            },
            shape: Shape::Args(args_fn(move |args| f(args).into_result())),
        }
    }

    /// A handler receiving the command's option block.
    pub fn options<T, F, R>(mut f: F) -> Self
    where
        T: Options,
        F: FnMut(&T) -> R + 'a,
        R: HandlerReturn,
    {
        let name = type_name::<F>();
        Self {
            name,
            signature: Signature {
                takes_args: false,
                options: Some(TypeSpec::of::<T>()),
                returns: R::SHAPE,
            },
            shape: Shape::Options(options_fn(move |options| {
                f(downcast::<T>(name, options)?).into_result()
            })),
        }
    }

    /// A handler receiving the positional arguments and the option block.
    pub fn args_options<T, F, R>(mut f: F) -> Self
    where
        T: Options,
        F: FnMut(&Args<'_>, &T) -> R + 'a,
        R: HandlerReturn,
    {
        let name = type_name::<F>();
        Self {
            name,
            signature: Signature {
                takes_args: true,
                options: Some(TypeSpec::of::<T>()),
                returns: R::SHAPE,
            },
            shape: Shape::ArgsOptions(args_options_fn(move |args, options| {
                f(args, downcast::<T>(name, options)?).into_result()
            })),
        }
    }

    /// The handler's type name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invokes the handler with whatever its shape accepts.
    pub(crate) fn call(
        &mut self,
        args: &Args<'_>,
        options: Option<&dyn Any>,
    ) -> anyhow::Result<()> {
        let name = self.name;
        let required = || anyhow!("handler {name} requires options but none were provided");
        match &mut self.shape {
            Shape::Bare(f) => f(),
            Shape::Args(f) => f(args),
            Shape::Options(f) => f(options.ok_or_else(required)?),
            Shape::ArgsOptions(f) => f(args, options.ok_or_else(required)?),
        }
    }
}

impl fmt::Debug for Handler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

fn downcast<'o, T: Any>(handler: &str, options: &'o dyn Any) -> anyhow::Result<&'o T> {
    options.downcast_ref::<T>().ok_or_else(|| {
        anyhow!(
            "handler {handler} expects options of type {}",
            type_name::<T>()
        )
    })
}

fn args_fn<'a, F>(f: F) -> ArgsFn<'a>
where
    F: FnMut(&Args<'_>) -> anyhow::Result<()> + 'a,
{
    Box::new(f)
}

fn options_fn<'a, F>(f: F) -> OptionsFn<'a>
where
    F: FnMut(&dyn Any) -> anyhow::Result<()> + 'a,
{
    Box::new(f)
}

fn args_options_fn<'a, F>(f: F) -> ArgsOptionsFn<'a>
where
    F: FnMut(&Args<'_>, &dyn Any) -> anyhow::Result<()> + 'a,
{
    Box::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Argument, Arguments};
    use crate::options::FlagSet;

    #[derive(Debug, Default)]
    struct Opts {
        loud: bool,
    }

    impl Options for Opts {
        fn bind<'a>(&'a mut self, flags: &mut FlagSet<'a>) {
            flags.field("loud", &mut self.loud);
        }
    }

    fn no_args() -> Arguments {
        Arguments::Unchecked
    }

    #[test]
    fn test_bare_handler_runs() {
        let mut calls = 0;
        {
            let mut handler = Handler::bare(|| calls += 1);
            let arguments = no_args();
            let args = Args::new(vec![], &arguments);
            handler.call(&args, None).unwrap();
            handler.call(&args, None).unwrap();
            assert_eq!(handler.signature().returns, ReturnShape::Unit);
            assert!(!handler.signature().takes_args);
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_args_handler_sees_tokens() {
        let mut seen = String::new();
        {
            let mut handler = Handler::args(|args: &Args| -> anyhow::Result<()> {
                seen = args.string("name")?.to_string();
                Ok(())
            });
            let arguments = Arguments::List(vec![Argument::new("name")]);
            let args = Args::new(vec!["ada".into()], &arguments);
            handler.call(&args, None).unwrap();
            assert_eq!(handler.signature().returns, ReturnShape::Result);
            assert!(handler.signature().takes_args);
        }
        assert_eq!(seen, "ada");
    }

    #[test]
    fn test_options_handler_downcasts() {
        let mut loud = None;
        {
            let mut handler = Handler::options(|opts: &Opts| loud = Some(opts.loud));
            assert_eq!(
                handler.signature().options,
                Some(TypeSpec::of::<Opts>())
            );
            let arguments = no_args();
            let args = Args::new(vec![], &arguments);
            let opts = Opts { loud: true };
            handler.call(&args, Some(&opts)).unwrap();

            let err = handler.call(&args, None).unwrap_err();
            assert!(err.to_string().contains("requires options"));

            let wrong = 7u8;
            let err = handler.call(&args, Some(&wrong)).unwrap_err();
            assert!(err.to_string().contains("expects options of type"));
        }
        assert_eq!(loud, Some(true));
    }

    #[test]
    fn test_errors_are_converted() {
        #[derive(Debug, thiserror::Error)]
        #[error("disk full")]
        struct DiskFull;

        let mut handler =
            Handler::args_options(|_: &Args, _: &Opts| -> Result<(), DiskFull> { Err(DiskFull) });
        let arguments = no_args();
        let args = Args::new(vec![], &arguments);
        let err = handler.call(&args, Some(&Opts::default())).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert!(handler.name().contains("closure"));
    }
}
