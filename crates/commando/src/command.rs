//! Command declarations.

use std::fmt;

use crate::args::{Args, Argument, Arguments};
use crate::handler::{Handler, HandlerReturn};
use crate::options::{BindError, Flag, FlagSet, Options};
use crate::signature::{Contract, TypeSpec};

/// A named command: its help texts, positional-argument contract, optional
/// option block and handler.
///
/// The option block is borrowed mutably for the command's lifetime; flags
/// parsed during dispatch are written into it, and the host reads them back
/// once the dispatcher has been dropped.
///
/// ```rust
/// use commando::{Args, Argument, Command, Options};
///
/// #[derive(Default, Options)]
/// struct GreetOptions {
///     loud: bool,
/// }
///
/// fn greet(args: &Args, options: &GreetOptions) -> anyhow::Result<()> {
///     let name = args.string("name")?;
///     if options.loud {
///         println!("HELLO {}!", name.to_uppercase());
///     } else {
///         println!("hello {name}");
///     }
///     Ok(())
/// }
///
/// let mut options = GreetOptions::default();
/// let command = Command::new("greet")
///     .help("Greets someone")
///     .arg(Argument::new("name").help("Who to greet"))
///     .options(&mut options)
///     .run_with(greet);
/// ```
pub struct Command<'a> {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) long_help: String,
    pub(crate) usage: String,
    pub(crate) arguments: Arguments,
    pub(crate) options: Option<&'a mut dyn Options>,
    pub(crate) handler: Option<Handler<'a>>,
}

impl<'a> Command<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            long_help: String::new(),
            usage: String::new(),
            arguments: Arguments::Unchecked,
            options: None,
            handler: None,
        }
    }

    /// One-line help shown in the command listing.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Detailed help shown by `help <command>`.
    pub fn long_help(mut self, long_help: impl Into<String>) -> Self {
        self.long_help = long_help.into();
        self
    }

    /// Free-form usage text shown after the command name.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Declares the next positional argument.
    pub fn arg(mut self, argument: Argument) -> Self {
        match &mut self.arguments {
            Arguments::List(list) => list.push(argument),
            _ => self.arguments = Arguments::List(vec![argument]),
        }
        self
    }

    /// Declares all positional arguments at once.
    pub fn args(mut self, arguments: impl IntoIterator<Item = Argument>) -> Self {
        self.arguments = Arguments::List(arguments.into_iter().collect());
        self
    }

    /// Rejects any positional argument.
    pub fn no_args(mut self) -> Self {
        self.arguments = Arguments::None;
        self
    }

    /// Binds the command's flags to `options`.
    pub fn options<T: Options>(mut self, options: &'a mut T) -> Self {
        self.options = Some(options);
        self
    }

    pub fn handler(mut self, handler: Handler<'a>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Runs `f` with no parameters.
    pub fn run<F, R>(self, f: F) -> Self
    where
        F: FnMut() -> R + 'a,
        R: HandlerReturn,
    {
        self.handler(Handler::bare(f))
    }

    /// Runs `f` with the positional arguments.
    pub fn run_args<F, R>(self, f: F) -> Self
    where
        F: FnMut(&Args<'_>) -> R + 'a,
        R: HandlerReturn,
    {
        self.handler(Handler::args(f))
    }

    /// Runs `f` with the option block.
    pub fn run_options<T, F, R>(self, f: F) -> Self
    where
        T: Options,
        F: FnMut(&T) -> R + 'a,
        R: HandlerReturn,
    {
        self.handler(Handler::options(f))
    }

    /// Runs `f` with the positional arguments and the option block.
    pub fn run_with<T, F, R>(self, f: F) -> Self
    where
        T: Options,
        F: FnMut(&Args<'_>, &T) -> R + 'a,
        R: HandlerReturn,
    {
        self.handler(Handler::args_options(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn long_help_text(&self) -> &str {
        &self.long_help
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn has_options(&self) -> bool {
        self.options.is_some()
    }

    pub fn options_type(&self) -> Option<TypeSpec> {
        self.options.as_deref().map(|o| o.type_spec())
    }

    pub fn get_handler(&self) -> Option<&Handler<'a>> {
        self.handler.as_ref()
    }

    /// What this command requires of its handler.
    pub fn contract(&self) -> Contract {
        Contract::command(&self.arguments, self.options_type())
    }

    /// Describes the command's flags, with defaults taken from the option
    /// block's current values.
    pub fn flags(&mut self) -> Result<Vec<Flag>, BindError> {
        match self.options.as_deref_mut() {
            Some(options) => Ok(FlagSet::bind(options)?.flags()),
            None => Ok(Vec::new()),
        }
    }
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("options", &self.options_type().map(|t| t.name()))
            .field("handler", &self.handler)
            .finish()
    }
}
