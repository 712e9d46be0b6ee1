//! Declarative dispatch for multi-command programs.
//!
//! `commando` runs programs shaped like `prog [global flags] <command>
//! [flags] [arguments]`. Each [`Command`] declares its positional
//! [`Argument`]s, an optional option block whose fields become flags, and a
//! handler. The [`Dispatcher`] parses the command line, writes flag values
//! straight into the option blocks, validates the positional arguments and
//! calls the handler inside a panic guard.
//!
//! # Features
//!
//! - **Typed option blocks**: `#[derive(Options)]` turns struct fields into
//!   flags, with names, help and defaults taken from the struct
//! - **Handler shapes**: handlers take nothing, `&Args`, `&T` or
//!   `(&Args, &T)`, checked against the command before they run
//! - **Global options and hooks**: flags before the command name, a before
//!   hook, an after hook and a provider of extra commands
//! - **Panic recovery**: a panicking handler becomes a [`PanicError`] naming
//!   the source location
//! - **Help**: command listing, per-command help, and a JSON dump for
//!   documentation tools
//!
//! # Example
//!
//! ```rust
//! use commando::{Args, Argument, Command, Dispatcher, Options};
//!
//! #[derive(Debug, Default, Options)]
//! struct GreetOptions {
//!     #[option(help = "Shout the greeting")]
//!     loud: bool,
//! }
//!
//! let mut options = GreetOptions::default();
//! let mut greeted = String::new();
//! let result = Dispatcher::builder()
//!     .program("hello")
//!     .command(
//!         Command::new("greet")
//!             .help("Greets someone")
//!             .arg(Argument::new("name"))
//!             .options(&mut options)
//!             .run_with(|args: &Args, _: &GreetOptions| -> anyhow::Result<()> {
//!                 greeted = args.string("name")?.to_string();
//!                 Ok(())
//!             }),
//!     )
//!     .build()
//!     .run(["greet", "--loud", "Ada"]);
//!
//! assert!(result.is_ok());
//! assert_eq!(greeted, "Ada");
//! assert!(options.loud);
//! ```
//!
//! # Outcomes
//!
//! [`Dispatcher::run`] returns `Ok(())` when the handler succeeded and a
//! [`DispatchError`] otherwise. [`exit_status`] and [`exit`] map the result
//! to the conventional exit codes: 0 for success, 2 when help was shown, 3
//! when no command was given, 4 for arguments passed to a command that takes
//! none and 1 for everything else.

// Lets `#[derive(Options)]` refer to `::commando` inside this crate.
extern crate self as commando;

mod args;
mod command;
mod dispatch;
mod dump;
mod env;
mod error;
mod flags;
mod handler;
pub mod help;
mod hooks;
mod options;
mod recover;
mod signature;

pub use args::{Args, Argument, ArgumentError, Arguments};
pub use command::Command;
pub use dispatch::{run, Dispatcher, DispatcherBuilder};
pub use dump::{CommandHelp, DumpError, Help, DUMP_HELP_ENV};
pub use env::{EnvReader, MockEnv, RealEnv};
pub use error::{exit, exit_code, exit_status, DispatchError};
pub use flags::FlagError;
pub use handler::{Handler, HandlerReturn};
pub use hooks::{Globals, Hook, HookError, HookPhase};
pub use options::{flag_name, AsAny, BindError, Flag, FlagSet, FlagSpec, FlagValue, Options, Slot};
pub use recover::{guard, PanicError};
pub use signature::{Contract, ReturnShape, Signature, SignatureError, TypeSpec};

pub use commando_macros::Options;
