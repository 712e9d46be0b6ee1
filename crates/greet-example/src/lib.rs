//! A small greeting program built on commando.
//!
//! ```text
//! greet [-v] <command> [flags] [arguments]
//!
//! greet greet --loud --times 2 Ada
//! greet sum 2 40
//! greet divide 1 0
//! ```
//!
//! `divide` by zero panics inside its handler; the dispatcher turns that
//! into an error naming the line it happened on.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;

use anyhow::anyhow;
use commando::{Args, Argument, Command, Dispatcher, DispatcherBuilder, FlagValue, Globals, Options};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Program-wide flags.
#[derive(Debug, Default, Options)]
pub struct GlobalOptions {
    #[option(name = "v", help = "Log dispatch details")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Plain,
    Polite,
    Pirate,
}

impl Style {
    fn salute(self) -> &'static str {
        match self {
            Style::Plain => "Hello",
            Style::Polite => "Good day",
            Style::Pirate => "Ahoy",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Style::Plain => "plain",
            Style::Polite => "polite",
            Style::Pirate => "pirate",
        })
    }
}

impl FlagValue for Style {
    fn set(&mut self, raw: &str) -> anyhow::Result<()> {
        *self = match raw {
            "plain" => Style::Plain,
            "polite" => Style::Polite,
            "pirate" => Style::Pirate,
            other => anyhow::bail!("unknown style {other:?}, expected plain, polite or pirate"),
        };
        Ok(())
    }

    fn type_name(&self) -> &str {
        "style"
    }
}

/// Flags of the `greet` command.
#[derive(Debug, Options)]
pub struct GreetOptions {
    #[option(help = "Shout the greeting")]
    pub loud: bool,

    #[option(help = "How many times to greet")]
    pub times: usize,

    #[option(help = "Greeting style: plain, polite or pirate")]
    pub style: Style,
}

impl Default for GreetOptions {
    fn default() -> Self {
        Self {
            loud: false,
            times: 1,
            style: Style::Plain,
        }
    }
}

/// Every option block of the program.
#[derive(Debug, Default)]
pub struct App {
    pub global: GlobalOptions,
    pub greet: GreetOptions,
}

/// A dispatcher for the program, writing command output to `out`.
///
/// The caller may still set the program name, environment and streams.
pub fn dispatcher<'a, W: Write + 'a>(app: &'a mut App, out: &'a RefCell<W>) -> DispatcherBuilder<'a> {
    let App { global, greet } = app;
    let globals = Globals::new()
        .options(global)
        .before_with(|global: &GlobalOptions| init_logging(global.verbose))
        .after_with(|command: &Command<'_>, _: &GlobalOptions| {
            debug!(command = command.name(), "dispatching");
        });
    Dispatcher::builder()
        .globals(globals)
        .commands(commands(greet, out))
}

/// The program's commands.
pub fn commands<'a, W: Write + 'a>(
    greet: &'a mut GreetOptions,
    out: &'a RefCell<W>,
) -> Vec<Command<'a>> {
    vec![
        Command::new("greet")
            .help("Greets someone")
            .long_help(
                "Prints a greeting for NAME, followed by MESSAGE when given.\n\
                 The style flag picks the salutation.",
            )
            .arg(Argument::new("name").help("Who to greet"))
            .arg(Argument::optional("message").help("Text to add after the greeting"))
            .options(greet)
            .run_with(move |args: &Args, options: &GreetOptions| {
                write_greeting(&mut *out.borrow_mut(), args, options)
            }),
        Command::new("sum")
            .help("Adds two integers")
            .arg(Argument::new("a"))
            .arg(Argument::new("b"))
            .run_args(move |args: &Args| -> anyhow::Result<()> {
                let total = args
                    .int("a")?
                    .checked_add(args.int("b")?)
                    .ok_or_else(|| anyhow!("sum does not fit in 64 bits"))?;
                writeln!(out.borrow_mut(), "{total}")?;
                Ok(())
            }),
        Command::new("divide")
            .help("Divides two integers")
            .arg(Argument::new("a"))
            .arg(Argument::new("b"))
            .run_args(move |args: &Args| -> anyhow::Result<()> {
                let (a, b) = (args.int("a")?, args.int("b")?);
                writeln!(out.borrow_mut(), "{}", a / b)?;
                Ok(())
            }),
        Command::new("version")
            .help("Shows the version")
            .no_args()
            .run(move || -> anyhow::Result<()> {
                writeln!(out.borrow_mut(), "greet {}", env!("CARGO_PKG_VERSION"))?;
                Ok(())
            }),
    ]
}

fn write_greeting(out: &mut dyn Write, args: &Args, options: &GreetOptions) -> anyhow::Result<()> {
    let name = args.string("name")?;
    let mut line = format!("{}, {name}!", options.style.salute());
    let message = args.string("message")?;
    if !message.is_empty() {
        line.push(' ');
        line.push_str(message);
    }
    if options.loud {
        line = line.to_uppercase();
    }
    for _ in 0..options.times {
        writeln!(out, "{line}")?;
    }
    info!(name, times = options.times, "greeted");
    Ok(())
}

/// Initialises tracing-based logging.
///
/// Uses `RUST_LOG` if set, otherwise `debug` when verbose and `warn` else.
pub fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    // Ignore error if a subscriber is already set (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
