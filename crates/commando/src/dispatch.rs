//! The dispatcher.
//!
//! A [`Dispatcher`] owns one registry of commands for one run. Running it
//! walks the command line through fixed stages:
//!
//! ```text
//! tokens
//!   → global flags          (global option block, stops at the first positional)
//!   → before hook, provider
//!   → command resolution    (no command, help, unknown command)
//!   → after hook
//!   → command flags         (command option block)
//!   → argument validation
//!   → handler               (inside the panic guard)
//! ```
//!
//! Malformed input ends the run with a [`DispatchError`] after a diagnostic
//! has been written to the error stream. A broken command table (a handler
//! whose signature does not fit its command, an invalid option block, a
//! required argument after an optional one) is a bug in the program and
//! panics before any handler runs.

use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use crate::args::Args;
use crate::command::Command;
use crate::dump::{Help, DUMP_HELP_ENV};
use crate::env::{EnvReader, RealEnv};
use crate::error::DispatchError;
use crate::flags::FlagError;
use crate::help::{self, Notice};
use crate::hooks::Globals;
use crate::options::{FlagSet, Options};
use crate::recover;
use crate::signature;

/// Runs one command out of a registry.
pub struct Dispatcher<'a> {
    program: String,
    commands: Vec<Command<'a>>,
    globals: Globals<'a>,
    env: Box<dyn EnvReader + 'a>,
    stdout: Box<dyn Write + 'a>,
    stderr: Box<dyn Write + 'a>,
}

/// Builder for [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder<'a> {
    program: Option<String>,
    commands: Vec<Command<'a>>,
    globals: Globals<'a>,
    env: Option<Box<dyn EnvReader + 'a>>,
    stdout: Option<Box<dyn Write + 'a>>,
    stderr: Option<Box<dyn Write + 'a>>,
}

impl<'a> DispatcherBuilder<'a> {
    /// Program name used in help output. Defaults to the file name of the
    /// running executable.
    pub fn program(mut self, name: impl Into<String>) -> Self {
        self.program = Some(name.into());
        self
    }

    pub fn command(mut self, command: Command<'a>) -> Self {
        self.commands.push(command);
        self
    }

    pub fn commands(mut self, commands: impl IntoIterator<Item = Command<'a>>) -> Self {
        self.commands.extend(commands);
        self
    }

    pub fn globals(mut self, globals: Globals<'a>) -> Self {
        self.globals = globals;
        self
    }

    /// Environment to read [`DUMP_HELP_ENV`] from. Defaults to the process
    /// environment.
    pub fn env(mut self, env: impl EnvReader + 'a) -> Self {
        self.env = Some(Box::new(env));
        self
    }

    /// Destination of the JSON help dump. Defaults to standard output.
    pub fn stdout(mut self, w: impl Write + 'a) -> Self {
        self.stdout = Some(Box::new(w));
        self
    }

    /// Destination of listings, help and diagnostics. Defaults to standard
    /// error.
    pub fn stderr(mut self, w: impl Write + 'a) -> Self {
        self.stderr = Some(Box::new(w));
        self
    }

    pub fn build(self) -> Dispatcher<'a> {
        Dispatcher {
            program: self.program.unwrap_or_else(default_program),
            commands: self.commands,
            globals: self.globals,
            env: self.env.unwrap_or_else(|| Box::new(RealEnv)),
            stdout: self.stdout.unwrap_or_else(|| Box::new(io::stdout())),
            stderr: self.stderr.unwrap_or_else(|| Box::new(io::stderr())),
        }
    }
}

impl<'a> Dispatcher<'a> {
    pub fn builder() -> DispatcherBuilder<'a> {
        DispatcherBuilder::default()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Dispatches the process arguments, without the program name.
    pub fn run_env(self) -> Result<(), DispatchError> {
        self.run(std::env::args().skip(1))
    }

    /// Dispatches `tokens`, which do not include the program name.
    pub fn run<I, S>(self, tokens: I) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Dispatcher {
            program,
            mut commands,
            mut globals,
            env,
            mut stdout,
            mut stderr,
        } = self;
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();

        if env.is_set(DUMP_HELP_ENV) {
            debug!(program = %program, "dumping help");
            let help = Help::collect(&program, globals.options.as_deref_mut(), &mut commands)
                .unwrap_or_else(|e| panic!("invalid options: {e}"));
            help.write_json(&mut *stdout)?;
            return Ok(());
        }

        if let Err(e) = globals.validate_hooks() {
            panic!("invalid hook: {e}");
        }

        let rest = match globals.options.as_deref_mut() {
            Some(options) => {
                let parsed = bind(options, "global options").parse(&program, tokens);
                match parsed {
                    Ok(rest) => rest,
                    Err(FlagError::Help) => {
                        let flags = flags_of(globals.options.as_deref_mut(), "global options");
                        let _ = help::write_global_help(&mut *stderr, &program, &flags, &commands);
                        return Err(DispatchError::Help);
                    }
                    Err(e) => return Err(report(&mut *stderr, e.into())),
                }
            }
            None => tokens,
        };
        debug!(?rest, "global flags parsed");

        globals
            .run_before()
            .map_err(|e| report(&mut *stderr, e.into()))?;
        let provided = globals
            .provide()
            .map_err(|e| report(&mut *stderr, e.into()))?;
        commands.extend(provided);

        let Some((name, rest)) = rest.split_first() else {
            let _ = help::write_listing(&mut *stderr, Notice::Missing, &commands);
            return Err(DispatchError::NoCommand);
        };
        if name == "help" {
            return show_help(&mut *stderr, &program, &mut commands, rest.first());
        }
        let Some(index) = commands.iter().position(|c| c.name() == name) else {
            let _ = help::write_listing(&mut *stderr, Notice::Unknown(name), &commands);
            return Err(DispatchError::UnknownCommand(name.clone()));
        };
        let mut command = commands.swap_remove(index);
        debug!(command = %command.name, "command resolved");

        check_command(&command);
        globals
            .run_after(&command)
            .map_err(|e| report(&mut *stderr, e.into()))?;

        let positional = match command.options.as_deref_mut() {
            Some(options) => {
                let title = format!("{program} {}", command.name);
                let parsed = bind(options, &command.name).parse(&title, rest.iter().cloned());
                match parsed {
                    Ok(positional) => positional,
                    Err(FlagError::Help) => {
                        let flags = flags_of(command.options.as_deref_mut(), &command.name);
                        let _ = help::write_command_help(&mut *stderr, &program, &command, &flags);
                        return Err(DispatchError::Help);
                    }
                    Err(e) => return Err(report(&mut *stderr, e.into())),
                }
            }
            None => rest.to_vec(),
        };
        debug!(command = %command.name, ?positional, "command flags parsed");

        let Command {
            name,
            arguments,
            options,
            handler,
            ..
        } = &mut command;
        let args = Args::new(positional, arguments);
        if let Err(e) = args.validate() {
            let err = DispatchError::from(e);
            if matches!(err, DispatchError::UnusedArguments) {
                let _ = writeln!(stderr, "command {name} does not accept any arguments");
                return Err(err);
            }
            return Err(report(&mut *stderr, err));
        }

        let Some(handler) = handler.as_mut() else {
            panic!("command {name} has no handler");
        };
        let options = options.as_deref().map(|o| o.as_any());
        debug!(command = %name, handler = handler.name(), "invoking handler");
        match recover::guard(name, || handler.call(&args, options)) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(report(
                &mut *stderr,
                DispatchError::Handler {
                    command: name.clone(),
                    source,
                },
            )),
            Err(panic) => Err(report(&mut *stderr, panic.into())),
        }
    }
}

/// Dispatches `tokens` against `commands` with default settings.
pub fn run<'a, I, S>(commands: Vec<Command<'a>>, tokens: I) -> Result<(), DispatchError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Dispatcher::builder().commands(commands).build().run(tokens)
}

fn default_program() -> String {
    std::env::args_os()
        .next()
        .and_then(|argv0| {
            Path::new(&argv0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// Binds an option block, treating defects as fatal.
fn bind<'o>(options: &'o mut dyn Options, owner: &str) -> FlagSet<'o> {
    FlagSet::bind(options).unwrap_or_else(|e| panic!("invalid options for {owner}: {e}"))
}

fn flags_of(options: Option<&mut (dyn Options + '_)>, owner: &str) -> Vec<crate::options::Flag> {
    options.map(|o| bind(o, owner).flags()).unwrap_or_default()
}

/// Panics if `command`'s handler or argument list is unusable.
fn check_command(command: &Command<'_>) {
    let Some(handler) = command.get_handler() else {
        panic!("command {} has no handler", command.name());
    };
    if let Err(e) = command.arguments().check() {
        panic!("invalid arguments for command {}: {e}", command.name());
    }
    if let Err(e) = signature::validate(handler.name(), &command.contract(), handler.signature()) {
        panic!("invalid handler for command {}: {e}", command.name());
    }
}

fn show_help(
    w: &mut dyn Write,
    program: &str,
    commands: &mut [Command<'_>],
    topic: Option<&String>,
) -> Result<(), DispatchError> {
    let Some(topic) = topic else {
        let _ = help::write_listing(w, Notice::Plain, commands);
        return Err(DispatchError::Help);
    };
    match commands.iter_mut().find(|c| c.name() == topic.as_str()) {
        Some(command) => {
            let flags = command
                .flags()
                .unwrap_or_else(|e| panic!("invalid options for {}: {e}", command.name()));
            let _ = help::write_command_help(w, program, command, &flags);
            Err(DispatchError::Help)
        }
        None => {
            let _ = help::write_listing(w, Notice::Unknown(topic), commands);
            Err(DispatchError::UnknownCommand(topic.clone()))
        }
    }
}

/// Echoes `err` to the diagnostic stream and hands it back.
fn report(w: &mut dyn Write, err: DispatchError) -> DispatchError {
    let _ = writeln!(w, "{err}");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A writer whose contents stay readable after the dispatcher is gone.
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn dispatcher<'a>(commands: Vec<Command<'a>>, stderr: &Shared) -> Dispatcher<'a> {
        Dispatcher::builder()
            .program("prog")
            .commands(commands)
            .env(MockEnv::new())
            .stdout(io::sink())
            .stderr(stderr.clone())
            .build()
    }

    #[test]
    fn test_runs_bare_command() {
        let mut ran = false;
        let stderr = Shared::default();
        let result = dispatcher(vec![Command::new("go").run(|| ran = true)], &stderr).run(["go"]);
        assert!(result.is_ok());
        assert!(ran);
        assert_eq!(stderr.text(), "");
    }

    #[test]
    fn test_empty_tokens_list_commands() {
        let stderr = Shared::default();
        let result = dispatcher(vec![Command::new("go").run(|| {})], &stderr).run(Vec::<String>::new());
        assert!(matches!(result, Err(DispatchError::NoCommand)));
        assert!(stderr.text().starts_with("missing command, available ones are:"));
    }

    #[test]
    fn test_help_for_unknown_topic() {
        let stderr = Shared::default();
        let result = dispatcher(vec![Command::new("go").run(|| {})], &stderr).run(["help", "nope"]);
        assert!(matches!(result, Err(DispatchError::UnknownCommand(ref n)) if n == "nope"));
        assert!(stderr.text().starts_with("unknown command nope, available ones are:"));
    }

    #[test]
    fn test_handler_error_is_reported() {
        let stderr = Shared::default();
        let result = dispatcher(
            vec![Command::new("sync").run(|| -> anyhow::Result<()> { anyhow::bail!("offline") })],
            &stderr,
        )
        .run(["sync"]);
        assert!(matches!(result, Err(DispatchError::Handler { .. })));
        assert_eq!(stderr.text(), "error running command sync: offline\n");
    }

    #[test]
    #[should_panic(expected = "has no handler")]
    fn test_command_without_handler_panics() {
        let stderr = Shared::default();
        let _ = dispatcher(vec![Command::new("empty")], &stderr).run(["empty"]);
    }

    #[test]
    fn test_dump_writes_json_to_stdout() {
        let mut ran = false;
        let stdout = Shared::default();
        let result = Dispatcher::builder()
            .program("prog")
            .command(Command::new("go").help("Goes").run(|| ran = true))
            .env(MockEnv::new().with_var(DUMP_HELP_ENV, "1"))
            .stdout(stdout.clone())
            .stderr(io::sink())
            .build()
            .run(["go"]);
        assert!(result.is_ok());
        assert!(!ran);
        let help = Help::from_json(stdout.text().as_bytes()).unwrap();
        assert_eq!(help.name, "prog");
        assert_eq!(help.command("go").unwrap().help, "Goes");
    }

    #[test]
    fn test_default_program_is_file_name() {
        let program = default_program();
        assert!(!program.is_empty());
        assert!(!program.contains(std::path::MAIN_SEPARATOR));
    }
}
