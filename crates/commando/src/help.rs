//! Help rendering.
//!
//! Two views are produced: the listing of every command, shown when no or
//! an unknown command is given and for a bare `help`, and the detail view
//! of one command shown by `help <command>` or `<command> --help`.
//!
//! ```text
//! unknown command frob, available ones are:
//!
//! greet  Greets someone
//! help   Print this help
//!
//! To view additional help for each command use help <command_name>
//! ```

use std::io::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::args::Arguments;
use crate::command::Command;
use crate::options::Flag;

/// Gap between table columns.
const PADDING: usize = 2;

/// The line printed above a command listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'n> {
    /// No header, for an explicit `help`.
    Plain,
    /// No command was given.
    Missing,
    /// The named command does not exist.
    Unknown(&'n str),
}

/// Writes the command listing.
pub fn write_listing(
    w: &mut dyn Write,
    notice: Notice<'_>,
    commands: &[Command<'_>],
) -> io::Result<()> {
    match notice {
        Notice::Plain => {}
        Notice::Missing => writeln!(w, "missing command, available ones are:\n")?,
        Notice::Unknown(name) => writeln!(w, "unknown command {name}, available ones are:\n")?,
    }
    let rows: Vec<(String, String)> = commands
        .iter()
        .map(|c| (c.name().to_string(), c.help_text().to_string()))
        .chain(std::iter::once(("help".to_string(), "Print this help".to_string())))
        .collect();
    write_table(w, "", &rows)?;
    writeln!(w, "\nTo view additional help for each command use help <command_name>")
}

/// Writes the detail view of `command`. `flags` are the command's flags.
pub fn write_command_help(
    w: &mut dyn Write,
    program: &str,
    command: &Command<'_>,
    flags: &[Flag],
) -> io::Result<()> {
    writeln!(w, "{}: {}", command.name(), command.help_text())?;
    let arguments = command.arguments();
    if !command.usage_text().is_empty() || arguments.has_named() {
        writeln!(w, "usage: {}", usage_line(program, command.name(), command.usage_text(), arguments))?;
    }
    if !command.long_help_text().is_empty() {
        writeln!(w, "\n{}", command.long_help_text())?;
    }
    if command.has_options() {
        writeln!(w, "\nFlags:")?;
        write_flags(w, flags)?;
    }
    if arguments.has_named() {
        writeln!(w, "\nArguments:")?;
        for argument in arguments.declared() {
            writeln!(w, "  {}: {}", argument.name, argument.help)?;
        }
    }
    Ok(())
}

/// Writes the global flags followed by the command listing.
pub fn write_global_help(
    w: &mut dyn Write,
    program: &str,
    flags: &[Flag],
    commands: &[Command<'_>],
) -> io::Result<()> {
    writeln!(w, "usage: {program} [flags] <command> [arguments]")?;
    if !flags.is_empty() {
        writeln!(w, "\nGlobal flags:")?;
        write_flags(w, flags)?;
    }
    writeln!(w, "\nCommands:")?;
    write_listing(w, Notice::Plain, commands)
}

fn usage_line(program: &str, name: &str, usage: &str, arguments: &Arguments) -> String {
    let mut line = format!("{program} {name}");
    if !usage.is_empty() {
        line.push(' ');
        line.push_str(usage);
    }
    for argument in arguments.declared() {
        if argument.optional {
            line.push_str(&format!(" [{}]", argument.name));
        } else {
            line.push(' ');
            line.push_str(&argument.name);
        }
    }
    line
}

fn write_flags(w: &mut dyn Write, flags: &[Flag]) -> io::Result<()> {
    let rows: Vec<(String, String)> = flags
        .iter()
        .map(|flag| {
            let dashes = if flag.name.chars().count() == 1 { "-" } else { "--" };
            let left = if flag.kind == "bool" {
                format!("{dashes}{}", flag.name)
            } else {
                format!("{dashes}{} <{}>", flag.name, flag.kind)
            };
            let mut right = flag.help.clone();
            if !flag.has_zero_default() {
                if !right.is_empty() {
                    right.push(' ');
                }
                right.push_str(&format!("(default: {})", flag.default));
            }
            (left, right)
        })
        .collect();
    write_table(w, "  ", &rows)
}

fn write_table(w: &mut dyn Write, indent: &str, rows: &[(String, String)]) -> io::Result<()> {
    let width = rows
        .iter()
        .map(|(left, _)| left.width())
        .max()
        .unwrap_or(0);
    for (left, right) in rows {
        if right.is_empty() {
            writeln!(w, "{indent}{left}")?;
        } else {
            let pad = width - left.width() + PADDING;
            writeln!(w, "{indent}{left}{:pad$}{right}", "")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Argument;
    use crate::options::{FlagSet, Options};

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn registry() -> Vec<Command<'static>> {
        vec![
            Command::new("greet").help("Greets someone").run(|| {}),
            Command::new("version").help("Shows the version").run(|| {}),
        ]
    }

    #[test]
    fn test_listing_for_missing_command() {
        let commands = registry();
        let text = render(|w| write_listing(w, Notice::Missing, &commands));
        assert_eq!(
            text,
            "missing command, available ones are:\n\n\
             greet    Greets someone\n\
             version  Shows the version\n\
             help     Print this help\n\
             \n\
             To view additional help for each command use help <command_name>\n"
        );
    }

    #[test]
    fn test_listing_for_unknown_command() {
        let commands = registry();
        let text = render(|w| write_listing(w, Notice::Unknown("frob"), &commands));
        assert!(text.starts_with("unknown command frob, available ones are:\n\n"));
        assert!(text.contains("help     Print this help\n"));
    }

    #[test]
    fn test_listing_measures_display_width() {
        let commands = vec![Command::new("grüße").help("Greets").run(|| {})];
        let text = render(|w| write_listing(w, Notice::Plain, &commands));
        assert!(text.starts_with("grüße  Greets\nhelp   Print this help\n"));
    }

    struct GreetOptions {
        loud: bool,
        times: usize,
        style: String,
    }

    impl Options for GreetOptions {
        fn bind<'a>(&'a mut self, flags: &mut FlagSet<'a>) {
            flags.field("loud", &mut self.loud).help("Shout");
            flags.field("times", &mut self.times).help("Repetitions");
            flags.field("style", &mut self.style);
        }
    }

    #[test]
    fn test_command_detail_view() {
        let mut options = GreetOptions {
            loud: false,
            times: 1,
            style: String::new(),
        };
        let mut command = Command::new("greet")
            .help("Greets someone")
            .long_help("Prints a greeting.\nOptionally loud.")
            .arg(Argument::new("name").help("Who to greet"))
            .arg(Argument::optional("greeting").help("Word to use"))
            .options(&mut options)
            .run_with(|_: &crate::Args, _: &GreetOptions| {});
        let flags = command.flags().unwrap();
        let text = render(|w| write_command_help(w, "prog", &command, &flags));
        let expected = [
            "greet: Greets someone",
            "usage: prog greet name [greeting]",
            "",
            "Prints a greeting.",
            "Optionally loud.",
            "",
            "Flags:",
            "  --loud            Shout",
            "  --times <usize>   Repetitions (default: 1)",
            "  --style <string>",
            "",
            "Arguments:",
            "  name: Who to greet",
            "  greeting: Word to use",
        ];
        assert_eq!(text, expected.join("\n") + "\n");
    }

    #[test]
    fn test_detail_view_without_usage() {
        let command = Command::new("version").help("Shows the version").run(|| {});
        let text = render(|w| write_command_help(w, "prog", &command, &[]));
        assert_eq!(text, "version: Shows the version\n");
    }

    #[test]
    fn test_global_help_lists_flags_and_commands() {
        let commands = registry();
        let flags = vec![Flag {
            name: "v".into(),
            help: "Verbose output".into(),
            kind: "bool".into(),
            default: "false".into(),
        }];
        let text = render(|w| write_global_help(w, "prog", &flags, &commands));
        assert!(text.starts_with("usage: prog [flags] <command> [arguments]\n"));
        assert!(text.contains("Global flags:\n  -v  Verbose output\n"));
        assert!(text.contains("Commands:\ngreet    Greets someone\n"));
    }
}
