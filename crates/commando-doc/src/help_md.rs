//! The `help-md` command.

use std::path::Path;
use std::process::{self, Stdio};

use commando::{Args, Argument, Command, Help, Options, DUMP_HELP_ENV};
use tracing::debug;

use crate::error::DocError;
use crate::output::OutputDestination;
use crate::render;

/// Flags of `help-md`.
#[derive(Debug, Default, Options)]
pub struct HelpOptions {
    #[option(help = "Header to prepend to the document")]
    pub header: String,

    #[option(help = "Footer to append to the document")]
    pub footer: String,

    #[option(name = "o", help = "Output file. If empty, output is printed to stdout")]
    pub output: String,
}

/// The `help-md` command, bound to `options`.
pub fn command(options: &mut HelpOptions) -> Command<'_> {
    Command::new("help-md")
        .help("Generates a markdown document with the help for the given command")
        .long_help(
            "Runs the given program with COMMANDO_DUMP_HELP set, reads the help it\n\
             prints as JSON and renders it as Markdown.",
        )
        .arg(Argument::new("cmd").help("Program to document"))
        .options(options)
        .run_with(|args: &Args, options: &HelpOptions| -> anyhow::Result<()> {
            if args.len() != 1 {
                anyhow::bail!("help-md accepts exactly one argument");
            }
            generate(args.string("cmd")?, options)?;
            Ok(())
        })
}

/// Documents `program` as configured by `options`.
pub fn generate(program: &str, options: &HelpOptions) -> Result<(), DocError> {
    let help = fetch_help(program)?;
    let header = read_optional(&options.header)?;
    let footer = read_optional(&options.footer)?;
    let document = render::render(&help, header.as_deref(), footer.as_deref())?;

    let destination = OutputDestination::from_path(&options.output);
    destination.write_text(&document).map_err(|source| DocError::Write {
        path: options.output.clone().into(),
        source,
    })
}

/// Runs `program` in dump mode and parses the help it prints.
pub fn fetch_help(program: &str) -> Result<Help, DocError> {
    debug!(program, "requesting help dump");
    let output = process::Command::new(program)
        .env(DUMP_HELP_ENV, "1")
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| DocError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(DocError::Failed {
            program: program.to_string(),
            status: output.status,
        });
    }
    Ok(Help::from_json(&output.stdout)?)
}

fn read_optional(path: &str) -> Result<Option<String>, DocError> {
    if path.is_empty() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|source| DocError::Read {
            path: Path::new(path).to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use commando::FlagSet;

    #[test]
    fn test_help_options_flags() {
        let mut options = HelpOptions::default();
        let names: Vec<String> = FlagSet::bind(&mut options)
            .unwrap()
            .flags()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["header", "footer", "o"]);
    }

    #[test]
    fn test_missing_program() {
        let err = fetch_help("commando-doc-no-such-program").unwrap_err();
        assert!(matches!(err, DocError::Spawn { .. }));
        assert!(err
            .to_string()
            .starts_with("failed to run commando-doc-no-such-program:"));
    }

    #[test]
    fn test_read_optional() {
        assert_eq!(read_optional("").unwrap(), None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("header.md");
        std::fs::write(&path, "# Header\n").unwrap();
        assert_eq!(
            read_optional(path.to_str().unwrap()).unwrap().as_deref(),
            Some("# Header\n")
        );

        let missing = dir.path().join("missing.md");
        let err = read_optional(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, DocError::Read { .. }));
    }
}
