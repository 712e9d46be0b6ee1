//! Command-line parsing of a bound [`FlagSet`].
//!
//! The flag set is turned into a throwaway `clap::Command` whose arguments
//! mirror the bound fields. Parsing stops at the first positional token (or
//! after `--`); everything from there on is returned untouched so the caller
//! can treat it as a command name or as positional arguments.
//!
//! Only values actually given on the command line are written back, so
//! fields keep their initial values otherwise.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ColorChoice};
use thiserror::Error;

use crate::options::FlagSet;

const REST: &str = "commando-rest";
const HELP: &str = "help";

/// Failure to parse flags.
#[derive(Debug, Error)]
pub enum FlagError {
    /// `--help` or `-h` was given.
    #[error("help requested")]
    Help,

    /// Rejected by the parser: unknown flag, missing value and the like.
    #[error("{}", .0.to_string().trim_end())]
    Parse(#[from] clap::Error),

    #[error("invalid value {value:?} for flag --{flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
}

impl FlagSet<'_> {
    /// Parses `tokens`, storing flag values into the bound fields.
    ///
    /// `name` is used in parser messages. Returns the tokens from the first
    /// positional one onwards.
    pub fn parse<I, S>(&mut self, name: &str, tokens: I) -> Result<Vec<String>, FlagError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let matches = match self.parser(name).try_get_matches_from(tokens) {
            Ok(matches) => matches,
            Err(err) if err.kind() == clap::error::ErrorKind::DisplayHelp => {
                return Err(FlagError::Help)
            }
            Err(err) => return Err(err.into()),
        };

        for binding in &mut self.bindings {
            if matches.value_source(&binding.name) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(raw) = matches.get_one::<String>(&binding.name) {
                tracing::trace!(flag = %binding.name, value = %raw, "flag set");
                binding
                    .slot
                    .set(raw)
                    .map_err(|reason| FlagError::InvalidValue {
                        flag: binding.name.clone(),
                        value: raw.clone(),
                        reason,
                    })?;
            }
        }

        Ok(matches
            .get_many::<String>(REST)
            .map(|rest| rest.cloned().collect())
            .unwrap_or_default())
    }

    fn parser(&self, name: &str) -> clap::Command {
        let mut command = clap::Command::new(name.to_string())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .color(ColorChoice::Never);

        for binding in &self.bindings {
            let mut arg = Arg::new(binding.name.clone())
                .long(binding.name.clone())
                .action(ArgAction::Set);
            if !binding.help.is_empty() {
                arg = arg.help(binding.help.clone());
            }
            if let Some(short) = single_char(&binding.name) {
                arg = arg.short(short);
            }
            arg = if binding.slot.is_bool() {
                arg.num_args(0..=1)
                    .require_equals(true)
                    .default_missing_value("true")
            } else {
                arg.num_args(1).allow_hyphen_values(true)
            };
            command = command.arg(arg);
        }

        if !self.contains(HELP) {
            let mut help = Arg::new(HELP).long(HELP).action(ArgAction::Help);
            if !self.contains("h") {
                help = help.short('h');
            }
            command = command.arg(help);
        }

        command.arg(
            Arg::new(REST)
                .num_args(1..)
                .trailing_var_arg(true)
                .action(ArgAction::Append),
        )
    }
}

fn single_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
