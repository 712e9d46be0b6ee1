//! Machine-readable help.
//!
//! When [`DUMP_HELP_ENV`] is set to a non-empty value, a dispatcher writes
//! a [`Help`] document as JSON to its standard output instead of running a
//! command. Documentation tools such as `commando-doc` run a program with the
//! variable set and render the result.

use std::io::Write;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::command::Command;
use crate::options::{BindError, Flag, FlagSet, Options};

/// Environment variable that switches a dispatcher into dump mode.
pub const DUMP_HELP_ENV: &str = "COMMANDO_DUMP_HELP";

/// Errors that can occur while dumping help.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("writing help failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Help for a whole program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Help {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub flags: Vec<Flag>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub commands: Vec<CommandHelp>,
}

/// Help for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHelp {
    pub name: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub long_help: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub flags: Vec<Flag>,
}

impl Help {
    /// Describes `program`, its global options and `commands`.
    pub fn collect(
        program: &str,
        globals: Option<&mut (dyn Options + '_)>,
        commands: &mut [Command<'_>],
    ) -> Result<Self, BindError> {
        let flags = match globals {
            Some(options) => FlagSet::bind(options)?.flags(),
            None => Vec::new(),
        };
        let commands = commands
            .iter_mut()
            .map(CommandHelp::collect)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: program.to_string(),
            flags,
            commands,
        })
    }

    pub fn to_json(&self) -> Result<String, DumpError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the document followed by a newline.
    pub fn write_json(&self, w: &mut dyn Write) -> Result<(), DumpError> {
        serde_json::to_writer_pretty(&mut *w, self)?;
        writeln!(w)?;
        Ok(())
    }

    pub fn from_json(json: &[u8]) -> Result<Self, DumpError> {
        Ok(serde_json::from_slice(json)?)
    }

    pub fn command(&self, name: &str) -> Option<&CommandHelp> {
        self.commands.iter().find(|c| c.name == name)
    }
}

impl CommandHelp {
    pub fn collect(command: &mut Command<'_>) -> Result<Self, BindError> {
        Ok(Self {
            flags: command.flags()?,
            name: command.name().to_string(),
            help: command.help_text().to_string(),
            long_help: command.long_help_text().to_string(),
            usage: command.usage_text().to_string(),
        })
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
