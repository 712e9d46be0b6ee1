//! Dispatch outcomes and exit codes.

use std::process::ExitCode;

use thiserror::Error;

use crate::args::ArgumentError;
use crate::dump::DumpError;
use crate::flags::FlagError;
use crate::hooks::HookError;
use crate::recover::PanicError;

/// Why a dispatch did not run a command to successful completion.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No tokens were given; the command listing has been shown.
    #[error("no command provided")]
    NoCommand,

    /// Help was requested and has been shown.
    #[error("help has been shown")]
    Help,

    /// Positional arguments were given to a command that takes none.
    #[error("arguments provided but not used")]
    UnusedArguments,

    #[error("unknown command {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Flags(FlagError),

    #[error(transparent)]
    Arguments(ArgumentError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Dump(#[from] DumpError),

    /// The handler returned an error.
    #[error("error running command {command}: {source:#}")]
    Handler {
        command: String,
        source: anyhow::Error,
    },

    #[error(transparent)]
    Panic(#[from] PanicError),
}

impl From<FlagError> for DispatchError {
    fn from(err: FlagError) -> Self {
        match err {
            FlagError::Help => DispatchError::Help,
            other => DispatchError::Flags(other),
        }
    }
}

impl From<ArgumentError> for DispatchError {
    fn from(err: ArgumentError) -> Self {
        match err {
            ArgumentError::Unused => DispatchError::UnusedArguments,
            other => DispatchError::Arguments(other),
        }
    }
}

impl DispatchError {
    /// The process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            DispatchError::Help => 2,
            DispatchError::NoCommand => 3,
            DispatchError::UnusedArguments => 4,
            _ => 1,
        }
    }

    /// Whether this outcome is only informational (help or listing shown).
    pub fn is_help(&self) -> bool {
        matches!(self, DispatchError::Help | DispatchError::NoCommand)
    }
}

/// Maps a dispatch result to its exit status.
pub fn exit_code(result: &Result<(), DispatchError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => err.exit_code(),
    }
}

/// Maps a dispatch result to an [`ExitCode`], for returning from `main`.
pub fn exit_status(result: &Result<(), DispatchError>) -> ExitCode {
    ExitCode::from(exit_code(result))
}

/// Terminates the process with the exit status for `result`.
pub fn exit(result: Result<(), DispatchError>) -> ! {
    std::process::exit(i32::from(exit_code(&result)))
}
