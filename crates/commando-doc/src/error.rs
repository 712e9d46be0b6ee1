//! Error types for documentation generation.

use std::path::PathBuf;
use std::process::ExitStatus;

use commando::DumpError;
use thiserror::Error;

/// Errors that can occur while documenting a program.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status} while dumping its help")]
    Failed { program: String, status: ExitStatus },

    #[error("invalid help document: {0}")]
    Dump(#[from] DumpError),

    #[error("error executing template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("error reading file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing output file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
