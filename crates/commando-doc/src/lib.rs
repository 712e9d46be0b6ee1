//! Markdown documentation for programs built on `commando`.
//!
//! A commando program prints a JSON description of its commands when
//! `COMMANDO_DUMP_HELP` is set. `commando-doc help-md <program>` runs the
//! program that way and renders the description as a Markdown document:
//!
//! ```text
//! commando-doc help-md -o docs/cli.md ./target/release/greet
//! ```

mod error;
pub mod help_md;
pub mod markdown;
mod output;
mod render;

use commando::Options;
use tracing_subscriber::EnvFilter;

pub use error::DocError;
pub use help_md::{fetch_help, generate, HelpOptions};
pub use output::OutputDestination;
pub use render::render;

/// Program-wide flags.
#[derive(Debug, Default, Options)]
pub struct GlobalOptions {
    #[option(name = "v", help = "Log what is being done")]
    pub verbose: bool,
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
