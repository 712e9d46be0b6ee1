//! Where generated documents go.

use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination for a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Write to standard output
    Stdout,
    /// Write to a specific file
    File(PathBuf),
}

impl OutputDestination {
    /// `Stdout` for an empty path, a file otherwise.
    pub fn from_path(path: &str) -> Self {
        if path.is_empty() {
            OutputDestination::Stdout
        } else {
            OutputDestination::File(PathBuf::from(path))
        }
    }

    /// Writes `content` as is, without adding a trailing newline.
    pub fn write_text(&self, content: &str) -> std::io::Result<()> {
        match self {
            OutputDestination::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(content.as_bytes())?;
                handle.flush()
            }
            OutputDestination::File(path) => {
                validate_path(path)?;
                std::fs::write(path, content)
            }
        }
    }
}

/// Validates that a file path's parent directory exists.
fn validate_path(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }
    }
    Ok(())
}
