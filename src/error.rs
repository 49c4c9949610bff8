//! Error types for obsidian2tex.

use std::io;
use thiserror::Error;

/// Result type alias for obsidian2tex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a note.
///
/// Line numbers are 1-based and refer to the source note as given to
/// [`crate::convert`], front matter included.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A display-math block was opened but never closed.
    #[error("Unterminated display math starting at line {line}")]
    UnterminatedMath { line: usize },

    /// An inline `$` has no closing `$` within its paragraph.
    #[error("Unterminated inline math starting at line {line}")]
    UnterminatedInlineMath { line: usize },

    /// An emphasis marker has no matching partner within its paragraph.
    #[error("Unbalanced emphasis marker '{marker}' at line {line}")]
    UnbalancedEmphasis { marker: String, line: usize },

    /// A table row has more cells than the separator row declares.
    #[error("Table row at line {line} has {found} cells, expected {expected}")]
    JaggedTable {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The LaTeX template could not be used.
    #[error("Template error: {0}")]
    Template(String),

    /// A referenced asset could not be found in the vault.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Error during rendering (JSON, template).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
