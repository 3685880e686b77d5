// src/error.rs

//! Error types for the OpenBLAS recipe

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while cooking the recipe
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid option/setting combination, detected before any I/O
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Source archive could not be downloaded
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    /// Source archive could not be extracted or had an unexpected layout
    #[error("Failed to fetch sources: {0}")]
    Fetch(String),

    /// A build or install child process exited non-zero
    #[error("{step} step failed with exit code {code:?}\n{output}")]
    BuildFailed {
        step: &'static str,
        code: Option<i32>,
        output: String,
    },

    /// A build tool could not be spawned at all
    #[error("Build tool not available: {0}")]
    ToolNotFound(String),

    /// A generated config file could not be patched
    #[error("Failed to patch {}: {reason}", .file.display())]
    Patch { file: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for recipe operations
pub type Result<T> = std::result::Result<T, Error>;
