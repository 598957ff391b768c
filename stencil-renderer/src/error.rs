//! Error types for stencil-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while compiling a template to a file.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error (parse or render).
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while reading templates or writing output.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
