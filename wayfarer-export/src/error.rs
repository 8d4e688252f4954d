//! Failures raised while exporting a trip plan.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors returned by the export functions.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The PDF writer failed.
    #[error("failed to render PDF: {0}")]
    Render(#[from] printpdf::Error),
    /// The rendered document could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target file.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
}
