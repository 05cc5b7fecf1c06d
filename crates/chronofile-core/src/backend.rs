use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("failed to extract text: {0}")]
    Extract(String),
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide the low-level "document bytes in, plain text out"
/// step; date resolution and renaming live in this crate and never touch
/// the PDF itself. Page order is preserved and pages are concatenated with
/// no explicit separator.
pub trait PdfBackend: Send + Sync {
    /// Extract the full text content of a PDF file.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
