use std::path::Path;

use mupdf::{Document, TextPageFlags};

use chronofile_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island — it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the resolver and renamer do not transitively
/// depend on it.
///
/// Text is extracted page by page in document order and concatenated with
/// no explicit page separator, so line numbers seen by the fixed-line
/// resolver layer match a straight top-to-bottom read of the document.
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::Open("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::Open(e.to_string()))?;

        let mut text = String::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::Extract(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::Extract(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::Extract(e.to_string()))?;

            // Block/line iteration, one line per extracted text line
            for block in text_page.blocks() {
                for line in block.lines() {
                    for c in line.chars() {
                        text.push(c.char().unwrap_or('\u{FFFD}'));
                    }
                    text.push('\n');
                }
            }
        }

        Ok(text)
    }
}
