// Loaded source document handle
use std::path::{Path, PathBuf};

use lopdf::Document;

use crate::types::{Result, SnipError};

/// A loaded PDF: raw bytes for upload, plus what the client needs to
/// know about it (page count). Replaced wholesale when a new file is
/// loaded; everything derived from it is reset by the session.
pub struct SourceDocument {
    path: PathBuf,
    file_name: String,
    bytes: Vec<u8>,
    page_count: u32,
}

impl SourceDocument {
    /// Load and validate a PDF from disk. Refuses non-PDF input with
    /// `InvalidSourceType` before any state is created.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        if !bytes.starts_with(b"%PDF-") {
            return Err(SnipError::InvalidSourceType);
        }

        let document = Document::load_mem(&bytes)
            .map_err(|e| SnipError::Pdf(e.to_string()))?;
        let page_count = document.get_pages().len() as u32;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            bytes,
            page_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}
