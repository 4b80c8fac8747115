use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

mod extract;
mod fields;

pub use extract::{GARBLED_THRESHOLD, extract_document, is_garbled, normalize_whitespace, readable_ratio};
pub use fields::{ExtractedFields, extract_fields};

/// Text and fields of one PDF page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPage {
    /// 1-based
    pub page_number: usize,
    /// Whitespace-normalized page text
    pub text: String,
    pub data: ExtractedFields,
    #[serde(default)]
    pub garbled: bool,
}

/// Result of importing a PDF, carried from the import screen into the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub pages: Vec<ExtractedPage>,
    pub total_pages: usize,
}

impl ExtractedDocument {
    /// Page by 0-based index
    pub fn page(&self, index: usize) -> Option<&ExtractedPage> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut ExtractedPage> {
        self.pages.get_mut(index)
    }
}

/// Read and extract a PDF from disk
pub fn import_file(path: &Path) -> Result<ExtractedDocument, ImportError> {
    let bytes = std::fs::read(path)?;
    log::info!("Importing {} ({} bytes)", path.display(), bytes.len());
    extract_document(&bytes)
}
