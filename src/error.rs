use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("page {0} does not exist")]
    PageNotFound(u32),

    #[error("failed to extract text from page {page}: {reason}")]
    PageText { page: u32, reason: String },

    #[error("failed to extract text fragments from page {page}: {reason}")]
    PageFragments { page: u32, reason: String },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("invalid table definition: {0}")]
    InvalidDefinition(String),

    #[error("failed to read table definition: {0}")]
    Config(#[from] serde_json::Error),
}
