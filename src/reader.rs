use crate::error::ExtractError;
use crate::model::{TextFragment, render_plain_text};

/// Source of page text and positioned fragments. Page numbers are 1-based.
pub trait DocumentReader {
    fn page_count(&self) -> u32;

    fn page_text(&self, page: u32) -> Result<String, ExtractError>;

    /// Fragments in the reader's scan order.
    fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ExtractError>;
}

/// Reader over fragments that are already in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDocument {
    pages: Vec<Vec<TextFragment>>,
}

impl MemoryDocument {
    #[must_use]
    pub fn new(pages: Vec<Vec<TextFragment>>) -> Self {
        Self { pages }
    }

    pub fn push_page(&mut self, fragments: Vec<TextFragment>) {
        self.pages.push(fragments);
    }

    fn page(&self, page: u32) -> Result<&[TextFragment], ExtractError> {
        let index = usize::try_from(page)
            .ok()
            .and_then(|page| page.checked_sub(1))
            .ok_or(ExtractError::PageNotFound(page))?;
        self.pages
            .get(index)
            .map(Vec::as_slice)
            .ok_or(ExtractError::PageNotFound(page))
    }
}

impl DocumentReader for MemoryDocument {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    fn page_text(&self, page: u32) -> Result<String, ExtractError> {
        self.page(page).map(render_plain_text)
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>, ExtractError> {
        self.page(page).map(<[TextFragment]>::to_vec)
    }
}
