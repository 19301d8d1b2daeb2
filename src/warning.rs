#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    TableNotFound,
    EndMarkerNotFound,
    UnresolvedColumn,
    UnclassifiedFragments,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub code: WarningCode,
    pub message: String,
    pub page: Option<u32>,
    pub column: Option<usize>,
}

impl ParseWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            page: None,
            column: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

/// Outcome of one parse. Rows themselves go to the caller's callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub pages: Vec<u32>,
    pub row_count: usize,
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    #[must_use]
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|warning| warning.code == code)
    }
}
