use std::collections::BTreeMap;

/// Cells of the row being assembled, keyed by column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RowBuilder {
    cells: BTreeMap<usize, String>,
}

impl RowBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Overwrites any cell already held at `column`.
    pub(crate) fn set(&mut self, column: usize, text: impl Into<String>) {
        self.cells.insert(column, text.into());
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cells.values().all(|cell| cell.trim().is_empty())
    }

    /// Cells in column order, padded with empty strings for columns never written.
    pub(crate) fn into_cells(mut self, width: usize) -> Vec<String> {
        (0..width)
            .map(|column| self.cells.remove(&column).unwrap_or_default())
            .collect()
    }
}
