use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::reader::DocumentReader;
use crate::table_parse::parse_table;
use crate::warning::ParseReport;

pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// How a data fragment picks its column when several anchors are within tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// The earliest declared column wins.
    #[default]
    FirstDeclared,
    /// The closest anchor wins; equal distances go to the earlier column.
    Nearest,
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "first-declared" => Ok(Self::FirstDeclared),
            "nearest" => Ok(Self::Nearest),
            other => Err(format!(
                "unknown match strategy '{other}', expected first-declared or nearest"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    header: Regex,
}

impl ColumnDef {
    #[must_use]
    pub fn new(header: Regex) -> Self {
        Self { header }
    }

    pub fn from_pattern(pattern: &str) -> Result<Self, ExtractError> {
        Ok(Self::new(Regex::new(pattern)?))
    }

    #[must_use]
    pub fn header(&self) -> &Regex {
        &self.header
    }
}

/// A table delimited by start/end markers, with columns in cell order.
///
/// The definition is never mutated by parsing: column anchors and the
/// table's vertical bounds are resolved per call to [`TableDef::parse`].
#[derive(Debug, Clone)]
pub struct TableDef {
    start_marker: Regex,
    end_marker: Regex,
    columns: Vec<ColumnDef>,
    tolerance: f64,
    strategy: MatchStrategy,
}

impl TableDef {
    #[must_use]
    pub fn new(start_marker: Regex, end_marker: Regex, columns: Vec<ColumnDef>) -> Self {
        Self {
            start_marker,
            end_marker,
            columns,
            tolerance: DEFAULT_TOLERANCE,
            strategy: MatchStrategy::default(),
        }
    }

    /// Negative and NaN tolerances are stored as 0, which keeps exact matches only.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn start_marker(&self) -> &Regex {
        &self.start_marker
    }

    #[must_use]
    pub fn end_marker(&self) -> &Regex {
        &self.end_marker
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Index of the first column whose header matches `text`.
    pub(crate) fn header_column(&self, text: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.header.is_match(text))
    }

    /// Calls `on_row` once per reconstructed row, in document order.
    ///
    /// Only reader failures are errors. A document without the table yields
    /// no rows and a report carrying a `TableNotFound` warning.
    pub fn parse<R, F>(&self, reader: &R, on_row: F) -> Result<ParseReport, ExtractError>
    where
        R: DocumentReader + ?Sized,
        F: FnMut(Vec<String>),
    {
        parse_table(self, reader, on_row)
    }

    pub fn collect_rows<R>(&self, reader: &R) -> Result<Vec<Vec<String>>, ExtractError>
    where
        R: DocumentReader + ?Sized,
    {
        let mut rows = Vec::new();
        self.parse(reader, |cells| rows.push(cells))?;
        Ok(rows)
    }
}
