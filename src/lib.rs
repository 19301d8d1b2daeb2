mod error;
mod geometry;
mod model;
mod options;
mod pdf_reader;
mod reader;
mod row;
mod table_def;
mod table_detect;
mod table_parse;
mod warning;

use std::path::Path;

pub use error::ExtractError;
pub use geometry::{Point, Rect};
pub use model::{TextAccumulator, TextFragment, render_plain_text};
pub use options::TableSpec;
pub use pdf_reader::PdfDocument;
pub use reader::{DocumentReader, MemoryDocument};
pub use table_def::{ColumnDef, DEFAULT_TOLERANCE, MatchStrategy, TableDef};
pub use warning::{ParseReport, ParseWarning, WarningCode};

/// Opens `input_pdf` and streams the rows of `table` to `on_row`.
pub fn extract_table_from_pdf<F>(
    input_pdf: &Path,
    table: &TableDef,
    on_row: F,
) -> Result<ParseReport, ExtractError>
where
    F: FnMut(Vec<String>),
{
    let document = PdfDocument::open(input_pdf)?;
    table.parse(&document, on_row)
}

pub fn extract_table_from_pdf_bytes<F>(
    input_pdf: &[u8],
    table: &TableDef,
    on_row: F,
) -> Result<ParseReport, ExtractError>
where
    F: FnMut(Vec<String>),
{
    let document = PdfDocument::from_bytes(input_pdf)?;
    table.parse(&document, on_row)
}
