use tracing::{debug, trace};

use crate::error::ExtractError;
use crate::model::TextFragment;
use crate::reader::DocumentReader;
use crate::row::RowBuilder;
use crate::table_def::{MatchStrategy, TableDef};
use crate::table_detect::{TableBounds, locate_table_pages};
use crate::warning::{ParseReport, ParseWarning, WarningCode};

/// Horizontal anchor of each column, resolved from its header fragment.
#[derive(Debug, Clone, PartialEq)]
struct ColumnAnchors {
    anchors: Vec<Option<f64>>,
}

impl ColumnAnchors {
    fn new(width: usize) -> Self {
        Self {
            anchors: vec![None; width],
        }
    }

    /// Later headers overwrite earlier ones.
    fn resolve(&mut self, column: usize, x: f64) {
        if let Some(anchor) = self.anchors.get_mut(column) {
            *anchor = Some(x);
        }
    }

    fn resolved_count(&self) -> usize {
        self.anchors.iter().filter(|anchor| anchor.is_some()).count()
    }

    fn unresolved(&self) -> impl Iterator<Item = usize> + '_ {
        self.anchors
            .iter()
            .enumerate()
            .filter_map(|(column, anchor)| anchor.is_none().then_some(column))
    }

    fn classify(&self, x: f64, tolerance: f64, strategy: MatchStrategy) -> Option<usize> {
        let mut candidates = self
            .anchors
            .iter()
            .enumerate()
            .filter_map(|(column, anchor)| anchor.map(|anchor| (column, (x - anchor).abs())))
            .filter(|(_, distance)| *distance <= tolerance);

        let chosen = match strategy {
            MatchStrategy::FirstDeclared => candidates.next(),
            MatchStrategy::Nearest => candidates.min_by(|left, right| left.1.total_cmp(&right.1)),
        };
        chosen.map(|(column, _)| column)
    }
}

/// Drops empty and out-of-bounds fragments and binds header fragments to
/// their columns. What remains is data in scan order.
fn select_data_fragments<'a>(
    table: &TableDef,
    fragments: &'a [TextFragment],
    bounds: &TableBounds,
    first: bool,
    last: bool,
    anchors: &mut ColumnAnchors,
) -> Vec<&'a TextFragment> {
    let mut data = Vec::new();
    for fragment in fragments {
        if fragment.text.is_empty() || !bounds.contains(fragment, first, last) {
            continue;
        }

        if let Some(column) = table.header_column(fragment.text.trim()) {
            debug!(column, x = fragment.rect.min.x, "resolved column anchor");
            anchors.resolve(column, fragment.rect.min.x);
            continue;
        }

        data.push(fragment);
    }
    data
}

struct PageRows {
    rows: Vec<Vec<String>>,
    unclassified: usize,
}

/// A row is closed once it holds a cell for every resolved column.
fn assemble_rows(table: &TableDef, data: &[&TextFragment], anchors: &ColumnAnchors) -> PageRows {
    let width = table.columns().len();
    let full = anchors.resolved_count();
    let tolerance = table.tolerance();

    let mut rows = Vec::new();
    let mut unclassified = 0_usize;
    let mut current = RowBuilder::new();
    for fragment in data {
        let Some(column) = anchors.classify(fragment.rect.min.x, tolerance, table.strategy())
        else {
            unclassified += 1;
            continue;
        };

        if current.len() >= full {
            let finished = std::mem::take(&mut current);
            if !finished.is_empty() {
                rows.push(finished.into_cells(width));
            }
        }
        current.set(column, fragment.text.trim());
    }

    if !current.is_empty() {
        rows.push(current.into_cells(width));
    }

    PageRows { rows, unclassified }
}

pub(crate) fn parse_table<R, F>(
    table: &TableDef,
    reader: &R,
    mut on_row: F,
) -> Result<ParseReport, ExtractError>
where
    R: DocumentReader + ?Sized,
    F: FnMut(Vec<String>),
{
    let pages = locate_table_pages(table, reader)?;
    let mut report = ParseReport {
        pages: pages.clone(),
        ..ParseReport::default()
    };
    let Some(last) = pages.len().checked_sub(1) else {
        report.warnings.push(ParseWarning::new(
            WarningCode::TableNotFound,
            "no page matches the table start marker",
        ));
        return Ok(report);
    };

    let mut anchors = ColumnAnchors::new(table.columns().len());
    let mut bounds = TableBounds::default();
    for (index, &page) in pages.iter().enumerate() {
        let fragments = reader.page_fragments(page)?;
        bounds.observe(&fragments, table.start_marker(), table.end_marker());
        debug!(page, start = ?bounds.start, end = ?bounds.end, "table bounds");

        let data = select_data_fragments(
            table,
            &fragments,
            &bounds,
            index == 0,
            index == last,
            &mut anchors,
        );
        let PageRows { rows, unclassified } = assemble_rows(table, &data, &anchors);
        debug!(page, rows = rows.len(), unclassified, "assembled page rows");

        if unclassified > 0 {
            report.warnings.push(
                ParseWarning::new(
                    WarningCode::UnclassifiedFragments,
                    format!("{unclassified} fragment(s) matched no column anchor"),
                )
                .with_page(page),
            );
        }

        for cells in rows {
            trace!(?cells, "emitting row");
            report.row_count += 1;
            on_row(cells);
        }
    }

    if bounds.end.is_none() {
        report.warnings.push(ParseWarning::new(
            WarningCode::EndMarkerNotFound,
            "end marker not found; table runs to the last selected page",
        ));
    }
    for column in anchors.unresolved() {
        report.warnings.push(
            ParseWarning::new(
                WarningCode::UnresolvedColumn,
                "column header never matched; column is always empty",
            )
            .with_column(column),
        );
    }

    Ok(report)
}
