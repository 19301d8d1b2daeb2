use regex::Regex;
use tracing::debug;

use crate::error::ExtractError;
use crate::model::{TextAccumulator, TextFragment};
use crate::reader::DocumentReader;
use crate::table_def::TableDef;

/// Pages from the first one matching the start marker through the first
/// one (from there on) matching the end marker. Empty when the table is absent.
pub(crate) fn locate_table_pages<R>(table: &TableDef, reader: &R) -> Result<Vec<u32>, ExtractError>
where
    R: DocumentReader + ?Sized,
{
    let mut pages = Vec::new();
    for page in 1..=reader.page_count() {
        let text = reader.page_text(page)?;
        if pages.is_empty() && !table.start_marker().is_match(&text) {
            continue;
        }
        pages.push(page);

        if table.end_marker().is_match(&text) {
            break;
        }
    }

    debug!(?pages, "located table pages");
    Ok(pages)
}

/// Vertical span of the table: the tops of the first fragments at which the
/// accumulated page text matches the start and end markers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TableBounds {
    pub(crate) start: Option<f64>,
    pub(crate) end: Option<f64>,
}

impl TableBounds {
    /// Bounds found on earlier pages are kept.
    pub(crate) fn observe(&mut self, fragments: &[TextFragment], start: &Regex, end: &Regex) {
        let mut accumulated = TextAccumulator::new();
        for fragment in fragments {
            accumulated.push(fragment);
            let text = accumulated.as_str();
            if self.end.is_none() && end.is_match(text) {
                self.end = Some(fragment.rect.max.y);
            } else if self.start.is_none() && start.is_match(text) {
                self.start = Some(fragment.rect.max.y);
            }

            if self.start.is_some() && self.end.is_some() {
                break;
            }
        }
    }

    /// `first`/`last` say whether the fragment sits on a boundary page.
    pub(crate) fn contains(&self, fragment: &TextFragment, first: bool, last: bool) -> bool {
        if first && self.start.is_some_and(|start| fragment.rect.min.y > start) {
            return false;
        }
        if last && self.end.is_some_and(|end| fragment.rect.max.y < end) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::{TableBounds, locate_table_pages};
    use crate::geometry::Rect;
    use crate::model::TextFragment;
    use crate::reader::MemoryDocument;
    use crate::table_def::TableDef;

    fn line(text: &str, y: f64) -> TextFragment {
        TextFragment::new(text, Rect::new(300.0, y, 360.0, y + 10.0))
    }

    fn table(start: &str, end: &str) -> TableDef {
        TableDef::new(
            Regex::new(start).expect("start"),
            Regex::new(end).expect("end"),
            Vec::new(),
        )
    }

    #[test]
    fn selects_pages_from_start_through_end() {
        let document = MemoryDocument::new(vec![
            vec![line("Report ends", 700.0)],
            vec![line("Report begins", 700.0)],
            vec![line("more rows", 700.0)],
            vec![line("Report ends", 700.0)],
            vec![line("Report begins again", 700.0), line("Report ends", 600.0)],
        ]);

        let pages = locate_table_pages(&table("begins", "ends"), &document).expect("locate");
        assert_eq!(pages, vec![2, 3, 4]);
    }

    #[test]
    fn stops_at_first_page_with_both_markers() {
        let document = MemoryDocument::new(vec![
            vec![line("start", 700.0), line("end", 600.0)],
            vec![line("start", 700.0)],
        ]);

        let pages = locate_table_pages(&table("start", "end"), &document).expect("locate");
        assert_eq!(pages, vec![1]);
    }

    #[test]
    fn absent_start_marker_yields_no_pages() {
        let document = MemoryDocument::new(vec![vec![line("nothing here", 700.0)]]);
        let pages = locate_table_pages(&table("start", "end"), &document).expect("locate");
        assert!(pages.is_empty());
    }

    #[test]
    fn records_tops_of_first_matching_fragments() {
        let fragments = vec![
            line("Title", 760.0),
            line("Start", 700.0),
            line("row", 650.0),
            line("End", 500.0),
            line("End", 400.0),
        ];
        let mut bounds = TableBounds::default();
        bounds.observe(
            &fragments,
            &Regex::new("Start").expect("start"),
            &Regex::new("End").expect("end"),
        );
        assert_eq!(bounds.start, Some(710.0));
        assert_eq!(bounds.end, Some(510.0));
    }

    #[test]
    fn keeps_bounds_from_earlier_pages() {
        let start = Regex::new("Start").expect("start");
        let end = Regex::new("End").expect("end");
        let mut bounds = TableBounds::default();
        bounds.observe(&[line("Start", 700.0)], &start, &end);
        bounds.observe(&[line("Start", 300.0), line("End", 200.0)], &start, &end);
        assert_eq!(bounds.start, Some(710.0));
        assert_eq!(bounds.end, Some(210.0));
    }

    #[test]
    fn filters_only_on_boundary_pages() {
        let bounds = TableBounds {
            start: Some(710.0),
            end: Some(510.0),
        };
        let above = line("above", 720.0);
        let below = line("below", 480.0);

        assert!(!bounds.contains(&above, true, false));
        assert!(bounds.contains(&above, false, false));
        assert!(!bounds.contains(&below, false, true));
        assert!(bounds.contains(&below, true, false));
        assert!(bounds.contains(&line("inside", 600.0), true, true));
    }

    #[test]
    fn unset_bounds_filter_nothing() {
        let bounds = TableBounds::default();
        assert!(bounds.contains(&line("anything", 9000.0), true, true));
    }
}
