// src/extractors/table.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table").expect("Failed to compile TABLE_SELECTOR")
});

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

// --- Data Structures ---

/// How to pick the revenue table out of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSelector {
    /// First table whose visible text contains this substring (whitespace-normalized).
    ByLabel(String),
    /// Zero-based position among all tables in document order.
    ByIndex(usize),
}

/// Untyped pair of cell texts from one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub date_text: String,
    pub revenue_text: String,
}

impl RawRow {
    pub fn new(date_text: impl Into<String>, revenue_text: impl Into<String>) -> Self {
        Self {
            date_text: date_text.into(),
            revenue_text: revenue_text.into(),
        }
    }
}

// --- Main Extractor Structure ---
#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    selector: Option<TableSelector>,
}

impl TableExtractor {
    /// With no selector the first table in the document is used.
    pub fn new(selector: Option<TableSelector>) -> Self {
        Self { selector }
    }

    /// Parses `html_content`, locates the revenue table and returns its data
    /// rows in document order. A table without data rows gives an empty vec.
    pub fn extract_rows(&self, html_content: &str) -> Result<Vec<RawRow>, ExtractError> {
        let document = Html::parse_document(html_content);

        let table = self.find_table(&document)?;
        tracing::debug!("Selected table with {} bytes of text", table.text().map(str::len).sum::<usize>());

        let rows = Self::rows_of(table);
        tracing::info!("Extracted {} raw rows from table", rows.len());
        Ok(rows)
    }

    fn find_table<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ExtractError> {
        let tables: Vec<ElementRef<'a>> = document.select(&TABLE_SELECTOR).collect();
        if tables.is_empty() {
            return Err(ExtractError::TableNotFound("document contains no <table> element".to_string()));
        }
        tracing::debug!("Document contains {} tables", tables.len());

        match &self.selector {
            None => Ok(tables[0]),
            Some(TableSelector::ByIndex(index)) => tables.get(*index).copied().ok_or_else(|| {
                ExtractError::TableNotFound(format!(
                    "table index {} out of range, document has {} tables",
                    index,
                    tables.len()
                ))
            }),
            Some(TableSelector::ByLabel(label)) => {
                let wanted = collapse_whitespace(label);
                let candidates: Vec<ElementRef<'a>> = tables
                    .iter()
                    .copied()
                    .filter(|table| collapse_whitespace(&table.text().collect::<String>()).contains(&wanted))
                    .collect();

                // An outer layout table contains the text of every table nested in it,
                // so prefer the first candidate that has no matching table inside it.
                candidates
                    .iter()
                    .copied()
                    .find(|outer| {
                        !candidates
                            .iter()
                            .any(|inner| inner.id() != outer.id() && is_inside(*inner, *outer))
                    })
                    .ok_or_else(|| ExtractError::TableNotFound(format!("no table labelled '{}'", label)))
            }
        }
    }

    fn rows_of(table: ElementRef) -> Vec<RawRow> {
        let mut rows = Vec::new();

        for row in table.select(&ROW_SELECTOR) {
            if nearest_table(row).map(|t| t.id()) != Some(table.id()) {
                continue; // belongs to a nested table
            }
            if matches!(section_of(row), Some("thead") | Some("tfoot")) {
                tracing::trace!("Skipping row outside the table body");
                continue;
            }

            let cells: Vec<ElementRef> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .collect();

            if !cells.is_empty() && cells.iter().all(|cell| cell.value().name() == "th") {
                tracing::trace!("Skipping header row");
                continue;
            }

            let texts: Vec<String> = cells
                .iter()
                .map(|cell| collapse_whitespace(&cell.text().collect::<String>()))
                .collect();

            if texts.iter().all(|text| text.is_empty()) {
                tracing::trace!("Skipping row without content");
                continue;
            }

            let mut texts = texts.into_iter();
            let date_text = texts.next().unwrap_or_default();
            let revenue_text = texts.next().unwrap_or_default();
            rows.push(RawRow::new(date_text, revenue_text));
        }

        rows
    }
}

/// Trims and collapses runs of whitespace (including `&nbsp;`) to single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn nearest_table(element: ElementRef) -> Option<ElementRef> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

/// Name of the row group (`thead`, `tbody`, `tfoot`) holding `row`, if any.
fn section_of<'a>(row: ElementRef<'a>) -> Option<&'a str> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|ancestor| ancestor.value().name() != "table")
        .map(|ancestor| ancestor.value().name())
        .find(|name| matches!(*name, "thead" | "tbody" | "tfoot"))
}

fn is_inside(inner: ElementRef, outer: ElementRef) -> bool {
    inner.ancestors().any(|ancestor| ancestor.id() == outer.id())
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const MACROTRENDS_LIKE: &str = r#"
        <!DOCTYPE html>
        <html><head><title>Tesla Revenue</title></head><body>
        <table class="historical_data_table">
            <thead><tr><th>Tesla Annual Revenue<br>(Millions of US $)</th></tr></thead>
            <tbody>
                <tr><td>2022</td><td>$81,462</td></tr>
                <tr><td>2021</td><td>$53,823</td></tr>
            </tbody>
        </table>
        <table class="historical_data_table">
            <thead><tr><th colspan="2">Tesla Quarterly Revenue<br>(Millions of US $)</th></tr></thead>
            <tbody>
                <tr><td>2022-12-31</td><td>$24,318</td></tr>
                <tr><td>  2022-09-30&nbsp;</td><td> $21,454 </td></tr>
                <tr><td></td><td> </td></tr>
                <tr><td>2022-06-30</td><td></td></tr>
            </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_label_selects_quarterly_table() {
        let extractor = TableExtractor::new(Some(TableSelector::ByLabel("Quarterly Revenue".into())));
        let rows = extractor.extract_rows(MACROTRENDS_LIKE).expect("table should be found");

        assert_eq!(
            rows,
            vec![
                RawRow::new("2022-12-31", "$24,318"),
                RawRow::new("2022-09-30", "$21,454"),
                RawRow::new("2022-06-30", ""),
            ]
        );
    }

    #[test]
    fn test_no_selector_falls_back_to_first_table() {
        let extractor = TableExtractor::new(None);
        let rows = extractor.extract_rows(MACROTRENDS_LIKE).unwrap();
        assert_eq!(rows.first(), Some(&RawRow::new("2022", "$81,462")));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_index_selector() {
        let extractor = TableExtractor::new(Some(TableSelector::ByIndex(1)));
        let rows = extractor.extract_rows(MACROTRENDS_LIKE).unwrap();
        assert_eq!(rows[0], RawRow::new("2022-12-31", "$24,318"));

        let out_of_range = TableExtractor::new(Some(TableSelector::ByIndex(5)));
        assert!(matches!(
            out_of_range.extract_rows(MACROTRENDS_LIKE),
            Err(ExtractError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_document_without_tables_is_not_found() {
        let html = "<html><body><p>403 Forbidden</p></body></html>";
        let result = TableExtractor::new(None).extract_rows(html);
        assert!(matches!(result, Err(ExtractError::TableNotFound(_))));
    }

    #[test]
    fn test_unmatched_label_is_not_found() {
        let extractor = TableExtractor::new(Some(TableSelector::ByLabel("Net Income".into())));
        assert!(matches!(
            extractor.extract_rows(MACROTRENDS_LIKE),
            Err(ExtractError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_header_only_table_yields_no_rows() {
        let html = "<table><thead><tr><th>Date</th><th>Revenue</th></tr></thead><tbody></tbody></table>";
        let rows = TableExtractor::new(None).extract_rows(html).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_thead_and_tfoot_rows_are_skipped() {
        let header_only = "<table><thead><tr><td>Date</td><td>Revenue</td></tr></thead><tbody></tbody></table>";
        assert_eq!(TableExtractor::new(None).extract_rows(header_only).unwrap(), vec![]);

        let with_footer = r#"
            <table>
                <thead><tr><td>Date</td><td>Revenue</td></tr></thead>
                <tbody><tr><td>2022-12-31</td><td>$24,318</td></tr></tbody>
                <tfoot><tr><td>Total</td><td>$24,318</td></tr></tfoot>
            </table>
        "#;
        let rows = TableExtractor::new(None).extract_rows(with_footer).unwrap();
        assert_eq!(rows, vec![RawRow::new("2022-12-31", "$24,318")]);
    }

    #[test]
    fn test_row_header_cell_is_kept_as_data() {
        let html = "<table><tr><th>Date</th><th>Revenue</th></tr><tr><th>Dec 31, 2022</th><td>24.32B</td></tr></table>";
        let rows = TableExtractor::new(None).extract_rows(html).unwrap();
        assert_eq!(rows, vec![RawRow::new("Dec 31, 2022", "24.32B")]);
    }

    #[test]
    fn test_nested_tables_are_kept_apart() {
        let html = r#"
            <table id="layout"><tr><td>
                <table id="data">
                    <tr><th>Quarterly Revenue</th></tr>
                    <tr><td>2022-12-31</td><td>$24,318</td></tr>
                </table>
            </td></tr></table>
        "#;
        let extractor = TableExtractor::new(Some(TableSelector::ByLabel("Quarterly Revenue".into())));
        let rows = extractor.extract_rows(html).unwrap();
        assert_eq!(rows, vec![RawRow::new("2022-12-31", "$24,318")]);
    }
}
