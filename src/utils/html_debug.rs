// src/utils/html_debug.rs
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Highlight {
    /// Opening `<table>` tag; gets a numbered marker inserted before it.
    Table(usize),
    /// Occurrence of the table label text.
    Label,
}

/// Builds a debug copy of a document where every `<table>` is preceded by a
/// numbered marker and every occurrence of `label` is highlighted.
pub fn annotate_tables(html: &str, label: Option<&str>) -> Result<String, AppError> {
    let table_re = Regex::new(r"(?i)<table\b[^>]*>")
        .map_err(|e| AppError::Config(format!("Invalid table pattern: {}", e)))?;

    let mut highlights: Vec<(usize, usize, Highlight)> = table_re
        .find_iter(html)
        .enumerate()
        .map(|(index, mat)| (mat.start(), mat.end(), Highlight::Table(index)))
        .collect();

    if let Some(label) = label.filter(|l| !l.is_empty()) {
        let label_re = Regex::new(&regex::escape(label))
            .map_err(|e| AppError::Config(format!("Invalid label pattern '{}': {}", label, e)))?;
        highlights.extend(
            label_re
                .find_iter(html)
                .map(|mat| (mat.start(), mat.end(), Highlight::Label)),
        );
    }
    highlights.sort_by_key(|h| h.0); // Sort by position

    let mut out = String::with_capacity(html.len() + highlights.len() * 96);
    out.push_str("<!-- revenue_extractor debug annotation -->\n<style>\n");
    out.push_str(".debug-table-marker { background-color: #FFFF00; font-weight: bold; }\n");
    out.push_str(".debug-label { background-color: #90EE90; }\n");
    out.push_str("</style>\n");

    let mut last_pos = 0;
    for (start, end, kind) in highlights {
        // Overlapping matches would split a slice twice
        if start < last_pos {
            continue;
        }
        out.push_str(&html[last_pos..start]);
        match kind {
            Highlight::Table(index) => {
                out.push_str(&format!(
                    "<div class=\"debug-table-marker\">table #{} (offset {})</div>",
                    index, start
                ));
                out.push_str(&html[start..end]);
            }
            Highlight::Label => {
                out.push_str(&format!("<span class=\"debug-label\" title=\"Position: {}-{}\">", start, end));
                out.push_str(&html[start..end]);
                out.push_str("</span>");
            }
        }
        last_pos = end;
    }
    out.push_str(&html[last_pos..]);

    Ok(out)
}

/// Writes the annotated copy of `html` to `path`.
pub fn save_annotated_html<P: AsRef<Path>>(html: &str, path: P, label: Option<&str>) -> Result<(), AppError> {
    let annotated = annotate_tables(html, label)?;
    fs::write(path.as_ref(), annotated)?;
    tracing::info!("Saved debug HTML to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_numbered_in_document_order() {
        let html = "<p>x</p><table id=\"a\"></table><TABLE></TABLE>";
        let annotated = annotate_tables(html, None).unwrap();

        let first = annotated.find("table #0").expect("first marker");
        let second = annotated.find("table #1").expect("second marker");
        assert!(first < second);
        assert!(annotated.contains("<table id=\"a\">"));
    }

    #[test]
    fn test_label_is_highlighted() {
        let html = "<table><caption>Tesla Quarterly Revenue</caption></table>";
        let annotated = annotate_tables(html, Some("Quarterly Revenue")).unwrap();

        assert!(annotated.contains("<span class=\"debug-label\""));
        assert!(annotated.contains("Quarterly Revenue</span>"));
        assert!(annotated.ends_with("</caption></table>"));
    }

    #[test]
    fn test_label_with_regex_metacharacters() {
        let html = "<table><th>Revenue (USD $)</th></table>";
        let annotated = annotate_tables(html, Some("(USD $)")).unwrap();
        assert!(annotated.contains("(USD $)</span>"));
    }
}
