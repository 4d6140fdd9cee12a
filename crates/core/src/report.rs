//! Row-oriented text reports for a presentation.
//!
//! [`ReportBuilder`] flattens a presentation into one row per page element,
//! and the formatters serialize those rows for the console or as a
//! pipe-delimited Markdown table.

use crate::extract::TextExtractor;
use crate::types::Presentation;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Id reported for a slide that came back without one.
const UNKNOWN_SLIDE_ID: &str = "unknown";

/// Id reported for an element that came back without one.
const UNKNOWN_ELEMENT_ID: &str = "none";

const TABLE_HEADER: &str = "| Page | Slide ID | Element # | Element ID | Element Text |";
const TABLE_SEPARATOR: &str = "|---------|----------|-----------|------------|--------------|";

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRow {
    /// 1-based slide number.
    pub slide_index: usize,
    pub slide_id: String,
    pub entry: RowEntry,
}

/// What a row says about its slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEntry {
    /// One page element and its extracted text.
    Element {
        /// 1-based element number within the slide.
        index: usize,
        id: String,
        text: String,
    },
    /// The slide has no page elements at all.
    NoElements,
}

/// Builds report rows from a presentation snapshot.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    extractor: TextExtractor,
}

impl ReportBuilder {
    /// Create a builder using the given extractor.
    pub fn new(extractor: TextExtractor) -> Self {
        Self { extractor }
    }

    /// Produce rows ordered by slide, then element, in document order.
    ///
    /// A slide without elements contributes a single [`RowEntry::NoElements`] row.
    pub fn build(&self, presentation: &Presentation) -> Vec<ExtractedRow> {
        let mut rows = Vec::new();

        for (slide_idx, slide) in presentation.slides.iter().enumerate() {
            let slide_id = slide
                .object_id
                .clone()
                .unwrap_or_else(|| UNKNOWN_SLIDE_ID.to_string());

            if slide.page_elements.is_empty() {
                rows.push(ExtractedRow {
                    slide_index: slide_idx + 1,
                    slide_id,
                    entry: RowEntry::NoElements,
                });
                continue;
            }

            for (element_idx, element) in slide.page_elements.iter().enumerate() {
                rows.push(ExtractedRow {
                    slide_index: slide_idx + 1,
                    slide_id: slide_id.clone(),
                    entry: RowEntry::Element {
                        index: element_idx + 1,
                        id: element
                            .object_id
                            .clone()
                            .unwrap_or_else(|| UNKNOWN_ELEMENT_ID.to_string()),
                        text: self.extractor.extract(element),
                    },
                });
            }
        }

        log::debug!(
            "Built {} report rows from {} slides",
            rows.len(),
            presentation.slide_count()
        );
        rows
    }
}

/// Replace newlines so a cell never breaks the one-row-per-line layout.
fn sanitize_cell(text: &str) -> String {
    text.replace('\n', " ")
}

/// Pipe-delimited Markdown table output.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownTable;

impl MarkdownTable {
    /// Create a new table formatter.
    pub fn new() -> Self {
        Self
    }

    /// Render rows as a table with a header and separator line.
    ///
    /// Lines are joined with `\n`; there is no trailing newline.
    pub fn render(&self, rows: &[ExtractedRow]) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(TABLE_HEADER.to_string());
        lines.push(TABLE_SEPARATOR.to_string());

        for row in rows {
            let line = match &row.entry {
                RowEntry::Element { index, id, text } => format!(
                    "| {} | {} | {} | {} | {} |",
                    row.slide_index,
                    row.slide_id,
                    index,
                    id,
                    sanitize_cell(text)
                ),
                RowEntry::NoElements => {
                    format!("| {} | {} | - | - | - |", row.slide_index, row.slide_id)
                }
            };
            lines.push(line);
        }

        lines.join("\n")
    }

    /// Render rows and write them as UTF-8 to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path, rows: &[ExtractedRow]) -> crate::Result<()> {
        let content = self.render(rows);
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        log::debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

/// Human-readable console output, one line per element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReport;

impl ConsoleReport {
    /// Create a new console formatter.
    pub fn new() -> Self {
        Self
    }

    /// Render rows, preceded by a slide count line, with a trailing newline.
    ///
    /// Elements without text are reported as such instead of as an empty line.
    pub fn render(&self, slide_count: usize, rows: &[ExtractedRow]) -> String {
        let mut out = format!("The presentation contains {} slides:\n", slide_count);

        for row in rows {
            match &row.entry {
                RowEntry::Element { text, .. } if !text.is_empty() => {
                    out.push_str(&format!("Slide {}: {}\n", row.slide_index, text));
                }
                RowEntry::Element { index, .. } => {
                    out.push_str(&format!("  Element {} has no text.\n", index));
                }
                RowEntry::NoElements => {
                    out.push_str(&format!("  Slide {} has no elements.\n", row.slide_index));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Page, PageElement, TextContent};
    use serde_json::json;

    fn hello_world() -> Presentation {
        let mut slide = Page::new("s1");
        slide
            .page_elements
            .push(PageElement::shape("e1", Some(TextContent::from_run("Hello\nWorld"))));
        Presentation {
            slides: vec![slide, Page::new("s2")],
            ..Presentation::default()
        }
    }

    #[test]
    fn test_build_rows() {
        let rows = ReportBuilder::default().build(&hello_world());

        assert_eq!(
            rows,
            vec![
                ExtractedRow {
                    slide_index: 1,
                    slide_id: "s1".to_string(),
                    entry: RowEntry::Element {
                        index: 1,
                        id: "e1".to_string(),
                        text: "Hello\nWorld".to_string(),
                    },
                },
                ExtractedRow {
                    slide_index: 2,
                    slide_id: "s2".to_string(),
                    entry: RowEntry::NoElements,
                },
            ]
        );
    }

    #[test]
    fn test_markdown_table() {
        let rows = ReportBuilder::default().build(&hello_world());
        let table = MarkdownTable::new().render(&rows);

        let expected = "| Page | Slide ID | Element # | Element ID | Element Text |\n\
                        |---------|----------|-----------|------------|--------------|\n\
                        | 1 | s1 | 1 | e1 | Hello World |\n\
                        | 2 | s2 | - | - | - |";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_missing_ids_fall_back() {
        let presentation: Presentation = serde_json::from_value(json!({
            "slides": [ { "pageElements": [ { "image": {} } ] } ]
        }))
        .unwrap();
        let rows = ReportBuilder::default().build(&presentation);
        let table = MarkdownTable::new().render(&rows);

        assert!(table.ends_with("| 1 | unknown | 1 | none |  |"));
    }

    #[test]
    fn test_element_order() {
        let mut slide = Page::new("s1");
        for id in ["a", "b", "c"] {
            slide
                .page_elements
                .push(PageElement::shape(id, Some(TextContent::from_run(id))));
        }
        let presentation = Presentation {
            slides: vec![Page::new("s0"), slide],
            ..Presentation::default()
        };

        let rows = ReportBuilder::default().build(&presentation);
        let order: Vec<(usize, Option<usize>)> = rows
            .iter()
            .map(|r| match &r.entry {
                RowEntry::Element { index, .. } => (r.slide_index, Some(*index)),
                RowEntry::NoElements => (r.slide_index, None),
            })
            .collect();
        assert_eq!(order, vec![(1, None), (2, Some(1)), (2, Some(2)), (2, Some(3))]);
    }

    #[test]
    fn test_write_is_idempotent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.md");
        std::fs::write(&path, "stale content that is much longer than the new table").unwrap();

        let mut presentation = hello_world();
        presentation.slides[0].page_elements.push(PageElement::shape(
            "jp",
            Some(TextContent::from_run("あっちょんぶりけ～！！ッ")),
        ));
        let rows = ReportBuilder::new(TextExtractor::new().with_trim(true)).build(&presentation);

        let table = MarkdownTable::new();
        table.write_to(&path, &rows).unwrap();
        let first = std::fs::read(&path).unwrap();
        table.write_to(&path, &rows).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        let text = String::from_utf8(first).unwrap();
        assert!(text.contains("| 1 | s1 | 2 | jp | あっちょんぶりけ～！！ッ |"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_console_report() {
        let mut presentation = hello_world();
        presentation.slides[0]
            .page_elements
            .push(PageElement::shape("empty", None));
        let rows = ReportBuilder::default().build(&presentation);

        let out = ConsoleReport::new().render(presentation.slide_count(), &rows);
        assert_eq!(
            out,
            "The presentation contains 2 slides:\n\
             Slide 1: Hello\nWorld\n\
             \x20 Element 2 has no text.\n\
             \x20 Slide 2 has no elements.\n"
        );
    }
}
