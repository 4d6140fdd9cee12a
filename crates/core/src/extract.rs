//! Text extraction from page elements.
//!
//! Walks the shape or table tree of a single element and concatenates the
//! content of every text run in document order.

use crate::types::{ElementKind, PageElement, Table, TextContent};

/// Extracts the plain text of a page element.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    /// Whether to trim leading/trailing whitespace off the final result.
    trim: bool,
}

impl TextExtractor {
    /// Create an extractor that returns the raw concatenation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to trim the extracted text.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Extract the text of one element.
    ///
    /// Shapes yield their own text; tables yield every cell's text in
    /// row-major order with no separator. Anything else, or an element
    /// with no text, yields an empty string.
    pub fn extract(&self, element: &PageElement) -> String {
        let mut text = String::new();

        match element.kind() {
            ElementKind::Shape(shape) => {
                if let Some(content) = &shape.text {
                    push_runs(&mut text, content);
                }
            }
            ElementKind::Table(table) => push_table(&mut text, table),
            ElementKind::Other => {}
        }

        if self.trim {
            text.trim().to_string()
        } else {
            text
        }
    }
}

fn push_table(out: &mut String, table: &Table) {
    for row in &table.table_rows {
        for cell in &row.table_cells {
            if let Some(content) = &cell.text {
                push_runs(out, content);
            }
        }
    }
}

/// Append the content of every text run, skipping markers and auto text.
fn push_runs(out: &mut String, content: &TextContent) {
    for run in content.text_elements.iter().filter_map(|e| e.text_run.as_ref()) {
        if let Some(s) = &run.content {
            out.push_str(s);
        }
    }
}
