//! Core domain types, element text extraction, and report formatting
//! for Google Slides presentations.

pub mod error;
pub mod extract;
pub mod report;
pub mod types;

pub use error::{Error, Result};
pub use extract::TextExtractor;
pub use report::{ConsoleReport, ExtractedRow, MarkdownTable, ReportBuilder, RowEntry};
pub use types::{
    ElementKind, Page, PageElement, Presentation, Shape, Table, TableCell, TableRow, TextContent,
    TextElement, TextRun,
};
