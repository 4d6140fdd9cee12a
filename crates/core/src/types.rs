//! Domain types mirroring the Slides API presentation document.
//!
//! Only the parts of the document that matter for text extraction are
//! modelled. Every field is optional or defaulted so that partial documents
//! deserialize cleanly; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// A presentation snapshot as returned by `presentations.get`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    /// Remote identifier of the presentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_id: Option<String>,

    /// Document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Locale of the presentation, as an IETF BCP 47 tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Slides in presentation order.
    #[serde(default)]
    pub slides: Vec<Page>,
}

impl Presentation {
    /// Parse a presentation from the raw API JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of slides in the snapshot.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Find a slide by its object id.
    pub fn slide(&self, object_id: &str) -> Option<&Page> {
        self.slides
            .iter()
            .find(|s| s.object_id.as_deref() == Some(object_id))
    }
}

/// A single page of a presentation. Only slides are fetched here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    /// Elements placed on the page, in z-order.
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
}

impl Page {
    /// Create an empty slide with the given id.
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: Some(object_id.into()),
            page_elements: Vec::new(),
        }
    }

    /// Find an element on this page by its object id.
    pub fn element(&self, object_id: &str) -> Option<&PageElement> {
        self.page_elements
            .iter()
            .find(|e| e.object_id.as_deref() == Some(object_id))
    }
}

/// A visual element rendered on a page.
///
/// The API encodes the element kind as whichever one of `shape`, `table`,
/// `image`, ... is present. Use [`PageElement::kind`] to match on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
}

/// The kind of a [`PageElement`], borrowed from the element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind<'a> {
    Shape(&'a Shape),
    Table(&'a Table),
    /// Images, lines, videos, groups and anything else without text.
    Other,
}

impl PageElement {
    /// Create a shape element holding the given text content.
    pub fn shape(object_id: impl Into<String>, text: Option<TextContent>) -> Self {
        Self {
            object_id: Some(object_id.into()),
            shape: Some(Shape {
                shape_type: Some("TEXT_BOX".to_string()),
                text,
            }),
            table: None,
        }
    }

    /// Classify this element. A shape wins over a table if both are present.
    pub fn kind(&self) -> ElementKind<'_> {
        match (&self.shape, &self.table) {
            (Some(shape), _) => ElementKind::Shape(shape),
            (None, Some(table)) => ElementKind::Table(table),
            (None, None) => ElementKind::Other,
        }
    }
}

/// A shape, such as a text box or rectangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

/// A table of rows and cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub rows: usize,

    #[serde(default)]
    pub columns: usize,

    #[serde(default)]
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

/// The text content of a shape or table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

impl TextContent {
    /// Build text content made of a paragraph marker followed by one run.
    ///
    /// This is how the service lays out freshly inserted text. Indices are
    /// left unset; nothing here reads them.
    pub fn from_run(content: impl Into<String>) -> Self {
        Self {
            text_elements: vec![
                TextElement {
                    paragraph_marker: Some(serde_json::json!({ "style": {} })),
                    ..TextElement::default()
                },
                TextElement {
                    text_run: Some(TextRun {
                        content: Some(content.into()),
                    }),
                    ..TextElement::default()
                },
            ],
        }
    }
}

/// One segment of text. Exactly one of the kind fields is normally set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Zero-based start index in UTF-16 code units. Omitted when zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,

    /// Auto text such as a slide number; carries no literal content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_text: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_marker: Option<serde_json::Value>,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
