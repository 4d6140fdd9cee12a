//! Wire types for `presentations.batchUpdate`.

use serde::{Deserialize, Serialize};

/// Text box height in EMU.
pub const TEXT_BOX_HEIGHT_EMU: f64 = 2_000_000.0;

/// Text box width in EMU.
pub const TEXT_BOX_WIDTH_EMU: f64 = 4_000_000.0;

/// Offset of the text box from the top-left corner, in EMU.
pub const TEXT_BOX_OFFSET_EMU: f64 = 100_000.0;

/// Body of a batch update call. The service applies all requests atomically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdatePresentationRequest {
    pub requests: Vec<Request>,
}

impl BatchUpdatePresentationRequest {
    /// Wrap a single request.
    pub fn single(request: Request) -> Self {
        Self {
            requests: vec![request],
        }
    }
}

/// One mutation. Serialized as `{"createSlide": {...}}` and so on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    CreateSlide(CreateSlideRequest),
    CreateShape(CreateShapeRequest),
    InsertText(InsertTextRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlideRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub insertion_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShapeRequest {
    pub object_id: String,
    pub shape_type: String,
    pub element_properties: PageElementProperties,
}

impl CreateShapeRequest {
    /// A fixed-size text box near the top-left corner of `page_object_id`.
    pub fn text_box(object_id: impl Into<String>, page_object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            shape_type: "TEXT_BOX".to_string(),
            element_properties: PageElementProperties {
                page_object_id: page_object_id.into(),
                size: Size {
                    height: Dimension::emu(TEXT_BOX_HEIGHT_EMU),
                    width: Dimension::emu(TEXT_BOX_WIDTH_EMU),
                },
                transform: AffineTransform {
                    scale_x: 1.0,
                    scale_y: 1.0,
                    translate_x: TEXT_BOX_OFFSET_EMU,
                    translate_y: TEXT_BOX_OFFSET_EMU,
                    unit: "EMU".to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElementProperties {
    pub page_object_id: String,
    pub size: Size,
    pub transform: AffineTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Size {
    pub height: Dimension,
    pub width: Dimension,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub magnitude: f64,
    pub unit: String,
}

impl Dimension {
    pub fn emu(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: "EMU".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub object_id: String,
    pub text: String,
    pub insertion_index: u32,
}

/// Response of a batch update: one reply per request, in request order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdatePresentationResponse {
    #[serde(default)]
    pub presentation_id: Option<String>,

    #[serde(default)]
    pub replies: Vec<Response>,
}

/// A single reply. Requests without a result produce an empty object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default)]
    pub create_slide: Option<ObjectReply>,

    #[serde(default)]
    pub create_shape: Option<ObjectReply>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReply {
    pub object_id: String,
}
