//! Remote Slides API access.

use crate::requests::{
    BatchUpdatePresentationRequest, BatchUpdatePresentationResponse, CreateShapeRequest,
    CreateSlideRequest, InsertTextRequest, Request,
};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use slides_core::{Error, Presentation, Result};

/// Default endpoint of the Slides REST API.
pub const DEFAULT_BASE_URL: &str = "https://slides.googleapis.com";

/// Operations the tool needs from the remote presentation service.
///
/// Each mutation is sent as its own batch update.
pub trait SlidesApi {
    /// Insert a new blank slide and return its object id.
    fn create_slide(&self, presentation_id: &str, insertion_index: u32) -> Result<String>;

    /// Create a shape on an existing slide.
    fn create_shape(&self, presentation_id: &str, shape: CreateShapeRequest) -> Result<()>;

    /// Insert text into a shape or table cell.
    fn insert_text(
        &self,
        presentation_id: &str,
        object_id: &str,
        text: &str,
        insertion_index: u32,
    ) -> Result<()>;

    /// Fetch the full presentation document.
    fn get_presentation(&self, presentation_id: &str) -> Result<Presentation>;
}

/// Blocking HTTP client for the Slides REST API.
#[derive(Debug, Clone)]
pub struct HttpSlidesClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl HttpSlidesClient {
    /// Create a client authorized with the given OAuth access token.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("slides-text/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
        })
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `{base}/v1/presentations/{id}{suffix}`, with the id percent-encoded as one segment.
    fn presentation_url(&self, presentation_id: &str, suffix: &str) -> Result<Url> {
        let invalid = || Error::Transport(format!("Invalid base URL '{}'", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("v1")
            .push("presentations")
            .push(&format!("{}{}", presentation_id, suffix));
        Ok(url)
    }

    /// Send one batch update and return the parsed replies.
    pub fn batch_update(
        &self,
        presentation_id: &str,
        body: &BatchUpdatePresentationRequest,
    ) -> Result<BatchUpdatePresentationResponse> {
        let url = self.presentation_url(presentation_id, ":batchUpdate")?;
        log::debug!("POST {} ({} requests)", url, body.requests.len());

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .map_err(|e| Error::Transport(format!("Request failed: {}", e)))?;

        parse_json(response)
    }
}

impl SlidesApi for HttpSlidesClient {
    fn create_slide(&self, presentation_id: &str, insertion_index: u32) -> Result<String> {
        let body = BatchUpdatePresentationRequest::single(Request::CreateSlide(
            CreateSlideRequest {
                object_id: None,
                insertion_index,
            },
        ));

        let response = self.batch_update(presentation_id, &body)?;
        response
            .replies
            .into_iter()
            .next()
            .and_then(|r| r.create_slide)
            .map(|r| r.object_id)
            .ok_or_else(|| Error::UnexpectedResponse("createSlide returned no object id".into()))
    }

    fn create_shape(&self, presentation_id: &str, shape: CreateShapeRequest) -> Result<()> {
        let body = BatchUpdatePresentationRequest::single(Request::CreateShape(shape));
        self.batch_update(presentation_id, &body)?;
        Ok(())
    }

    fn insert_text(
        &self,
        presentation_id: &str,
        object_id: &str,
        text: &str,
        insertion_index: u32,
    ) -> Result<()> {
        let body = BatchUpdatePresentationRequest::single(Request::InsertText(InsertTextRequest {
            object_id: object_id.to_string(),
            text: text.to_string(),
            insertion_index,
        }));
        self.batch_update(presentation_id, &body)?;
        Ok(())
    }

    fn get_presentation(&self, presentation_id: &str) -> Result<Presentation> {
        let url = self.presentation_url(presentation_id, "")?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|e| Error::Transport(format!("Request failed: {}", e)))?;

        let presentation: Presentation = parse_json(response)?;
        log::debug!("Fetched presentation with {} slides", presentation.slide_count());
        Ok(presentation)
    }
}

/// Google's JSON error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Pick a readable message out of an error response body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => body.trim().to_string(),
    }
}

/// Turn a response into `T`, or into an API error for non-success statuses.
fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;

    if !status.is_success() {
        log::error!("Slides API returned {}: {}", status, body);
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| Error::UnexpectedResponse(format!("Failed to parse response: {}", e)))
}
