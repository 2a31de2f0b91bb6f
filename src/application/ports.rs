//! Collaborator traits describing the HTTP and navigation adapters.

use async_trait::async_trait;
use koinonia_api_types::PostPayload;
use thiserror::Error;

use crate::domain::uploads::ImageFile;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    Endpoint { endpoint: String, reason: String },
    #[error("request failed: {0}")]
    Request(String),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response body is not JSON: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn request(err: impl std::fmt::Display) -> Self {
        Self::Request(err.to_string())
    }
}

/// The two request shapes the form engine sends to the backend.
///
/// Implementations return the decoded JSON body and leave its interpretation
/// to the caller; timeouts are the implementation's concern.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Send one image as multipart form data in a part named `image`.
    async fn upload_image(
        &self,
        endpoint: &str,
        image: &ImageFile,
    ) -> Result<serde_json::Value, TransportError>;

    /// Send a post payload as a JSON body.
    async fn post_json(
        &self,
        endpoint: &str,
        payload: &PostPayload,
    ) -> Result<serde_json::Value, TransportError>;
}

/// Performs a hard navigation once a post has been created.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}
