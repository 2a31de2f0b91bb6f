//! Request and response shapes for the community backend endpoints used by
//! the post form engine.

use serde::{Deserialize, Serialize};

/// Multipart part name carrying the image bytes on upload.
pub const IMAGE_PART_NAME: &str = "image";

/// Payload key carrying the representative image position.
pub const MAIN_IMAGE_INDEX_KEY: &str = "main_image_index";

/// JSON object sent to a category's submit endpoint.
pub type PostPayload = serde_json::Map<String, serde_json::Value>;

/// Successful response to an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageUploadResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Response to a post submission. Only `success == true` counts as created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ImageUploadResponse {
    /// Interpret an arbitrary JSON body as an upload response.
    ///
    /// Anything other than an object with a string `imageUrl` yields `None`.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

impl SubmitResponse {
    /// Interpret an arbitrary JSON body as a submission response.
    ///
    /// A body whose `success` is missing or not a boolean yields `None`.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn upload_response_requires_string_image_url() {
        let ok = ImageUploadResponse::from_value(json!({"imageUrl": "https://cdn/a.jpg"}));
        assert_eq!(
            ok.map(|resp| resp.image_url).as_deref(),
            Some("https://cdn/a.jpg")
        );

        assert!(ImageUploadResponse::from_value(json!({"image_url": "x"})).is_none());
        assert!(ImageUploadResponse::from_value(json!({"imageUrl": 42})).is_none());
        assert!(ImageUploadResponse::from_value(json!("https://cdn/a.jpg")).is_none());
    }

    #[test]
    fn submit_response_requires_boolean_success() {
        let rejected = SubmitResponse::from_value(json!({"success": false, "message": "full"}))
            .expect("valid body");
        assert!(!rejected.success);
        assert_eq!(rejected.message.as_deref(), Some("full"));

        assert!(SubmitResponse::from_value(json!({"success": "true"})).is_none());
        assert!(SubmitResponse::from_value(json!({"ok": true})).is_none());
    }
}
