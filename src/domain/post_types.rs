//! Declarative descriptor of one community post category.

use serde::Serialize;

use super::fields::FieldSpec;

#[derive(Debug, Clone, Serialize)]
pub struct PostTypeConfig {
    #[serde(rename = "type")]
    pub post_type: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
    pub submit_endpoint: String,
    pub success_message: String,
    pub list_path: String,
}

impl PostTypeConfig {
    /// Start a config whose endpoint and list route follow the category key.
    pub fn new(post_type: impl Into<String>, title: impl Into<String>) -> Self {
        let post_type = post_type.into();
        Self {
            submit_endpoint: format!("/api/community/{post_type}"),
            list_path: format!("/community/{post_type}"),
            success_message: "Your post has been published.".to_string(),
            title: title.into(),
            fields: Vec::new(),
            post_type,
        }
    }

    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn submit_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.submit_endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    #[must_use]
    pub fn list_path(mut self, path: impl Into<String>) -> Self {
        self.list_path = path.into();
        self
    }

    pub fn field_by_key(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// The images field, if the category collects photos.
    pub fn images_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.kind.is_images())
    }

    pub fn has_images(&self) -> bool {
        self.images_field().is_some()
    }
}
