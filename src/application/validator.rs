//! Client-side validation of a filled post form.

use thiserror::Error;

use crate::domain::{
    fields::{FieldSpec, FormValues},
    post_types::PostTypeConfig,
    uploads::UploadState,
};

/// The single error shown to the user when a form does not validate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub key: String,
    pub label: String,
    pub message: String,
}

impl ValidationError {
    fn required(field: &FieldSpec) -> Self {
        let message = if field.kind.is_images() {
            format!("{}: please add at least one image", field.label)
        } else {
            format!("{} is required", field.label)
        };
        Self {
            key: field.key.clone(),
            label: field.label.clone(),
            message,
        }
    }

    fn format(field: &FieldSpec, reason: String) -> Self {
        Self {
            key: field.key.clone(),
            label: field.label.clone(),
            message: format!("{}: {reason}", field.label),
        }
    }
}

/// Check every field in declaration order and stop at the first failure.
///
/// For each field the required rule comes first, then the field's own format
/// rule. Fields after the first failing one are not looked at.
pub fn validate_all(
    config: &PostTypeConfig,
    values: &FormValues,
    uploads: &UploadState,
) -> Result<(), ValidationError> {
    for field in &config.fields {
        let value = values.get(&field.key);
        if field.required && !field.required_satisfied(value, uploads) {
            return Err(ValidationError::required(field));
        }
        if let Some(reason) = field.format_error(value) {
            return Err(ValidationError::format(field, reason));
        }
    }
    Ok(())
}
