use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::{config::LoadError, domain::error::DomainError, infra::error::InfraError};

use super::form::FormError;
use super::submission::SubmissionError;
use super::uploader::UploadError;
use super::validator::ValidationError;

/// Everything that can stop a post submission.
///
/// None of these are retried automatically; the form stays editable and the
/// user decides whether to try again.
#[derive(Debug, Error)]
pub enum PostFormError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl PostFormError {
    pub fn kind(&self) -> &'static str {
        match self {
            PostFormError::Form(FormError::ImageConstraint(_)) => "image_constraint",
            PostFormError::Form(_) => "form_state",
            PostFormError::Validation(_) => "validation",
            PostFormError::Upload(_) => "upload",
            PostFormError::Submission(_) => "submission",
        }
    }
}

/// Message chain of an error, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            let message = inner.to_string();
            if messages.last() != Some(&message) {
                messages.push(message);
            }
            current = inner.source();
        }
        Self { source, messages }
    }

    pub fn render(&self) -> String {
        self.messages.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unknown post type `{0}`")]
    UnknownPostType(String),
    #[error("post type `{post_type}` has its own screen at {create_path}")]
    BespokePostType {
        post_type: String,
        create_path: String,
    },
    #[error("failed to read {}: {source}", .path.display())]
    InputFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Post(#[from] PostFormError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<FormError> for AppError {
    fn from(error: FormError) -> Self {
        Self::Post(PostFormError::Form(error))
    }
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit status: 2 for problems the operator can fix in the
    /// command line or form input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::UnknownPostType(_)
            | AppError::BespokePostType { .. }
            | AppError::InputFile { .. }
            | AppError::InvalidInput(_)
            | AppError::Post(PostFormError::Validation(_) | PostFormError::Form(_)) => 2,
            AppError::Config(_)
            | AppError::Domain(_)
            | AppError::Infra(_)
            | AppError::Post(_)
            | AppError::Unexpected(_) => 1,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}
