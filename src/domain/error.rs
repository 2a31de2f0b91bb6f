use thiserror::Error;

/// Invariant violations detected while assembling the post type table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("post type `{post_type}` is registered more than once")]
    DuplicatePostType { post_type: String },
    #[error("post type `{post_type}` declares field `{key}` more than once")]
    DuplicateField { post_type: String, key: String },
    #[error("post type `{post_type}` declares more than one images field")]
    MultipleImageFields { post_type: String },
    #[error("select field `{key}` of post type `{post_type}` has no options")]
    EmptyOptions { post_type: String, key: String },
    #[error("post type `{post_type}` cannot be both generic and bespoke")]
    ConflictingClassification { post_type: String },
}
