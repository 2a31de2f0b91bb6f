//! Application layer: the post form engine and its orchestration.

pub mod catalog;
pub mod error;
pub mod form;
pub mod ports;
pub mod registry;
pub mod submission;
pub mod uploader;
pub mod validator;
