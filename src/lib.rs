//! Declarative form engine for church community listings.
//!
//! Post categories are described once as data; one generic form renders,
//! validates and submits any of them, uploading images in selection order
//! before the post itself is created.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
