//! Domain layer: the declarative form model and its invariants.

pub mod error;
pub mod fields;
pub mod post_types;
pub mod rules;
pub mod uploads;
