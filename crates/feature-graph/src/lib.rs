//! Feature graph of the exchange model: sketches, extrudes and revolves
//! held in a [`UnifiedModel`] that owns them and indexes them by ID.

pub mod model;
pub mod resolve;
pub mod types;
pub mod validate;

pub use model::UnifiedModel;
pub use types::*;
pub use validate::{ValidationIssue, ValidationReport};
