//! Custom request extractors and deserialization helpers.

pub mod trimmed;
mod validated_json;

pub use trimmed::{trimmed, trimmed_opt};
pub use validated_json::{ValidatedJson, ValidatedQuery};
