//! Custom request extractors.

mod validated_json;

pub use validated_json::{collect_validation_errors, ValidatedJson};
