//! Per-page processing: pull raw fields out of the DOM, split the address,
//! and decide whether the result is complete enough to keep.

pub mod address;
pub mod extract;
pub mod validate;

pub use address::parse_address;
pub use extract::extract_fields;
pub use validate::{is_valid_record, validate_record, Rejection};
