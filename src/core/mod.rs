//! Presentation Exchange data model.
//!
//! Every type in this module validates itself on construction and on decoding:
//! a value that exists is a value that honors its invariants.

pub mod credential_format;
pub mod error;
pub mod filter;
pub mod identifier;
pub mod input_descriptor;
pub mod json_path;
pub mod object;
pub mod presentation_definition;
pub mod presentation_submission;
