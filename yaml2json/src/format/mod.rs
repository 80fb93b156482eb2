//! Format-specific halves of the conversion:
//! - `yaml`: safe parsing of a multi-document YAML stream
//! - `json`: pretty rendering of the parsed documents as one JSON array

pub mod json;
pub mod yaml;
