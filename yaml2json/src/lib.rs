//! # yaml2json
//!
//! Safe conversion of YAML document streams into JSON.
//!
//! A YAML file may hold any number of documents separated by `---`. This
//! crate loads all of them as plain data (scalars, sequences and mappings
//! under YAML 1.1 typing rules) and renders them as a single pretty-printed
//! JSON array in stream order. Tags outside the core schema are refused, as
//! are numbers JSON cannot hold. Nothing is rendered until every document
//! has loaded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use yaml2json::{ConvertConfig, convert_file, write_output};
//!
//! let json = convert_file(Path::new("config.yaml"), &ConvertConfig::default()).unwrap();
//! write_output(&json, &mut std::io::stdout()).unwrap();
//! ```

mod config;
mod error;
mod format;
mod loader;
mod output;
mod resolve;
mod source;

use std::path::Path;

use tracing::info;

pub use config::{ConvertConfig, DEFAULT_INDENT, DEFAULT_MAX_ALIAS_NODES};
pub use error::{ConvertError, LoadError, LoadErrorKind};
pub use format::json::render_json;
pub use format::yaml::parse_documents;
pub use output::write_output;
pub use serde_saphyr::budget::Budget;
pub use source::read_source;

/// Convert the YAML file at `path` into rendered JSON bytes.
///
/// Reads the whole file, parses every document, then renders the JSON
/// array. The returned bytes end with a newline and are ready to write out.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] or [`ConvertError::InvalidEncoding`] if the
/// file cannot be read as UTF-8 text, [`ConvertError::Parse`] if the YAML is
/// malformed or cannot be loaded as plain data, and
/// [`ConvertError::Serialize`] if rendering fails.
pub fn convert_file(path: &Path, config: &ConvertConfig) -> Result<Vec<u8>, ConvertError> {
    let content = read_source(path)?;
    let documents = parse_documents(&content, path, config)?;
    let json = render_json(&documents, config)?;
    info!(
        file = %path.display(),
        documents = documents.len(),
        bytes = json.len(),
        "converted YAML stream to JSON"
    );
    Ok(json)
}
