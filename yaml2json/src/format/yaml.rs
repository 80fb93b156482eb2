//! YAML stream parsing.
//!
//! The stream is first scanned against the configured [`Budget`], then
//! loaded into JSON values. Every document is fully materialized before
//! anything is returned, so an error anywhere in the stream fails the whole
//! conversion.

use std::path::Path;

use serde_json::Value;
use serde_saphyr::budget::{Budget, BudgetBreach, EnforcingPolicy, check_yaml_budget};
use tracing::debug;

use crate::config::ConvertConfig;
use crate::error::{ConvertError, LoadError, LoadErrorKind};
use crate::loader::{load, syntax_error};

/// Parse all YAML documents in `content`, in stream order.
///
/// Only plain data is produced: scalars, sequences and mappings. An empty
/// document yields `null`; a stream with no documents yields an empty list.
/// `path` is used for diagnostics only.
///
/// # Errors
///
/// Returns [`ConvertError::Parse`] if any document is malformed, exceeds the
/// budget, uses a tag outside the core schema, repeats a mapping key, or
/// holds a value JSON cannot represent.
pub fn parse_documents(
    content: &str,
    path: &Path,
    config: &ConvertConfig,
) -> Result<Vec<Value>, ConvertError> {
    let parse_error = |error: LoadError| ConvertError::Parse {
        path: path.to_owned(),
        error,
    };

    check_budget(content, &config.budget).map_err(parse_error)?;
    let documents = load(content, config.max_alias_nodes).map_err(parse_error)?;
    debug!(
        file = %path.display(),
        documents = documents.len(),
        "parsed YAML stream"
    );

    Ok(documents)
}

fn check_budget(content: &str, budget: &Budget) -> Result<(), LoadError> {
    let report = check_yaml_budget(content, budget.clone(), EnforcingPolicy::AllContent)
        .map_err(|e| syntax_error(&e))?;
    match report.breached {
        Some(breach) => Err(LoadError::new(
            LoadErrorKind::Budget,
            describe_breach(&breach),
        )),
        None => Ok(()),
    }
}

fn describe_breach(breach: &BudgetBreach) -> String {
    match breach {
        BudgetBreach::Events { events } => format!("too many YAML events ({events})"),
        BudgetBreach::Aliases { aliases } => format!("too many aliases ({aliases})"),
        BudgetBreach::Anchors { anchors } => format!("too many anchors ({anchors})"),
        BudgetBreach::Depth { depth } => format!("nesting too deep ({depth} levels)"),
        BudgetBreach::Documents { documents } => format!("too many documents ({documents})"),
        BudgetBreach::Nodes { nodes } => format!("too many nodes ({nodes})"),
        BudgetBreach::ScalarBytes { total_scalar_bytes } => {
            format!("scalar content too large ({total_scalar_bytes} bytes)")
        }
        BudgetBreach::MergeKeys { merge_keys } => format!("too many merge keys ({merge_keys})"),
        BudgetBreach::AliasAnchorRatio { aliases, anchors } => {
            format!("too many aliases ({aliases}) for the anchors defined ({anchors})")
        }
        BudgetBreach::SequenceUnbalanced => "unbalanced collection end".to_owned(),
        BudgetBreach::InputBytes { input_bytes } => {
            format!("input too large ({input_bytes} bytes)")
        }
    }
}
