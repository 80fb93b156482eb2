//! Configuration for YAML-to-JSON conversion.

use serde_saphyr::budget::Budget;

/// Indentation width used when no other width is configured.
pub const DEFAULT_INDENT: usize = 2;

/// Nodes alias expansion may add to one stream before loading is refused.
pub const DEFAULT_MAX_ALIAS_NODES: usize = 1_000_000;

/// Options controlling how YAML is loaded and how JSON is rendered.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ConvertConfig {
    /// Number of spaces per nesting level in the JSON output (default: 2).
    pub indent: usize,
    /// Limits checked over the raw event stream before any value is built.
    pub budget: Budget,
    /// Cap on nodes copied in by aliases across the whole stream.
    pub max_alias_nodes: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            budget: Budget::default(),
            max_alias_nodes: DEFAULT_MAX_ALIAS_NODES,
        }
    }
}
