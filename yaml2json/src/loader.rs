//! Event-driven construction of JSON values from a YAML stream.
//!
//! The parser's events are folded into `serde_json::Value`s with an explicit
//! stack, one value per document. Every document yields a value, so an
//! empty document (`---` with nothing after it) becomes `null`.

use std::collections::HashMap;

use saphyr_parser::{Event, Parser, ScalarStyle, ScanError, Span, Tag};
use serde_json::{Map, Value};

use crate::error::{LoadError, LoadErrorKind};
use crate::resolve::{resolve_plain, resolve_tagged};

/// Prefix shared by every tag of the YAML core schema; `!!x` expands to it.
const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Plain key that merges other mappings into the enclosing one.
const MERGE_KEY: &str = "<<";

/// Load every document in `content`, in stream order.
///
/// # Errors
///
/// Returns a [`LoadError`] for malformed YAML, tags outside the core
/// schema, numbers JSON cannot hold, duplicate or non-scalar mapping keys,
/// bad merge keys, recursive aliases, and alias expansion beyond
/// `max_alias_nodes`.
pub fn load(content: &str, max_alias_nodes: usize) -> Result<Vec<Value>, LoadError> {
    let mut loader = Loader::new(max_alias_nodes);
    for item in Parser::new_from_str(content) {
        let (event, span) = item.map_err(|e| syntax_error(&e))?;
        loader.handle(event, span)?;
    }
    Ok(loader.documents)
}

/// Convert a scanner diagnostic, keeping its position.
#[must_use]
pub fn syntax_error(err: &ScanError) -> LoadError {
    let marker = err.marker();
    LoadError::new(LoadErrorKind::Syntax, err.info()).at(marker.line(), marker.col() + 1)
}

fn located(err: LoadError, span: Span) -> LoadError {
    err.at(span.start.line(), span.start.col() + 1)
}

/// How a node's tag is interpreted.
enum TagClass<'a> {
    /// The non-specific `!` tag: the node keeps its plain string form.
    NonSpecific,
    /// A core schema tag, given by its suffix (`str`, `int`, `map`, ...).
    Core(&'a str),
    /// Anything else: local `!custom` tags and foreign URIs.
    Other,
}

fn classify(tag: &Tag) -> TagClass<'_> {
    if tag.handle == CORE_TAG_PREFIX {
        TagClass::Core(&tag.suffix)
    } else if !tag.handle.is_empty() {
        TagClass::Other
    } else if tag.suffix == "!" {
        TagClass::NonSpecific
    } else if let Some(suffix) = tag.suffix.strip_prefix(CORE_TAG_PREFIX) {
        TagClass::Core(suffix)
    } else {
        TagClass::Other
    }
}

fn unsupported_tag(tag: &Tag) -> LoadError {
    let shown = match classify(tag) {
        TagClass::Core(suffix) => format!("!!{suffix}"),
        TagClass::NonSpecific | TagClass::Other => tag.to_string(),
    };
    LoadError::new(
        LoadErrorKind::UnsupportedTag,
        format!("unsupported tag `{shown}`"),
    )
}

/// Accept a collection tag only if it is absent, `!`, or the matching core tag.
fn check_collection_tag(tag: Option<&Tag>, core: &str) -> Result<(), LoadError> {
    let Some(tag) = tag else {
        return Ok(());
    };
    let accepted = match classify(tag) {
        TagClass::NonSpecific => true,
        TagClass::Core(suffix) => suffix == core,
        TagClass::Other => false,
    };
    if accepted {
        Ok(())
    } else {
        Err(unsupported_tag(tag))
    }
}

fn scalar_value(text: &str, style: ScalarStyle, tag: Option<&Tag>) -> Result<Value, LoadError> {
    let Some(tag) = tag else {
        return if style == ScalarStyle::Plain {
            resolve_plain(text)
        } else {
            Ok(Value::String(text.to_owned()))
        };
    };
    match classify(tag) {
        TagClass::NonSpecific => Ok(Value::String(text.to_owned())),
        TagClass::Core(suffix) => resolve_tagged(suffix, text),
        TagClass::Other => Err(unsupported_tag(tag)),
    }
}

/// Render a scalar key the way JSON object keys are written.
fn key_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Null => Some("null".to_owned()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn count_nodes(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(count_nodes).sum::<usize>(),
        Value::Object(map) => 1 + map.values().map(count_nodes).sum::<usize>(),
        _ => 1,
    }
}

/// What the innermost open mapping expects next.
enum Slot {
    Key,
    Value(String),
    Merge,
}

struct MappingFrame {
    anchor: usize,
    entries: Map<String, Value>,
    /// Mappings pulled in through `<<`, lowest precedence first.
    merged: Vec<Map<String, Value>>,
    slot: Slot,
}

impl MappingFrame {
    fn new(anchor: usize) -> Self {
        Self {
            anchor,
            entries: Map::new(),
            merged: Vec::new(),
            slot: Slot::Key,
        }
    }

    fn expects_key(&self) -> bool {
        matches!(self.slot, Slot::Key)
    }

    fn accept(&mut self, value: Value) -> Result<(), LoadError> {
        match std::mem::replace(&mut self.slot, Slot::Key) {
            Slot::Key => {
                let key = key_text(value).ok_or_else(|| {
                    LoadError::new(
                        LoadErrorKind::NonScalarKey,
                        "mapping keys must be scalars",
                    )
                })?;
                if self.entries.contains_key(&key) {
                    return Err(LoadError::new(
                        LoadErrorKind::DuplicateKey,
                        format!("duplicate mapping key `{key}`"),
                    ));
                }
                self.slot = Slot::Value(key);
            }
            Slot::Value(key) => {
                self.entries.insert(key, value);
            }
            Slot::Merge => self.merge(value)?,
        }
        Ok(())
    }

    /// Earlier mappings in a merge list win over later ones.
    fn merge(&mut self, value: Value) -> Result<(), LoadError> {
        let invalid = || {
            LoadError::new(
                LoadErrorKind::InvalidMerge,
                "merge key `<<` needs a mapping or a list of mappings",
            )
        };
        match value {
            Value::Object(map) => self.merged.push(map),
            Value::Array(items) => {
                let maps = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(map) => Ok(map),
                        _ => Err(invalid()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.merged.extend(maps.into_iter().rev());
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Merged entries first, then explicit ones, which override them in place.
    fn finish(self) -> Value {
        let mut map = Map::new();
        for merged in self.merged {
            map.extend(merged);
        }
        map.extend(self.entries);
        Value::Object(map)
    }
}

enum Frame {
    Sequence { anchor: usize, items: Vec<Value> },
    Mapping(MappingFrame),
}

struct Anchored {
    value: Value,
    nodes: usize,
}

struct Loader {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Anchored>,
    root: Option<Value>,
    documents: Vec<Value>,
    alias_nodes: usize,
    max_alias_nodes: usize,
}

impl Loader {
    fn new(max_alias_nodes: usize) -> Self {
        Self {
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            documents: Vec::new(),
            alias_nodes: 0,
            max_alias_nodes,
        }
    }

    fn handle(&mut self, event: Event<'_>, span: Span) -> Result<(), LoadError> {
        match event {
            Event::DocumentStart(_) => {
                self.root = None;
                self.anchors.clear();
            }
            Event::DocumentEnd => {
                let root = self.root.take().unwrap_or(Value::Null);
                self.documents.push(root);
            }
            Event::Scalar(text, style, anchor, tag) => {
                self.scalar(&text, style, anchor, tag.as_deref())
                    .map_err(|e| located(e, span))?;
            }
            Event::SequenceStart(anchor, tag) => {
                self.open(tag.as_deref(), "seq")
                    .map_err(|e| located(e, span))?;
                self.stack.push(Frame::Sequence {
                    anchor,
                    items: Vec::new(),
                });
            }
            Event::MappingStart(anchor, tag) => {
                self.open(tag.as_deref(), "map")
                    .map_err(|e| located(e, span))?;
                self.stack.push(Frame::Mapping(MappingFrame::new(anchor)));
            }
            Event::SequenceEnd | Event::MappingEnd => {
                self.close().map_err(|e| located(e, span))?;
            }
            Event::Alias(id) => {
                self.alias(id).map_err(|e| located(e, span))?;
            }
            Event::Nothing | Event::StreamStart | Event::StreamEnd => {}
        }
        Ok(())
    }

    fn scalar(
        &mut self,
        text: &str,
        style: ScalarStyle,
        anchor: usize,
        tag: Option<&Tag>,
    ) -> Result<(), LoadError> {
        if style == ScalarStyle::Plain
            && tag.is_none()
            && text == MERGE_KEY
            && let Some(Frame::Mapping(frame)) = self.stack.last_mut()
            && frame.expects_key()
        {
            frame.slot = Slot::Merge;
            return Ok(());
        }
        let value = scalar_value(text, style, tag)?;
        self.complete(value, anchor)
    }

    /// Check a collection about to open: its tag, and that it is not a key.
    fn open(&self, tag: Option<&Tag>, core: &str) -> Result<(), LoadError> {
        check_collection_tag(tag, core)?;
        match self.stack.last() {
            Some(Frame::Mapping(frame)) if frame.expects_key() => Err(LoadError::new(
                LoadErrorKind::NonScalarKey,
                "mapping keys must be scalars",
            )),
            _ => Ok(()),
        }
    }

    fn close(&mut self) -> Result<(), LoadError> {
        let (value, anchor) = match self.stack.pop() {
            Some(Frame::Sequence { anchor, items }) => (Value::Array(items), anchor),
            Some(Frame::Mapping(frame)) => {
                let anchor = frame.anchor;
                (frame.finish(), anchor)
            }
            None => {
                return Err(LoadError::new(
                    LoadErrorKind::Syntax,
                    "collection end without a matching start",
                ));
            }
        };
        self.complete(value, anchor)
    }

    fn alias(&mut self, id: usize) -> Result<(), LoadError> {
        let Some(anchored) = self.anchors.get(&id) else {
            return Err(LoadError::new(
                LoadErrorKind::RecursiveAlias,
                "alias refers to a node that contains it",
            ));
        };
        self.alias_nodes = self.alias_nodes.saturating_add(anchored.nodes);
        if self.alias_nodes > self.max_alias_nodes {
            return Err(LoadError::new(
                LoadErrorKind::AliasExpansionLimit,
                format!(
                    "aliases expand to more than {} nodes",
                    self.max_alias_nodes
                ),
            ));
        }
        let value = anchored.value.clone();
        self.complete(value, 0)
    }

    /// Attach a finished node to its parent, recording it if anchored.
    fn complete(&mut self, value: Value, anchor: usize) -> Result<(), LoadError> {
        if anchor != 0 {
            let nodes = count_nodes(&value);
            self.anchors.insert(
                anchor,
                Anchored {
                    value: value.clone(),
                    nodes,
                },
            );
        }
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping(frame)) => frame.accept(value)?,
        }
        Ok(())
    }
}
