//! Document pipeline: YAML or TOML text to [`Config`] and back.
//!
//! # Data Flow
//! ```text
//! bytes
//!     → serde_yaml::Value | toml::Table (shape only)
//!     → second pass over the same bytes, scalars read as written
//!     → Node tree (scalars kept as source text)
//!     → DocumentDecoder walks the schema, one key per field
//!     → Config
//! ```
//!
//! # Design Decisions
//! - Both syntaxes collapse into one [`Node`] tree, so the walk is the same
//! - Scalars keep their source text and go through the same leaf decoders as
//!   variables, so `token: 0x1F` and `PREFIX_AUTH_TOKEN=0x1F` agree
//! - Absent keys and explicit nulls are the zero value
//! - A node of the wrong shape is a `SchemaMismatch` naming its dotted path

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess};
use serde::Deserialize;

use crate::config::error::ConfigError;
use crate::config::schema::Config;
use crate::config::types::{KeyValueSet, NetworkEndpointList};
use crate::config::visit::{dotted_path, Leaf, LeafKind, Schema, Visitor};

/// Syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_name(path.extension()?.to_str()?)
    }

    /// Pick a format from its name (`yaml`, `yml`, `toml`), ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }
}

/// A syntax-neutral document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Null,
    Scalar(String),
    List(Vec<Node>),
    Map(BTreeMap<String, Node>),
}

impl Node {
    /// Parse document text into a node tree.
    ///
    /// Scalars keep the text they were written with: `0x1F` stays `0x1F`.
    pub fn parse(bytes: &[u8], format: DocumentFormat) -> Result<Self, ConfigError> {
        match format {
            DocumentFormat::Yaml => {
                let shape: serde_yaml::Value = serde_yaml::from_slice(bytes)?;
                if shape.is_null() {
                    return Ok(Node::Null);
                }
                check_yaml_keys(&shape, &mut Vec::new())?;
                let seed = YamlSeed { shape: &shape };
                Ok(seed.deserialize(serde_yaml::Deserializer::from_slice(bytes))?)
            }
            DocumentFormat::Toml => {
                let text = std::str::from_utf8(bytes)?;
                let shape = toml::Value::Table(toml::from_str(text)?);
                let seed = TomlSeed {
                    shape: &shape,
                    text,
                };
                Ok(seed.deserialize(toml::Deserializer::new(text))?)
            }
        }
    }

    fn into_yaml(self) -> serde_yaml::Value {
        use serde_yaml::Value;

        match self {
            Node::Null => Value::Null,
            Node::Scalar(s) => Value::String(s),
            Node::List(items) => Value::Sequence(items.into_iter().map(Node::into_yaml).collect()),
            Node::Map(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (Value::String(key), value.into_yaml()))
                    .collect(),
            ),
        }
    }

    fn into_toml(self) -> toml::Value {
        use toml::Value;

        match self {
            // never produced by the encoder; TOML has no null
            Node::Null => Value::String(String::new()),
            Node::Scalar(s) => Value::String(s),
            Node::List(items) => Value::Array(items.into_iter().map(Node::into_toml).collect()),
            Node::Map(entries) => Value::Table(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into_toml()))
                    .collect(),
            ),
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Scalar(_) => "scalar",
            Node::List(_) => "list",
            Node::Map(_) => "map",
        }
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.join(".")
    }
}

/// Mapping keys must be scalars so they can name fields and key-value entries.
fn check_yaml_keys(value: &serde_yaml::Value, path: &mut Vec<String>) -> Result<(), ConfigError> {
    use serde_yaml::Value;

    match value {
        Value::Sequence(items) => items.iter().try_for_each(|item| check_yaml_keys(item, path)),
        Value::Mapping(mapping) => {
            for (key, value) in mapping {
                let Some(key) = yaml_key_text(key) else {
                    return Err(ConfigError::SchemaMismatch {
                        path: display_path(path),
                        expected: "scalar keys",
                    });
                };
                path.push(key);
                check_yaml_keys(value, path)?;
                path.pop();
            }
            Ok(())
        }
        Value::Tagged(tagged) => check_yaml_keys(&tagged.value, path),
        _ => Ok(()),
    }
}

fn yaml_key_text(key: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Node for a tagged YAML value. The tag hides the source text, so scalars
/// below it fall back to their parsed form.
fn from_tagged_yaml(value: &serde_yaml::Value) -> Node {
    use serde_yaml::Value;

    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Scalar(b.to_string()),
        Value::Number(n) => Node::Scalar(n.to_string()),
        Value::String(s) => Node::Scalar(s.clone()),
        Value::Sequence(items) => Node::List(items.iter().map(from_tagged_yaml).collect()),
        Value::Mapping(mapping) => Node::Map(
            mapping
                .iter()
                .filter_map(|(key, value)| Some((yaml_key_text(key)?, from_tagged_yaml(value))))
                .collect(),
        ),
        Value::Tagged(tagged) => from_tagged_yaml(&tagged.value),
    }
}

/// Second YAML pass, steered by the already parsed shape.
///
/// serde_yaml hands a plain scalar to `deserialize_str` exactly as written,
/// so every scalar is read as a string instead of its resolved type.
struct YamlSeed<'s> {
    shape: &'s serde_yaml::Value,
}

impl<'de> DeserializeSeed<'de> for YamlSeed<'_> {
    type Value = Node;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        use serde_yaml::Value;

        match self.shape {
            Value::Null => {
                IgnoredAny::deserialize(deserializer)?;
                Ok(Node::Null)
            }
            Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                String::deserialize(deserializer).map(Node::Scalar)
            }
            Value::Sequence(items) => deserializer.deserialize_seq(YamlList { items }),
            Value::Mapping(mapping) => deserializer.deserialize_map(YamlMap { mapping }),
            Value::Tagged(tagged) => {
                IgnoredAny::deserialize(deserializer)?;
                Ok(from_tagged_yaml(&tagged.value))
            }
        }
    }
}

struct YamlList<'s> {
    items: &'s [serde_yaml::Value],
}

impl<'de> de::Visitor<'de> for YamlList<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(self.items.len());
        for shape in self.items {
            match seq.next_element_seed(YamlSeed { shape })? {
                Some(node) => items.push(node),
                None => break,
            }
        }
        Ok(Node::List(items))
    }
}

struct YamlMap<'s> {
    mapping: &'s serde_yaml::Mapping,
}

impl<'de> de::Visitor<'de> for YamlMap<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping")
    }

    // the parsed mapping keeps document order, so entries pair up one to one
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut entries = BTreeMap::new();
        for (key_shape, shape) in self.mapping {
            let key = match map.next_key_seed(YamlSeed { shape: key_shape })? {
                Some(Node::Scalar(key)) => key,
                Some(_) => return Err(de::Error::custom("mapping keys must be scalars")),
                None => break,
            };
            entries.insert(key, map.next_value_seed(YamlSeed { shape })?);
        }
        Ok(Node::Map(entries))
    }
}

/// Second TOML pass, steered by the already parsed shape.
///
/// Numbers and dates are read through [`toml::Spanned`] and replaced by the
/// slice of the source they were parsed from.
struct TomlSeed<'s> {
    shape: &'s toml::Value,
    text: &'s str,
}

impl<'de> DeserializeSeed<'de> for TomlSeed<'_> {
    type Value = Node;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        use toml::Value;

        match self.shape {
            Value::String(s) => {
                IgnoredAny::deserialize(deserializer)?;
                Ok(Node::Scalar(s.clone()))
            }
            Value::Boolean(b) => {
                IgnoredAny::deserialize(deserializer)?;
                Ok(Node::Scalar(b.to_string()))
            }
            Value::Integer(_) | Value::Float(_) | Value::Datetime(_) => {
                let spanned = toml::Spanned::<Value>::deserialize(deserializer)?;
                let raw = match self.text.get(spanned.span()) {
                    Some(raw) => raw.to_string(),
                    None => spanned.get_ref().to_string(),
                };
                Ok(Node::Scalar(raw))
            }
            Value::Array(items) => deserializer.deserialize_seq(TomlList {
                items,
                text: self.text,
            }),
            Value::Table(table) => deserializer.deserialize_map(TomlMap {
                table,
                text: self.text,
            }),
        }
    }
}

struct TomlList<'s> {
    items: &'s [toml::Value],
    text: &'s str,
}

impl<'de> de::Visitor<'de> for TomlList<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(self.items.len());
        for shape in self.items {
            match seq.next_element_seed(TomlSeed {
                shape,
                text: self.text,
            })? {
                Some(node) => items.push(node),
                None => break,
            }
        }
        Ok(Node::List(items))
    }
}

struct TomlMap<'s> {
    table: &'s toml::Table,
    text: &'s str,
}

impl<'de> de::Visitor<'de> for TomlMap<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a table")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some(key) = map.next_key::<String>()? {
            match self.table.get(&key) {
                Some(shape) => {
                    let node = map.next_value_seed(TomlSeed {
                        shape,
                        text: self.text,
                    })?;
                    entries.insert(key, node);
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(Node::Map(entries))
    }
}

/// Decode a document into a fresh [`Config`].
pub fn decode(bytes: &[u8], format: DocumentFormat) -> Result<Config, ConfigError> {
    let root = Node::parse(bytes, format)?;
    decode_node(&root)
}

/// Decode an already parsed node tree.
pub fn decode_node(root: &Node) -> Result<Config, ConfigError> {
    let entries = match root {
        Node::Null => None,
        Node::Map(entries) => Some(entries),
        _ => {
            return Err(ConfigError::SchemaMismatch {
                path: display_path(&[]),
                expected: "section",
            })
        }
    };

    let mut config = Config::default();
    let mut decoder = DocumentDecoder {
        entries,
        path: Vec::new(),
    };
    config.visit(&mut decoder)?;
    Ok(config)
}

/// Render a configuration as a document in the given syntax.
///
/// Zero-valued fields and empty sections are left out.
pub fn render(config: &Config, format: DocumentFormat) -> Result<String, ConfigError> {
    let root = encode(config)?;
    match format {
        DocumentFormat::Yaml => Ok(serde_yaml::to_string(&root.into_yaml())?),
        DocumentFormat::Toml => Ok(toml::to_string(&root.into_toml())?),
    }
}

/// Encode a configuration into a node tree.
pub fn encode(config: &Config) -> Result<Node, ConfigError> {
    // visiting needs `&mut`; encode from a scratch copy
    let mut scratch = config.clone();
    let mut encoder = DocumentEncoder::default();
    scratch.visit(&mut encoder)?;
    Ok(Node::Map(encoder.entries))
}

struct DocumentDecoder<'n> {
    entries: Option<&'n BTreeMap<String, Node>>,
    path: Vec<&'static str>,
}

impl<'n> DocumentDecoder<'n> {
    fn lookup(&self, key: &str) -> Option<&'n Node> {
        self.entries.and_then(|entries| entries.get(key))
    }
}

impl Visitor for DocumentDecoder<'_> {
    fn leaf(&mut self, key: &'static str, leaf: Leaf<'_>) -> Result<(), ConfigError> {
        let path = dotted_path(&self.path, key);

        match self.lookup(key) {
            None | Some(Node::Null) => leaf.decode(None),
            Some(Node::Scalar(text)) => leaf.decode(Some(text)).map_err(|e| e.at(path)),
            Some(Node::List(items)) => match leaf {
                Leaf::Endpoints(slot) => {
                    *slot = decode_endpoint_items(items, &path)?;
                    Ok(())
                }
                other => Err(shape_mismatch(path, other.kind(), "list")),
            },
            Some(Node::Map(entries)) => match leaf {
                Leaf::Pairs(slot) => {
                    *slot = decode_pair_entries(entries, &path)?;
                    Ok(())
                }
                other => Err(shape_mismatch(path, other.kind(), "map")),
            },
        }
    }

    fn section(&mut self, key: &'static str, section: &mut dyn Schema) -> Result<(), ConfigError> {
        let mut path = self.path.clone();
        path.push(key);

        let entries = match self.lookup(key) {
            None | Some(Node::Null) => None,
            Some(Node::Map(entries)) => Some(entries),
            Some(other) => {
                tracing::debug!(path = %path.join("."), found = other.shape(), "Section has wrong shape");
                return Err(ConfigError::SchemaMismatch {
                    path: path.join("."),
                    expected: "section",
                });
            }
        };

        section.visit(&mut DocumentDecoder { entries, path })
    }
}

fn shape_mismatch(path: String, kind: LeafKind, found: &'static str) -> ConfigError {
    tracing::debug!(%path, expected = kind.describe(), found, "Field has wrong shape");
    ConfigError::SchemaMismatch {
        path,
        expected: kind.describe(),
    }
}

fn decode_endpoint_items(items: &[Node], path: &str) -> Result<NetworkEndpointList, ConfigError> {
    let mut texts = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            Node::Null => {}
            Node::Scalar(text) => texts.push(text.as_str()),
            _ => {
                return Err(ConfigError::SchemaMismatch {
                    path: format!("{path}[{i}]"),
                    expected: LeafKind::Endpoint.describe(),
                })
            }
        }
    }
    NetworkEndpointList::decode_items(texts).map_err(|e| e.at(path))
}

fn decode_pair_entries(
    entries: &BTreeMap<String, Node>,
    path: &str,
) -> Result<KeyValueSet, ConfigError> {
    let mut set = KeyValueSet::new();
    for (key, value) in entries {
        let value = match value {
            Node::Null => "",
            Node::Scalar(text) => text.as_str(),
            _ => {
                return Err(ConfigError::SchemaMismatch {
                    path: format!("{path}.{key}"),
                    expected: "string value",
                })
            }
        };
        set.insert_pair(key, value).map_err(|e| e.at(path))?;
    }
    Ok(set)
}

#[derive(Default)]
struct DocumentEncoder {
    entries: BTreeMap<String, Node>,
}

impl Visitor for DocumentEncoder {
    fn leaf(&mut self, key: &'static str, leaf: Leaf<'_>) -> Result<(), ConfigError> {
        let node = match &leaf {
            Leaf::Endpoints(list) if !list.is_empty() => Node::List(
                list.iter()
                    .map(|endpoint| Node::Scalar(endpoint.to_string()))
                    .collect(),
            ),
            Leaf::Pairs(set) if !set.is_empty() => Node::Map(
                set.iter()
                    .map(|(k, v)| (k.to_string(), Node::Scalar(v.to_string())))
                    .collect(),
            ),
            _ => match leaf.encode() {
                Some(text) => Node::Scalar(text),
                None => return Ok(()),
            },
        };
        self.entries.insert(key.to_string(), node);
        Ok(())
    }

    fn section(&mut self, key: &'static str, section: &mut dyn Schema) -> Result<(), ConfigError> {
        let mut child = DocumentEncoder::default();
        section.visit(&mut child)?;
        if !child.entries.is_empty() {
            self.entries.insert(key.to_string(), Node::Map(child.entries));
        }
        Ok(())
    }
}
