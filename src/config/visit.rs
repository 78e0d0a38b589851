//! The declarative field table shared by every pipeline.
//!
//! Each configuration struct implements [`Schema`] by naming its fields, in
//! order, to a [`Visitor`]. Decoders, encoders and the variable listing are
//! all visitors, so a field declared once takes part in every source.

use crate::config::error::ConfigError;
use crate::config::types::{decode_flag, KeyValueSet, NetworkEndpoint, NetworkEndpointList};

/// A configuration struct whose fields can be walked by a [`Visitor`].
pub trait Schema {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError>;
}

/// One pipeline's view of the field table.
pub trait Visitor {
    /// A leaf field under `key` in the current section.
    fn leaf(&mut self, key: &'static str, leaf: Leaf<'_>) -> Result<(), ConfigError>;

    /// A nested section under `key`.
    fn section(&mut self, key: &'static str, section: &mut dyn Schema) -> Result<(), ConfigError>;
}

/// Semantic type of a leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Text,
    Flag,
    Endpoint,
    EndpointList,
    KeyValueSet,
}

impl LeafKind {
    /// Human-readable description used in errors and listings.
    pub fn describe(self) -> &'static str {
        match self {
            LeafKind::Text => "string",
            LeafKind::Flag => "boolean",
            LeafKind::Endpoint => "endpoint (scheme://address)",
            LeafKind::EndpointList => "endpoint list",
            LeafKind::KeyValueSet => "key:value set",
        }
    }
}

/// Mutable access to one leaf field, tagged with its semantic type.
#[derive(Debug)]
pub enum Leaf<'a> {
    Text(&'a mut String),
    Flag(&'a mut bool),
    Endpoint(&'a mut NetworkEndpoint),
    Endpoints(&'a mut NetworkEndpointList),
    Pairs(&'a mut KeyValueSet),
}

impl Leaf<'_> {
    pub fn kind(&self) -> LeafKind {
        match self {
            Leaf::Text(_) => LeafKind::Text,
            Leaf::Flag(_) => LeafKind::Flag,
            Leaf::Endpoint(_) => LeafKind::Endpoint,
            Leaf::Endpoints(_) => LeafKind::EndpointList,
            Leaf::Pairs(_) => LeafKind::KeyValueSet,
        }
    }

    /// Decode a raw textual value into the field.
    ///
    /// `None` means the source does not mention the field and resets it to
    /// its type's zero value.
    pub fn decode(self, raw: Option<&str>) -> Result<(), ConfigError> {
        let Some(raw) = raw else {
            self.reset();
            return Ok(());
        };

        match self {
            Leaf::Text(slot) => *slot = raw.to_string(),
            Leaf::Flag(slot) => *slot = decode_flag(raw)?,
            Leaf::Endpoint(slot) => {
                *slot = if raw.trim().is_empty() {
                    NetworkEndpoint::default()
                } else {
                    NetworkEndpoint::decode(raw)?
                }
            }
            Leaf::Endpoints(slot) => *slot = NetworkEndpointList::decode(raw)?,
            Leaf::Pairs(slot) => *slot = KeyValueSet::decode(raw)?,
        }
        Ok(())
    }

    fn reset(self) {
        match self {
            Leaf::Text(slot) => *slot = String::new(),
            Leaf::Flag(slot) => *slot = false,
            Leaf::Endpoint(slot) => *slot = NetworkEndpoint::default(),
            Leaf::Endpoints(slot) => *slot = NetworkEndpointList::default(),
            Leaf::Pairs(slot) => *slot = KeyValueSet::default(),
        }
    }

    /// Textual form of the field, or `None` for the zero value.
    pub fn encode(&self) -> Option<String> {
        let text = match self {
            Leaf::Text(slot) => slot.to_string(),
            Leaf::Flag(slot) => {
                if **slot {
                    "true".to_string()
                } else {
                    String::new()
                }
            }
            Leaf::Endpoint(slot) => slot.to_string(),
            Leaf::Endpoints(slot) => slot.to_string(),
            Leaf::Pairs(slot) => slot.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Dotted path of `key` below `parents`, e.g. `auth.keys_backend.params`.
pub fn dotted_path(parents: &[&str], key: &str) -> String {
    parents
        .iter()
        .copied()
        .chain(std::iter::once(key))
        .collect::<Vec<_>>()
        .join(".")
}
