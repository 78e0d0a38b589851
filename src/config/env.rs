//! Variable pipeline: flat `PREFIX_SECTION_FIELD` variables to [`Config`] and back.
//!
//! # Data Flow
//! ```text
//! schema path ["auth", "keys_backend", "params"]
//!     → variable name TELEPORT_AUTH_KEYS_BACKEND_PARAMS
//!     → VarSource lookup (None when unset)
//!     → leaf decoder shared with the document pipeline
//! ```
//!
//! # Design Decisions
//! - Names are derived from the schema, never scanned from the source, so
//!   unknown variables are ignored and no iteration order is relied on
//! - An unset variable is the zero value; only malformed values are errors
//! - Errors carry the dotted field path, the same one the document pipeline
//!   reports for the same field

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::config::error::ConfigError;
use crate::config::schema::Config;
use crate::config::visit::{dotted_path, Leaf, LeafKind, Schema, Visitor};

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "TELEPORT";

/// A read-only namespace of string variables.
pub trait VarSource {
    /// Value of `name`, or `None` when unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> VarSource for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl VarSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Adapts a lookup closure into a [`VarSource`].
pub struct VarFn<F>(pub F);

impl<F> VarSource for VarFn<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }
}

/// One variable recognised by the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Full variable name, prefix included.
    pub name: String,
    /// Dotted field path.
    pub path: String,
    pub kind: LeafKind,
}

/// Variable name for `key` below `parents`.
///
/// `var_name("TELEPORT", &["auth"], "http_addr")` is `TELEPORT_AUTH_HTTP_ADDR`.
pub fn var_name(prefix: &str, parents: &[&str], key: &str) -> String {
    let prefix = prefix.trim_end_matches('_');
    parents
        .iter()
        .copied()
        .chain(std::iter::once(key))
        .fold(prefix.to_ascii_uppercase(), |mut name, segment| {
            if !name.is_empty() {
                name.push('_');
            }
            name.push_str(&segment.to_ascii_uppercase());
            name
        })
}

/// Decode a fresh [`Config`] from variables under `prefix`.
pub fn decode<S: VarSource + ?Sized>(prefix: &str, source: &S) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    let mut decoder = EnvDecoder {
        prefix,
        source,
        path: Vec::new(),
        found: 0,
    };
    config.visit(&mut decoder)?;
    tracing::debug!(prefix, variables = decoder.found, "Decoded configuration from variables");
    Ok(config)
}

/// Render a configuration as the variable set that decodes back to it.
///
/// Zero-valued fields are left out.
pub fn encode(prefix: &str, config: &Config) -> Result<BTreeMap<String, String>, ConfigError> {
    // visiting needs `&mut`; encode from a scratch copy
    let mut scratch = config.clone();
    let mut encoder = EnvEncoder {
        prefix,
        path: Vec::new(),
        vars: BTreeMap::new(),
    };
    scratch.visit(&mut encoder)?;
    Ok(encoder.vars)
}

/// Every variable the schema recognises, in declaration order.
pub fn variables(prefix: &str) -> Result<Vec<Variable>, ConfigError> {
    let mut collector = Collector {
        prefix,
        path: Vec::new(),
        vars: Vec::new(),
    };
    Config::default().visit(&mut collector)?;
    Ok(collector.vars)
}

struct EnvDecoder<'a, S: ?Sized> {
    prefix: &'a str,
    source: &'a S,
    path: Vec<&'static str>,
    found: usize,
}

impl<S: VarSource + ?Sized> Visitor for EnvDecoder<'_, S> {
    fn leaf(&mut self, key: &'static str, leaf: Leaf<'_>) -> Result<(), ConfigError> {
        let name = var_name(self.prefix, &self.path, key);
        let raw = self.source.var(&name);
        if raw.is_some() {
            self.found += 1;
            tracing::trace!(variable = %name, "Variable set");
        }
        leaf.decode(raw.as_deref())
            .map_err(|e| e.at(dotted_path(&self.path, key)))
    }

    fn section(&mut self, key: &'static str, section: &mut dyn Schema) -> Result<(), ConfigError> {
        self.path.push(key);
        let result = section.visit(self);
        self.path.pop();
        result
    }
}

struct EnvEncoder<'a> {
    prefix: &'a str,
    path: Vec<&'static str>,
    vars: BTreeMap<String, String>,
}

impl Visitor for EnvEncoder<'_> {
    fn leaf(&mut self, key: &'static str, leaf: Leaf<'_>) -> Result<(), ConfigError> {
        if let Some(value) = leaf.encode() {
            self.vars.insert(var_name(self.prefix, &self.path, key), value);
        }
        Ok(())
    }

    fn section(&mut self, key: &'static str, section: &mut dyn Schema) -> Result<(), ConfigError> {
        self.path.push(key);
        let result = section.visit(self);
        self.path.pop();
        result
    }
}

struct Collector<'a> {
    prefix: &'a str,
    path: Vec<&'static str>,
    vars: Vec<Variable>,
}

impl Visitor for Collector<'_> {
    fn leaf(&mut self, key: &'static str, leaf: Leaf<'_>) -> Result<(), ConfigError> {
        self.vars.push(Variable {
            name: var_name(self.prefix, &self.path, key),
            path: dotted_path(&self.path, key),
            kind: leaf.kind(),
        });
        Ok(())
    }

    fn section(&mut self, key: &'static str, section: &mut dyn Schema) -> Result<(), ConfigError> {
        self.path.push(key);
        let result = section.visit(self);
        self.path.pop();
        result
    }
}
