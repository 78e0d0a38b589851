//! Composite value types and their textual decoders.
//!
//! # Responsibilities
//! - Decode `scheme://address` endpoints and ordered endpoint lists
//! - Decode `key:value` collections
//! - Decode booleans from their textual forms
//!
//! # Design Decisions
//! - Every decoder works on text; the document pipeline reduces its scalars
//!   to text first, so both sources share exactly these functions
//! - Blank input is the zero value, not an error
//! - Duplicate keys in a key-value collection: last occurrence wins

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::config::error::ConfigError;

/// Separator between items of list-valued variables.
pub const LIST_DELIMITER: char = ',';

/// Separator between key and value inside a key-value token.
pub const PAIR_DELIMITER: char = ':';

/// Separator between scheme and address of an endpoint.
pub const SCHEME_DELIMITER: &str = "://";

/// A scheme-qualified dial/listen target such as `tcp://localhost:5000`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NetworkEndpoint {
    /// Network scheme (`tcp`, `unix`, ...).
    pub scheme: String,
    /// Scheme-specific address, taken verbatim.
    pub address: String,
}

impl NetworkEndpoint {
    pub fn new(scheme: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            address: address.into(),
        }
    }

    /// Decode an endpoint, splitting on the first `://`.
    ///
    /// The input is not trimmed. Everything after the delimiter is the
    /// address, whitespace included; the scheme may not contain whitespace.
    pub fn decode(raw: &str) -> Result<Self, ConfigError> {
        let malformed = || ConfigError::MalformedEndpoint {
            value: raw.to_string(),
        };

        let (scheme, address) = raw.split_once(SCHEME_DELIMITER).ok_or_else(malformed)?;
        if scheme.is_empty()
            || scheme.contains(char::is_whitespace)
            || address.contains(SCHEME_DELIMITER)
        {
            return Err(malformed());
        }

        Ok(Self::new(scheme, address))
    }

    /// True for the zero value (no scheme).
    pub fn is_unset(&self) -> bool {
        self.scheme.is_empty()
    }
}

impl FromStr for NetworkEndpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for NetworkEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            return Ok(());
        }
        write!(f, "{}{}{}", self.scheme, SCHEME_DELIMITER, self.address)
    }
}

impl Serialize for NetworkEndpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered endpoints; order reflects configured priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NetworkEndpointList(Vec<NetworkEndpoint>);

impl NetworkEndpointList {
    /// Decode a comma-separated list of endpoints.
    ///
    /// Fails on the first malformed element.
    pub fn decode(raw: &str) -> Result<Self, ConfigError> {
        Self::decode_items(split_list(raw))
    }

    /// Decode already-separated items, trimming each and skipping blank ones.
    pub fn decode_items<'a, I>(items: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        items
            .into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(NetworkEndpoint::decode)
            .collect()
    }

    pub fn into_inner(self) -> Vec<NetworkEndpoint> {
        self.0
    }
}

impl Deref for NetworkEndpointList {
    type Target = [NetworkEndpoint];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<NetworkEndpoint>> for NetworkEndpointList {
    fn from(endpoints: Vec<NetworkEndpoint>) -> Self {
        Self(endpoints)
    }
}

impl FromIterator<NetworkEndpoint> for NetworkEndpointList {
    fn from_iter<T: IntoIterator<Item = NetworkEndpoint>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a NetworkEndpointList {
    type Item = &'a NetworkEndpoint;
    type IntoIter = std::slice::Iter<'a, NetworkEndpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for NetworkEndpointList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, endpoint) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", LIST_DELIMITER)?;
            }
            write!(f, "{}", endpoint)?;
        }
        Ok(())
    }
}

/// A string-to-string mapping with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyValueSet(BTreeMap<String, String>);

impl KeyValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode comma-separated `key:value` tokens, each split on its first colon.
    pub fn decode(raw: &str) -> Result<Self, ConfigError> {
        let mut set = Self::new();
        for token in split_list(raw).filter(|token| !token.trim().is_empty()) {
            let (key, value) = token
                .split_once(PAIR_DELIMITER)
                .ok_or_else(|| ConfigError::MalformedKeyValue {
                    token: token.trim().to_string(),
                })?;
            set.insert_pair(key, value)?;
        }
        Ok(set)
    }

    /// Insert one pair, trimming both halves. The key must not be blank.
    pub fn insert_pair(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::MalformedKeyValue {
                token: format!("{}{}", PAIR_DELIMITER, value.trim()),
            });
        }
        self.0.insert(key.to_string(), value.trim().to_string());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for KeyValueSet {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Display for KeyValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", LIST_DELIMITER)?;
            }
            write!(f, "{}{}{}", key, PAIR_DELIMITER, value)?;
        }
        Ok(())
    }
}

/// Decode a boolean. Blank text is `false`.
pub fn decode_flag(raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(ConfigError::TypeCoercion {
            value: other.to_string(),
            expected: "boolean",
        }),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LIST_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ErrorKind;

    #[test]
    fn test_endpoint_tcp() {
        let endpoint = NetworkEndpoint::decode("tcp://localhost:5000").unwrap();
        assert_eq!(endpoint, NetworkEndpoint::new("tcp", "localhost:5000"));
        assert_eq!(endpoint.to_string(), "tcp://localhost:5000");
    }

    #[test]
    fn test_endpoint_unix_path() {
        let endpoint: NetworkEndpoint = "unix:///var/run/auth.sock".parse().unwrap();
        assert_eq!(endpoint.scheme, "unix");
        assert_eq!(endpoint.address, "/var/run/auth.sock");
    }

    #[test]
    fn test_endpoint_rejects_missing_delimiter() {
        let err = NetworkEndpoint::decode("localhost:5000").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEndpoint);
    }

    #[test]
    fn test_endpoint_rejects_empty_scheme() {
        let err = NetworkEndpoint::decode("://localhost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEndpoint);
    }

    #[test]
    fn test_endpoint_rejects_second_delimiter() {
        let err = NetworkEndpoint::decode("tcp://a://b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEndpoint);
    }

    #[test]
    fn test_endpoint_address_is_verbatim() {
        let endpoint = NetworkEndpoint::decode("tcp:// host:1 ").unwrap();
        assert_eq!(endpoint.scheme, "tcp");
        assert_eq!(endpoint.address, " host:1 ");
        assert_eq!(endpoint.to_string(), "tcp:// host:1 ");
    }

    #[test]
    fn test_endpoint_rejects_whitespace_in_scheme() {
        for raw in [" tcp://host:1", "t cp://host:1"] {
            match NetworkEndpoint::decode(raw).unwrap_err() {
                ConfigError::MalformedEndpoint { value } => assert_eq!(value, raw),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_unset_endpoint_displays_empty() {
        assert_eq!(NetworkEndpoint::default().to_string(), "");
        assert!(NetworkEndpoint::default().is_unset());
    }

    #[test]
    fn test_endpoint_list_preserves_order() {
        let list = NetworkEndpointList::decode("tcp://localhost:5000,unix:///var/run/auth.sock")
            .unwrap();
        assert_eq!(
            list.into_inner(),
            vec![
                NetworkEndpoint::new("tcp", "localhost:5000"),
                NetworkEndpoint::new("unix", "/var/run/auth.sock"),
            ]
        );
    }

    #[test]
    fn test_endpoint_list_skips_blank_items() {
        let list = NetworkEndpointList::decode(" tcp://a:1 , ,tcp://b:2,").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], NetworkEndpoint::new("tcp", "b:2"));
        assert!(NetworkEndpointList::decode("").unwrap().is_empty());
    }

    #[test]
    fn test_endpoint_list_fails_on_first_bad_item() {
        let err = NetworkEndpointList::decode("tcp://a:1,localhost:5000,nope").unwrap_err();
        match err {
            ConfigError::MalformedEndpoint { value } => assert_eq!(value, "localhost:5000"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_key_value_decode() {
        let set = KeyValueSet::decode("a:1,b:2").unwrap();
        assert_eq!(set, KeyValueSet::from([("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_key_value_splits_on_first_colon() {
        let set = KeyValueSet::decode("path:/var/lib:data").unwrap();
        assert_eq!(set.get("path"), Some("/var/lib:data"));
    }

    #[test]
    fn test_key_value_duplicate_last_wins() {
        let set = KeyValueSet::decode("a:1,a:2").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a"), Some("2"));
    }

    #[test]
    fn test_key_value_rejects_token_without_colon() {
        let err = KeyValueSet::decode("a").unwrap_err();
        match err {
            ConfigError::MalformedKeyValue { token } => assert_eq!(token, "a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_key_value_rejects_empty_key() {
        let err = KeyValueSet::decode(":value").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKeyValue);
    }

    #[test]
    fn test_key_value_reencode_is_stable() {
        let set = KeyValueSet::decode("b:2,a:1").unwrap();
        let again = KeyValueSet::decode(&set.to_string()).unwrap();
        assert_eq!(again, KeyValueSet::from([("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_decode_flag() {
        assert!(decode_flag("true").unwrap());
        assert!(decode_flag("1").unwrap());
        assert!(!decode_flag("False").unwrap());
        assert!(!decode_flag("").unwrap());

        let err = decode_flag("yes").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);
    }
}
