//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a node.
//! Every struct declares its fields once, in its [`Schema`] impl; the key
//! names there are the document keys and, upper-cased, the variable names.

use serde::Serialize;

use crate::config::error::ConfigError;
use crate::config::types::{KeyValueSet, NetworkEndpoint, NetworkEndpointList};
use crate::config::visit::{Leaf, Schema, Visitor};

/// Root configuration for a cluster node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Logging settings.
    pub log: LogSettings,

    /// Directory holding the node's local state.
    pub data_dir: String,

    /// Fully qualified domain name of this node.
    pub fqdn: String,

    /// Authority servers to dial, in priority order.
    pub auth_servers: NetworkEndpointList,

    /// Authority role.
    pub auth: AuthorityRole,

    /// Access (SSH) role.
    pub ssh: AccessRole,

    /// Tunnel role.
    pub tun: TunnelRole,
}

impl Schema for Config {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError> {
        visitor.section("log", &mut self.log)?;
        visitor.leaf("data_dir", Leaf::Text(&mut self.data_dir))?;
        visitor.leaf("fqdn", Leaf::Text(&mut self.fqdn))?;
        visitor.leaf("auth_servers", Leaf::Endpoints(&mut self.auth_servers))?;
        visitor.section("auth", &mut self.auth)?;
        visitor.section("ssh", &mut self.ssh)?;
        visitor.section("tun", &mut self.tun)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    /// Where log lines go (`console`, `stderr`, `stdout`).
    pub output: String,

    /// Minimum severity (`DEBUG`, `INFO`, `WARN`, ...).
    pub severity: String,
}

impl Schema for LogSettings {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError> {
        visitor.leaf("output", Leaf::Text(&mut self.output))?;
        visitor.leaf("severity", Leaf::Text(&mut self.severity))
    }
}

/// Authority role: issues certificates and keeps cluster state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorityRole {
    pub enabled: bool,

    /// Address of the HTTP API.
    pub http_addr: NetworkEndpoint,

    /// Address of the SSH endpoint.
    pub ssh_addr: NetworkEndpoint,

    /// Domain the authority is responsible for.
    pub domain: String,

    pub token: String,

    pub secret_key: String,

    /// Node name -> provisioning token.
    pub allowed_tokens: KeyValueSet,

    /// Authority name -> certificate.
    pub trusted_user_authorities: KeyValueSet,

    pub keys_backend: BackendDescriptor,

    pub events_backend: BackendDescriptor,

    pub records_backend: BackendDescriptor,
}

impl Schema for AuthorityRole {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError> {
        visitor.leaf("enabled", Leaf::Flag(&mut self.enabled))?;
        visitor.leaf("http_addr", Leaf::Endpoint(&mut self.http_addr))?;
        visitor.leaf("ssh_addr", Leaf::Endpoint(&mut self.ssh_addr))?;
        visitor.leaf("domain", Leaf::Text(&mut self.domain))?;
        visitor.leaf("token", Leaf::Text(&mut self.token))?;
        visitor.leaf("secret_key", Leaf::Text(&mut self.secret_key))?;
        visitor.leaf("allowed_tokens", Leaf::Pairs(&mut self.allowed_tokens))?;
        visitor.leaf(
            "trusted_user_authorities",
            Leaf::Pairs(&mut self.trusted_user_authorities),
        )?;
        visitor.section("keys_backend", &mut self.keys_backend)?;
        visitor.section("events_backend", &mut self.events_backend)?;
        visitor.section("records_backend", &mut self.records_backend)
    }
}

/// Access role: serves SSH sessions on this node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessRole {
    pub enabled: bool,

    /// Listen address.
    pub addr: NetworkEndpoint,

    pub token: String,

    /// Login shell for sessions.
    pub shell: String,
}

impl Schema for AccessRole {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError> {
        visitor.leaf("enabled", Leaf::Flag(&mut self.enabled))?;
        visitor.leaf("token", Leaf::Text(&mut self.token))?;
        visitor.leaf("addr", Leaf::Endpoint(&mut self.addr))?;
        visitor.leaf("shell", Leaf::Text(&mut self.shell))
    }
}

/// Tunnel role: keeps a reverse tunnel open to a remote server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TunnelRole {
    pub enabled: bool,

    /// Tunnel server to dial.
    pub server_addr: NetworkEndpoint,

    pub token: String,
}

impl Schema for TunnelRole {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError> {
        visitor.leaf("enabled", Leaf::Flag(&mut self.enabled))?;
        visitor.leaf("token", Leaf::Text(&mut self.token))?;
        visitor.leaf("server_addr", Leaf::Endpoint(&mut self.server_addr))
    }
}

/// A pluggable storage or event backend.
///
/// The same shape serves the keys, events and records backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackendDescriptor {
    /// Backend implementation name (document key `type`).
    #[serde(rename = "type")]
    pub kind: String,

    /// Implementation-specific parameters.
    pub params: KeyValueSet,

    /// Optional extra key; empty when not configured.
    pub additional_key: String,
}

impl Schema for BackendDescriptor {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError> {
        visitor.leaf("type", Leaf::Text(&mut self.kind))?;
        visitor.leaf("params", Leaf::Pairs(&mut self.params))?;
        visitor.leaf("additional_key", Leaf::Text(&mut self.additional_key))
    }
}
