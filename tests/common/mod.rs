//! Shared fixtures: one logical configuration in every source format.

#![allow(dead_code)]

use std::collections::HashMap;

use node_config::config::{
    AccessRole, AuthorityRole, BackendDescriptor, Config, KeyValueSet, LogSettings,
    NetworkEndpoint, NetworkEndpointList, TunnelRole,
};

pub const CONFIG_YAML: &str = r#"
log:
  output: console
  severity: INFO

data_dir: /tmp/data_dir
fqdn: fqdn.example.com
auth_servers: ['tcp://localhost:5000', 'unix:///var/run/auth.sock']

auth:
  enabled: true
  http_addr: 'tcp://localhost:4444'
  ssh_addr: 'tcp://localhost:5555'
  domain: a.fqdn.example.com
  token: authtoken
  secret_key: authsecret
  allowed_tokens:
    node1.a.fqdn.example.com: token1
    node2.a.fqdn.example.com: token2

  trusted_user_authorities:
    a.example.com: cert1
    b.example.com: cert2

  keys_backend:
    type: bolt
    params: {path: "/keys"}
    additional_key: somekey

  events_backend:
    type: bolt
    params: {path: "/events"}

  records_backend:
    type: bolt
    params: {path: "/records"}

ssh:
  enabled: true
  token: sshtoken
  addr: 'tcp://localhost:1234'
  shell: /bin/bash

tun:
  enabled: true
  token: tuntoken
  server_addr: 'tcp://telescope.example.com'
"#;

pub const CONFIG_TOML: &str = r#"
data_dir = "/tmp/data_dir"
fqdn = "fqdn.example.com"
auth_servers = ["tcp://localhost:5000", "unix:///var/run/auth.sock"]

[log]
output = "console"
severity = "INFO"

[auth]
enabled = true
http_addr = "tcp://localhost:4444"
ssh_addr = "tcp://localhost:5555"
domain = "a.fqdn.example.com"
token = "authtoken"
secret_key = "authsecret"
allowed_tokens = { "node1.a.fqdn.example.com" = "token1", "node2.a.fqdn.example.com" = "token2" }
trusted_user_authorities = { "a.example.com" = "cert1", "b.example.com" = "cert2" }

[auth.keys_backend]
type = "bolt"
params = { path = "/keys" }
additional_key = "somekey"

[auth.events_backend]
type = "bolt"
params = { path = "/events" }

[auth.records_backend]
type = "bolt"
params = { path = "/records" }

[ssh]
enabled = true
token = "sshtoken"
addr = "tcp://localhost:1234"
shell = "/bin/bash"

[tun]
enabled = true
token = "tuntoken"
server_addr = "tcp://telescope.example.com"
"#;

pub const ENV_VARS: &[(&str, &str)] = &[
    ("TELEPORT_LOG_OUTPUT", "console"),
    ("TELEPORT_LOG_SEVERITY", "INFO"),
    ("TELEPORT_AUTH_SERVERS", "tcp://localhost:5000,unix:///var/run/auth.sock"),
    ("TELEPORT_DATA_DIR", "/tmp/data_dir"),
    ("TELEPORT_FQDN", "fqdn.example.com"),
    ("TELEPORT_AUTH_ENABLED", "true"),
    ("TELEPORT_AUTH_HTTP_ADDR", "tcp://localhost:4444"),
    ("TELEPORT_AUTH_SSH_ADDR", "tcp://localhost:5555"),
    ("TELEPORT_AUTH_DOMAIN", "a.fqdn.example.com"),
    ("TELEPORT_AUTH_TOKEN", "authtoken"),
    ("TELEPORT_AUTH_SECRET_KEY", "authsecret"),
    (
        "TELEPORT_AUTH_ALLOWED_TOKENS",
        "node1.a.fqdn.example.com:token1,node2.a.fqdn.example.com:token2",
    ),
    (
        "TELEPORT_AUTH_TRUSTED_USER_AUTHORITIES",
        "a.example.com:cert1,b.example.com:cert2",
    ),
    ("TELEPORT_AUTH_KEYS_BACKEND_TYPE", "bolt"),
    ("TELEPORT_AUTH_KEYS_BACKEND_PARAMS", "path:/keys"),
    ("TELEPORT_AUTH_KEYS_BACKEND_ADDITIONAL_KEY", "somekey"),
    ("TELEPORT_AUTH_EVENTS_BACKEND_TYPE", "bolt"),
    ("TELEPORT_AUTH_EVENTS_BACKEND_PARAMS", "path:/events"),
    ("TELEPORT_AUTH_RECORDS_BACKEND_TYPE", "bolt"),
    ("TELEPORT_AUTH_RECORDS_BACKEND_PARAMS", "path:/records"),
    ("TELEPORT_SSH_ENABLED", "true"),
    ("TELEPORT_SSH_TOKEN", "sshtoken"),
    ("TELEPORT_SSH_ADDR", "tcp://localhost:1234"),
    ("TELEPORT_SSH_SHELL", "/bin/bash"),
    ("TELEPORT_TUN_ENABLED", "true"),
    ("TELEPORT_TUN_TOKEN", "tuntoken"),
    ("TELEPORT_TUN_SERVER_ADDR", "tcp://telescope.example.com"),
];

/// The fixture variables as a lookup map.
pub fn env_vars() -> HashMap<String, String> {
    vars(ENV_VARS)
}

pub fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The fixture variables without any `TELEPORT_TUN_*` entry.
pub fn env_vars_without_tunnel() -> HashMap<String, String> {
    let mut vars = env_vars();
    vars.retain(|name, _| !name.starts_with("TELEPORT_TUN_"));
    vars
}

fn backend(path: &str, additional_key: &str) -> BackendDescriptor {
    BackendDescriptor {
        kind: "bolt".into(),
        params: KeyValueSet::from([("path", path)]),
        additional_key: additional_key.into(),
    }
}

/// The configuration every fixture describes.
pub fn expected_config() -> Config {
    Config {
        log: LogSettings {
            output: "console".into(),
            severity: "INFO".into(),
        },
        data_dir: "/tmp/data_dir".into(),
        fqdn: "fqdn.example.com".into(),
        auth_servers: NetworkEndpointList::from(vec![
            NetworkEndpoint::new("tcp", "localhost:5000"),
            NetworkEndpoint::new("unix", "/var/run/auth.sock"),
        ]),
        auth: AuthorityRole {
            enabled: true,
            http_addr: NetworkEndpoint::new("tcp", "localhost:4444"),
            ssh_addr: NetworkEndpoint::new("tcp", "localhost:5555"),
            domain: "a.fqdn.example.com".into(),
            token: "authtoken".into(),
            secret_key: "authsecret".into(),
            allowed_tokens: KeyValueSet::from([
                ("node1.a.fqdn.example.com", "token1"),
                ("node2.a.fqdn.example.com", "token2"),
            ]),
            trusted_user_authorities: KeyValueSet::from([
                ("a.example.com", "cert1"),
                ("b.example.com", "cert2"),
            ]),
            keys_backend: backend("/keys", "somekey"),
            events_backend: backend("/events", ""),
            records_backend: backend("/records", ""),
        },
        ssh: AccessRole {
            enabled: true,
            addr: NetworkEndpoint::new("tcp", "localhost:1234"),
            token: "sshtoken".into(),
            shell: "/bin/bash".into(),
        },
        tun: TunnelRole {
            enabled: true,
            server_addr: NetworkEndpoint::new("tcp", "telescope.example.com"),
            token: "tuntoken".into(),
        },
    }
}
