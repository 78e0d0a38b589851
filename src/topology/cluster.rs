//! Current and trusted clusters as seen from this node.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::config::Config;

/// Error raised by a remote site handle.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to list nodes of cluster {cluster}: {reason}")]
    NodeListing { cluster: String, reason: String },
}

/// A connected remote site, as exposed by the tunnel subsystem.
pub trait RemoteSite {
    fn name(&self) -> &str;
    fn last_connected(&self) -> SystemTime;
    fn status(&self) -> &str;
    /// Number of nodes registered in the site.
    fn node_count(&self) -> Result<usize, TopologyError>;
}

/// Summary of one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub name: String,
    #[serde(serialize_with = "unix_seconds")]
    pub last_connected: SystemTime,
    pub status: String,
    #[serde(rename = "nodeCount")]
    pub node_count: usize,
}

/// The local cluster and every other cluster it trusts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailableClusters {
    /// Site named after the local cluster, if connected.
    pub current: Option<Cluster>,
    /// All other sites, sorted by name.
    pub trusted: Vec<Cluster>,
}

impl AvailableClusters {
    /// Partition `sites` into the current cluster and trusted ones.
    pub fn new<'a, S, I>(current_name: &str, sites: I) -> Result<Self, TopologyError>
    where
        S: RemoteSite + ?Sized + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let mut out = AvailableClusters::default();
        for site in sites {
            let cluster = Cluster {
                name: site.name().to_string(),
                last_connected: site.last_connected(),
                status: site.status().to_string(),
                node_count: site.node_count()?,
            };

            if cluster.name == current_name {
                out.current = Some(cluster);
            } else {
                out.trusted.push(cluster);
            }
        }

        out.trusted.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    /// Build the view for a node, naming the local cluster by its authority domain.
    pub fn for_node<'a, S, I>(config: &Config, sites: I) -> Result<Self, TopologyError>
    where
        S: RemoteSite + ?Sized + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        Self::new(&config.auth.domain, sites)
    }
}

fn unix_seconds<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    serializer.serialize_u64(secs)
}
