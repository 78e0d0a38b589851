//! Cluster topology view.
//!
//! # Data Flow
//! ```text
//! Config (own cluster name) + connected remote sites
//!     → cluster.rs (node counts, partition by name, sort)
//!     → AvailableClusters (serialized for user-facing APIs)
//! ```
//!
//! # Design Decisions
//! - Pure aggregation: no parsing, no validation
//! - Any site failing to report its nodes fails the whole view

pub mod cluster;

pub use cluster::{AvailableClusters, Cluster, RemoteSite, TopologyError};
