//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Config.log (output, severity)
//!     → logging.rs (subscriber + filter)
//!     → structured events from reloads and swaps that follow
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted messages where it matters
//! - Installed once, from the decoded configuration; the initial load runs
//!   before any subscriber exists, so its own events are not emitted

pub mod logging;
