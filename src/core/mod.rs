//! Core types for the topology engine
//!
//! This module holds the foundations shared by every stage of the pipeline:
//! the typed error family and, re-exported for convenience, the result alias
//! used at engine boundaries.
//!
//! # Error Philosophy
//!
//! Degraded cluster input is normal operation for this engine: a malformed
//! connection annotation or a workload missing its uid simply yields a
//! smaller graph. [`TopologyError`] is reserved for contract violations:
//! bugs in a depicter or filterer supplied by the caller, or a structural
//! invariant broken by hand-mutation of a graph.

pub mod error;

pub use error::TopologyError;

/// Result alias for engine operations that can hit a contract violation.
pub type Result<T> = std::result::Result<T, TopologyError>;
