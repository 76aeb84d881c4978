//! Error handling for the topology engine
//!
//! The engine distinguishes two failure families:
//! 1. **Degraded input**: malformed annotations, missing uids, unresolvable
//!    edge endpoints or group children. These are recovered locally (the
//!    offending resource/edge is skipped) and never surface as an error.
//! 2. **Caller contract violations**: a filterer reporting a filter id that
//!    was never supplied, a depicter model getter failing, or a produced
//!    graph breaking a structural invariant. These are programming errors
//!    and are raised synchronously as [`TopologyError`] so they are caught
//!    in development and testing rather than swallowed.
//!
//! The invariant-violation variants (`DuplicateNodeId`, `SharedChild`,
//! `MissingGroupChild`, `DanglingEdge`) are produced by
//! [`TopologyGraph::validate`](crate::graph::TopologyGraph::validate) and
//! name the exact structural rule that was broken.

use thiserror::Error;

/// The main error type for topology engine operations.
///
/// Every variant represents a caller contract violation or a structural
/// invariant failure. Degraded input never produces one of these; it is
/// logged and skipped instead.
#[derive(Error, Debug)]
pub enum TopologyError {
    /// Two nodes in the graph share the same id.
    ///
    /// Node ids are resource uids (or synthetic group ids) and must be
    /// unique within one graph.
    #[error("duplicate node id in graph: {id}")]
    DuplicateNodeId {
        /// The id that appears more than once
        id: String,
    },

    /// A node id appears in the `children` of two distinct groups.
    ///
    /// Group ownership is exclusive; re-parenting must remove the old
    /// parent's reference before adding the new one.
    #[error("node '{child}' is claimed by two groups: '{first}' and '{second}'")]
    SharedChild {
        /// The doubly-owned child id
        child: String,
        /// Id of the group that claimed the child first
        first: String,
        /// Id of the second group claiming the same child
        second: String,
    },

    /// A group's `children` references an id absent from the graph.
    #[error("group '{group}' references missing child '{child}'")]
    MissingGroupChild {
        /// Id of the group holding the stale reference
        group: String,
        /// The child id that does not resolve to any node
        child: String,
    },

    /// An edge references a node id absent from the graph.
    ///
    /// The builder drops unresolvable edges during assembly, so this only
    /// fires when a caller mutates the graph by hand.
    #[error("edge '{edge}' references missing node '{node}'")]
    DanglingEdge {
        /// Id of the offending edge
        edge: String,
        /// The endpoint id that does not resolve
        node: String,
    },

    /// A filterer callback reported a filter id that was not in the
    /// supplied filter list.
    #[error("filterer '{filterer}' reported unknown filter id '{filter_id}'")]
    FiltererContract {
        /// Name of the offending filterer
        filterer: String,
        /// The filter id it claimed to have applied
        filter_id: String,
    },

    /// A depicter's model getter returned an error.
    ///
    /// Depicters are composition-time extensions; a failing model getter is
    /// a bug in the extension, not degraded cluster input.
    #[error("depicter '{depicter}' failed to produce a model: {reason}")]
    DepicterFailed {
        /// Name of the offending depicter
        depicter: String,
        /// Rendered error chain from the model getter
        reason: String,
    },
}
