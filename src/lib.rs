//! Topograph - topology graph construction and reconciliation engine
//!
//! Turns heterogeneous, independently-loaded collections of cluster
//! resources (workloads, builds, routes, services, custom operator
//! resources) into a single consistent visual graph of nodes, edges, and
//! groups, then re-derives the visibility/collapse state whenever display
//! filters change, without ever losing or duplicating a node.
//!
//! # Architecture Overview
//!
//! The engine is a fixed pipeline of pure stages over read-only snapshots:
//!
//! ```text
//! resource snapshot
//!     └── base model builder (+ depicter registry)   → raw graph
//!             └── operator-backed service reconciler → grouped graph
//!                     └── traffic overlay merger     → stable graph
//!                             └── filter engine      → render-ready graph
//! ```
//!
//! Rebuilds are wholesale: a new snapshot in, a new graph out. The filter
//! engine is re-run on every filter change against the stable graph and
//! mutates only `visible`/`collapsed` flags. There is no incremental update
//! path and no shared mutable state; everything the renderer consumes is a
//! freshly constructed value.
//!
//! ## Key Guarantees
//!
//! - **Unique ids**: every node id appears once per graph.
//! - **Exclusive ownership**: a node belongs to at most one group's
//!   `children`; re-parenting removes the old reference first.
//! - **No dangling references**: group children and edge endpoints always
//!   resolve; unresolvable ones are dropped during assembly, not kept.
//! - **Idempotence**: rebuilding from an unchanged snapshot yields a
//!   structurally equal graph, so re-renders do not thrash.
//!
//! # Core Modules
//!
//! - [`resource`] - Cluster resource model and the snapshot input contract
//! - [`graph`] - Node/edge/graph data model, group merge, invariant checks
//! - [`builder`] - Base model builder and the depicter extension seam
//! - [`reconciler`] - Operator-backed service grouping post-pass
//! - [`overlay`] - Service-mesh traffic edge overlay
//! - [`filters`] - Display filter and visibility/collapse engine
//! - [`extensions`] - Bundled serverless depicter and operator filterer
//! - [`pipeline`] - Stage chaining and composition parameters
//!
//! # Example
//!
//! ```rust,no_run
//! use topograph::filters::{DisplayFilter, EXPAND_GROUPS_FILTER_ID};
//! use topograph::pipeline::{build_topology, filter_topology, TopologyParams};
//! use topograph::resource::ResourceSnapshot;
//!
//! # async fn example() -> Result<(), topograph::core::TopologyError> {
//! let params = TopologyParams::for_namespace("shop");
//! let snapshot = ResourceSnapshot::new();
//! let workloads = Vec::new();
//!
//! // Full rebuild on every snapshot change.
//! let graph = build_topology(&params, &snapshot, &workloads, None).await?;
//!
//! // Cheap re-derivation on every filter change.
//! let filters = vec![DisplayFilter::expand(EXPAND_GROUPS_FILTER_ID, false)];
//! let rendered = filter_topology(&params, &graph, &filters)?;
//! # let _ = rendered;
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod core;
pub mod graph;
pub mod resource;

// Pipeline stages
pub mod builder;
pub mod overlay;
pub mod reconciler;

// Display state
pub mod filters;

// Extension seams and composition
pub mod extensions;
pub mod pipeline;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::core::TopologyError;
pub use crate::graph::{Edge, EdgeType, NodeType, TopologyGraph, TopologyNode};
pub use crate::pipeline::{build_topology, filter_topology, TopologyParams};
