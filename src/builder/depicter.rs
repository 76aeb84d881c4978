//! Depicter registry
//!
//! Depicters let optional domain extensions (serverless, service binding,
//! operator tooling) claim a resource before the builder turns it into a
//! generic workload node. A depicter is a claim predicate plus an async
//! model getter producing the nodes/edges that stand in for the default
//! node; getters may fetch supplementary data, so the builder awaits the
//! whole set before assembling the final model.
//!
//! Registration is an explicit ordered list assembled by the caller at
//! composition time and passed into the builder as a parameter; there is
//! no module-level mutable registry. Scan order is the priority order:
//! the first depicter whose predicate matches handles the resource, and
//! later depicters are not consulted.

use crate::graph::{GraphFragment, TopologyGraph};
use crate::resource::{Resource, ResourceSnapshot};
use async_trait::async_trait;
use std::sync::Arc;

/// An extension that intercepts resources before default node creation.
#[async_trait]
pub trait Depicter: Send + Sync {
    /// Stable name, used in diagnostics and error reporting.
    fn name(&self) -> &'static str;

    /// Whether this depicter claims `resource` instead of letting it become
    /// a generic workload node.
    fn claims(&self, resource: &Resource) -> bool;

    /// De-duplication check used while accumulating nodes into the shared
    /// graph: whether this depicter claims `resource` given what has
    /// already been placed. Defaults to the plain claim predicate.
    fn claims_placed(&self, resource: &Resource, graph: &TopologyGraph) -> bool {
        let _ = graph;
        self.claims(resource)
    }

    /// Convert a claimed resource into the graph fragment that represents
    /// it. Runs once per claimed resource; all getters for one build are
    /// awaited together.
    async fn model(
        &self,
        resource: &Resource,
        snapshot: &ResourceSnapshot,
    ) -> anyhow::Result<GraphFragment>;
}

/// The first depicter in scan order whose predicate claims `resource`.
#[must_use]
pub fn claiming_depicter<'a>(
    depicters: &'a [Arc<dyn Depicter>],
    resource: &Resource,
) -> Option<&'a Arc<dyn Depicter>> {
    depicters.iter().find(|d| d.claims(resource))
}

/// Whether any depicter claims `resource` against the already-built graph.
#[must_use]
pub fn any_claims_placed(
    depicters: &[Arc<dyn Depicter>],
    resource: &Resource,
    graph: &TopologyGraph,
) -> bool {
    depicters.iter().any(|d| d.claims_placed(resource, graph))
}
