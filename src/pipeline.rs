//! Full build pipeline
//!
//! Chains the stages in their fixed order: base model (with depicters) →
//! operator-backed service reconciliation → optional traffic overlay. The
//! result is the stable graph the filter engine is then re-run against on
//! every filter change.
//!
//! [`TopologyParams`] is the composition surface: the caller assembles the
//! ordered depicter and filterer lists and the installed-operator
//! descriptors once, then reuses them for every rebuild. There is no
//! module-level registration anywhere in the engine.

use crate::builder::{build_base_model, Depicter};
use crate::core::TopologyError;
use crate::extensions::serverless::is_serverless_backed;
use crate::filters::{apply_display_filters, DisplayFilter, Filterer, ALL_APPLICATIONS};
use crate::graph::TopologyGraph;
use crate::overlay::{merge_traffic_overlay, MeshGraph};
use crate::reconciler::{reconcile_operator_groups, OperatorDescriptor};
use crate::resource::{Resource, ResourceSnapshot};
use std::sync::Arc;
use tracing::debug;

/// Composition-time parameters for the engine.
///
/// Assembled once by the caller; every field is an explicit ordered list
/// rather than a mutable registry.
pub struct TopologyParams {
    /// Namespace the graph is built for.
    pub namespace: String,
    /// Currently selected application, or [`ALL_APPLICATIONS`].
    pub selected_application: String,
    /// Ordered depicter list; first matching depicter wins.
    pub depicters: Vec<Arc<dyn Depicter>>,
    /// Ordered filterer list, run last by the filter engine.
    pub filterers: Vec<Filterer>,
    /// Installed operator descriptors for the reconciler.
    pub operators: Vec<OperatorDescriptor>,
}

impl TopologyParams {
    /// Parameters for a namespace with no extensions and no operators.
    #[must_use]
    pub fn for_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            selected_application: ALL_APPLICATIONS.to_string(),
            depicters: Vec::new(),
            filterers: Vec::new(),
            operators: Vec::new(),
        }
    }
}

/// Build the stable topology graph from one resource snapshot.
///
/// Runs the base builder, the operator reconciler, and (when a mesh
/// snapshot is supplied) the traffic overlay, then checks the structural
/// invariants. The returned graph is what the filter engine operates on.
///
/// # Errors
///
/// Returns [`TopologyError::DepicterFailed`] when an extension's model
/// getter fails, or an invariant-violation variant if a buggy extension
/// produced an inconsistent fragment.
pub async fn build_topology(
    params: &TopologyParams,
    snapshot: &ResourceSnapshot,
    workloads: &[Resource],
    mesh: Option<&MeshGraph>,
) -> Result<TopologyGraph, TopologyError> {
    let mut graph =
        build_base_model(&params.namespace, snapshot, workloads, &params.depicters).await?;
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "base model assembled"
    );

    reconcile_operator_groups(&mut graph, &params.operators, &is_serverless_backed);

    if let Some(mesh) = mesh {
        merge_traffic_overlay(&mut graph, mesh);
    }

    graph.validate()?;
    Ok(graph)
}

/// Re-derive visibility/collapse state for the current filters.
///
/// Thin composition wrapper over
/// [`apply_display_filters`](crate::filters::apply_display_filters) that
/// pulls the selected application and filterer list from `params`.
///
/// # Errors
///
/// Returns [`TopologyError::FiltererContract`] when a filterer misbehaves.
pub fn filter_topology(
    params: &TopologyParams,
    graph: &TopologyGraph,
    filters: &[DisplayFilter],
) -> Result<TopologyGraph, TopologyError> {
    apply_display_filters(graph, filters, &params.selected_application, &params.filterers)
}
