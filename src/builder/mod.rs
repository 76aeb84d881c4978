//! Base model builder
//!
//! Converts the pre-flattened workload list plus its build/route/service
//! context into the raw topology graph: one workload node per unclaimed
//! workload resource, application groups derived from the `part-of` label,
//! and connects-to edges parsed from connection annotations.
//!
//! Depicters run first: every workload claimed by one is handed to that
//! depicter's async model getter, and the resulting fragments are merged
//! into the same shared graph as the default nodes. The whole depicter set
//! is awaited together, so the build resolves once, not incrementally.
//!
//! # Merge Rules
//!
//! - A fragment node is added only when no existing node shares its id;
//!   fragment groups route through [`merge_group`].
//! - A *default* workload node is additionally vetoed when any registered
//!   depicter claims its resource against the graph built so far.
//! - Edges are kept only when both endpoints resolve to placed nodes, and
//!   group children referencing unplaced ids are pruned before the graph is
//!   returned. Both drops are silent no-ops, not errors.

pub mod depicter;
pub mod workload;

pub use depicter::{Depicter, any_claims_placed, claiming_depicter};
pub use workload::{connects_to_edges, workload_node};

use crate::core::TopologyError;
use crate::graph::{merge_group, GraphFragment, TopologyGraph, TopologyNode};
use crate::resource::{Resource, ResourceSnapshot};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Build the raw topology graph for one namespace.
///
/// `workloads` is the pre-flattened list of concrete workload instances
/// across all watched workload kinds; `depicters` is the ordered extension
/// list (first matching depicter wins, otherwise the default workload node
/// is built).
///
/// # Errors
///
/// Returns [`TopologyError::DepicterFailed`] when a claimed resource's
/// model getter fails: extension failures are programming errors, unlike
/// degraded input, which is skipped silently.
pub async fn build_base_model(
    namespace: &str,
    snapshot: &ResourceSnapshot,
    workloads: &[Resource],
    depicters: &[Arc<dyn Depicter>],
) -> Result<TopologyGraph, TopologyError> {
    let mut graph = TopologyGraph::new();

    let in_scope: Vec<&Resource> = workloads
        .iter()
        .filter(|w| {
            let keep = namespace.is_empty() || w.namespace() == namespace;
            if !keep {
                trace!(workload = %w.name(), namespace = %w.namespace(), "outside namespace, skipped");
            }
            keep
        })
        .collect();

    // Depicter pass: first matching depicter claims the resource; the full
    // set of model getters is awaited together.
    let claimed: Vec<(&Resource, &Arc<dyn Depicter>)> = in_scope
        .iter()
        .copied()
        .filter_map(|w| claiming_depicter(depicters, w).map(|d| (w, d)))
        .collect();

    let models = join_all(claimed.iter().map(|(resource, depicter)| async move {
        depicter
            .model(resource, snapshot)
            .await
            .map_err(|err| TopologyError::DepicterFailed {
                depicter: depicter.name().to_string(),
                reason: format!("{err:#}"),
            })
    }))
    .await;

    for model in models {
        merge_fragment(&mut graph, model?);
    }

    // Default pass: unclaimed workloads become generic workload nodes,
    // grouped by their part-of label.
    for resource in in_scope.iter().copied() {
        if claiming_depicter(depicters, resource).is_some() {
            continue;
        }
        let Some(node) = workload_node(resource, snapshot) else {
            continue;
        };
        if graph.contains_node(&node.id) {
            trace!(id = %node.id, "node already placed, default node skipped");
            continue;
        }
        if any_claims_placed(depicters, resource, &graph) {
            debug!(id = %node.id, "depicter vetoed default node");
            continue;
        }

        let node_id = node.id.clone();
        graph.nodes.push(node);

        if let Some(app) = resource.part_of() {
            let mut group = TopologyNode::application_group(app);
            group.children.push(node_id);
            if let Some(data) = group.group_data_mut() {
                data.group_resources.push(resource.clone());
            }
            merge_group(group, &mut graph.nodes);
        }
    }

    // Edge pass: connection annotations, resolved against the full
    // workload list, kept only when both endpoints were actually placed.
    for resource in in_scope.iter().copied() {
        for edge in connects_to_edges(resource, workloads) {
            if !graph.contains_node(&edge.source) || !graph.contains_node(&edge.target) {
                trace!(edge = %edge.id, "endpoint not placed in graph, edge dropped");
                continue;
            }
            if graph.edges.iter().any(|e| e.id == edge.id && e.edge_type == edge.edge_type) {
                continue;
            }
            graph.edges.push(edge);
        }
    }

    prune_unresolved_children(&mut graph);
    Ok(graph)
}

/// Merge a depicter-produced fragment into the shared graph. Groups route
/// through [`merge_group`]; plain nodes are id-deduplicated.
pub fn merge_fragment(graph: &mut TopologyGraph, fragment: GraphFragment) {
    for node in fragment.nodes {
        if node.group {
            merge_group(node, &mut graph.nodes);
        } else if graph.contains_node(&node.id) {
            trace!(id = %node.id, "fragment node already placed, skipped");
        } else {
            graph.nodes.push(node);
        }
    }

    for edge in fragment.edges {
        if graph.edges.iter().any(|e| e.id == edge.id && e.edge_type == edge.edge_type) {
            continue;
        }
        graph.edges.push(edge);
    }
}

/// Strip child and edge references that never resolved to a placed node.
/// Fragment edges may arrive before their endpoints, so this runs once at
/// the end of assembly.
fn prune_unresolved_children(graph: &mut TopologyGraph) {
    let ids: HashSet<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
    for node in &mut graph.nodes {
        node.children.retain(|child| {
            let placed = ids.contains(child);
            if !placed {
                debug!(parent = %node.id, child = %child, "child never placed, reference dropped");
            }
            placed
        });
    }
    graph.edges.retain(|edge| {
        let resolved = ids.contains(&edge.source) && ids.contains(&edge.target);
        if !resolved {
            trace!(edge = %edge.id, "edge endpoint never placed, edge dropped");
        }
        resolved
    });
}
