//! Traffic overlay merger
//!
//! Folds an externally supplied service-mesh graph into the topology model
//! as a second, distinctly-typed edge set. Mesh nodes are matched to
//! internal graph nodes by workload identity (equality of
//! `(namespace, workload name)`), and every mesh edge whose both endpoints
//! resolve becomes a `traffic` edge carrying the raw rates as its payload.
//!
//! The merger never mutates or removes a `connects-to` edge, even when a
//! traffic edge lands on the same pair of nodes: both edge types coexist.
//! Mesh edges with an unresolved endpoint are discarded whole; no partial
//! edge is created.

use crate::graph::{Edge, EdgeType, TopologyGraph};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::trace;

/// The external mesh-graph snapshot shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshGraph {
    /// Mesh nodes.
    #[serde(default)]
    pub nodes: Vec<MeshNode>,
    /// Mesh edges.
    #[serde(default)]
    pub edges: Vec<MeshEdge>,
}

/// One mesh node, wrapping its payload the way the mesh API does.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshNode {
    /// Node payload.
    pub data: MeshNodeData,
}

/// Mesh node payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshNodeData {
    /// Mesh-internal node id, referenced by mesh edges.
    pub id: String,
    /// Workload name this mesh node observed.
    #[serde(default)]
    pub workload: String,
    /// Namespace of the observed workload.
    #[serde(default)]
    pub namespace: String,
    /// Application name as reported by the mesh, unused for matching.
    #[serde(default)]
    pub app: Option<String>,
}

/// One mesh edge, wrapping its payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshEdge {
    /// Edge payload.
    pub data: MeshEdgeData,
}

/// Mesh edge payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeshEdgeData {
    /// Mesh-internal id of the source node.
    pub source: String,
    /// Mesh-internal id of the target node.
    pub target: String,
    /// Raw traffic rates, carried through untouched.
    #[serde(default)]
    pub traffic: serde_json::Value,
}

/// Append `traffic` edges for every mesh edge whose endpoints both resolve
/// to internal graph nodes.
pub fn merge_traffic_overlay(graph: &mut TopologyGraph, mesh: &MeshGraph) {
    // Mesh-node id → internal node id, matched by (namespace, workload).
    let lookup: HashMap<&str, &str> = mesh
        .nodes
        .iter()
        .filter_map(|mesh_node| {
            graph
                .nodes
                .iter()
                .find(|node| {
                    !node.group
                        && node.label == mesh_node.data.workload
                        && node
                            .resource
                            .as_ref()
                            .is_some_and(|r| r.namespace() == mesh_node.data.namespace)
                })
                .map(|node| (mesh_node.data.id.as_str(), node.id.as_str()))
        })
        .collect();

    let mut traffic_edges = Vec::new();
    for mesh_edge in &mesh.edges {
        let (Some(source), Some(target)) = (
            lookup.get(mesh_edge.data.source.as_str()),
            lookup.get(mesh_edge.data.target.as_str()),
        ) else {
            trace!(
                source = %mesh_edge.data.source,
                target = %mesh_edge.data.target,
                "mesh edge endpoint unresolved, discarded"
            );
            continue;
        };

        let edge = Edge::new(EdgeType::Traffic, *source, *target)
            .with_data(mesh_edge.data.traffic.clone());
        let already_present = graph
            .edges
            .iter()
            .chain(traffic_edges.iter())
            .any(|e| e.id == edge.id && e.edge_type == EdgeType::Traffic);
        if !already_present {
            traffic_edges.push(edge);
        }
    }
    graph.edges.extend(traffic_edges);
}
