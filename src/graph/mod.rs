//! Topology graph data model
//!
//! This module defines the output shape of the engine: [`TopologyNode`],
//! [`Edge`], and the containing [`TopologyGraph`], plus the structural
//! invariant checker the rest of the pipeline relies on.
//!
//! # Invariants
//!
//! After every build and after every filter pass the graph satisfies:
//! 1. Every node id is unique.
//! 2. A node appears in at most one group's `children` (exclusive ownership).
//! 3. Group `children` never reference an id absent from the node list.
//! 4. Edges only reference node ids present in the graph.
//! 5. Rebuilding from an unchanged snapshot yields a structurally equal
//!    graph.
//!
//! [`TopologyGraph::validate`] checks 1–4 and returns the exact violated
//! rule as a [`TopologyError`]; idempotence (5) is a property of the pure
//! build functions and is covered by the integration suite.
//!
//! # Node Shape
//!
//! Nodes are a single struct with a mandatory [`NodeType`] discriminant
//! rather than a trait object: every pipeline stage pattern-matches on the
//! discriminant, and the renderer consumes a uniform serialized shape.
//! Variant-specific payloads live behind the [`NodeData`] tagged union so
//! extensions can attach their own data without widening the node struct.

pub mod merge;

pub use merge::merge_group;

use crate::core::TopologyError;
use crate::resource::Resource;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Default width of a workload node, in layout units.
pub const NODE_WIDTH: f64 = 104.0;
/// Default height of a workload node, in layout units.
pub const NODE_HEIGHT: f64 = 104.0;
/// Default width of a group node.
pub const GROUP_WIDTH: f64 = 300.0;
/// Default height of a group node.
pub const GROUP_HEIGHT: f64 = 180.0;

/// Icon name used when nothing better can be inferred for a node.
pub const DEFAULT_ICON: &str = "default";

/// Prefix for application group ids, keeping them disjoint from resource
/// uids.
pub const GROUP_ID_PREFIX: &str = "group:";

/// Node discriminant. Every node carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    /// A concrete workload instance (deployment-like object, pod, job).
    Workload,
    /// A visual grouping of workloads sharing a `part-of` label value.
    ApplicationGroup,
    /// A synthetic grouping of resources owned by one operator release.
    OperatorBackedService,
    /// An event-source fan-in node contributed by the serverless depicter.
    EventSource,
}

/// Edge discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    /// Derived from a workload's connection annotation.
    ConnectsTo,
    /// Derived from an externally supplied service-mesh graph.
    Traffic,
    /// Derived from a service-binding custom resource.
    ServiceBinding,
    /// Derived from an eventing subscription/trigger.
    EventPubSub,
}

/// Display data derived for a workload node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkloadData {
    /// Deep link to the workload's source for in-place editing, when the
    /// VCS annotations allow one to be derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    /// Raw source repository URI from the VCS annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_uri: Option<String>,
    /// Icon name inferred from runtime/name labels.
    pub icon: String,
    /// Whether this workload is a serverless resource.
    pub serverless: bool,
}

/// Display data carried by group nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupData {
    /// Icon for the group badge (operator-backed groups resolve one).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// The underlying resources this group represents, for roll-up display
    /// when the group renders collapsed.
    pub group_resources: Vec<Resource>,
}

/// Variant-specific node payload, keyed by the node discriminant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeData {
    /// Payload of [`NodeType::Workload`] nodes.
    Workload(WorkloadData),
    /// Payload of group-shaped nodes.
    Group(GroupData),
    /// Opaque payload attached by a depicter-produced extension node.
    Extension(serde_json::Value),
}

/// Secondary resource context attached to a workload node: the builds,
/// routes, services, and alerts whose labels reference the workload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecondaryResources {
    /// Builds producing this workload's image.
    pub builds: Vec<Resource>,
    /// Routes exposing this workload.
    pub routes: Vec<Resource>,
    /// Services selecting this workload.
    pub services: Vec<Resource>,
    /// Firing monitoring alerts scoped to this workload.
    pub alerts: Vec<Resource>,
}

/// One node of the topology graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyNode {
    /// Unique id: the resource uid for workloads, a synthetic id for groups.
    pub id: String,
    /// Node discriminant.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Display label.
    pub label: String,
    /// Whether this node is group-shaped (may own children).
    pub group: bool,
    /// Whether the node currently renders. Only the filter engine writes
    /// this after assembly.
    pub visible: bool,
    /// Whether a group renders as a single rolled-up icon. Only meaningful
    /// on group-shaped nodes.
    pub collapsed: bool,
    /// Ordered child node ids. Exclusive ownership: an id appears in at
    /// most one node's children across the whole graph.
    pub children: Vec<String>,
    /// Layout hint.
    pub width: f64,
    /// Layout hint.
    pub height: f64,
    /// The source resource this node represents, absent on synthetic
    /// groups derived from a bare label value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    /// Secondary resource context (builds/routes/services).
    pub resources: SecondaryResources,
    /// Variant-specific payload.
    pub data: NodeData,
}

impl TopologyNode {
    /// Build a workload node with default dimensions and visibility.
    #[must_use]
    pub fn workload(id: impl Into<String>, label: impl Into<String>, resource: Resource) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::Workload,
            label: label.into(),
            group: false,
            visible: true,
            collapsed: false,
            children: Vec::new(),
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
            resource: Some(resource),
            resources: SecondaryResources::default(),
            data: NodeData::Workload(WorkloadData {
                icon: DEFAULT_ICON.to_string(),
                ..WorkloadData::default()
            }),
        }
    }

    /// Build an application group node for a `part-of` label value.
    #[must_use]
    pub fn application_group(name: &str) -> Self {
        Self {
            id: application_group_id(name),
            node_type: NodeType::ApplicationGroup,
            label: name.to_string(),
            group: true,
            visible: true,
            collapsed: false,
            children: Vec::new(),
            width: GROUP_WIDTH,
            height: GROUP_HEIGHT,
            resource: None,
            resources: SecondaryResources::default(),
            data: NodeData::Group(GroupData::default()),
        }
    }

    /// Build an operator-backed service group node.
    #[must_use]
    pub fn operator_group(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::OperatorBackedService,
            label: label.into(),
            group: true,
            visible: true,
            collapsed: false,
            children: Vec::new(),
            width: GROUP_WIDTH,
            height: GROUP_HEIGHT,
            resource: None,
            resources: SecondaryResources::default(),
            data: NodeData::Group(GroupData::default()),
        }
    }

    /// The group payload, when this node carries one.
    #[must_use]
    pub fn group_data(&self) -> Option<&GroupData> {
        match &self.data {
            NodeData::Group(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable group payload access.
    pub fn group_data_mut(&mut self) -> Option<&mut GroupData> {
        match &mut self.data {
            NodeData::Group(data) => Some(data),
            _ => None,
        }
    }

    /// The workload payload, when this node carries one.
    #[must_use]
    pub fn workload_data(&self) -> Option<&WorkloadData> {
        match &self.data {
            NodeData::Workload(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable workload payload access.
    pub fn workload_data_mut(&mut self) -> Option<&mut WorkloadData> {
        match &mut self.data {
            NodeData::Workload(data) => Some(data),
            _ => None,
        }
    }

    /// The kind of the underlying resource, if any.
    #[must_use]
    pub fn resource_kind(&self) -> Option<&str> {
        self.resource.as_ref().map(|r| r.kind.as_str())
    }
}

/// The id of the application group for a `part-of` label value.
#[must_use]
pub fn application_group_id(name: &str) -> String {
    format!("{GROUP_ID_PREFIX}{name}")
}

/// Stable edge id derived from the endpoint ids, so re-renders do not
/// thrash when the graph is rebuilt from an unchanged snapshot.
#[must_use]
pub fn edge_id(source: &str, target: &str) -> String {
    format!("{source}_{target}")
}

/// One edge of the topology graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    /// Stable id, `<source>_<target>`.
    pub id: String,
    /// Edge discriminant.
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Optional display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional payload (traffic rates on mesh edges).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Edge {
    /// Build an edge with its stable derived id.
    #[must_use]
    pub fn new(edge_type: EdgeType, source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            edge_type,
            source,
            target,
            label: None,
            data: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A fragment of graph contributed by one producer (the base builder or a
/// depicter), merged into the shared model by the builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphFragment {
    /// Nodes to merge.
    pub nodes: Vec<TopologyNode>,
    /// Edges to merge.
    pub edges: Vec<Edge>,
}

/// The complete topology graph handed to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopologyGraph {
    /// All nodes, workloads and groups alike.
    pub nodes: Vec<TopologyNode>,
    /// All edges.
    pub edges: Vec<Edge>,
}

impl TopologyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a node with `id` exists.
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node_by_id(&self, id: &str) -> Option<&TopologyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Mutable node lookup by id.
    pub fn node_by_id_mut(&mut self, id: &str) -> Option<&mut TopologyNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// The node currently owning `child_id`, found by a linear scan over
    /// every node's `children`. Re-parenting is a plain edit of those
    /// arrays, so there are no back-references to keep in sync.
    #[must_use]
    pub fn parent_of(&self, child_id: &str) -> Option<&TopologyNode> {
        self.nodes.iter().find(|n| n.children.iter().any(|c| c == child_id))
    }

    /// Walk parent links from `id` to the top-most ancestor, returning its
    /// id. Returns `id` itself when the node is top-level. The walk carries
    /// a visited set so an accidental ownership cycle terminates instead of
    /// spinning.
    #[must_use]
    pub fn top_level_parent(&self, id: &str) -> String {
        let mut current = id.to_string();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(current.clone());

        while let Some(parent) = self.parent_of(&current) {
            if !visited.insert(parent.id.clone()) {
                tracing::warn!(node = %id, cycle_at = %parent.id, "ownership cycle while walking parents");
                break;
            }
            current = parent.id.clone();
        }
        current
    }

    /// Node ids that no group owns.
    #[must_use]
    pub fn top_level_ids(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| self.parent_of(&n.id).is_none())
            .map(|n| n.id.clone())
            .collect()
    }

    /// Check structural invariants 1–4 (unique ids, exclusive ownership,
    /// resolvable children, resolvable edge endpoints).
    pub fn validate(&self) -> Result<(), TopologyError> {
        let mut ids: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(&node.id) {
                return Err(TopologyError::DuplicateNodeId { id: node.id.clone() });
            }
        }

        let mut owners: HashMap<&str, &str> = HashMap::new();
        for node in &self.nodes {
            for child in &node.children {
                if !ids.contains(child.as_str()) {
                    return Err(TopologyError::MissingGroupChild {
                        group: node.id.clone(),
                        child: child.clone(),
                    });
                }
                if let Some(first) = owners.insert(child, &node.id) {
                    return Err(TopologyError::SharedChild {
                        child: child.clone(),
                        first: first.to_string(),
                        second: node.id.clone(),
                    });
                }
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(TopologyError::DanglingEdge {
                        edge: edge.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
