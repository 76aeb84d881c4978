//! Operator-backed service reconciler
//!
//! Post-pass over the assembled base graph: detects workloads owned by an
//! installed operator, synthesizes one operator-backed-service group per
//! (operator, release) pair, re-parents the owned workloads under it, and
//! merges icon/group metadata.
//!
//! Matching is by owner reference: either the reference uid equals the
//! operator's instance uid, or the reference kind appears among the
//! custom-resource kinds the operator declares. Matches are partitioned by
//! the owning reference's name, so distinct releases of the same operator
//! get distinct synthetic groups.
//!
//! Re-parenting preserves hierarchy: when a stolen workload sat inside an
//! application group, the synthetic group takes its place as a child of
//! that application group.

use crate::graph::{
    merge_group, GroupData, NodeData, NodeType, TopologyGraph, TopologyNode, DEFAULT_ICON,
};
use crate::resource::{OwnerReference, Resource};
use std::collections::BTreeMap;
use tracing::debug;

/// A custom-resource kind declared as owned by an installed operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedKind {
    /// The owned kind, e.g. `Database`.
    pub kind: String,
    /// API group the kind belongs to; `None` matches any group.
    pub api_group: Option<String>,
}

impl OwnedKind {
    /// An owned kind matching any API group.
    #[must_use]
    pub fn named(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            api_group: None,
        }
    }

    fn matches(&self, owner: &OwnerReference) -> bool {
        if self.kind != owner.kind {
            return false;
        }
        match &self.api_group {
            Some(group) => owner
                .api_version
                .split_once('/')
                .is_some_and(|(g, _)| g == group),
            None => true,
        }
    }
}

/// Identity and ownership declaration of one installed operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorDescriptor {
    /// Operator name, e.g. `pg-operator`.
    pub name: String,
    /// Uid of the operator's installed instance.
    pub uid: String,
    /// Human-facing name for group labels.
    pub display_name: String,
    /// The operator's own icon, the middle fallback in icon resolution.
    pub icon: Option<String>,
    /// Custom-resource kinds this operator owns.
    pub owned_kinds: Vec<OwnedKind>,
}

impl OperatorDescriptor {
    fn matching_owner<'a>(&self, resource: &'a Resource) -> Option<&'a OwnerReference> {
        resource
            .metadata
            .owner_references
            .iter()
            .find(|owner| owner.uid == self.uid || self.owned_kinds.iter().any(|k| k.matches(owner)))
    }
}

struct Match {
    node_id: String,
    owner: OwnerReference,
    resource: Resource,
}

/// Re-group operator-owned workloads under synthetic operator-backed
/// service groups.
///
/// `exclude` skips nodes whose resource is already accounted for by another
/// producer (the serverless ownership check in the default pipeline); an
/// excluded node keeps its current parent untouched.
pub fn reconcile_operator_groups(
    graph: &mut TopologyGraph,
    operators: &[OperatorDescriptor],
    exclude: &dyn Fn(&Resource) -> bool,
) {
    for operator in operators {
        // Partition matched nodes by owning reference name: one synthetic
        // group per release.
        let mut partitions: BTreeMap<String, Vec<Match>> = BTreeMap::new();
        for node in &graph.nodes {
            if node.group {
                continue;
            }
            let Some(resource) = &node.resource else {
                continue;
            };
            if exclude(resource) {
                debug!(node = %node.id, "excluded from operator grouping");
                continue;
            }
            if let Some(owner) = operator.matching_owner(resource) {
                partitions.entry(owner.name.clone()).or_default().push(Match {
                    node_id: node.id.clone(),
                    owner: owner.clone(),
                    resource: resource.clone(),
                });
            }
        }

        for (release, members) in partitions {
            let group_id = group_id_for(operator, &members);
            let icon = resolve_icon(operator, &members);

            // Steal members from the application groups that held them,
            // putting the synthetic group in their place.
            for member in &members {
                let top = graph.top_level_parent(&member.node_id);
                if top == member.node_id {
                    continue;
                }
                let Some(parent) = graph.node_by_id_mut(&top) else {
                    continue;
                };
                if parent.node_type != NodeType::ApplicationGroup {
                    continue;
                }
                parent.children.retain(|c| c != &member.node_id);
                if !parent.children.contains(&group_id) {
                    parent.children.push(group_id.clone());
                }
            }

            // A member still wearing the generic icon inherits the
            // operator's.
            for member in &members {
                if let Some(node) = graph.node_by_id_mut(&member.node_id)
                    && let Some(data) = node.workload_data_mut()
                    && data.icon == DEFAULT_ICON
                {
                    data.icon.clone_from(&icon);
                }
            }

            let mut group = TopologyNode::operator_group(group_id, release);
            group.children = members.iter().map(|m| m.node_id.clone()).collect();
            group.data = NodeData::Group(GroupData {
                icon: Some(icon),
                group_resources: members.into_iter().map(|m| m.resource).collect(),
            });
            merge_group(group, &mut graph.nodes);
        }
    }
}

/// Group id: the owning reference's uid, or a deterministic composite of
/// operator name and release when the provider omitted the uid.
fn group_id_for(operator: &OperatorDescriptor, members: &[Match]) -> String {
    members
        .iter()
        .find(|m| !m.owner.uid.is_empty())
        .map_or_else(
            || format!("{}:{}", operator.name, members[0].owner.name),
            |m| m.owner.uid.clone(),
        )
}

/// Icon resolution: the owned resource's spec icon, falling back to the
/// operator's icon, falling back to the generic default.
fn resolve_icon(operator: &OperatorDescriptor, members: &[Match]) -> String {
    members
        .iter()
        .find_map(|m| m.resource.spec.get("icon").and_then(|v| v.as_str()))
        .map(ToString::to_string)
        .or_else(|| operator.icon.clone())
        .unwrap_or_else(|| DEFAULT_ICON.to_string())
}
