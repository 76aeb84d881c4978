//! Workload node assembly
//!
//! Turns one workload resource into a graph node: looks up the secondary
//! build/route/service context by label reference, derives display data
//! (edit URL from VCS annotations, icon from runtime/name labels, the
//! serverless flag), and parses the JSON connection annotation into
//! connects-to edges.
//!
//! Failure semantics here are deliberately soft: a malformed connection
//! annotation yields zero edges for that resource, and a workload missing
//! `metadata.uid` cannot be placed in the graph and is skipped. Neither is
//! an error.

use crate::extensions::serverless;
use crate::graph::{Edge, EdgeType, SecondaryResources, TopologyNode, WorkloadData, DEFAULT_ICON};
use crate::resource::snapshot::keys;
use crate::resource::{
    Resource, ResourceSnapshot, CONNECTS_TO_ANNOTATION, NAME_LABEL, RUNTIME_LABEL,
    VCS_REF_ANNOTATION, VCS_URI_ANNOTATION,
};
use serde::Deserialize;
use tracing::{debug, warn};

/// One entry of the connection annotation: either a bare target name or a
/// `{apiVersion, kind, name}` descriptor.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConnectsToTarget {
    Name(String),
    Ref(TargetRef),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetRef {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    name: String,
}

/// Build the workload node for `resource`, or `None` when the resource has
/// no uid and cannot be placed in the graph.
#[must_use]
pub fn workload_node(resource: &Resource, snapshot: &ResourceSnapshot) -> Option<TopologyNode> {
    let Some(uid) = resource.uid() else {
        warn!(kind = %resource.kind, name = %resource.name(), "workload has no uid, skipped");
        return None;
    };

    let mut node = TopologyNode::workload(uid, resource.name(), resource.clone());
    node.resources = associated_resources(resource, snapshot);
    node.data = crate::graph::NodeData::Workload(workload_data(resource));
    Some(node)
}

/// Secondary context for a workload: builds, routes, services, and alerts
/// whose own labels reference this workload's name.
#[must_use]
pub fn associated_resources(resource: &Resource, snapshot: &ResourceSnapshot) -> SecondaryResources {
    SecondaryResources {
        builds: matching(snapshot.resources(keys::BUILDS), resource.name()),
        routes: matching(snapshot.resources(keys::ROUTES), resource.name()),
        services: matching(snapshot.resources(keys::SERVICES), resource.name()),
        alerts: matching(snapshot.resources(keys::ALERTS), resource.name()),
    }
}

fn matching(candidates: &[Resource], workload_name: &str) -> Vec<Resource> {
    candidates
        .iter()
        .filter(|c| {
            c.instance_name() == Some(workload_name) || c.label(NAME_LABEL) == Some(workload_name)
        })
        .cloned()
        .collect()
}

/// Derived display data for a workload node.
#[must_use]
pub fn workload_data(resource: &Resource) -> WorkloadData {
    let vcs_uri = resource.annotation(VCS_URI_ANNOTATION).map(ToString::to_string);
    let edit_url = vcs_uri.as_deref().map(|uri| {
        let vcs_ref = resource.annotation(VCS_REF_ANNOTATION).unwrap_or("main");
        format!("{}/edit/{vcs_ref}", uri.trim_end_matches('/'))
    });

    WorkloadData {
        edit_url,
        vcs_uri,
        icon: icon_for(resource),
        serverless: serverless::is_serverless_resource(resource),
    }
}

/// Icon inferred from the runtime label, falling back to the component name
/// label, falling back to the generic default.
#[must_use]
pub fn icon_for(resource: &Resource) -> String {
    resource
        .label(RUNTIME_LABEL)
        .or_else(|| resource.label(NAME_LABEL))
        .unwrap_or(DEFAULT_ICON)
        .to_string()
}

/// Connects-to edges for `resource`, resolved against the workload list.
///
/// Each annotation entry resolves by object name (plus kind/apiVersion when
/// the descriptor gives them) or by the target's instance label. An edge is
/// created only when the target resolves to a workload with a uid; a
/// malformed annotation silently yields zero edges.
#[must_use]
pub fn connects_to_edges(resource: &Resource, workloads: &[Resource]) -> Vec<Edge> {
    let Some(source_uid) = resource.uid() else {
        return Vec::new();
    };
    let Some(raw) = resource.annotation(CONNECTS_TO_ANNOTATION) else {
        return Vec::new();
    };

    let targets: Vec<ConnectsToTarget> = match serde_json::from_str(raw) {
        Ok(targets) => targets,
        Err(err) => {
            debug!(
                workload = %resource.name(),
                error = %err,
                "malformed connection annotation, no edges derived"
            );
            return Vec::new();
        }
    };

    let mut edges = Vec::new();
    for target in targets {
        let resolved = match &target {
            ConnectsToTarget::Name(name) => resolve_target(workloads, name, None, None),
            ConnectsToTarget::Ref(target_ref) => resolve_target(
                workloads,
                &target_ref.name,
                target_ref.kind.as_deref(),
                target_ref.api_version.as_deref(),
            ),
        };

        match resolved {
            Some(target_uid) => {
                edges.push(Edge::new(EdgeType::ConnectsTo, source_uid, target_uid));
            }
            None => {
                debug!(workload = %resource.name(), "connection target did not resolve, edge dropped");
            }
        }
    }
    edges
}

fn resolve_target<'a>(
    workloads: &'a [Resource],
    name: &str,
    kind: Option<&str>,
    api_version: Option<&str>,
) -> Option<&'a str> {
    let by_name = workloads.iter().find(|w| {
        w.name() == name
            && kind.is_none_or(|k| w.kind == k)
            && api_version.is_none_or(|v| w.api_version == v)
    });

    by_name
        .or_else(|| workloads.iter().find(|w| w.instance_name() == Some(name)))
        .and_then(Resource::uid)
}
