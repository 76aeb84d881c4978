//! Serverless extension
//!
//! Claims knative serving/eventing resources before the builder turns them
//! into generic workload nodes. Knative services become workload-shaped
//! nodes flagged as serverless; event sources become dedicated fan-in nodes
//! with an `event-pub-sub` edge to their sink, so several sources pointing
//! at one service read as a fan-in at render time.
//!
//! The ownership check [`is_serverless_backed`] is consumed by the operator
//! reconciler: a resource that is itself backing a serverless source or
//! sink stays with its serverless producer and is never re-parented under
//! an operator group.

use crate::builder::Depicter;
use crate::builder::workload::workload_node;
use crate::graph::{
    Edge, EdgeType, GraphFragment, NodeData, NodeType, TopologyNode, merge_group,
    NODE_HEIGHT, NODE_WIDTH,
};
use crate::resource::snapshot::keys;
use crate::resource::{Resource, ResourceSnapshot};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// API group of knative serving resources.
pub const KNATIVE_SERVING_GROUP: &str = "serving.knative.dev";

/// API group of knative eventing resources.
pub const KNATIVE_EVENTING_GROUP: &str = "eventing.knative.dev";

/// API group of knative event sources.
pub const KNATIVE_SOURCES_GROUP: &str = "sources.knative.dev";

/// Label a revision/deployment carries when it backs a knative service.
pub const KNATIVE_SERVICE_LABEL: &str = "serving.knative.dev/service";

/// Whether a resource is a serverless resource (a knative serving object,
/// or a workload labeled as backing one).
#[must_use]
pub fn is_serverless_resource(resource: &Resource) -> bool {
    resource.api_group() == KNATIVE_SERVING_GROUP
        || resource.label(KNATIVE_SERVICE_LABEL).is_some()
}

/// Whether a resource is a knative event source.
#[must_use]
pub fn is_event_source(resource: &Resource) -> bool {
    resource.api_group() == KNATIVE_SOURCES_GROUP
}

/// Whether a resource is backing a serverless source or sink through its
/// owner references. Such a resource already belongs to its serverless
/// producer and must not be stolen by another grouping pass.
#[must_use]
pub fn is_serverless_backed(resource: &Resource) -> bool {
    resource.metadata.owner_references.iter().any(|owner| {
        let group = owner.api_version.split_once('/').map_or("", |(g, _)| g);
        group == KNATIVE_SERVING_GROUP
            || group == KNATIVE_EVENTING_GROUP
            || group == KNATIVE_SOURCES_GROUP
    })
}

/// Depicter claiming knative serving services and event sources.
#[derive(Debug, Default)]
pub struct ServerlessDepicter;

#[async_trait]
impl Depicter for ServerlessDepicter {
    fn name(&self) -> &'static str {
        "serverless"
    }

    fn claims(&self, resource: &Resource) -> bool {
        is_serverless_resource(resource) || is_event_source(resource)
    }

    async fn model(
        &self,
        resource: &Resource,
        snapshot: &ResourceSnapshot,
    ) -> anyhow::Result<GraphFragment> {
        if is_event_source(resource) {
            return Ok(event_source_fragment(resource, snapshot));
        }
        Ok(serverless_service_fragment(resource, snapshot))
    }
}

fn serverless_service_fragment(resource: &Resource, snapshot: &ResourceSnapshot) -> GraphFragment {
    let Some(mut node) = workload_node(resource, snapshot) else {
        return GraphFragment::default();
    };
    if let Some(data) = node.workload_data_mut() {
        data.serverless = true;
    }

    let mut fragment = GraphFragment::default();
    if let Some(app) = resource.part_of() {
        let mut group = TopologyNode::application_group(app);
        group.children.push(node.id.clone());
        if let Some(data) = group.group_data_mut() {
            data.group_resources.push(resource.clone());
        }
        fragment.nodes.push(node);
        // merge_group inside the builder handles collisions; here the
        // fragment just carries the group alongside its child.
        merge_group(group, &mut fragment.nodes);
    } else {
        fragment.nodes.push(node);
    }
    fragment
}

fn event_source_fragment(resource: &Resource, snapshot: &ResourceSnapshot) -> GraphFragment {
    let Some(uid) = resource.uid() else {
        debug!(kind = %resource.kind, name = %resource.name(), "event source has no uid, skipped");
        return GraphFragment::default();
    };

    let sink_name = resource
        .spec
        .pointer("/sink/ref/name")
        .and_then(|v| v.as_str());

    let node = TopologyNode {
        id: uid.to_string(),
        node_type: NodeType::EventSource,
        label: resource.name().to_string(),
        group: false,
        visible: true,
        collapsed: false,
        children: Vec::new(),
        width: NODE_WIDTH,
        height: NODE_HEIGHT,
        resource: Some(resource.clone()),
        resources: Default::default(),
        data: NodeData::Extension(json!({
            "eventSourceKind": resource.kind,
            "sink": sink_name,
        })),
    };

    let mut fragment = GraphFragment {
        nodes: vec![node],
        edges: Vec::new(),
    };

    // Edge to the sink; dropped by the builder if the sink never places.
    if let Some(sink_name) = sink_name {
        let sink_uid = snapshot
            .resources(keys::SERVICES)
            .iter()
            .find(|s| s.name() == sink_name)
            .and_then(Resource::uid);
        match sink_uid {
            Some(sink_uid) => fragment
                .edges
                .push(Edge::new(EdgeType::EventPubSub, uid, sink_uid)),
            None => debug!(source = %resource.name(), sink = %sink_name, "sink did not resolve"),
        }
    }
    fragment
}
