//! Test fixtures for creating sample cluster resources
//!
//! Builders for the resource shapes the engine consumes: workloads with
//! labels/annotations/owner references, secondary resources, snapshots, and
//! installed-operator descriptors.

use crate::reconciler::{OperatorDescriptor, OwnedKind};
use crate::resource::{
    ObjectMeta, OwnerReference, Resource, ResourceSnapshot, WatchResult, CONNECTS_TO_ANNOTATION,
    INSTANCE_LABEL, PART_OF_LABEL,
};
use uuid::Uuid;

/// Builder for one cluster resource.
#[derive(Clone, Debug)]
pub struct ResourceFixture {
    resource: Resource,
}

/// Start a resource fixture of the given kind and name, with a fresh
/// random uid and the `shop` namespace.
pub fn resource(api_version: &str, kind: &str, name: &str) -> ResourceFixture {
    ResourceFixture {
        resource: Resource {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: "shop".to_string(),
                uid: Uuid::new_v4().to_string(),
                ..ObjectMeta::default()
            },
            ..Resource::default()
        },
    }
}

impl ResourceFixture {
    /// A `Deployment` named `name`.
    pub fn deployment(name: &str) -> Self {
        resource("apps/v1", "Deployment", name)
    }

    /// A build associated with the given workload.
    pub fn build_for(workload: &str) -> Self {
        resource("build.openshift.io/v1", "Build", &format!("{workload}-build-1"))
            .with_label(INSTANCE_LABEL, workload)
    }

    /// A route associated with the given workload.
    pub fn route_for(workload: &str) -> Self {
        resource("route.openshift.io/v1", "Route", workload).with_label(INSTANCE_LABEL, workload)
    }

    /// A service associated with the given workload.
    pub fn service_for(workload: &str) -> Self {
        resource("v1", "Service", workload).with_label(INSTANCE_LABEL, workload)
    }

    /// Pin the uid instead of the random default.
    pub fn with_uid(mut self, uid: &str) -> Self {
        self.resource.metadata.uid = uid.to_string();
        self
    }

    /// Clear the uid, producing a resource the builder must skip.
    pub fn without_uid(mut self) -> Self {
        self.resource.metadata.uid = String::new();
        self
    }

    /// Set the namespace.
    pub fn in_namespace(mut self, namespace: &str) -> Self {
        self.resource.metadata.namespace = namespace.to_string();
        self
    }

    /// Add a label.
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.resource.metadata.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Add an annotation.
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.resource
            .metadata
            .annotations
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Mark the resource as part of an application grouping.
    pub fn part_of(self, application: &str) -> Self {
        self.with_label(PART_OF_LABEL, application)
    }

    /// Add a JSON connection annotation listing bare target names.
    pub fn connects_to(self, targets: &[&str]) -> Self {
        let value = serde_json::to_string(targets).expect("target list serializes");
        self.with_annotation(CONNECTS_TO_ANNOTATION, &value)
    }

    /// Add an owner reference.
    pub fn owned_by(mut self, api_version: &str, kind: &str, name: &str, uid: &str) -> Self {
        self.resource.metadata.owner_references.push(OwnerReference {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            uid: uid.to_string(),
            controller: Some(true),
        });
        self
    }

    /// Set the raw spec payload.
    pub fn with_spec(mut self, spec: serde_json::Value) -> Self {
        self.resource.spec = spec;
        self
    }

    /// Finish the fixture.
    pub fn build(self) -> Resource {
        self.resource
    }
}

/// Builder for a resource snapshot.
#[derive(Clone, Debug, Default)]
pub struct SnapshotFixture {
    snapshot: ResourceSnapshot,
}

/// Start an empty snapshot fixture.
pub fn snapshot() -> SnapshotFixture {
    SnapshotFixture::default()
}

impl SnapshotFixture {
    /// Record a loaded collection under `key`.
    pub fn loaded(mut self, key: &str, data: Vec<Resource>) -> Self {
        self.snapshot.insert(key, WatchResult::loaded(data));
        self
    }

    /// Record a pending collection under `key`.
    pub fn pending(mut self, key: &str) -> Self {
        self.snapshot.insert(key, WatchResult::pending());
        self
    }

    /// Finish the fixture.
    pub fn build(self) -> ResourceSnapshot {
        self.snapshot
    }
}

/// Builder for an installed operator descriptor.
#[derive(Clone, Debug)]
pub struct OperatorFixture {
    descriptor: OperatorDescriptor,
}

/// Start an operator fixture with a fresh random instance uid.
pub fn operator(name: &str) -> OperatorFixture {
    OperatorFixture {
        descriptor: OperatorDescriptor {
            name: name.to_string(),
            uid: Uuid::new_v4().to_string(),
            display_name: name.to_string(),
            icon: None,
            owned_kinds: Vec::new(),
        },
    }
}

impl OperatorFixture {
    /// Pin the instance uid.
    pub fn with_uid(mut self, uid: &str) -> Self {
        self.descriptor.uid = uid.to_string();
        self
    }

    /// Set the operator icon.
    pub fn with_icon(mut self, icon: &str) -> Self {
        self.descriptor.icon = Some(icon.to_string());
        self
    }

    /// Declare an owned custom-resource kind in the given API group.
    pub fn owns(mut self, kind: &str, api_group: &str) -> Self {
        self.descriptor.owned_kinds.push(OwnedKind {
            kind: kind.to_string(),
            api_group: Some(api_group.to_string()),
        });
        self
    }

    /// Finish the fixture.
    pub fn build(self) -> OperatorDescriptor {
        self.descriptor
    }
}
