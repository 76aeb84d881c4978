//! Cluster resource model
//!
//! The engine never fetches anything itself; it is handed already-loaded
//! snapshots of cluster resources by an external collaborator. This module
//! defines the minimal resource shape the engine reads: kind/apiVersion,
//! object metadata (name, namespace, uid, labels, annotations, owner
//! references), and opaque `spec`/`status` payloads kept as raw JSON.
//!
//! Well-known label and annotation keys used by the builder live here as
//! named constants so the parsing code never repeats string literals.
//!
//! # Serde Shape
//!
//! Structs deserialize directly from the camelCase wire form produced by the
//! cluster API (`apiVersion`, `ownerReferences`, `creationTimestamp`), so a
//! snapshot provider can feed raw watch payloads straight in.

pub mod snapshot;

pub use snapshot::{ResourceSnapshot, WatchResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label marking a workload as part of a named application grouping.
pub const PART_OF_LABEL: &str = "app.kubernetes.io/part-of";

/// Label carrying the workload's instance name; also used to resolve
/// connection targets that reference an instance rather than an object name.
pub const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";

/// Label carrying the component name; the icon fallback when no runtime
/// label is present.
pub const NAME_LABEL: &str = "app.kubernetes.io/name";

/// Label naming the runtime/builder of a workload; the primary icon source.
pub const RUNTIME_LABEL: &str = "app.openshift.io/runtime";

/// Annotation holding the JSON-encoded list of connection targets.
pub const CONNECTS_TO_ANNOTATION: &str = "app.openshift.io/connects-to";

/// Annotation holding the source repository URI of a workload.
pub const VCS_URI_ANNOTATION: &str = "app.openshift.io/vcs-uri";

/// Annotation holding the source repository ref (branch/tag) of a workload.
pub const VCS_REF_ANNOTATION: &str = "app.openshift.io/vcs-ref";

/// An owner reference attached to a resource's metadata.
///
/// Owner references drive the operator-backed service reconciler: a workload
/// whose owner points at an installed operator's instance (by uid) or at one
/// of its owned custom-resource kinds gets re-parented under a synthetic
/// operator group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerReference {
    /// API version of the owning object (e.g. `postgres.example.com/v1`).
    pub api_version: String,
    /// Kind of the owning object.
    pub kind: String,
    /// Name of the owning object; operator release partitioning keys on it.
    pub name: String,
    /// Uid of the owning object; empty when the provider omitted it.
    pub uid: String,
    /// Whether this reference is the managing controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,
}

/// Object metadata common to every cluster resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    /// Object name, unique per namespace and kind.
    pub name: String,
    /// Namespace the object lives in.
    pub namespace: String,
    /// Cluster-assigned unique id. A workload without one cannot be placed
    /// in the graph and is skipped by the builder.
    pub uid: String,
    /// Object labels. Sorted map so serialized output is deterministic.
    pub labels: BTreeMap<String, String>,
    /// Object annotations.
    pub annotations: BTreeMap<String, String>,
    /// Owner references, possibly empty.
    pub owner_references: Vec<OwnerReference>,
    /// Creation timestamp as reported by the cluster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

/// A single cluster resource as handed over by the snapshot provider.
///
/// `spec` and `status` stay as raw JSON. The engine only dips into them for
/// a handful of well-known fields (operator icons, event-source sinks) and
/// has no business imposing a schema on arbitrary custom resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    /// API version, e.g. `apps/v1` or `serving.knative.dev/v1`.
    pub api_version: String,
    /// Resource kind, e.g. `Deployment`.
    pub kind: String,
    /// Object metadata.
    pub metadata: ObjectMeta,
    /// Raw spec payload.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub spec: serde_json::Value,
    /// Raw status payload.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub status: serde_json::Value,
}

impl Resource {
    /// Object name shorthand.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Namespace shorthand.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// The resource uid, or `None` when the provider handed over an object
    /// without one (such a workload is skipped, not failed).
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        if self.metadata.uid.is_empty() {
            None
        } else {
            Some(&self.metadata.uid)
        }
    }

    /// Look up a label value.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata.labels.get(key).map(String::as_str)
    }

    /// Look up an annotation value.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    /// The application grouping this resource belongs to, if labeled.
    #[must_use]
    pub fn part_of(&self) -> Option<&str> {
        self.label(PART_OF_LABEL)
    }

    /// The instance name of this resource, if labeled.
    #[must_use]
    pub fn instance_name(&self) -> Option<&str> {
        self.label(INSTANCE_LABEL)
    }

    /// The API group portion of `api_version` (empty for core-group objects).
    #[must_use]
    pub fn api_group(&self) -> &str {
        match self.api_version.split_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }
}
