//! Resource snapshot input contract
//!
//! The snapshot provider hands the engine a mapping from resource-type key
//! to a [`WatchResult`]: the loaded flag, an optional load error, and the
//! resource list itself. Absent keys are treated as empty/not-yet-loaded,
//! never as an error; an early rebuild against a half-loaded snapshot just
//! produces a smaller graph.

use crate::resource::Resource;
use std::collections::HashMap;

/// Well-known resource-type keys used by the base model builder.
///
/// The snapshot map is stringly keyed on purpose: operator and serverless
/// extensions register their own custom-resource keys without this crate
/// knowing about them.
pub mod keys {
    /// Builds associated with workloads.
    pub const BUILDS: &str = "builds";
    /// Routes exposing workloads.
    pub const ROUTES: &str = "routes";
    /// Services selecting workloads.
    pub const SERVICES: &str = "services";
    /// Firing monitoring alerts.
    pub const ALERTS: &str = "alerts";
    /// Installed operator descriptors.
    pub const OPERATORS: &str = "operators";
}

/// Per-resource-kind load state as supplied by the snapshot provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchResult {
    /// Whether the initial list for this kind has completed.
    pub loaded: bool,
    /// Provider-reported load failure, if any.
    pub load_error: Option<String>,
    /// The resources themselves.
    pub data: Vec<Resource>,
}

impl WatchResult {
    /// A completed load carrying `data`.
    #[must_use]
    pub fn loaded(data: Vec<Resource>) -> Self {
        Self {
            loaded: true,
            load_error: None,
            data,
        }
    }

    /// A load that has not completed yet.
    #[must_use]
    pub fn pending() -> Self {
        Self::default()
    }

    /// A load that failed with the given provider error.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            loaded: true,
            load_error: Some(error.into()),
            data: Vec::new(),
        }
    }
}

/// Read-only snapshot of every watched resource collection.
#[derive(Debug, Clone, Default)]
pub struct ResourceSnapshot {
    entries: HashMap<String, WatchResult>,
}

impl ResourceSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the watch result for a resource-type key.
    pub fn insert(&mut self, key: impl Into<String>, result: WatchResult) {
        self.entries.insert(key.into(), result);
    }

    /// The resources under `key`. An absent key yields an empty slice.
    #[must_use]
    pub fn resources(&self, key: &str) -> &[Resource] {
        self.entries.get(key).map_or(&[], |r| r.data.as_slice())
    }

    /// The full watch result under `key`, if the provider supplied one.
    #[must_use]
    pub fn result(&self, key: &str) -> Option<&WatchResult> {
        self.entries.get(key)
    }

    /// Whether `key` has finished its initial load. Absent keys have not.
    #[must_use]
    pub fn is_loaded(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|r| r.loaded)
    }
}
