//! Filter/visibility engine
//!
//! Recomputes each node's `visible` and `collapsed` flags from the current
//! display filters, the selected application, and the filterer callbacks
//! contributed by domain extensions. The engine is a pure function of
//! `(graph, filters, selected application, filterers)`: it clones the graph
//! and mutates only the two display flags, never node identity, group
//! membership, or edges.
//!
//! # Ordering
//!
//! Ordering is significant. Kind filters, the text query, and application
//! selection determine *visible*; the expand toggles determine *collapsed*;
//! registered filterers run last and may apply their own collapse semantics
//! to their own node type. A collapsed-but-visible group still renders as a
//! single icon with its children's resources rolled up, whereas an
//! invisible node renders nothing.
//!
//! The coarse outer toggle ([`EXPAND_APPLICATION_GROUPS_FILTER_ID`]) is
//! checked first: when it is off every group collapses, whatever the
//! per-type toggles say. With it on, [`EXPAND_GROUPS_FILTER_ID`] drives the
//! collapse state of application group nodes, and extension filterers drive
//! their own group types.

use crate::core::TopologyError;
use crate::graph::{application_group_id, NodeType, TopologyGraph};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// The coarse outer expand toggle: off collapses every group node.
pub const EXPAND_APPLICATION_GROUPS_FILTER_ID: &str = "expand-application-groups";

/// The application-group expand toggle, consulted once the outer toggle is
/// on.
pub const EXPAND_GROUPS_FILTER_ID: &str = "expand-groups";

/// Id of the free-text filter entry.
pub const TEXT_FILTER_ID: &str = "text";

/// Sentinel for "no application selected, show them all".
pub const ALL_APPLICATIONS: &str = "#all-applications#";

/// Display filter category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// A collapse/expand toggle.
    Expand,
    /// A per-resource-kind visibility exclusion.
    Kind,
    /// A free-text label query.
    Text,
}

/// Resolved filter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean toggle state.
    Toggle(bool),
    /// Text query.
    Query(String),
}

/// One user-controlled display filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFilter {
    /// Filter id. Kind filters use the resource kind itself as the id.
    pub id: String,
    /// Category.
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    /// Resolved value.
    pub value: FilterValue,
}

impl DisplayFilter {
    /// An expand toggle.
    #[must_use]
    pub fn expand(id: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            filter_type: FilterType::Expand,
            value: FilterValue::Toggle(enabled),
        }
    }

    /// A kind-exclusion filter; `hidden = true` hides nodes of that kind.
    #[must_use]
    pub fn kind(kind: impl Into<String>, hidden: bool) -> Self {
        Self {
            id: kind.into(),
            filter_type: FilterType::Kind,
            value: FilterValue::Toggle(hidden),
        }
    }

    /// The free-text filter.
    #[must_use]
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            id: TEXT_FILTER_ID.to_string(),
            filter_type: FilterType::Text,
            value: FilterValue::Query(query.into()),
        }
    }

    /// The toggle state, when this filter carries one.
    #[must_use]
    pub fn toggle_value(&self) -> Option<bool> {
        match self.value {
            FilterValue::Toggle(value) => Some(value),
            FilterValue::Query(_) => None,
        }
    }
}

/// The toggle state of the expand filter with `id`, if present.
#[must_use]
pub fn toggle(filters: &[DisplayFilter], id: &str) -> Option<bool> {
    filters
        .iter()
        .find(|f| f.filter_type == FilterType::Expand && f.id == id)
        .and_then(DisplayFilter::toggle_value)
}

/// The active text query, if a non-empty one is present.
#[must_use]
pub fn text_query(filters: &[DisplayFilter]) -> Option<&str> {
    filters
        .iter()
        .find(|f| f.filter_type == FilterType::Text)
        .and_then(|f| match &f.value {
            FilterValue::Query(query) if !query.is_empty() => Some(query.as_str()),
            _ => None,
        })
}

/// Resource kinds hidden by an enabled kind filter.
#[must_use]
pub fn hidden_kinds(filters: &[DisplayFilter]) -> HashSet<&str> {
    filters
        .iter()
        .filter(|f| f.filter_type == FilterType::Kind && f.toggle_value() == Some(true))
        .map(|f| f.id.as_str())
        .collect()
}

/// A collapse-semantics callback contributed by a domain extension.
///
/// Runs after the built-in passes, mutates only `collapsed` flags on its own
/// node type, and reports the filter ids it applied. Reporting an id that is
/// not in the supplied filter list is a contract violation and raises.
pub struct Filterer {
    name: &'static str,
    apply: Box<dyn Fn(&mut TopologyGraph, &[DisplayFilter]) -> Vec<String> + Send + Sync>,
}

impl Filterer {
    /// Wrap a callback under a stable name used in diagnostics.
    #[must_use]
    pub fn new(
        name: &'static str,
        apply: impl Fn(&mut TopologyGraph, &[DisplayFilter]) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            apply: Box::new(apply),
        }
    }

    /// The filterer's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, graph: &mut TopologyGraph, filters: &[DisplayFilter]) -> Vec<String> {
        (self.apply)(graph, filters)
    }
}

impl fmt::Debug for Filterer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filterer").field("name", &self.name).finish()
    }
}

/// Recompute `visible`/`collapsed` across the graph.
///
/// Returns a new graph; the input is untouched. Node identity, group
/// membership, and edges are carried over unchanged.
///
/// # Errors
///
/// Returns [`TopologyError::FiltererContract`] when a filterer reports a
/// filter id absent from `filters`.
pub fn apply_display_filters(
    graph: &TopologyGraph,
    filters: &[DisplayFilter],
    selected_application: &str,
    filterers: &[Filterer],
) -> Result<TopologyGraph, TopologyError> {
    let mut out = graph.clone();

    // Leaf visibility: kind exclusions, then the text query.
    let hidden = hidden_kinds(filters);
    let query = text_query(filters).map(str::to_lowercase);
    for node in &mut out.nodes {
        if node.group {
            continue;
        }
        let mut visible = true;
        if node.resource_kind().is_some_and(|kind| hidden.contains(kind)) {
            visible = false;
        }
        if visible
            && let Some(query) = &query
            && !node.label.to_lowercase().contains(query)
        {
            visible = false;
        }
        node.visible = visible;
    }

    // A group stays visible while at least one descendant leaf is.
    let group_visibility: Vec<(String, bool)> = out
        .nodes
        .iter()
        .filter(|n| n.group)
        .map(|n| (n.id.clone(), subtree_has_visible_leaf(&out, &n.id)))
        .collect();
    for (id, visible) in group_visibility {
        if let Some(node) = out.node_by_id_mut(&id) {
            node.visible = visible;
        }
    }

    // Application selection hides entire foreign top-level subtrees.
    if selected_application != ALL_APPLICATIONS {
        for top in out.top_level_ids() {
            if !belongs_to_application(&out, &top, selected_application) {
                hide_subtree(&mut out, &top);
            }
        }
    }

    // Collapse state: outer toggle first, then the application-group
    // toggle; extension filterers own the rest.
    let outer_expanded = toggle(filters, EXPAND_APPLICATION_GROUPS_FILTER_ID).unwrap_or(true);
    let app_groups_expanded = toggle(filters, EXPAND_GROUPS_FILTER_ID).unwrap_or(true);
    for node in &mut out.nodes {
        if !node.group {
            continue;
        }
        node.collapsed = if !outer_expanded {
            true
        } else if node.node_type == NodeType::ApplicationGroup {
            !app_groups_expanded
        } else {
            false
        };
    }

    for filterer in filterers {
        for applied in filterer.run(&mut out, filters) {
            if !filters.iter().any(|f| f.id == applied) {
                return Err(TopologyError::FiltererContract {
                    filterer: filterer.name().to_string(),
                    filter_id: applied,
                });
            }
        }
    }

    debug_assert_eq!(out.nodes.len(), graph.nodes.len());
    debug_assert_eq!(out.edges.len(), graph.edges.len());
    Ok(out)
}

fn subtree_has_visible_leaf(graph: &TopologyGraph, id: &str) -> bool {
    fn walk(graph: &TopologyGraph, id: &str, visited: &mut HashSet<String>) -> bool {
        if !visited.insert(id.to_string()) {
            return false;
        }
        let Some(node) = graph.node_by_id(id) else {
            return false;
        };
        if !node.group {
            return node.visible;
        }
        node.children.iter().any(|child| walk(graph, child, visited))
    }
    walk(graph, id, &mut HashSet::new())
}

fn belongs_to_application(graph: &TopologyGraph, id: &str, application: &str) -> bool {
    let Some(node) = graph.node_by_id(id) else {
        return false;
    };
    if node.id == application_group_id(application) {
        return true;
    }
    node.resource
        .as_ref()
        .is_some_and(|r| r.part_of() == Some(application))
}

fn hide_subtree(graph: &mut TopologyGraph, id: &str) {
    let mut pending = vec![id.to_string()];
    let mut visited: HashSet<String> = HashSet::new();
    while let Some(current) = pending.pop() {
        if !visited.insert(current.clone()) {
            continue;
        }
        if let Some(node) = graph.node_by_id_mut(&current) {
            node.visible = false;
            pending.extend(node.children.iter().cloned());
        }
    }
}
