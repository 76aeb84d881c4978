//! Operator extension filterer
//!
//! Operator-backed service groups have their own "operator groupings"
//! toggle, independent of the generic application-group expand toggle. This
//! filterer runs after the built-in collapse pass and only ever *adds*
//! collapse: the coarse outer toggle is checked first by the engine, so an
//! already-collapsed group stays collapsed whatever this toggle says.

use crate::filters::{toggle, DisplayFilter, Filterer};
use crate::graph::NodeType;

/// Toggle id controlling the collapse state of operator-backed groups.
pub const EXPAND_OPERATOR_GROUPS_FILTER_ID: &str = "expand-operator-groups";

/// Filterer applying the operator-groupings toggle to
/// [`NodeType::OperatorBackedService`] nodes.
#[must_use]
pub fn operator_filterer() -> Filterer {
    Filterer::new("operator-groups", |graph, filters| {
        let Some(expanded) = toggle(filters, EXPAND_OPERATOR_GROUPS_FILTER_ID) else {
            return Vec::new();
        };
        if !expanded {
            for node in &mut graph.nodes {
                if node.node_type == NodeType::OperatorBackedService {
                    node.collapsed = true;
                }
            }
        }
        vec![EXPAND_OPERATOR_GROUPS_FILTER_ID.to_string()]
    })
}

/// The default filter set a console composes for this extension.
#[must_use]
pub fn default_filters() -> Vec<DisplayFilter> {
    vec![DisplayFilter::expand(EXPAND_OPERATOR_GROUPS_FILTER_ID, true)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{apply_display_filters, ALL_APPLICATIONS, EXPAND_APPLICATION_GROUPS_FILTER_ID};
    use crate::graph::{TopologyGraph, TopologyNode};
    use crate::resource::Resource;

    fn graph_with_operator_group() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph
            .nodes
            .push(TopologyNode::workload("u-db", "db", Resource::default()));
        let mut group = TopologyNode::operator_group("op-1", "main-db");
        group.children.push("u-db".to_string());
        graph.nodes.push(group);
        graph
    }

    #[test]
    fn test_operator_toggle_collapses_operator_groups() {
        let graph = graph_with_operator_group();
        let filters = vec![DisplayFilter::expand(EXPAND_OPERATOR_GROUPS_FILTER_ID, false)];

        let filtered =
            apply_display_filters(&graph, &filters, ALL_APPLICATIONS, &[operator_filterer()])
                .unwrap();
        assert!(filtered.node_by_id("op-1").unwrap().collapsed);
    }

    #[test]
    fn test_operator_toggle_independent_of_group_toggle() {
        let graph = graph_with_operator_group();
        // Application-group toggle off; operator toggle on. The operator
        // group stays expanded.
        let filters = vec![
            DisplayFilter::expand(crate::filters::EXPAND_GROUPS_FILTER_ID, false),
            DisplayFilter::expand(EXPAND_OPERATOR_GROUPS_FILTER_ID, true),
        ];

        let filtered =
            apply_display_filters(&graph, &filters, ALL_APPLICATIONS, &[operator_filterer()])
                .unwrap();
        assert!(!filtered.node_by_id("op-1").unwrap().collapsed);
    }

    #[test]
    fn test_outer_toggle_still_wins() {
        let graph = graph_with_operator_group();
        let filters = vec![
            DisplayFilter::expand(EXPAND_APPLICATION_GROUPS_FILTER_ID, false),
            DisplayFilter::expand(EXPAND_OPERATOR_GROUPS_FILTER_ID, true),
        ];

        let filtered =
            apply_display_filters(&graph, &filters, ALL_APPLICATIONS, &[operator_filterer()])
                .unwrap();
        assert!(filtered.node_by_id("op-1").unwrap().collapsed);
    }

    #[test]
    fn test_absent_toggle_applies_nothing() {
        let graph = graph_with_operator_group();
        let filtered =
            apply_display_filters(&graph, &[], ALL_APPLICATIONS, &[operator_filterer()]).unwrap();
        assert!(!filtered.node_by_id("op-1").unwrap().collapsed);
    }
}
