//! Filter engine scenarios over graphs produced by the full pipeline.

use topograph::extensions::{operator_filterer, EXPAND_OPERATOR_GROUPS_FILTER_ID};
use topograph::filters::{
    DisplayFilter, ALL_APPLICATIONS, EXPAND_APPLICATION_GROUPS_FILTER_ID, EXPAND_GROUPS_FILTER_ID,
};
use topograph::pipeline::{build_topology, filter_topology, TopologyParams};
use topograph::test_utils::fixtures::{self, ResourceFixture};
use topograph::TopologyGraph;

async fn sample_graph() -> (TopologyParams, TopologyGraph) {
    let workloads = [
        ResourceFixture::deployment("app")
            .with_uid("u-app")
            .part_of("shop-app")
            .build(),
        ResourceFixture::deployment("db-1")
            .with_uid("u-db")
            .part_of("shop-app")
            .owned_by("postgres.example.com/v1", "Database", "main-db", "owner-uid")
            .build(),
        ResourceFixture::deployment("standalone").with_uid("u-solo").build(),
    ];

    let mut params = TopologyParams::for_namespace("shop");
    params.operators = vec![
        fixtures::operator("pg-operator")
            .with_uid("op-uid")
            .owns("Database", "postgres.example.com")
            .build(),
    ];
    params.filterers = vec![operator_filterer()];

    let graph = build_topology(&params, &fixtures::snapshot().build(), &workloads, None)
        .await
        .unwrap();
    (params, graph)
}

fn visible_count(graph: &TopologyGraph) -> usize {
    graph.nodes.iter().filter(|n| n.visible).count()
}

#[tokio::test]
async fn test_kind_filter_monotone_and_restoring() {
    let (params, graph) = sample_graph().await;

    let baseline = filter_topology(&params, &graph, &[]).unwrap();
    let excluded = filter_topology(
        &params,
        &graph,
        &[DisplayFilter::kind("Deployment", true)],
    )
    .unwrap();
    let restored = filter_topology(
        &params,
        &graph,
        &[DisplayFilter::kind("Deployment", false)],
    )
    .unwrap();

    assert!(visible_count(&excluded) <= visible_count(&baseline));

    let baseline_visible: Vec<_> =
        baseline.nodes.iter().filter(|n| n.visible).map(|n| n.id.clone()).collect();
    let restored_visible: Vec<_> =
        restored.nodes.iter().filter(|n| n.visible).map(|n| n.id.clone()).collect();
    assert_eq!(baseline_visible, restored_visible);
}

#[tokio::test]
async fn test_filter_pass_never_alters_topology() {
    let (params, graph) = sample_graph().await;
    let filters = vec![
        DisplayFilter::kind("Deployment", true),
        DisplayFilter::expand(EXPAND_GROUPS_FILTER_ID, false),
    ];

    let filtered = filter_topology(&params, &graph, &filters).unwrap();

    assert_eq!(filtered.nodes.len(), graph.nodes.len());
    assert_eq!(filtered.edges.len(), graph.edges.len());
    for (before, after) in graph.nodes.iter().zip(&filtered.nodes) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.children, after.children);
    }
    assert!(filtered.validate().is_ok());
}

#[tokio::test]
async fn test_application_selection_hides_foreign_nodes() {
    let (mut params, graph) = sample_graph().await;
    params.selected_application = "shop-app".to_string();

    let filtered = filter_topology(&params, &graph, &[]).unwrap();

    assert!(filtered.node_by_id("group:shop-app").unwrap().visible);
    assert!(filtered.node_by_id("u-app").unwrap().visible);
    assert!(!filtered.node_by_id("u-solo").unwrap().visible);

    params.selected_application = ALL_APPLICATIONS.to_string();
    let unfiltered = filter_topology(&params, &graph, &[]).unwrap();
    assert!(unfiltered.node_by_id("u-solo").unwrap().visible);
}

#[tokio::test]
async fn test_expand_toggles_layer_correctly() {
    let (params, graph) = sample_graph().await;

    // Outer toggle off: every group collapses, operator toggle on or not.
    let all_collapsed = filter_topology(
        &params,
        &graph,
        &[
            DisplayFilter::expand(EXPAND_APPLICATION_GROUPS_FILTER_ID, false),
            DisplayFilter::expand(EXPAND_OPERATOR_GROUPS_FILTER_ID, true),
        ],
    )
    .unwrap();
    assert!(all_collapsed.node_by_id("group:shop-app").unwrap().collapsed);
    assert!(all_collapsed.node_by_id("owner-uid").unwrap().collapsed);

    // Application-group toggle off: only application groups collapse.
    let app_collapsed = filter_topology(
        &params,
        &graph,
        &[DisplayFilter::expand(EXPAND_GROUPS_FILTER_ID, false)],
    )
    .unwrap();
    assert!(app_collapsed.node_by_id("group:shop-app").unwrap().collapsed);
    assert!(!app_collapsed.node_by_id("owner-uid").unwrap().collapsed);

    // Operator toggle off: only operator groups collapse.
    let operator_collapsed = filter_topology(
        &params,
        &graph,
        &[DisplayFilter::expand(EXPAND_OPERATOR_GROUPS_FILTER_ID, false)],
    )
    .unwrap();
    assert!(!operator_collapsed.node_by_id("group:shop-app").unwrap().collapsed);
    assert!(operator_collapsed.node_by_id("owner-uid").unwrap().collapsed);
}

#[tokio::test]
async fn test_collapsed_group_remains_visible_with_rollup() {
    let (params, graph) = sample_graph().await;
    let filtered = filter_topology(
        &params,
        &graph,
        &[DisplayFilter::expand(EXPAND_APPLICATION_GROUPS_FILTER_ID, false)],
    )
    .unwrap();

    let group = filtered.node_by_id("owner-uid").unwrap();
    assert!(group.collapsed);
    assert!(group.visible);
    // Roll-up data for the collapsed rendering.
    assert!(!group.group_data().unwrap().group_resources.is_empty());
}

#[tokio::test]
async fn test_reapplying_same_filters_is_stable() {
    let (params, graph) = sample_graph().await;
    let filters = vec![
        DisplayFilter::kind("Deployment", true),
        DisplayFilter::expand(EXPAND_GROUPS_FILTER_ID, false),
        DisplayFilter::expand(EXPAND_OPERATOR_GROUPS_FILTER_ID, false),
    ];

    let once = filter_topology(&params, &graph, &filters).unwrap();
    let twice = filter_topology(&params, &once, &filters).unwrap();
    assert_eq!(once, twice);
}
