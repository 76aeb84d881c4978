//! Build pipeline scenarios: snapshot in, stable graph out.

use std::sync::Arc;

use topograph::extensions::ServerlessDepicter;
use topograph::graph::{EdgeType, NodeType};
use topograph::overlay::MeshGraph;
use topograph::pipeline::{build_topology, TopologyParams};
use topograph::resource::snapshot::keys;
use topograph::test_utils::{fixtures, init_test_logging};
use topograph::test_utils::fixtures::ResourceFixture;

fn params_with_operator() -> TopologyParams {
    let mut params = TopologyParams::for_namespace("shop");
    params.operators = vec![
        fixtures::operator("pg-operator")
            .with_uid("op-uid")
            .with_icon("postgres")
            .owns("Database", "postgres.example.com")
            .build(),
    ];
    params
}

/// `app` (no owner) connects to `db-1`, which is owned by CRD kind
/// `Database` from the installed `pg-operator`. Expected: one workload
/// node, one operator-backed-service group wrapping `db-1`, one
/// connects-to edge between the workload uids.
#[tokio::test]
async fn test_operator_owned_target_scenario() {
    init_test_logging(None);

    let app = ResourceFixture::deployment("app")
        .with_uid("u-app")
        .connects_to(&["db-1"])
        .build();
    let db = ResourceFixture::deployment("db-1")
        .with_uid("u-db")
        .owned_by("postgres.example.com/v1", "Database", "main-db", "owner-uid")
        .build();

    let graph = build_topology(
        &params_with_operator(),
        &fixtures::snapshot().build(),
        &[app, db],
        None,
    )
    .await
    .unwrap();

    assert!(graph.validate().is_ok());
    assert_eq!(graph.nodes.len(), 3);

    let app_node = graph.node_by_id("u-app").unwrap();
    assert_eq!(app_node.node_type, NodeType::Workload);

    let synthetic = graph.node_by_id("owner-uid").unwrap();
    assert_eq!(synthetic.node_type, NodeType::OperatorBackedService);
    assert_eq!(synthetic.children, vec!["u-db"]);

    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].edge_type, EdgeType::ConnectsTo);
    assert_eq!(graph.edges[0].id, "u-app_u-db");
}

/// Re-parenting: an application group holding an operator-owned workload
/// W1 and a plain workload W2 ends up holding `[W2, syntheticGroup]`, with
/// W1 under the synthetic group.
#[tokio::test]
async fn test_operator_reparenting_inside_application_group() {
    init_test_logging(None);

    let w1 = ResourceFixture::deployment("db-1")
        .with_uid("u-w1")
        .part_of("shop-app")
        .owned_by("postgres.example.com/v1", "Database", "main-db", "owner-uid")
        .build();
    let w2 = ResourceFixture::deployment("api")
        .with_uid("u-w2")
        .part_of("shop-app")
        .build();

    let graph = build_topology(
        &params_with_operator(),
        &fixtures::snapshot().build(),
        &[w1, w2],
        None,
    )
    .await
    .unwrap();

    assert!(graph.validate().is_ok());

    let app_group = graph.node_by_id("group:shop-app").unwrap();
    let mut children = app_group.children.clone();
    children.sort();
    assert_eq!(children, vec!["owner-uid", "u-w2"]);

    let synthetic = graph.node_by_id("owner-uid").unwrap();
    assert_eq!(synthetic.children, vec!["u-w1"]);
}

#[tokio::test]
async fn test_traffic_overlay_adds_exactly_one_edge() {
    init_test_logging(None);

    let app = ResourceFixture::deployment("app")
        .with_uid("u-app")
        .connects_to(&["db"])
        .build();
    let db = ResourceFixture::deployment("db").with_uid("u-db").build();

    let mesh: MeshGraph = serde_json::from_value(serde_json::json!({
        "nodes": [
            { "data": { "id": "m1", "workload": "app", "namespace": "shop" } },
            { "data": { "id": "m2", "workload": "db", "namespace": "shop" } }
        ],
        "edges": [
            { "data": { "source": "m1", "target": "m2", "traffic": { "rps": "4.1" } } }
        ]
    }))
    .unwrap();

    let params = TopologyParams::for_namespace("shop");
    let snapshot = fixtures::snapshot().build();
    let workloads = [app, db];

    let without = build_topology(&params, &snapshot, &workloads, None).await.unwrap();
    let with = build_topology(&params, &snapshot, &workloads, Some(&mesh)).await.unwrap();

    assert_eq!(with.edges.len(), without.edges.len() + 1);
    let traffic: Vec<_> = with.edges.iter().filter(|e| e.edge_type == EdgeType::Traffic).collect();
    assert_eq!(traffic.len(), 1);
    assert_eq!(traffic[0].id, "u-app_u-db");

    // The original connects-to edge is unchanged.
    let connects: Vec<_> = with
        .edges
        .iter()
        .filter(|e| e.edge_type == EdgeType::ConnectsTo)
        .collect();
    assert_eq!(connects, without.edges.iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn test_secondary_resources_attached_to_workload() {
    let app = ResourceFixture::deployment("app").with_uid("u-app").build();
    let snapshot = fixtures::snapshot()
        .loaded(keys::BUILDS, vec![ResourceFixture::build_for("app").build()])
        .loaded(keys::ROUTES, vec![ResourceFixture::route_for("app").build()])
        .loaded(
            keys::SERVICES,
            vec![
                ResourceFixture::service_for("app").build(),
                ResourceFixture::service_for("other").build(),
            ],
        )
        .build();

    let graph = build_topology(
        &TopologyParams::for_namespace("shop"),
        &snapshot,
        &[app],
        None,
    )
    .await
    .unwrap();

    let node = graph.node_by_id("u-app").unwrap();
    assert_eq!(node.resources.builds.len(), 1);
    assert_eq!(node.resources.routes.len(), 1);
    assert_eq!(node.resources.services.len(), 1);
}

#[tokio::test]
async fn test_serverless_owned_workload_not_stolen_by_operator() {
    init_test_logging(None);

    // Backs a knative revision AND carries an owner reference matching the
    // operator's owned kind; the serverless ownership check wins.
    let backing = ResourceFixture::deployment("fn-00001-deployment")
        .with_uid("u-backing")
        .owned_by("serving.knative.dev/v1", "Revision", "fn-00001", "rev-uid")
        .owned_by("postgres.example.com/v1", "Database", "main-db", "owner-uid")
        .build();

    let mut params = params_with_operator();
    params.depicters = vec![Arc::new(ServerlessDepicter)];

    let graph = build_topology(&params, &fixtures::snapshot().build(), &[backing], None)
        .await
        .unwrap();

    assert!(graph.node_by_id("owner-uid").is_none());
    assert_eq!(graph.node_by_id("u-backing").unwrap().node_type, NodeType::Workload);
}

#[tokio::test]
async fn test_serverless_depicter_claims_knative_service() {
    let knative = fixtures::resource("serving.knative.dev/v1", "Service", "fn")
        .with_uid("u-fn")
        .part_of("shop-app")
        .build();

    let mut params = TopologyParams::for_namespace("shop");
    params.depicters = vec![Arc::new(ServerlessDepicter)];

    let graph = build_topology(&params, &fixtures::snapshot().build(), &[knative], None)
        .await
        .unwrap();

    assert!(graph.validate().is_ok());
    let node = graph.node_by_id("u-fn").unwrap();
    assert!(node.workload_data().unwrap().serverless);
    assert_eq!(graph.node_by_id("group:shop-app").unwrap().children, vec!["u-fn"]);
}

#[tokio::test]
async fn test_event_source_fans_into_sink() {
    let sink = fixtures::resource("serving.knative.dev/v1", "Service", "fn")
        .with_uid("u-fn")
        .build();
    let source = fixtures::resource("sources.knative.dev/v1", "PingSource", "tick")
        .with_uid("u-tick")
        .with_spec(serde_json::json!({ "sink": { "ref": { "kind": "Service", "name": "fn" } } }))
        .build();

    let mut params = TopologyParams::for_namespace("shop");
    params.depicters = vec![Arc::new(ServerlessDepicter)];
    let snapshot = fixtures::snapshot().loaded(keys::SERVICES, vec![sink.clone()]).build();

    let graph = build_topology(&params, &snapshot, &[sink, source], None).await.unwrap();

    assert!(graph.validate().is_ok());
    assert_eq!(graph.node_by_id("u-tick").unwrap().node_type, NodeType::EventSource);
    let pubsub: Vec<_> = graph
        .edges
        .iter()
        .filter(|e| e.edge_type == EdgeType::EventPubSub)
        .collect();
    assert_eq!(pubsub.len(), 1);
    assert_eq!(pubsub[0].id, "u-tick_u-fn");
}

#[tokio::test]
async fn test_workload_without_uid_is_absent_not_fatal() {
    let broken = ResourceFixture::deployment("broken").without_uid().build();
    let fine = ResourceFixture::deployment("fine").with_uid("u-fine").build();

    let graph = build_topology(
        &TopologyParams::for_namespace("shop"),
        &fixtures::snapshot().build(),
        &[broken, fine],
        None,
    )
    .await
    .unwrap();

    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.node_by_id("u-fine").is_some());
}

#[tokio::test]
async fn test_rebuild_from_unchanged_snapshot_is_idempotent() {
    let workloads = [
        ResourceFixture::deployment("app")
            .with_uid("u-app")
            .part_of("shop-app")
            .connects_to(&["db-1"])
            .build(),
        ResourceFixture::deployment("db-1")
            .with_uid("u-db")
            .part_of("shop-app")
            .owned_by("postgres.example.com/v1", "Database", "main-db", "owner-uid")
            .build(),
    ];
    let params = params_with_operator();
    let snapshot = fixtures::snapshot().build();

    let first = build_topology(&params, &snapshot, &workloads, None).await.unwrap();
    let second = build_topology(&params, &snapshot, &workloads, None).await.unwrap();

    assert_eq!(first, second);
    assert!(first.validate().is_ok());
}

#[tokio::test]
async fn test_exclusive_ownership_across_producers() {
    // Two deployments in one application, both owned by the same operator
    // release: the application group must reference the synthetic group
    // once, and each workload must have exactly one parent.
    let workloads = [
        ResourceFixture::deployment("db-primary")
            .with_uid("u-1")
            .part_of("shop-app")
            .owned_by("postgres.example.com/v1", "Database", "main-db", "owner-uid")
            .build(),
        ResourceFixture::deployment("db-replica")
            .with_uid("u-2")
            .part_of("shop-app")
            .owned_by("postgres.example.com/v1", "Database", "main-db", "owner-uid")
            .build(),
    ];

    let graph = build_topology(
        &params_with_operator(),
        &fixtures::snapshot().build(),
        &workloads,
        None,
    )
    .await
    .unwrap();

    assert!(graph.validate().is_ok());
    let app_group = graph.node_by_id("group:shop-app").unwrap();
    assert_eq!(app_group.children, vec!["owner-uid"]);
    let synthetic = graph.node_by_id("owner-uid").unwrap();
    assert_eq!(synthetic.children, vec!["u-1", "u-2"]);
}
