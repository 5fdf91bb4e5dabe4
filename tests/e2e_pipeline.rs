//! End-to-end tests for the `Network` pipeline against `MemorySink`.
//!
//! Each test exercises: resolve -> order -> sources -> single flush per layer.

use fluvial_network::model::{GID_FIELD, NODE_A_FIELD, NODE_B_FIELD, STRAHLER_FIELD};
use fluvial_network::{
    Coord, CycleDetected, Error, FeatureSink, LineFeature, MemorySink, Network, NetworkConfig, Outcome,
    TopologySource, Value,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

/// Two heads joining at (10, 10), draining east.
fn confluence() -> Vec<LineFeature> {
    vec![
        LineFeature::new([(5.0, 5.0), (10.0, 10.0)]).with_property("name", "L1"),
        LineFeature::new([(3.0, 3.0), (10.0, 10.0)]).with_property("name", "L2"),
        LineFeature::new([(10.0, 10.0), (20.0, 10.0)]).with_property("name", "L3"),
    ]
}

fn network(config: NetworkConfig) -> Network<MemorySink> {
    Network::with_sink(MemorySink::new(), config).unwrap()
}

fn int_field(line: &LineFeature, key: &str) -> Option<i64> {
    line.get(key).and_then(Value::as_int)
}

// ============================================================================
// 1. Full preparation of a simple confluence
// ============================================================================

#[test]
fn test_prepare_confluence() {
    let net = network(NetworkConfig::default());
    let report = net.prepare(&confluence()).unwrap();

    assert_eq!(report.node_count, 4);
    assert_eq!(report.max_order, 2);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.strahler, Outcome::Written(3));
    assert_eq!(report.sources, Outcome::Written(2));

    let sink = net.sink();
    let ordered = sink.lines("network_strahler").unwrap();
    let orders: Vec<Option<i64>> = ordered.iter().map(|l| int_field(l, STRAHLER_FIELD)).collect();
    assert_eq!(orders, vec![Some(1), Some(1), Some(2)]);
    assert_eq!(ordered[2].get("name"), Some(&Value::from("L3")));
    assert_eq!(int_field(&ordered[2], NODE_A_FIELD), int_field(&ordered[0], NODE_B_FIELD));

    let sources = sink.points("sources").unwrap();
    let coords: Vec<Coord> = sources.iter().map(|p| p.coord).collect();
    assert_eq!(coords, vec![Coord::xy(5.0, 5.0), Coord::xy(3.0, 3.0)]);
    assert_eq!(sources[0].get(STRAHLER_FIELD), Some(&Value::Int(1)));
    assert_eq!(sources[1].get("name"), Some(&Value::from("L2")));

    let nodes = sink.points("nodes").unwrap();
    let gids: Vec<Option<i64>> = nodes.iter().map(|p| p.get(GID_FIELD).and_then(Value::as_int)).collect();
    assert_eq!(gids, vec![Some(0), Some(1), Some(2), Some(3)]);
}

// ============================================================================
// 2. Every layer is written exactly once
// ============================================================================

#[test]
fn test_prepare_writes_each_layer_once() {
    let net = network(NetworkConfig::default());
    net.prepare(&confluence()).unwrap();
    assert_eq!(net.sink().write_count(), 4);
    assert_eq!(
        net.sink().layers(),
        vec!["network_nodes", "network_strahler", "nodes", "sources"]
    );
}

// ============================================================================
// 3. Single line network
// ============================================================================

#[test]
fn test_single_line_is_head_and_source() {
    let net = network(NetworkConfig::default());
    let report = net.prepare(&[LineFeature::new([(0.0, 0.0), (0.0, -5.0)])]).unwrap();
    assert_eq!(report.max_order, 1);
    assert_eq!(report.sources, Outcome::Written(1));
    assert_eq!(net.sink().points("sources").unwrap()[0].coord, Coord::xy(0.0, 0.0));
}

// ============================================================================
// 4. Empty network
// ============================================================================

#[test]
fn test_empty_network() {
    let net = network(NetworkConfig::default());
    let report = net.prepare(&[]).unwrap();
    assert_eq!(report.node_count, 0);
    assert_eq!(report.strahler, Outcome::Written(0));
    assert_eq!(net.sink().lines("network_strahler"), Some(vec![]));
}

// ============================================================================
// 5. Existing output with overwrite disabled is skipped
// ============================================================================

#[test]
fn test_existing_layer_skipped() {
    let sink = MemorySink::new();
    let marker = vec![LineFeature::new([(0.0, 0.0), (1.0, 1.0)]).with_property("kept", true)];
    sink.write_lines("network_strahler", marker.clone()).unwrap();

    let config = NetworkConfig { overwrite: false, ..Default::default() };
    let net = Network::with_sink(sink, config).unwrap();

    assert_eq!(net.strahler_order(&confluence()).unwrap(), Outcome::Skipped);
    let report = net.prepare(&confluence()).unwrap();
    assert_eq!(report.strahler, Outcome::Skipped);
    assert_eq!(report.sources, Outcome::Written(2));
    assert_eq!(net.sink().lines("network_strahler"), Some(marker));
}

#[test]
fn test_existing_layer_overwritten_by_default() {
    let sink = MemorySink::new();
    sink.write_lines("network_strahler", vec![]).unwrap();
    let net = Network::with_sink(sink, NetworkConfig::default()).unwrap();
    assert_eq!(net.strahler_order(&confluence()).unwrap(), Outcome::Written(3));
}

// ============================================================================
// 6. Failures leave the sink untouched
// ============================================================================

#[test]
fn test_cycle_fails_before_any_write_when_strict() {
    let lines = vec![
        LineFeature::new([(0.0, 0.0), (1.0, 0.0)]),
        LineFeature::new([(1.0, 0.0), (2.0, 0.0)]),
        LineFeature::new([(2.0, 0.0), (1.0, 0.0)]),
    ];
    let mut config = NetworkConfig::default();
    config.order.fail_on_cycle = true;
    let net = network(config);
    assert!(matches!(net.prepare(&lines), Err(Error::CycleDetected { head: 0, .. })));
    assert_eq!(net.sink().write_count(), 0);
}

#[test]
fn test_malformed_geometry_fails_before_any_write() {
    let mut lines = confluence();
    lines.push(LineFeature::new([(7.0, 7.0)]));
    let net = network(NetworkConfig::default());
    assert!(matches!(net.prepare(&lines), Err(Error::MalformedGeometry { line: 3, .. })));
    assert!(net.sink().layers().is_empty());
}

#[test]
fn test_invalid_resolver_config() {
    let config = NetworkConfig::from_json(r#"{ "resolver": { "steps": 0 } }"#).unwrap();
    assert!(matches!(
        Network::with_sink(MemorySink::new(), config),
        Err(Error::InvalidConfig(_))
    ));
}

// ============================================================================
// 7. Unreachable sub-network is dropped and counted
// ============================================================================

#[test]
fn test_headless_loop_dropped() {
    let mut lines = confluence();
    lines.push(LineFeature::new([(50.0, 50.0), (60.0, 60.0)]));
    lines.push(LineFeature::new([(60.0, 60.0), (50.0, 50.0)]));
    let net = network(NetworkConfig::default());
    let report = net.prepare(&lines).unwrap();
    assert_eq!(report.dropped, 2);
    assert_eq!(report.strahler, Outcome::Written(3));
    assert_eq!(net.sink().lines("network_nodes").map(|l| l.len()), Some(5));
}

// ============================================================================
// 8. A loop in one component does not block the rest
// ============================================================================

#[test]
fn test_cycle_in_one_component_keeps_the_rest() {
    let mut lines = confluence();
    lines.push(LineFeature::new([(100.0, 0.0), (101.0, 0.0)]));
    lines.push(LineFeature::new([(101.0, 0.0), (102.0, 0.0)]));
    lines.push(LineFeature::new([(102.0, 0.0), (101.0, 0.0)]));

    let net = network(NetworkConfig::default());
    let report = net.prepare(&lines).unwrap();
    assert_eq!(report.cycles, vec![CycleDetected { head: 3, line: 4 }]);
    assert_eq!(report.max_order, 2);
    assert_eq!(report.strahler, Outcome::Written(6));

    let ordered = net.sink().lines("network_strahler").unwrap();
    let orders: Vec<Option<i64>> = ordered.iter().take(3).map(|l| int_field(l, STRAHLER_FIELD)).collect();
    assert_eq!(orders, vec![Some(1), Some(1), Some(2)]);
    assert_eq!(net.sink().write_count(), 4);
}

// ============================================================================
// 9. Staged run: nodes → order from stored ids → sources
// ============================================================================

#[test]
fn test_staged_run_through_node_fields() {
    let mut config = NetworkConfig {
        topology: TopologySource::NodeFields,
        ..Default::default()
    };
    config.order.field = "STRAHLER".into();
    let net = network(config);

    let (network_nodes, nodes) = net.identify_nodes(&confluence()).unwrap();
    assert_eq!(network_nodes, Outcome::Written(3));
    assert_eq!(nodes, Outcome::Written(4));

    let annotated = net.sink().lines("network_nodes").unwrap();
    assert_eq!(net.strahler_order(&annotated).unwrap(), Outcome::Written(3));

    let ordered = net.sink().lines("network_strahler").unwrap();
    assert_eq!(int_field(&ordered[2], "STRAHLER"), Some(2));
    assert_eq!(net.create_sources(&ordered).unwrap(), Outcome::Written(2));
}

#[test]
fn test_prepare_keeps_stored_node_ids() {
    let ids = [(10, 11), (12, 11), (11, 13)];
    let lines: Vec<LineFeature> = confluence()
        .into_iter()
        .zip(ids)
        .map(|(l, (a, b))| l.with_property(NODE_A_FIELD, a).with_property(NODE_B_FIELD, b))
        .collect();

    let net = network(NetworkConfig { topology: TopologySource::NodeFields, ..Default::default() });
    let report = net.prepare(&lines).unwrap();
    assert_eq!(report.max_order, 2);

    let ordered = net.sink().lines("network_strahler").unwrap();
    let starts: Vec<Option<i64>> = ordered.iter().map(|l| int_field(l, NODE_A_FIELD)).collect();
    assert_eq!(starts, vec![Some(10), Some(12), Some(11)]);
    let sources = net.sink().points("sources").unwrap();
    assert_eq!(sources[0].get(NODE_A_FIELD), Some(&Value::Int(10)));

    let resolved = net.sink().lines("network_nodes").unwrap();
    let starts: Vec<Option<i64>> = resolved.iter().map(|l| int_field(l, NODE_A_FIELD)).collect();
    assert_eq!(starts, vec![Some(0), Some(2), Some(1)]);
}

#[test]
fn test_node_fields_required() {
    let net = network(NetworkConfig { topology: TopologySource::NodeFields, ..Default::default() });
    assert!(matches!(
        net.strahler_order(&confluence()),
        Err(Error::MissingProperty { line: 0, .. })
    ));
}

// ============================================================================
// 10. Topology source matters for jittered input
// ============================================================================

#[test]
fn test_coincidence_misses_jittered_junction() {
    let lines = vec![
        LineFeature::new([(0.0, 10.0), (5.0, 5.0)]),
        LineFeature::new([(10.0, 10.0), (5.0 + 1e-9, 5.0)]),
        LineFeature::new([(5.0, 5.0), (5.0, 0.0)]),
    ];

    let raw = network(NetworkConfig { topology: TopologySource::Coincidence, ..Default::default() });
    assert_eq!(raw.prepare(&lines).unwrap().max_order, 1);

    let resolved = network(NetworkConfig::default());
    assert_eq!(resolved.prepare(&lines).unwrap().max_order, 2);
}
