//! End-to-end blue/green cycle against a seeded local control plane.
//!
//! Walks boot → healthcheck → swap → destroy on a listener with a
//! default rule, a path rule and two header-marked test rules.

use std::collections::BTreeMap;

use cutover_core::{CutoverError, HealthState, ScalingConfig, TargetHealth};
use cutover_engine::BlueGreen;
use cutover_state::{StateStore, Topology};

const TOPOLOGY: &str = r#"{
    "load_balancers": [{
        "id": "lb-1",
        "name": "web",
        "listeners": [
            {"id": "l-443", "protocol": "HTTPS", "port": 443, "rules": []},
            {"id": "l-80", "protocol": "HTTP", "port": 80, "rules": [
                {"id": "r-default", "is_default": true,
                 "action": {"target_id": "arn:tg/targetgroup/app-blue/aaaa1111"}},
                {"id": "r-api", "priority": 10,
                 "conditions": [{"field": "path-pattern", "values": ["/api/*"]}],
                 "action": {"target_id": "arn:tg/targetgroup/api-blue/bbbb2222"}},
                {"id": "r-test-app", "priority": 1,
                 "conditions": [{"field": "http-header", "values": ["X-Env"]}],
                 "action": {"target_id": "arn:tg/targetgroup/app-green/cccc3333"}},
                {"id": "r-test-api", "priority": 2,
                 "conditions": [
                    {"field": "http-header", "values": ["X-Env"]},
                    {"field": "path-pattern", "values": ["/api/*"]}
                 ],
                 "action": {"target_id": "arn:tg/targetgroup/api-green/dddd4444"}}
            ]}
        ]
    }],
    "target_health": {
        "arn:tg/targetgroup/app-blue/aaaa1111": [
            {"endpoint": "i-1", "port": 8080, "state": "unhealthy"},
            {"endpoint": "i-2", "port": 8080, "state": "healthy"}
        ],
        "arn:tg/targetgroup/api-blue/bbbb2222": [
            {"endpoint": "i-3", "port": 8080, "state": "healthy"}
        ],
        "arn:tg/targetgroup/app-green/cccc3333": [],
        "arn:tg/targetgroup/api-green/dddd4444": []
    },
    "scaling_groups": {
        "app-blue": {"min": 2, "max": 6, "desired": 4},
        "api-blue": {"min": 1, "max": 3, "desired": 2},
        "app-green": {"min": 0, "max": 0, "desired": 0},
        "api-green": {"min": 0, "max": 0, "desired": 0}
    }
}"#;

fn seeded() -> StateStore {
    let store = StateStore::open_in_memory().unwrap();
    store.import(&Topology::from_json(TOPOLOGY).unwrap()).unwrap();
    store
}

fn target_names(store: &StateStore) -> BTreeMap<String, String> {
    store
        .list_rules_for("l-80")
        .unwrap()
        .into_iter()
        .map(|r| {
            let name = cutover_engine::name_of(r.target_id()).unwrap().to_string();
            (r.id, name)
        })
        .collect()
}

fn healthy(endpoint: &str) -> TargetHealth {
    TargetHealth {
        endpoint: endpoint.to_string(),
        port: Some(8080),
        state: HealthState::Healthy,
    }
}

#[test]
fn full_cutover_cycle() {
    let store = seeded();
    let bg = BlueGreen::new("web", store.clone(), store.clone());

    // Boot: green mirrors blue.
    let changes = bg.boot().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(
        store.get_scaling_group("app-green").unwrap(),
        Some(ScalingConfig::new(2, 6, 4))
    );
    assert_eq!(
        store.get_scaling_group("api-green").unwrap(),
        Some(ScalingConfig::new(1, 3, 2))
    );

    // Healthcheck before green members register.
    let report = bg.healthcheck().unwrap();
    assert_eq!(
        report.production,
        BTreeMap::from([("api-blue".to_string(), true), ("app-blue".to_string(), true)])
    );
    assert_eq!(
        report.test,
        BTreeMap::from([("api-green".to_string(), false), ("app-green".to_string(), false)])
    );

    store
        .put_target_health("arn:tg/targetgroup/app-green/cccc3333", &[healthy("i-9")])
        .unwrap();
    store
        .put_target_health("arn:tg/targetgroup/api-green/dddd4444", &[healthy("i-8")])
        .unwrap();
    assert!(bg.healthcheck().unwrap().all_available());

    // Swap: every rule moves to its counterpart.
    let report = bg.swap().unwrap();
    assert_eq!(report.applied.len(), 4);
    let names = target_names(&store);
    assert_eq!(names["r-default"], "app-green");
    assert_eq!(names["r-api"], "api-green");
    assert_eq!(names["r-test-app"], "app-blue");
    assert_eq!(names["r-test-api"], "api-blue");

    // Production status now reports the green targets.
    let production = bg.production_health_status().unwrap();
    assert!(production.contains_key("app-green"));
    let testing = bg.testing_health_status().unwrap();
    assert!(testing.contains_key("app-blue"));

    // Destroy: blue, now the test side, is retired.
    let changes = bg.destroy().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(store.get_scaling_group("app-blue").unwrap(), Some(ScalingConfig::ZERO));
    assert_eq!(store.get_scaling_group("api-blue").unwrap(), Some(ScalingConfig::ZERO));
    assert_eq!(
        store.get_scaling_group("app-green").unwrap(),
        Some(ScalingConfig::new(2, 6, 4))
    );
}

#[test]
fn double_swap_is_identity() {
    let store = seeded();
    let before = target_names(&store);
    let bg = BlueGreen::new("web", store.clone(), store.clone());
    bg.swap().unwrap();
    bg.swap().unwrap();
    assert_eq!(target_names(&store), before);
}

#[test]
fn unpaired_production_target_blocks_swap() {
    let store = seeded();
    store
        .update_rule_target("r-api", "arn:tg/targetgroup/service-canary/eeee5555")
        .unwrap();
    let before = target_names(&store);

    let bg = BlueGreen::new("web", store.clone(), store.clone());
    let err = bg.swap().unwrap_err();
    assert!(matches!(err, CutoverError::UnpairedName(ref n) if n == "service-canary"));
    assert_eq!(target_names(&store), before);
}
