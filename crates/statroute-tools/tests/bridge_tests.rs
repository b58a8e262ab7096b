// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the tool execution bridge against mock upstreams.

use serde_json::json;
use statroute_config::model::DataConfig;
use statroute_core::{StatrouteError, ToolExecutor, ToolFailureKind, ToolOutcome};
use statroute_tools::DataBridge;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> DataConfig {
    let base = server.uri();
    DataConfig {
        timeout_secs: 5,
        world_bank_url: format!("{base}/wb"),
        imf_url: format!("{base}/imf"),
        comtrade_url: format!("{base}/comtrade"),
        faostat_url: format!("{base}/fao"),
        owid_url: format!("{base}/owid"),
    }
}

#[tokio::test]
async fn bridge_exposes_five_definitions() {
    let server = MockServer::start().await;
    let bridge = DataBridge::from_config(&config_for(&server)).unwrap();
    assert_eq!(bridge.definitions().len(), 5);
}

#[tokio::test]
async fn unknown_tool_is_an_error() {
    let server = MockServer::start().await;
    let bridge = DataBridge::from_config(&config_for(&server)).unwrap();
    let err = bridge.execute("get_weather", json!({})).await.unwrap_err();
    assert!(matches!(err, StatrouteError::UnknownTool(name) if name == "get_weather"));
}

#[tokio::test]
async fn atlantis_yields_structured_lookup_failure() {
    let server = MockServer::start().await;
    let bridge = DataBridge::from_config(&config_for(&server)).unwrap();

    for (tool, args) in [
        (
            "get_world_bank_indicator",
            json!({"countries": ["Atlantis"], "indicator": "SP.POP.TOTL"}),
        ),
        ("get_imf_indicator", json!({"countries": ["Atlantis"], "indicator": "NGDP_RPCH"})),
        ("get_trade_flows", json!({"reporter": "Atlantis"})),
        ("get_fao_statistics", json!({"country": "Atlantis", "item": "Maize"})),
    ] {
        let outcome = bridge.execute(tool, args).await.unwrap();
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("{tool}: expected failure");
        };
        assert_eq!(failure.kind, ToolFailureKind::Lookup, "{tool}");
        assert!(failure.error.contains("Atlantis"), "{tool}");
        let body = ToolOutcome::Failure(failure).into_json();
        assert_eq!(body["kind"], "lookup");
    }
}

#[tokio::test]
async fn identical_calls_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/imf/NGDP_RPCH/NGA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": {"NGDP_RPCH": {"NGA": {"2024": 3.1}}}
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/imf/NGDP_RPCH/NGA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": {"NGDP_RPCH": {"NGA": {"2024": 3.4}}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = DataBridge::from_config(&config_for(&server)).unwrap();
    let args = json!({
        "countries": ["Nigeria"],
        "indicator": "NGDP_RPCH",
        "start_year": 2024,
        "end_year": 2024
    });

    let first = bridge.execute("get_imf_indicator", args.clone()).await.unwrap();
    let second = bridge.execute("get_imf_indicator", args).await.unwrap();

    let (ToolOutcome::Data(a), ToolOutcome::Data(b)) = (first, second) else {
        panic!("expected data from both calls");
    };
    assert_eq!(a["rows"][0]["value"], 3.1);
    assert_eq!(b["rows"][0]["value"], 3.4);
}

#[tokio::test]
async fn slow_upstream_times_out_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(3))
                .set_body_string("Entity,Code,Year,x\n"),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.timeout_secs = 1;
    let bridge = DataBridge::from_config(&config).unwrap();

    let outcome = bridge
        .execute("get_owid_series", json!({"chart": "population"}))
        .await
        .unwrap();
    let ToolOutcome::Failure(failure) = outcome else {
        panic!("expected timeout failure");
    };
    assert_eq!(failure.kind, ToolFailureKind::Transport);
    assert!(failure.error.contains("timed out"));
}
