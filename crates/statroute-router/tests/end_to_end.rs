// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full pipeline against HTTP doubles: a Gemini-format model that asks for
//! World Bank data, the real data bridge, and the router's tool loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use statroute_config::model::{DataConfig, RoutingConfig};
use statroute_core::{ProviderAdapter, StatrouteError, Tier};
use statroute_provider::{GeminiWire, ModelDriver, gemini};
use statroute_router::{AdapterMap, InMemorySessionStore, RouteRequest, Router};
use statroute_tools::DataBridge;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn world_bank() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/country/KEN/indicator/NY.GDP.MKTP.CD"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"page": 1, "pages": 1, "per_page": 1000, "total": 2},
            [
                {"indicator": {"id": "NY.GDP.MKTP.CD", "value": "GDP (current US$)"},
                 "country": {"id": "KE", "value": "Kenya"},
                 "date": "2023", "value": 1.079e11},
                {"indicator": {"id": "NY.GDP.MKTP.CD", "value": "GDP (current US$)"},
                 "country": {"id": "KE", "value": "Kenya"},
                 "date": "2022", "value": 1.135e11}
            ]
        ])))
        .expect(1)
        .mount(&server)
        .await;
    server
}

async fn gemini_model() -> MockServer {
    let server = MockServer::start().await;
    // The continuation carries the tool result back.
    Mock::given(method("POST"))
        .and(body_string_contains("functionResponse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Kenya's GDP was about $108 billion in 2023."}
                ]}
            }],
            "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 20}
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "get_world_bank_indicator", "args": {
                        "countries": ["Kenya"],
                        "indicator": "NY.GDP.MKTP.CD",
                        "start_year": 2022,
                        "end_year": 2023
                    }}}
                ]}
            }],
            "usageMetadata": {"promptTokenCount": 200, "candidatesTokenCount": 10}
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn router(model_url: &str, data: DataConfig) -> Router {
    let driver = ModelDriver::new(
        GeminiWire::new("test-key"),
        gemini::profile(512),
        model_url,
        Duration::from_secs(5),
    )
    .unwrap();
    let mut adapters: AdapterMap = HashMap::new();
    adapters.insert(Tier::Standard, Arc::new(driver) as Arc<dyn ProviderAdapter>);

    Router::new(
        RoutingConfig::default(),
        adapters,
        Arc::new(DataBridge::from_config(&data).unwrap()),
        Arc::new(InMemorySessionStore::new(20)),
    )
}

#[tokio::test]
async fn model_calls_world_bank_and_answers() {
    let data_server = world_bank().await;
    let model_server = gemini_model().await;
    let data = DataConfig {
        world_bank_url: data_server.uri(),
        ..DataConfig::default()
    };
    let router = router(&model_server.uri(), data);

    let answer = router
        .answer(&RouteRequest::new("What is Kenya's GDP?"))
        .await
        .unwrap();

    assert_eq!(answer.rounds, 1);
    assert_eq!(answer.response.tier_used, Tier::Standard);
    assert!(answer.response.content.contains("Kenya's GDP"));
    assert!(!answer.response.fallback_used);

    let result = &answer.tool_results[0];
    assert!(!result.is_error);
    assert_eq!(result.content["source"], "world_bank");
    assert_eq!(result.content["count"], 2);
    assert_eq!(result.content["rows"][0]["year"], 2022);

    assert_eq!(answer.total_usage.input_tokens, 500);
    assert_eq!(answer.total_usage.estimated_cost, 0.0);

    let usage = router.usage().await;
    assert_eq!(usage.standard.calls, 2);
}

#[tokio::test]
async fn unconfigured_premium_tier_reports_every_attempt() {
    let model_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
        })))
        .mount(&model_server)
        .await;
    let router = router(&model_server.uri(), DataConfig::default());

    let err = router
        .route(&RouteRequest::new("GDP of Kenya").without_tools())
        .await
        .unwrap_err();
    let StatrouteError::FatalRouting { attempts, .. } = err else {
        panic!("expected FatalRouting, got {err:?}");
    };
    assert_eq!(attempts.len(), 2);
    assert!(attempts[0].message.contains("503"));
    assert!(attempts[1].message.contains("no provider adapter"));
}
