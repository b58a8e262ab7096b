// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! UN Comtrade public preview API (annual, HS, all commodities).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use statroute_core::{PropertySchema, ToolDefinition, ToolFailure, ToolFailureKind, ToolOutcome};

use super::{
    Envelope, Row, SourceClient, build_url, current_year, lenient_year, outcome, parse_args,
    unknown_country,
};
use crate::catalog::Tool;
use crate::reference::{CodeTable, ReferenceData, WORLD_PARTNER};

pub const NAME: &str = "get_trade_flows";
const SOURCE: &str = "UN Comtrade";
const SUGGESTION: &str = "retry with a different year; Comtrade data lags by one to two years";
const INDICATOR: &str = "TOTAL";

/// Latest year with complete reporting.
pub fn default_year(current: i32) -> i32 {
    current - 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Export,
    Import,
}

impl Flow {
    fn parse(raw: Option<&str>) -> Result<Self, ToolFailure> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("export") | Some("exports") | Some("x") => Ok(Flow::Export),
            Some("import") | Some("imports") | Some("m") => Ok(Flow::Import),
            Some(other) => Err(ToolFailure::invalid_arguments(format!(
                "unknown trade flow `{other}` (expected export or import)"
            ))),
        }
    }

    fn code(self) -> &'static str {
        match self {
            Flow::Export => "X",
            Flow::Import => "M",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Flow::Export => "export",
            Flow::Import => "import",
        }
    }
}

pub struct ComtradeTool {
    client: SourceClient,
    base_url: String,
    reference: Arc<dyn ReferenceData>,
}

#[derive(Debug, Deserialize)]
struct Args {
    reporter: String,
    #[serde(default)]
    partner: Option<String>,
    #[serde(default)]
    flow: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    data: Vec<Record>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    #[serde(default, deserialize_with = "lenient_year")]
    period: Option<i32>,
    #[serde(default)]
    reporter_desc: Option<String>,
    #[serde(default)]
    partner_desc: Option<String>,
    #[serde(default)]
    primary_value: Option<f64>,
}

impl ComtradeTool {
    pub fn new(
        client: SourceClient,
        base_url: impl Into<String>,
        reference: Arc<dyn ReferenceData>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            reference,
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<Envelope, ToolFailure> {
        let args: Args = parse_args(input)?;
        let flow = Flow::parse(args.flow.as_deref())?;
        let reporter_code = self
            .reference
            .resolve(CodeTable::UnNumeric, &args.reporter)
            .ok_or_else(|| unknown_country(&args.reporter))?;

        let (partner_name, partner_code) = match args.partner.as_deref().map(str::trim) {
            None | Some("") => ("World".to_string(), WORLD_PARTNER.to_string()),
            Some(p) if p.eq_ignore_ascii_case("world") => {
                ("World".to_string(), WORLD_PARTNER.to_string())
            }
            Some(p) => (
                p.to_string(),
                self.reference
                    .resolve(CodeTable::UnNumeric, p)
                    .ok_or_else(|| unknown_country(p))?,
            ),
        };
        let year = args.year.unwrap_or_else(|| default_year(current_year()));

        let url = build_url(
            &self.base_url,
            "preview/C/A/HS",
            &[
                ("reporterCode", reporter_code),
                ("period", year.to_string()),
                ("partnerCode", partner_code),
                ("flowCode", flow.code().to_string()),
                ("cmdCode", INDICATOR.to_string()),
            ],
        )?;
        let payload: Payload = self.client.get_json(SOURCE, url).await?;

        let rows: Vec<Row> = payload
            .data
            .into_iter()
            .filter_map(|r| {
                let value = r.primary_value?;
                let mut row = Row::new(
                    r.reporter_desc.unwrap_or_else(|| args.reporter.clone()),
                    r.period.unwrap_or(year),
                    serde_json::json!(value),
                    INDICATOR,
                );
                row.partner = Some(r.partner_desc.unwrap_or_else(|| partner_name.clone()));
                row.flow = Some(flow.label().to_string());
                Some(row)
            })
            .collect();

        if rows.is_empty() {
            return Err(ToolFailure::transport(format!(
                "no {} data for {} in {year}",
                flow.label(),
                args.reporter
            )));
        }
        Ok(Envelope::new("comtrade", INDICATOR, rows))
    }
}

#[async_trait]
impl Tool for ComtradeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            NAME,
            "Fetch the total annual goods trade value in US dollars between a reporting \
             country and a partner (default: the world) from UN Comtrade.",
        )
        .required("reporter", PropertySchema::string("Reporting country name"))
        .optional(
            "partner",
            PropertySchema::string("Partner country name (default: World)"),
        )
        .optional(
            "flow",
            PropertySchema::string("Trade direction (default: export)")
                .one_of(["export", "import"]),
        )
        .optional(
            "year",
            PropertySchema::integer("Reporting year (default: two years ago)"),
        )
    }

    async fn invoke(&self, input: serde_json::Value) -> ToolOutcome {
        outcome(self.run(input).await.map_err(|failure| {
            if failure.kind == ToolFailureKind::Transport {
                failure.with_suggestion(SUGGESTION)
            } else {
                failure
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::StaticReferenceData;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(base: &str) -> ComtradeTool {
        ComtradeTool::new(
            SourceClient::new(Duration::from_secs(5)).unwrap(),
            base,
            Arc::new(StaticReferenceData),
        )
    }

    #[tokio::test]
    async fn fetches_exports_to_world() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/preview/C/A/HS"))
            .and(query_param("reporterCode", "566"))
            .and(query_param("period", "2022"))
            .and(query_param("partnerCode", "0"))
            .and(query_param("flowCode", "X"))
            .and(query_param("cmdCode", "TOTAL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elapsedTime": "0.1 secs",
                "count": 1,
                "data": [{
                    "period": "2022",
                    "reporterDesc": "Nigeria",
                    "partnerCode": 0,
                    "partnerDesc": "World",
                    "flowCode": "X",
                    "cmdCode": "TOTAL",
                    "primaryValue": 63_470_000_000.0
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({"reporter": "Nigeria", "year": 2022}))
            .await;
        let ToolOutcome::Data(body) = outcome else {
            panic!("expected data, got {outcome:?}");
        };
        assert_eq!(body["source"], "comtrade");
        assert_eq!(body["count"], 1);
        assert_eq!(body["rows"][0]["partner"], "World");
        assert_eq!(body["rows"][0]["flow"], "export");
        assert_eq!(body["rows"][0]["year"], 2022);
    }

    #[tokio::test]
    async fn imports_from_a_partner_use_partner_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("reporterCode", "404"))
            .and(query_param("partnerCode", "156"))
            .and(query_param("flowCode", "M"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"period": 2021, "primaryValue": 4.1e9}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({
                "reporter": "Kenya",
                "partner": "China",
                "flow": "imports",
                "year": 2021
            }))
            .await;
        let ToolOutcome::Data(body) = outcome else {
            panic!("expected data");
        };
        assert_eq!(body["rows"][0]["country"], "Kenya");
        assert_eq!(body["rows"][0]["partner"], "China");
        assert_eq!(body["rows"][0]["flow"], "import");
    }

    #[tokio::test]
    async fn empty_data_suggests_another_year() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({"reporter": "Ghana", "year": 2025}))
            .await;
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, ToolFailureKind::Transport);
        assert!(failure.suggestion.unwrap().contains("different year"));
    }

    #[tokio::test]
    async fn unknown_partner_is_lookup_failure() {
        let outcome = tool("http://127.0.0.1:9")
            .invoke(json!({"reporter": "Ghana", "partner": "Atlantis"}))
            .await;
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, ToolFailureKind::Lookup);
    }

    #[test]
    fn flow_aliases() {
        assert_eq!(Flow::parse(None).unwrap(), Flow::Export);
        assert_eq!(Flow::parse(Some("M")).unwrap(), Flow::Import);
        assert!(Flow::parse(Some("re-export")).is_err());
    }
}
