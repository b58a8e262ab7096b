// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! World Bank Indicators API v2.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use statroute_core::{ParamType, PropertySchema, ToolDefinition, ToolFailure, ToolOutcome};

use super::{
    Envelope, Row, SourceClient, YearRange, build_url, current_year, lenient_year, one_or_many,
    outcome, parse_args, resolve_all,
};
use crate::catalog::Tool;
use crate::reference::{CodeTable, ReferenceData};

pub const NAME: &str = "get_world_bank_indicator";
const SOURCE: &str = "World Bank";

/// Last ten complete years.
pub fn default_years(current: i32) -> YearRange {
    YearRange {
        start: current - 10,
        end: current - 1,
    }
}

pub struct WorldBankTool {
    client: SourceClient,
    base_url: String,
    reference: Arc<dyn ReferenceData>,
}

impl WorldBankTool {
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
        if !is_indicator_code(&args.indicator) {
            return Err(ToolFailure::invalid_arguments(format!(
                "invalid World Bank indicator code: {}",
                args.indicator
            ))
            .with_suggestion("use a code such as NY.GDP.MKTP.KD.ZG or SP.POP.TOTL"));
        }

        let countries = resolve_all(&*self.reference, CodeTable::Iso3, &args.countries)?;
        let years = YearRange::resolve(
            args.start_year,
            args.end_year,
            default_years(current_year()),
        );
        let codes = countries
            .iter()
            .map(|(_, code)| code.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let url = build_url(
            &self.base_url,
            &format!("country/{codes}/indicator/{}", args.indicator),
            &[
                ("format", "json".to_string()),
                ("date", format!("{}:{}", years.start, years.end)),
                ("per_page", "1000".to_string()),
            ],
        )?;
        let payload: Vec<serde_json::Value> = self.client.get_json(SOURCE, url).await?;
        let rows = parse_payload(payload, &args.indicator)?;
        Ok(Envelope::new("world_bank", args.indicator, rows))
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    #[serde(deserialize_with = "one_or_many")]
    countries: Vec<String>,
    indicator: String,
    #[serde(default, deserialize_with = "lenient_year")]
    start_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_year")]
    end_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Record {
    country: Label,
    date: String,
    value: Option<f64>,
    indicator: Label,
}

#[derive(Debug, Deserialize)]
struct Label {
    #[serde(default)]
    id: String,
    #[serde(default)]
    value: String,
}

fn is_indicator_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

/// The payload is `[metadata, records]`; an error reply carries only the
/// metadata element with a `message` list.
fn parse_payload(
    payload: Vec<serde_json::Value>,
    indicator: &str,
) -> Result<Vec<Row>, ToolFailure> {
    let mut parts = payload.into_iter();
    let meta = parts.next();
    let Some(data) = parts.next() else {
        let detail = meta
            .as_ref()
            .and_then(|m| m.pointer("/message/0/value"))
            .and_then(|v| v.as_str())
            .map(|v| format!(": {v}"))
            .unwrap_or_default();
        return Err(ToolFailure::transport(format!(
            "World Bank returned no data for {indicator}{detail}"
        )));
    };

    let records: Option<Vec<Record>> = serde_json::from_value(data)
        .map_err(|e| ToolFailure::transport(format!("unreadable World Bank payload: {e}")))?;

    Ok(records
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| {
            let value = r.value?;
            let year = r.date.parse().ok()?;
            let indicator = if r.indicator.id.is_empty() {
                indicator.to_string()
            } else {
                r.indicator.id
            };
            Some(Row::new(r.country.value, year, serde_json::json!(value), indicator))
        })
        .collect())
}

#[async_trait]
impl Tool for WorldBankTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            NAME,
            "Fetch a World Bank development indicator (e.g. NY.GDP.MKTP.KD.ZG for GDP growth, \
             SP.POP.TOTL for population) for one or more countries over a range of years.",
        )
        .required(
            "countries",
            PropertySchema::array_of(ParamType::String, "Country names or ISO3 codes"),
        )
        .required(
            "indicator",
            PropertySchema::string("World Bank indicator code, e.g. NY.GDP.MKTP.CD"),
        )
        .optional("start_year", PropertySchema::integer("First year (default: ten years ago)"))
        .optional("end_year", PropertySchema::integer("Last year (default: last complete year)"))
    }

    async fn invoke(&self, input: serde_json::Value) -> ToolOutcome {
        outcome(self.run(input).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::StaticReferenceData;
    use serde_json::json;
    use statroute_core::ToolFailureKind;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(base: &str) -> WorldBankTool {
        WorldBankTool::new(
            SourceClient::new(Duration::from_secs(5)).unwrap(),
            base,
            Arc::new(StaticReferenceData),
        )
    }

    fn record(country: &str, iso: &str, year: &str, value: Option<f64>) -> serde_json::Value {
        json!({
            "indicator": {"id": "NY.GDP.MKTP.KD.ZG", "value": "GDP growth (annual %)"},
            "country": {"id": &iso[..2], "value": country},
            "countryiso3code": iso,
            "date": year,
            "value": value,
            "unit": "",
            "obs_status": "",
            "decimal": 1
        })
    }

    #[tokio::test]
    async fn fetches_and_normalizes_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/country/NGA;GHA/indicator/NY.GDP.MKTP.KD.ZG"))
            .and(query_param("format", "json"))
            .and(query_param("date", "2020:2022"))
            .and(query_param("per_page", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"page": 1, "pages": 1, "per_page": 1000, "total": 4},
                [
                    record("Nigeria", "NGA", "2022", Some(3.3)),
                    record("Nigeria", "NGA", "2021", Some(3.6)),
                    record("Ghana", "GHA", "2022", None),
                    record("Ghana", "GHA", "2020", Some(0.5))
                ]
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({
                "countries": ["Nigeria", "Ghana"],
                "indicator": "NY.GDP.MKTP.KD.ZG",
                "start_year": 2020,
                "end_year": 2022
            }))
            .await;

        let ToolOutcome::Data(body) = outcome else {
            panic!("expected data, got {outcome:?}");
        };
        assert_eq!(body["source"], "world_bank");
        assert_eq!(body["count"], 3);
        assert_eq!(body["rows"][0]["year"], 2020);
        assert_eq!(body["rows"][0]["country"], "Ghana");
        assert_eq!(body["rows"][2]["value"], 3.3);
    }

    #[tokio::test]
    async fn reversed_years_are_swapped_in_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("date", "2015:2018"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{}, []])))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({
                "countries": "Kenya",
                "indicator": "SP.POP.TOTL",
                "start_year": 2018,
                "end_year": 2015
            }))
            .await;
        assert!(!outcome.is_failure());
    }

    #[tokio::test]
    async fn unknown_country_is_lookup_failure_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({"countries": ["Atlantis"], "indicator": "SP.POP.TOTL"}))
            .await;
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, ToolFailureKind::Lookup);
        assert!(failure.error.contains("Atlantis"));
    }

    #[tokio::test]
    async fn error_message_payload_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"message": [{"id": "120", "key": "Invalid value",
                              "value": "The provided parameter value is not valid"}]}
            ])))
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({"countries": ["NGA"], "indicator": "BAD.CODE"}))
            .await;
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, ToolFailureKind::Transport);
        assert!(failure.error.contains("not valid"));
    }

    #[tokio::test]
    async fn path_injection_in_indicator_is_rejected() {
        let outcome = tool("http://127.0.0.1:9")
            .invoke(json!({"countries": ["NGA"], "indicator": "../../etc"}))
            .await;
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, ToolFailureKind::InvalidArguments);
    }

    #[test]
    fn default_window_is_last_ten_complete_years() {
        assert_eq!(default_years(2026), YearRange { start: 2016, end: 2025 });
    }
}
