// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FAOSTAT crops and livestock production (QCL domain).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use statroute_core::{PropertySchema, ToolDefinition, ToolFailure, ToolFailureKind, ToolOutcome};

use super::{
    Envelope, Row, SourceClient, YearRange, build_url, coerce_cell, current_year, lenient_year,
    outcome, parse_args, unknown_country,
};
use crate::catalog::Tool;
use crate::reference::{CodeTable, ReferenceData};

pub const NAME: &str = "get_fao_statistics";
const SOURCE: &str = "FAOSTAT";
const SUGGESTION: &str = "try get_owid_series for a related agricultural chart";

/// Ten years ending two years ago; FAOSTAT publishes with a lag.
pub fn default_years(current: i32) -> YearRange {
    YearRange {
        start: current - 11,
        end: current - 2,
    }
}

pub struct FaostatTool {
    client: SourceClient,
    base_url: String,
    reference: Arc<dyn ReferenceData>,
}

#[derive(Debug, Deserialize)]
struct Args {
    country: String,
    item: String,
    #[serde(default)]
    element: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    start_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_year")]
    end_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    data: Vec<Record>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Record {
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    item: Option<String>,
    #[serde(default)]
    element: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    year: Option<i32>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    value: serde_json::Value,
}

impl FaostatTool {
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
        let element_name = args.element.as_deref().unwrap_or("production");

        let area = self
            .reference
            .resolve(CodeTable::FaoArea, &args.country)
            .ok_or_else(|| unknown_country(&args.country))?;
        let item = self
            .reference
            .resolve(CodeTable::FaoItem, &args.item)
            .ok_or_else(|| {
                ToolFailure::lookup(format!("unknown FAO item: {}", args.item))
                    .with_suggestion("use a crop name such as Maize, Wheat, Rice, or Cassava")
            })?;
        let element = self
            .reference
            .resolve(CodeTable::FaoElement, element_name)
            .ok_or_else(|| {
                ToolFailure::lookup(format!("unknown FAO element: {element_name}"))
                    .with_suggestion("use Production, Yield, or Area harvested")
            })?;
        let current = current_year();
        let years = YearRange::resolve(args.start_year, args.end_year, default_years(current))
            .listable(current)?;

        let url = build_url(
            &self.base_url,
            "data/QCL",
            &[
                ("area", area),
                ("item", item),
                ("element", element),
                ("year", years.comma_list()),
            ],
        )?;
        let payload: Payload = self.client.get_json(SOURCE, url).await?;

        let indicator = format!("{} {}", args.item, element_name);
        let rows: Vec<Row> = payload
            .data
            .into_iter()
            .filter_map(|r| {
                let year = r.year?;
                let value = match r.value {
                    serde_json::Value::String(s) => coerce_cell(&s),
                    serde_json::Value::Null => return None,
                    other => other,
                };
                let label = match (&r.item, &r.element) {
                    (Some(item), Some(element)) => format!("{item} {element}"),
                    _ => indicator.clone(),
                };
                let mut row = Row::new(
                    r.area.unwrap_or_else(|| args.country.clone()),
                    year,
                    value,
                    label,
                );
                row.unit = r.unit;
                Some(row)
            })
            .collect();

        if rows.is_empty() {
            return Err(ToolFailure::transport(format!(
                "FAOSTAT returned no {indicator} data for {}",
                args.country
            )));
        }
        Ok(Envelope::new("faostat", indicator, rows))
    }
}

#[async_trait]
impl Tool for FaostatTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            NAME,
            "Fetch FAOSTAT crop statistics (production, yield, or area harvested) for a \
             country and crop.",
        )
        .required("country", PropertySchema::string("Country name"))
        .required(
            "item",
            PropertySchema::string("Crop name, e.g. Maize, Wheat, Rice, Cassava, Cocoa"),
        )
        .optional(
            "element",
            PropertySchema::string("Measure (default: production)")
                .one_of(["production", "yield", "area harvested"]),
        )
        .optional("start_year", PropertySchema::integer("First year"))
        .optional("end_year", PropertySchema::integer("Last year"))
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

    fn tool(base: &str) -> FaostatTool {
        FaostatTool::new(
            SourceClient::new(Duration::from_secs(5)).unwrap(),
            base,
            Arc::new(StaticReferenceData),
        )
    }

    #[tokio::test]
    async fn fetches_maize_production_with_units() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/QCL"))
            .and(query_param("area", "159"))
            .and(query_param("item", "56"))
            .and(query_param("element", "5510"))
            .and(query_param("year", "2021,2022"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"Area": "Nigeria", "Item": "Maize (corn)", "Element": "Production",
                     "Year": "2022", "Unit": "t", "Value": 12_745_000},
                    {"Area": "Nigeria", "Item": "Maize (corn)", "Element": "Production",
                     "Year": "2021", "Unit": "t", "Value": "12500000"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({
                "country": "Nigeria",
                "item": "Maize",
                "start_year": 2021,
                "end_year": 2022
            }))
            .await;
        let ToolOutcome::Data(body) = outcome else {
            panic!("expected data, got {outcome:?}");
        };
        assert_eq!(body["source"], "faostat");
        assert_eq!(body["count"], 2);
        assert_eq!(body["rows"][0]["year"], 2021);
        assert_eq!(body["rows"][0]["value"], 12_500_000.0);
        assert_eq!(body["rows"][1]["unit"], "t");
        assert_eq!(body["rows"][1]["indicator"], "Maize (corn) Production");
    }

    #[tokio::test]
    async fn server_error_suggests_owid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({"country": "Kenya", "item": "Wheat", "element": "yield"}))
            .await;
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert!(failure.error.contains("500"));
        assert!(failure.suggestion.unwrap().contains("get_owid_series"));
    }

    #[tokio::test]
    async fn unknown_item_is_lookup_failure() {
        let outcome = tool("http://127.0.0.1:9")
            .invoke(json!({"country": "Kenya", "item": "Unobtainium"}))
            .await;
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, ToolFailureKind::Lookup);
        assert!(failure.error.contains("Unobtainium"));
    }

    #[tokio::test]
    async fn out_of_window_years_are_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = tool(&server.uri())
            .invoke(json!({
                "country": "Kenya",
                "item": "Maize",
                "start_year": -5_000_000,
                "end_year": 5_000_000
            }))
            .await;
        let ToolOutcome::Failure(failure) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(failure.kind, ToolFailureKind::InvalidArguments);
        assert!(failure.suggestion.is_none());
    }

    #[test]
    fn default_window_ends_two_years_back() {
        assert_eq!(default_years(2026), YearRange { start: 2015, end: 2024 });
    }
}
