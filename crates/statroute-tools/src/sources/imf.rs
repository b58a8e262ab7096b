// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! IMF DataMapper API (World Economic Outlook series, including forecasts).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use statroute_core::{
    ParamType, PropertySchema, ToolDefinition, ToolFailure, ToolFailureKind, ToolOutcome,
};

use super::{
    Envelope, Row, SourceClient, YearRange, build_url, current_year, lenient_year, one_or_many,
    outcome, parse_args, resolve_all,
};
use crate::catalog::Tool;
use crate::reference::{CodeTable, ReferenceData};

pub const NAME: &str = "get_imf_indicator";
const SOURCE: &str = "IMF";
const SUGGESTION: &str = "try get_world_bank_indicator for historical figures";

/// Supported DataMapper indicators and their labels.
pub const INDICATORS: &[(&str, &str)] = &[
    ("NGDP_RPCH", "Real GDP growth (annual %)"),
    ("PCPIPCH", "Inflation, average consumer prices (annual %)"),
    ("LUR", "Unemployment rate (%)"),
    ("GGXWDG_NGDP", "General government gross debt (% of GDP)"),
    ("BCA_NGDPD", "Current account balance (% of GDP)"),
];

/// Four years back through two years of forecasts.
pub fn default_years(current: i32) -> YearRange {
    YearRange {
        start: current - 4,
        end: current + 2,
    }
}

pub struct ImfTool {
    client: SourceClient,
    base_url: String,
    reference: Arc<dyn ReferenceData>,
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

/// `{"values": {INDICATOR: {ISO3: {"2024": 3.1}}}}`
#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    values: Option<HashMap<String, HashMap<String, BTreeMap<String, Option<f64>>>>>,
}

impl ImfTool {
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
        let indicator = args.indicator.trim().to_ascii_uppercase();
        if !INDICATORS.iter().any(|(code, _)| *code == indicator) {
            return Err(ToolFailure::invalid_arguments(format!(
                "unsupported IMF indicator: {}",
                args.indicator
            )));
        }

        let countries = resolve_all(&*self.reference, CodeTable::Iso3, &args.countries)?;
        let current = current_year();
        let years = YearRange::resolve(args.start_year, args.end_year, default_years(current))
            .listable(current)?;
        let codes = countries
            .iter()
            .map(|(_, code)| code.as_str())
            .collect::<Vec<_>>()
            .join("/");

        let url = build_url(
            &self.base_url,
            &format!("{indicator}/{codes}"),
            &[("periods", years.comma_list())],
        )?;
        let payload: Payload = self.client.get_json(SOURCE, url).await?;

        let series = payload
            .values
            .and_then(|mut v| v.remove(&indicator))
            .ok_or_else(|| {
                ToolFailure::transport(format!("IMF returned no data for {indicator}"))
            })?;

        let mut rows = Vec::new();
        for (name, code) in &countries {
            let Some(by_year) = series.get(code) else {
                continue;
            };
            for (year, value) in by_year {
                let (Ok(year), Some(value)) = (year.parse::<i32>(), value) else {
                    continue;
                };
                if years.contains(year) {
                    rows.push(Row::new(name, year, serde_json::json!(value), &indicator));
                }
            }
        }
        Ok(Envelope::new("imf", indicator, rows))
    }
}

#[async_trait]
impl Tool for ImfTool {
    fn definition(&self) -> ToolDefinition {
        let codes = INDICATORS.iter().map(|(code, _)| *code);
        let labels = INDICATORS
            .iter()
            .map(|(code, label)| format!("{code} = {label}"))
            .collect::<Vec<_>>()
            .join("; ");
        ToolDefinition::new(
            NAME,
            format!(
                "Fetch IMF World Economic Outlook figures, including forecasts for the next \
                 two years. Indicators: {labels}."
            ),
        )
        .required(
            "countries",
            PropertySchema::array_of(ParamType::String, "Country names or ISO3 codes"),
        )
        .required(
            "indicator",
            PropertySchema::string("IMF indicator code").one_of(codes),
        )
        .optional("start_year", PropertySchema::integer("First year (default: four years ago)"))
        .optional("end_year", PropertySchema::integer("Last year (default: two years ahead)"))
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
