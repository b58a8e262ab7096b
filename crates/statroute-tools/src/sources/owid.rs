// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Our World in Data grapher charts, fetched as CSV.
//!
//! A chart CSV has the header `Entity,Code,Year,<value columns...>`. Each
//! non-empty value cell becomes one row, tagged with its column name.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use statroute_core::{ParamType, PropertySchema, ToolDefinition, ToolFailure, ToolOutcome};

use super::{
    Envelope, Row, SourceClient, YearRange, build_url, coerce_cell, lenient_year, outcome,
    optional_one_or_many, parse_args,
};
use crate::catalog::Tool;
use crate::reference::{CodeTable, ReferenceData};

pub const NAME: &str = "get_owid_series";
const SOURCE: &str = "Our World in Data";

pub struct OwidTool {
    client: SourceClient,
    base_url: String,
    reference: Arc<dyn ReferenceData>,
}

#[derive(Debug, Deserialize)]
struct Args {
    chart: String,
    #[serde(default, deserialize_with = "optional_one_or_many")]
    countries: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_year")]
    start_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_year")]
    end_year: Option<i32>,
}

/// Which entities to keep: names compared case-insensitively, or ISO3 codes.
struct EntityFilter {
    names: Vec<String>,
    codes: Vec<String>,
}

impl EntityFilter {
    fn matches(&self, entity: &str, code: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(entity.trim()))
            || (!code.is_empty() && self.codes.iter().any(|c| c == code))
    }
}

impl OwidTool {
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
        let slug = self
            .reference
            .resolve(CodeTable::OwidChart, &args.chart)
            .ok_or_else(|| {
                ToolFailure::lookup(format!("unknown OWID chart: {}", args.chart)).with_suggestion(
                    "use a grapher chart slug such as life-expectancy or co-emissions-per-capita",
                )
            })?;

        let filter = args.countries.filter(|c| !c.is_empty()).map(|names| EntityFilter {
            codes: names
                .iter()
                .filter_map(|n| self.reference.resolve(CodeTable::Iso3, n))
                .collect(),
            names,
        });
        let years = match (args.start_year, args.end_year) {
            (None, None) => None,
            (start, end) => Some(YearRange::resolve(
                start,
                end,
                YearRange {
                    start: i32::MIN,
                    end: i32::MAX,
                },
            )),
        };

        let url = build_url(&self.base_url, &format!("{slug}.csv"), &[])?;
        let body = self.client.get_text(SOURCE, url).await?;
        let (columns, rows) = parse_csv(&body, filter.as_ref(), years)?;

        if rows.is_empty() && filter.is_some() {
            return Err(ToolFailure::lookup(format!(
                "no rows in {slug} matched the requested countries"
            ))
            .with_suggestion("OWID uses English entity names such as \"United States\""));
        }
        Ok(Envelope::new("owid", slug, rows).with_columns(columns))
    }
}

fn parse_csv(
    body: &str,
    filter: Option<&EntityFilter>,
    years: Option<YearRange>,
) -> Result<(Vec<String>, Vec<Row>), ToolFailure> {
    let unreadable =
        |detail: String| ToolFailure::transport(format!("unreadable OWID CSV: {detail}"));

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers = reader.headers().map_err(|e| unreadable(e.to_string()))?.clone();

    let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let (Some(entity_idx), Some(year_idx)) = (position("Entity"), position("Year")) else {
        return Err(unreadable("missing Entity or Year column".to_string()));
    };
    let code_idx = position("Code");

    let value_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != entity_idx && *i != year_idx && Some(*i) != code_idx)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| unreadable(e.to_string()))?;
        let entity = record.get(entity_idx).unwrap_or_default();
        let code = code_idx.and_then(|i| record.get(i)).unwrap_or_default();
        let Some(year) = record.get(year_idx).and_then(|y| y.trim().parse::<i32>().ok()) else {
            continue;
        };

        if filter.is_some_and(|f| !f.matches(entity, code)) {
            continue;
        }
        if years.is_some_and(|r| !r.contains(year)) {
            continue;
        }

        for (idx, column) in &value_columns {
            let cell = record.get(*idx).unwrap_or_default();
            if cell.trim().is_empty() {
                continue;
            }
            rows.push(Row::new(entity, year, coerce_cell(cell), column));
        }
    }

    let columns = value_columns.into_iter().map(|(_, name)| name).collect();
    Ok((columns, rows))
}

#[async_trait]
impl Tool for OwidTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            NAME,
            "Fetch a time series from an Our World in Data chart (by slug or common name, \
             e.g. life-expectancy, co-emissions-per-capita), optionally filtered to countries \
             and years.",
        )
        .required(
            "chart",
            PropertySchema::string("Chart slug or common name"),
        )
        .optional(
            "countries",
            PropertySchema::array_of(ParamType::String, "Country or region names (default: all)"),
        )
        .optional("start_year", PropertySchema::integer("First year (default: all years)"))
        .optional("end_year", PropertySchema::integer("Last year (default: all years)"))
    }

    async fn invoke(&self, input: serde_json::Value) -> ToolOutcome {
        outcome(self.run(input).await)
    }
}
