// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statistical data sources and the plumbing they share.
//!
//! Every source turns its upstream payload into [`Row`]s inside an
//! [`Envelope`]. Upstream trouble becomes a [`ToolFailure`] and never an
//! `Err`, so the model can read what went wrong and try something else.

pub mod comtrade;
pub mod faostat;
pub mod imf;
pub mod owid;
pub mod world_bank;

use std::time::Duration;

use chrono::Datelike;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use statroute_core::{StatrouteError, ToolFailure, ToolOutcome};
use tracing::debug;

/// One normalized observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub country: String,
    pub year: i32,
    /// A number, or text when the upstream cell is not numeric.
    pub value: serde_json::Value,
    pub indicator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Row {
    pub fn new(
        country: impl Into<String>,
        year: i32,
        value: serde_json::Value,
        indicator: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            year,
            value,
            indicator: indicator.into(),
            partner: None,
            flow: None,
            unit: None,
        }
    }
}

/// Result body returned to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub source: &'static str,
    pub indicator: String,
    pub rows: Vec<Row>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl Envelope {
    /// Build an envelope, sorting rows ascending by year.
    pub fn new(source: &'static str, indicator: impl Into<String>, mut rows: Vec<Row>) -> Self {
        rows.sort_by_key(|r| r.year);
        Self {
            source,
            indicator: indicator.into(),
            count: rows.len(),
            rows,
            columns: None,
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn into_json(self) -> serde_json::Value {
        serde_json::to_value(&self).unwrap_or_else(|e| {
            serde_json::json!({ "source": self.source, "error": e.to_string() })
        })
    }
}

/// Earliest year a source is asked to enumerate.
pub const EARLIEST_LISTED_YEAR: i32 = 1900;

/// How far past the current year an enumerated range may reach.
pub const LISTED_YEARS_AHEAD: i32 = 10;

/// Inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Fill missing bounds from `default` and swap reversed ranges.
    pub fn resolve(start: Option<i32>, end: Option<i32>, default: YearRange) -> Self {
        let start = start.unwrap_or(default.start);
        let end = end.unwrap_or(default.end);
        if start > end {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Reject ranges outside `EARLIEST_LISTED_YEAR..=current + LISTED_YEARS_AHEAD`.
    /// Sources that send one parameter per year call this before
    /// [`YearRange::comma_list`].
    pub fn listable(self, current: i32) -> Result<Self, ToolFailure> {
        let latest = current.saturating_add(LISTED_YEARS_AHEAD);
        if self.start < EARLIEST_LISTED_YEAR || self.end > latest {
            return Err(ToolFailure::invalid_arguments(format!(
                "year range {}-{} is outside {EARLIEST_LISTED_YEAR}-{latest}",
                self.start, self.end
            )));
        }
        Ok(self)
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// Comma-separated list of every year in the range.
    pub fn comma_list(&self) -> String {
        self.years()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Shared HTTP client for all sources, with the per-call data timeout.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl SourceClient {
    pub fn new(timeout: Duration) -> Result<Self, StatrouteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statroute/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StatrouteError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// GET `url` and return the body. Timeouts, non-success statuses, and
    /// connection errors become transport failures naming `source`.
    pub async fn get_text(&self, source: &str, url: reqwest::Url) -> Result<String, ToolFailure> {
        debug!(source, url = %url, "fetching data");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ToolFailure::transport(format!(
                    "{source} request timed out after {}s",
                    self.timeout.as_secs()
                ))
            } else {
                ToolFailure::transport(format!("{source} request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ToolFailure::transport(format!("{source} returned not found")));
        }
        if !status.is_success() {
            return Err(ToolFailure::transport(format!("{source} returned {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ToolFailure::transport(format!("failed to read {source} response: {e}")))
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        source: &str,
        url: reqwest::Url,
    ) -> Result<T, ToolFailure> {
        let body = self.get_text(source, url).await?;
        serde_json::from_str(&body)
            .map_err(|e| ToolFailure::transport(format!("unreadable {source} payload: {e}")))
    }
}

/// Build a URL with query parameters under `base`.
pub fn build_url(
    base: &str,
    path: &str,
    params: &[(&str, String)],
) -> Result<reqwest::Url, ToolFailure> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    reqwest::Url::parse_with_params(&raw, params)
        .map_err(|e| ToolFailure::transport(format!("invalid request URL {raw}: {e}")))
}

/// Decode tool arguments into a typed struct.
pub fn parse_args<T: DeserializeOwned>(input: serde_json::Value) -> Result<T, ToolFailure> {
    serde_json::from_value(input)
        .map_err(|e| ToolFailure::invalid_arguments(format!("invalid arguments: {e}")))
}

/// Accept either a single string or a list of strings.
pub fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// Like [`one_or_many`], for optional fields.
pub fn optional_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    one_or_many(deserializer).map(Some)
}

/// Accept a year as a JSON number or a numeric string.
pub fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Number(i32),
        Text(String),
    }

    match Option::<Year>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Year::Number(y)) => Ok(Some(y)),
        Some(Year::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid year `{s}`"))),
    }
}

/// Coerce a CSV cell: a number iff the whole cell parses as a finite float,
/// otherwise the trimmed text.
pub fn coerce_cell(cell: &str) -> serde_json::Value {
    let trimmed = cell.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(trimmed.to_string())),
        _ => serde_json::Value::String(trimmed.to_string()),
    }
}

pub fn outcome(result: Result<Envelope, ToolFailure>) -> ToolOutcome {
    match result {
        Ok(envelope) => ToolOutcome::Data(envelope.into_json()),
        Err(failure) => ToolOutcome::Failure(failure),
    }
}

/// Resolve every name in `names`, failing on the first unknown one.
pub fn resolve_all(
    reference: &dyn crate::reference::ReferenceData,
    table: crate::reference::CodeTable,
    names: &[String],
) -> Result<Vec<(String, String)>, ToolFailure> {
    if names.is_empty() {
        return Err(ToolFailure::invalid_arguments("at least one country is required"));
    }
    names
        .iter()
        .map(|name| {
            reference
                .resolve(table, name)
                .map(|code| (name.clone(), code))
                .ok_or_else(|| unknown_country(name))
        })
        .collect()
}

pub fn unknown_country(name: &str) -> ToolFailure {
    ToolFailure::lookup(format!("unknown country: {name}"))
        .with_suggestion("use an English country name or an ISO3 code such as NGA")
}
