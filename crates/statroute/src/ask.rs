// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `statroute ask` and `statroute batch`.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use statroute_config::StatrouteConfig;
use statroute_core::{StatrouteError, Tier};
use statroute_cost::UsageSnapshot;
use statroute_router::{Answer, InMemorySessionStore, RouteRequest, Router};
use statroute_tools::DataBridge;
use tracing::info;

/// Wire providers, tools, and the session store into a router.
pub fn build_router(config: &StatrouteConfig) -> Result<Router, StatrouteError> {
    let adapters = statroute_provider::build_adapters(config)?;
    let bridge = DataBridge::from_config(&config.data)?;
    info!(
        agent = %config.agent.name,
        tools = bridge.catalog().len(),
        "router starting"
    );
    Ok(Router::new(
        config.routing.clone(),
        adapters,
        Arc::new(bridge),
        Arc::new(InMemorySessionStore::new(config.history.max_messages)),
    ))
}

pub async fn run_ask(
    config: &StatrouteConfig,
    query: String,
    tier: Option<Tier>,
    include_tools: bool,
    json: bool,
) -> i32 {
    let router = match build_router(config) {
        Ok(router) => router,
        Err(err) => return crate::startup_error(config, &err),
    };
    let request = build_request(query, tier, include_tools);

    match router.answer(&request).await {
        Ok(answer) => {
            print_answer(&answer, json);
            0
        }
        Err(err) => {
            eprintln!("statroute: {err}");
            1
        }
    }
}

pub async fn run_batch(
    config: &StatrouteConfig,
    input: &Path,
    tier: Option<Tier>,
    json: bool,
) -> i32 {
    let queries = match read_queries(input) {
        Ok(queries) => queries,
        Err(err) => {
            eprintln!("statroute: cannot read {}: {err}", input.display());
            return 1;
        }
    };
    let router = match build_router(config) {
        Ok(router) => router,
        Err(err) => return crate::startup_error(config, &err),
    };

    let requests = queries
        .into_iter()
        .map(|q| build_request(q, tier, true))
        .collect();
    let results = router.route_batch(requests).await;

    let mut failed = 0usize;
    for (index, result) in results.iter().enumerate() {
        match result {
            Ok(answer) => {
                if !json {
                    println!("## {}", index + 1);
                }
                print_answer(answer, json);
            }
            Err(err) => {
                failed += 1;
                eprintln!("statroute: query {} failed: {err}", index + 1);
            }
        }
    }

    let usage = router.usage().await;
    eprintln!("{}", batch_footer(results.len() - failed, failed, &usage));
    if failed > 0 { 1 } else { 0 }
}

fn batch_footer(ok: usize, failed: usize, usage: &UsageSnapshot) -> String {
    let tiers = Tier::ALL
        .iter()
        .map(|&tier| format!("{tier} {}", usage.tier(tier).attempts()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "batch: {ok} ok, {failed} failed | attempts: {tiers} | total cost ${:.4}",
        usage.total_cost_usd
    )
}

fn build_request(query: String, tier: Option<Tier>, include_tools: bool) -> RouteRequest {
    let mut request = RouteRequest::new(query);
    request.forced_tier = tier;
    request.include_tools = include_tools;
    request
}

/// One query per non-empty line; lines starting with `#` are comments.
pub fn read_queries(input: &Path) -> std::io::Result<Vec<String>> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)?
    };
    Ok(parse_queries(&text))
}

fn parse_queries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn print_answer(answer: &Answer, json: bool) {
    if json {
        match serde_json::to_string_pretty(&answer.response) {
            Ok(body) => println!("{body}"),
            Err(err) => eprintln!("statroute: cannot encode response: {err}"),
        }
        return;
    }
    println!("{}", answer.response.content);
    eprintln!("{}", summary(answer));
}

/// One-line provenance footer for an answer.
fn summary(answer: &Answer) -> String {
    let response = &answer.response;
    let mut line = format!(
        "[{} via {} {} | {} tool round(s) | {} in / {} out tokens | ${:.4}]",
        response.tier_used,
        response.provider,
        response.model,
        answer.rounds,
        answer.total_usage.input_tokens,
        answer.total_usage.output_tokens,
        answer.total_usage.estimated_cost,
    );
    if let Some(original) = response.original_tier {
        line.push_str(&format!(" (fell back from {original})"));
    }
    line
}
