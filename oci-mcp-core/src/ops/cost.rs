//! Tenancy cost summary over the usage API

use super::snake_case_keys;
use crate::client::{CloudClients, RequestSummarizedUsagesDetails};
use crate::error::{OciMcpError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Granularity used when the caller gives none
pub const DEFAULT_GRANULARITY: &str = "DAILY";

/// Look-back used when no start is given
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Time window of a cost query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Result of `get_tenancy_cost_summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub start: String,
    pub end: String,
    pub granularity: String,
    pub total_computed_amount: f64,
    pub items: Vec<Value>,
}

/// Parse RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (UTC) or `YYYY-MM-DD`
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(OciMcpError::invalid_argument(format!(
        "Invalid timestamp '{}': expected ISO 8601",
        input
    )))
}

/// End defaults to `now`; start defaults to end minus seven days
pub fn resolve_window(
    start_time_iso: Option<&str>,
    end_time_iso: Option<&str>,
    now: DateTime<Utc>,
) -> Result<CostWindow> {
    let end = match end_time_iso.filter(|s| !s.is_empty()) {
        Some(text) => parse_timestamp(text)?,
        None => now,
    };
    let start = match start_time_iso.filter(|s| !s.is_empty()) {
        Some(text) => parse_timestamp(text)?,
        None => end - Duration::days(DEFAULT_WINDOW_DAYS),
    };
    Ok(CostWindow { start, end })
}

fn utc_text(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Sum of `computed_amount`; missing or null rows count as zero
fn total_computed_amount(items: &[Value]) -> f64 {
    items
        .iter()
        .filter_map(|row| row.get("computed_amount").and_then(Value::as_f64))
        .sum()
}

/// One summarized usage request grouped by service
pub async fn get_tenancy_cost_summary(
    clients: &dyn CloudClients,
    start_time_iso: Option<&str>,
    end_time_iso: Option<&str>,
    granularity: Option<&str>,
) -> Result<CostSummary> {
    let usage = clients.usage()?;
    let window = resolve_window(start_time_iso, end_time_iso, Utc::now())?;
    let granularity = granularity
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GRANULARITY)
        .to_string();

    let details = RequestSummarizedUsagesDetails::cost_by_service(
        clients.tenancy_id(),
        window.start,
        window.end,
        granularity.clone(),
    );
    let aggregation = usage.request_summarized_usages(&details).await?;

    let items: Vec<Value> = aggregation.items.into_iter().map(snake_case_keys).collect();
    let total = total_computed_amount(&items);
    debug!(rows = items.len(), total, "Cost summary");

    Ok(CostSummary {
        start: utc_text(window.start),
        end: utc_text(window.end),
        granularity,
        total_computed_amount: total,
        items,
    })
}
