//! Soroban RPC client: polls `getEvents` and decodes escrow events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//!
//! ## Decoding
//!
//! Events are requested with `xdrFormat: "json"`, so topics and values arrive
//! as tagged ScVal JSON (`{"symbol":"funded"}`, `{"map":[{"key":…,"val":…}]}`).
//! [`flatten_scval`] turns that into plain JSON before fields are picked out.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::errors::{AuditorError, Result};
use crate::events::{CampaignStatus, EscrowEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// Topic list (ScVal JSON, or JSON-encoded strings on older RPCs)
    #[serde(alias = "topicJson")]
    pub topic: Vec<Value>,
    /// Event value / data
    #[serde(alias = "valueJson")]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    /// Unique event identity assigned by the RPC.
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`      : optional opaque pagination cursor from a previous response.
/// * `limit`       : maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                continue;
            }
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    warn!("Rate-limited by RPC (will retry in {backoff}s)");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let body: RpcResponse = resp.json().await?;

                if let Some(err) = body.error {
                    // Code -32600 / -32601 are hard failures; everything else we retry
                    if err.code == -32600 || err.code == -32601 {
                        return Err(AuditorError::EventParse(format!(
                            "RPC hard error {}: {}",
                            err.code, err.message
                        )));
                    }
                    warn!(
                        "RPC soft error (will retry in {backoff}s): {} {}",
                        err.code, err.message
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let result = body.result.ok_or_else(|| {
                    AuditorError::EventParse("Empty result from getEvents".to_string())
                })?;

                debug!(
                    "Fetched {} events (latest_ledger={:?})",
                    result.events.len(),
                    result.latest_ledger
                );

                return Ok((result.events, result.cursor, result.latest_ledger));
            }
        }
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`EscrowEvent`] structs.
///
/// Events without an identity, or emitted by failed contract calls, are
/// dropped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<EscrowEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<EscrowEvent> {
    let Some(event_id) = raw.id.clone().or_else(|| raw.paging_token.clone()) else {
        warn!("Skipping event without id (tx {:?})", raw.tx_hash);
        return None;
    };

    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let campaign_id = raw
        .topic
        .get(1)
        .and_then(extract_u64)
        .and_then(|id| i64::try_from(id).ok());

    let data = flatten_scval(&raw.value);
    let (actor, amount, detail) = decode_data(&data, kind);

    Some(EscrowEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        campaign_id,
        actor,
        amount,
        detail,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.as_deref().map(normalize_tx_hash),
    })
}

/// Pick `(actor, amount, detail)` out of a flattened event payload.
fn decode_data(value: &Value, kind: EventKind) -> (Option<String>, Option<String>, Option<String>) {
    match kind {
        EventKind::CampaignCreated => (
            extract_field(value, &["researcher", "address"]),
            extract_field(value, &["funding_goal", "goal"]),
            extract_field(value, &["deadline"]),
        ),
        EventKind::CampaignFunded => (
            extract_field(value, &["backer", "funder", "address"]),
            extract_field(value, &["amount"]),
            extract_field(value, &["total_funded"]),
        ),
        EventKind::CampaignFinalized => {
            let outcome = extract_field(value, &["state", "final_state"])
                .and_then(|s| s.parse::<u64>().ok())
                .and_then(CampaignStatus::from_discriminant)
                .map(|s| s.as_str().to_string());
            (None, extract_field(value, &["total_funded"]), outcome)
        }
        EventKind::FundsWithdrawn => (
            extract_field(value, &["researcher", "address"]),
            extract_field(value, &["amount"]),
            None,
        ),
        EventKind::RefundClaimed => (
            extract_field(value, &["backer", "address"]),
            extract_field(value, &["amount"]),
            None,
        ),
        EventKind::ResearchUpdate => (
            extract_field(value, &["researcher", "address"]),
            None,
            extract_field(value, &["content_ref", "ipfs_hash"]),
        ),
        EventKind::Unknown => (None, None, None),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(key) {
            let s = match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            };
            if s.is_some() {
                return s;
            }
        }
    }
    None
}

/// Convert tagged ScVal JSON into plain JSON.
///
/// Scalars become strings or numbers, `vec` becomes an array and `map`
/// becomes an object keyed by the flattened key. Legacy
/// `{"type": …, "value": …}` wrappers and already-plain JSON pass through.
pub fn flatten_scval(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            if map.len() == 2 && map.contains_key("type") {
                if let Some(inner) = map.get("value") {
                    return flatten_scval(inner);
                }
            }
            if map.len() == 1 {
                if let Some((tag, inner)) = map.iter().next() {
                    if let Some(flat) = flatten_tagged(tag, inner) {
                        return flat;
                    }
                }
            }
            Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), flatten_scval(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(flatten_scval).collect()),
        other => other.clone(),
    }
}

fn flatten_tagged(tag: &str, inner: &Value) -> Option<Value> {
    match tag {
        "symbol" | "string" | "address" | "bytes" | "bool" => Some(inner.clone()),
        "u32" | "i32" | "u64" | "i64" | "timepoint" | "duration" | "u128" | "i128" => {
            Some(integer_value(inner))
        }
        "vec" => Some(Value::Array(
            inner
                .as_array()
                .map(|items| items.iter().map(flatten_scval).collect())
                .unwrap_or_default(),
        )),
        "map" => {
            let mut out = Map::new();
            for entry in inner.as_array().into_iter().flatten() {
                let key = entry.get("key").map(flatten_scval);
                let val = entry.get("val").map(flatten_scval);
                if let (Some(key), Some(val)) = (key, val) {
                    let key = match key {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    out.insert(key, val);
                }
            }
            Some(Value::Object(out))
        }
        _ => None,
    }
}

/// Integers are normalised to decimal strings; 128-bit values may arrive as
/// `{"hi": …, "lo": …}` parts.
fn integer_value(inner: &Value) -> Value {
    match inner {
        Value::Number(n) => Value::String(n.to_string()),
        Value::String(s) => Value::String(s.clone()),
        Value::Object(parts) => {
            let hi = parts.get("hi").and_then(|v| v.as_i64());
            let lo = parts.get("lo").and_then(|v| v.as_u64());
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    Value::String((((hi as i128) << 64) | lo as i128).to_string())
                }
                _ => inner.clone(),
            }
        }
        other => other.clone(),
    }
}

/// Extract a Soroban Symbol from a topic entry.
/// The RPC may return `{"symbol":"created"}`, `{"type":"symbol","value":"created"}`,
/// a JSON-encoded string of either, or just the raw string.
fn extract_symbol(raw: &Value) -> String {
    match raw {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v @ Value::Object(_)) => extract_symbol(&v),
            // Fallback: treat the raw string as the symbol
            _ => s.clone(),
        },
        other => match flatten_scval(other) {
            Value::String(s) => s,
            flat => flat.to_string(),
        },
    }
}

/// Extract the campaign id from a topic entry that might be ScVal JSON,
/// a JSON-encoded string or a bare number.
fn extract_u64(raw: &Value) -> Option<u64> {
    let flat = match raw {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v) => flatten_scval(&v),
            Err(_) => Value::String(s.clone()),
        },
        other => flatten_scval(other),
    };
    match flat {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Lower-case a hex transaction hash so the same transaction always stores
/// the same way. Non-hex input is kept verbatim.
fn normalize_tx_hash(raw: &str) -> String {
    match hex::decode(raw.trim()) {
        Ok(bytes) => hex::encode(bytes),
        Err(_) => raw.to_string(),
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
