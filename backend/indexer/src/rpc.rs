//! Soroban RPC client: polls `getEvents` and decodes custody protocol events.
//!
//! Events are requested with `xdrFormat: "json"`, so topics and data arrive
//! as JSON-rendered `ScVal`s instead of base64 XDR.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//! * JSON-RPC codes `-32600` / `-32601` are malformed-request errors and are
//!   surfaced instead of retried.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{CustodyEvent, EventKind};

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

/// One event as returned by `getEvents` with `xdrFormat: "json"`.
///
/// Topics and data arrive as JSON-rendered `ScVal`s, e.g.
/// `{"symbol":"invested"}`, `{"u64":"42"}` or `{"map":[{"key":..,"val":..}]}`.
#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    #[serde(rename = "topicJson", default)]
    pub topic: Vec<Value>,
    #[serde(rename = "valueJson", default)]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// One page of `getEvents`.
#[derive(Debug)]
pub struct EventsPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`: optional opaque pagination cursor from a previous response.
/// * `limit`: maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventsPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.secs);
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs, err.code, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventsPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn is_hard_error(code: i64) -> bool {
    code == -32600 || code == -32601
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

/// Decode a list of raw RPC events into [`CustodyEvent`] structs.
///
/// Events from failed contract calls are dropped; they never changed state.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<CustodyEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<CustodyEvent> {
    let Some(symbol) = raw.topic.first().and_then(scalar) else {
        warn!("Skipping event without a symbol topic: {:?}", raw.id);
        return None;
    };
    let kind = EventKind::from_topic(&symbol);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let project_id = raw.topic.get(1).and_then(scalar);
    let decoded = decode_data(&raw.value, kind);
    let tx_hash = raw.tx_hash.as_deref().map(normalize_tx_hash);

    let event_id = raw.id.clone().unwrap_or_else(|| {
        fallback_event_id(
            ledger,
            tx_hash.as_deref(),
            kind,
            project_id.as_deref(),
            decoded.tx_index,
        )
    });

    Some(CustodyEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        project_id,
        tx_index: decoded.tx_index,
        actor: decoded.actor,
        amount: decoded.amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash,
    })
}

/// Dedup key for events the RPC returned without an id.
fn fallback_event_id(
    ledger: i64,
    tx_hash: Option<&str>,
    kind: EventKind,
    project_id: Option<&str>,
    tx_index: Option<i64>,
) -> String {
    format!(
        "{ledger}:{}:{}:{}:{}",
        tx_hash.unwrap_or("-"),
        kind.as_str(),
        project_id.unwrap_or("-"),
        tx_index.map(|i| i.to_string()).unwrap_or_else(|| "-".into()),
    )
}

#[derive(Debug, Default, PartialEq)]
struct DecodedData {
    actor: Option<String>,
    amount: Option<String>,
    tx_index: Option<i64>,
}

/// Pull apart the event data. Every contract event carries one of the
/// contract's structs, which the RPC renders as an `ScVal` map keyed by
/// field name.
fn decode_data(value: &Value, kind: EventKind) -> DecodedData {
    let tx_index = if kind.is_transaction() {
        field(value, "index").and_then(|s| s.parse().ok())
    } else {
        None
    };

    let (actor, amount) = match kind {
        EventKind::ProjectCreated => (field(value, "owner"), field(value, "min_capital")),
        EventKind::Invested => (field(value, "financier"), field(value, "amount")),
        EventKind::ProjectFunded => (None, field(value, "total_invested")),
        EventKind::ProjectExpired => (None, None),
        EventKind::TransactionCreated => (field(value, "owner"), field(value, "value")),
        EventKind::TransactionSigned => (field(value, "signer"), None),
        // For payouts the interesting party is the recipient.
        EventKind::TransactionExecuted => (field(value, "to"), field(value, "value")),
        EventKind::TransactionRevoked => (field(value, "owner"), None),
        EventKind::Unknown => (None, None),
    };

    DecodedData {
        actor,
        amount,
        tx_index,
    }
}

// ─────────────────────────────────────────────────────────
// ScVal JSON helpers
// ─────────────────────────────────────────────────────────

/// Look up `key` in an `ScVal` map and render its value as a scalar.
fn field(value: &Value, key: &str) -> Option<String> {
    value
        .get("map")?
        .as_array()?
        .iter()
        .find(|entry| entry.get("key").and_then(scalar).as_deref() == Some(key))
        .and_then(|entry| entry.get("val"))
        .and_then(scalar)
}

/// Render a scalar `ScVal` (symbol, string, address or integer) as a string.
/// Containers and `void` yield `None`.
fn scalar(value: &Value) -> Option<String> {
    let Value::Object(map) = value else {
        return None;
    };
    let (tag, inner) = map.iter().next()?;
    match tag.as_str() {
        "symbol" | "string" | "address" => inner.as_str().map(String::from),
        "u32" | "i32" | "u64" | "i64" | "u128" | "i128" | "timepoint" | "duration" => {
            integer(inner)
        }
        _ => None,
    }
}

/// Integers come as JSON numbers, decimal strings, or (128-bit, older RPCs)
/// `{"hi": .., "lo": ..}` parts.
fn integer(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => s.parse::<i128>().ok().map(|n| n.to_string()),
        Value::Object(parts) => {
            let hi = parts.get("hi").and_then(integer)?.parse::<i128>().ok()?;
            let lo = parts.get("lo").and_then(integer)?.parse::<u64>().ok()?;
            Some(((hi << 64) | i128::from(lo)).to_string())
        }
        _ => None,
    }
}

/// Lower-case a 32-byte hex transaction hash; anything else is kept verbatim.
fn normalize_tx_hash(raw: &str) -> String {
    match hex::decode(raw) {
        Ok(bytes) if bytes.len() == 32 => hex::encode(bytes),
        _ => raw.to_string(),
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
