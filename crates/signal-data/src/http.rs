//! Shared REST plumbing for exchange connectors.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use signal_core::error::DataError;
use std::time::Duration;
use tracing::debug;

/// Decoded response of a public endpoint.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    /// Generic failure for a non-success status the connector did not map.
    pub fn into_upstream(self) -> DataError {
        DataError::Upstream(format!("HTTP {}: {}", self.status, self.body))
    }
}

/// Build the HTTP client owned by one connector.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, DataError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(DataError::upstream)
}

/// GET a public JSON endpoint.
///
/// Transport failures and undecodable bodies are `Upstream`. The status is
/// returned alongside the body so connectors can map exchange error codes;
/// a non-JSON error page (403/451 geo blocks, 418/429 rate limits) becomes
/// `Upstream` directly.
pub(crate) async fn get_json(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<Reply, DataError> {
    debug!("GET {} {:?}", url, query);

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(DataError::upstream)?;

    let status = response.status();
    let text = response.text().await.map_err(DataError::upstream)?;

    match serde_json::from_str(&text) {
        Ok(body) => Ok(Reply { status, body }),
        Err(_) if !status.is_success() => Err(DataError::Upstream(format!("HTTP {}", status))),
        Err(e) => Err(DataError::Upstream(format!("Invalid JSON from {}: {}", url, e))),
    }
}

/// Read a number that exchanges encode either as a JSON number or a string.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Integer variant of [`as_f64`].
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f as i64)),
        _ => None,
    }
}

/// Payload that did not have the expected shape.
pub(crate) fn malformed(what: &str) -> DataError {
    DataError::Upstream(format!("Malformed {} payload", what))
}
