//! Kraken spot market data.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use signal_core::error::DataError;
use signal_core::subscription::Subscription;
use signal_core::traits::ExchangeConnector;
use signal_core::types::{Bar, Timeframe};
use std::collections::BTreeSet;
use tracing::debug;

use crate::http::{self, as_f64, as_i64, malformed};
use crate::registry::ConnectorSettings;
use crate::symbol;
use crate::ws::{Frame, Heartbeat, KlineStream};

const REST_URL: &str = "https://api.kraken.com";
const WS_URL: &str = "wss://ws.kraken.com";

/// Kraken's own asset codes that differ from the common ones.
const ASSET_ALIASES: [(&str, &str); 2] = [("BTC", "XBT"), ("DOGE", "XDG")];

/// Kraken connector.
pub struct KrakenConnector {
    client: Client,
    settings: ConnectorSettings,
}

impl KrakenConnector {
    pub fn new(settings: ConnectorSettings) -> Result<Self, DataError> {
        Ok(Self {
            client: http::build_client(settings.request_timeout)?,
            settings,
        })
    }

    /// Interval in minutes. Kraken has no monthly candles.
    fn interval(timeframe: Timeframe) -> Option<u64> {
        match timeframe {
            Timeframe::Monthly => None,
            other => Some(other.as_minutes()),
        }
    }

    fn require_interval(symbol: &str, timeframe: Timeframe) -> Result<u64, DataError> {
        Self::interval(timeframe).ok_or_else(|| {
            DataError::invalid_symbol(symbol, format!("kraken has no {} interval", timeframe))
        })
    }
}

fn to_kraken_asset(asset: &str) -> &str {
    ASSET_ALIASES
        .iter()
        .find(|(common, _)| *common == asset)
        .map(|(_, kraken)| *kraken)
        .unwrap_or(asset)
}

fn from_kraken_asset(asset: &str) -> &str {
    ASSET_ALIASES
        .iter()
        .find(|(_, kraken)| *kraken == asset)
        .map(|(common, _)| *common)
        .unwrap_or(asset)
}

/// `BTC/USD` -> `XBT/USD`, the form the WebSocket API uses.
pub(crate) fn ws_pair(unified: &str) -> String {
    match symbol::split(unified) {
        Some((base, quote)) => format!("{}/{}", to_kraken_asset(&base), to_kraken_asset(&quote)),
        None => unified.trim().to_uppercase(),
    }
}

/// `BTC/USD` -> `XBTUSD`, the form the REST API accepts.
pub(crate) fn rest_pair(unified: &str) -> String {
    ws_pair(unified).replace('/', "")
}

/// Kraken reports failures in an `error` array even with HTTP 200.
fn check_errors(symbol: Option<&str>, body: &Value) -> Result<(), DataError> {
    let errors: Vec<&str> = body
        .get("error")
        .and_then(Value::as_array)
        .map(|errors| errors.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if errors.is_empty() {
        return Ok(());
    }

    let message = errors.join("; ");
    let symbol_rejected = errors
        .iter()
        .any(|e| e.starts_with("EQuery:Unknown asset pair") || e.starts_with("EGeneral:Invalid arguments"));

    match symbol {
        Some(symbol) if symbol_rejected => Err(DataError::invalid_symbol(symbol, message)),
        _ => Err(DataError::Upstream(format!("Kraken API error: {}", message))),
    }
}

/// Parse `GET /0/public/OHLC`.
///
/// The result holds one pair-keyed array of
/// `[time, "open", "high", "low", "close", "vwap", "volume", count]` rows with
/// `time` in seconds, plus a `last` cursor.
pub(crate) fn parse_ohlc(body: &Value) -> Result<Vec<Bar>, DataError> {
    let result = body
        .get("result")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("OHLC"))?;

    let rows = result
        .iter()
        .find(|(key, _)| key.as_str() != "last")
        .and_then(|(_, rows)| rows.as_array())
        .ok_or_else(|| malformed("OHLC"))?;

    rows.iter()
        .map(|row| {
            let field = |i: usize| row.get(i).ok_or_else(|| malformed("OHLC row"));
            Ok(Bar::new(
                as_i64(field(0)?).ok_or_else(|| malformed("OHLC time"))? * 1000,
                as_f64(field(1)?).ok_or_else(|| malformed("OHLC open"))?,
                as_f64(field(2)?).ok_or_else(|| malformed("OHLC high"))?,
                as_f64(field(3)?).ok_or_else(|| malformed("OHLC low"))?,
                as_f64(field(4)?).ok_or_else(|| malformed("OHLC close"))?,
                as_f64(field(6)?).ok_or_else(|| malformed("OHLC volume"))?,
            ))
        })
        .collect()
}

/// Parse `GET /0/public/AssetPairs` into unified symbols via each pair's `wsname`.
pub(crate) fn parse_asset_pairs(body: &Value) -> Result<BTreeSet<String>, DataError> {
    let pairs = body
        .get("result")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("AssetPairs"))?;

    Ok(pairs
        .values()
        .filter(|p| p.get("status").and_then(Value::as_str).unwrap_or("online") == "online")
        .filter_map(|p| {
            let wsname = p.get("wsname")?.as_str()?;
            let (base, quote) = wsname.split_once('/')?;
            Some(symbol::unify(from_kraken_asset(base), from_kraken_asset(quote)))
        })
        .collect())
}

/// Parse a v1 public WebSocket frame.
///
/// OHLC updates are arrays
/// `[channelID, [time, etime, o, h, l, c, vwap, volume, count], "ohlc-<minutes>", pair]`
/// where `etime` closes the interval; everything else is an event object.
pub(crate) fn parse_stream_frame(text: &str) -> Result<Frame, DataError> {
    let value: Value = serde_json::from_str(text).map_err(DataError::upstream)?;

    if let Some(event) = value.get("event").and_then(Value::as_str) {
        let failed = value.get("status").and_then(Value::as_str) == Some("error");
        if event == "subscriptionStatus" && failed {
            let reason = value
                .get("errorMessage")
                .and_then(Value::as_str)
                .unwrap_or("subscription refused");
            return Ok(Frame::Rejected(reason.to_string()));
        }
        return Ok(Frame::Ignored);
    }

    let Some(message) = value.as_array() else {
        return Ok(Frame::Ignored);
    };
    let channel = message.get(2).and_then(Value::as_str).unwrap_or_default();
    let Some(minutes) = channel.strip_prefix("ohlc-") else {
        return Ok(Frame::Ignored);
    };
    let minutes: i64 = minutes.parse().map_err(|_| malformed("ohlc channel"))?;

    let candle = message
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("ohlc update"))?;
    let field = |i: usize| candle.get(i).ok_or_else(|| malformed("ohlc update"));

    let end_secs = as_i64(field(1)?).ok_or_else(|| malformed("ohlc end time"))?;
    let bar = Bar::new(
        (end_secs - minutes * 60) * 1000,
        as_f64(field(2)?).ok_or_else(|| malformed("ohlc open"))?,
        as_f64(field(3)?).ok_or_else(|| malformed("ohlc high"))?,
        as_f64(field(4)?).ok_or_else(|| malformed("ohlc low"))?,
        as_f64(field(5)?).ok_or_else(|| malformed("ohlc close"))?,
        as_f64(field(7)?).ok_or_else(|| malformed("ohlc volume"))?,
    );
    Ok(Frame::Bars(vec![bar]))
}

#[async_trait]
impl ExchangeConnector for KrakenConnector {
    fn id(&self) -> &str {
        "kraken"
    }

    fn supports_timeframe(&self, timeframe: Timeframe) -> bool {
        Self::interval(timeframe).is_some()
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError> {
        let interval = Self::require_interval(symbol, timeframe)?;
        let url = format!("{}/0/public/OHLC", REST_URL);
        let query = [("pair", rest_pair(symbol)), ("interval", interval.to_string())];

        let reply = http::get_json(&self.client, &url, &query).await?;
        check_errors(Some(symbol), &reply.body)?;
        if !reply.status.is_success() {
            return Err(reply.into_upstream());
        }

        // No limit parameter; the endpoint always serves up to 720 rows.
        let mut bars = parse_ohlc(&reply.body)?;
        let excess = bars.len().saturating_sub(limit);
        bars.drain(..excess);
        debug!("kraken returned {} candles for {}", bars.len(), symbol);
        Ok(bars)
    }

    async fn watch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Subscription, DataError> {
        let interval = Self::require_interval(symbol, timeframe)?;
        let request = |event: &str| {
            serde_json::json!({
                "event": event,
                "pair": [ws_pair(symbol)],
                "subscription": {"name": "ohlc", "interval": interval}
            })
            .to_string()
        };

        KlineStream {
            url: WS_URL.to_string(),
            symbol: symbol.to_string(),
            subscribe: Some(request("subscribe")),
            unsubscribe: Some(request("unsubscribe")),
            heartbeat: Some(Heartbeat {
                every: self.settings.ping_interval,
                message: serde_json::json!({"event": "ping"}).to_string(),
            }),
            parse: parse_stream_frame,
        }
        .open(self.settings.channel_buffer)
        .await
    }

    async fn load_markets(&self) -> Result<BTreeSet<String>, DataError> {
        let url = format!("{}/0/public/AssetPairs", REST_URL);
        let reply = http::get_json(&self.client, &url, &[]).await?;
        check_errors(None, &reply.body)?;
        if !reply.status.is_success() {
            return Err(reply.into_upstream());
        }
        parse_asset_pairs(&reply.body)
    }
}
