//! Bybit v5 spot market data.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
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

const REST_URL: &str = "https://api.bybit.com";
const WS_URL: &str = "wss://stream.bybit.com/v5/public/spot";
const MAX_KLINES: usize = 1000;

/// retCode for an invalid request parameter, which covers unknown symbols.
const PARAMS_ERROR: i64 = 10001;

/// Bybit API response wrapper
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    #[serde(default)]
    result: Value,
}

/// Bybit spot connector.
pub struct BybitConnector {
    client: Client,
    settings: ConnectorSettings,
}

impl BybitConnector {
    pub fn new(settings: ConnectorSettings) -> Result<Self, DataError> {
        Ok(Self {
            client: http::build_client(settings.request_timeout)?,
            settings,
        })
    }

    fn interval(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::Minute1 => "1",
            Timeframe::Minute5 => "5",
            Timeframe::Minute15 => "15",
            Timeframe::Minute30 => "30",
            Timeframe::Hour1 => "60",
            Timeframe::Hour4 => "240",
            Timeframe::Daily => "D",
            Timeframe::Weekly => "W",
            Timeframe::Monthly => "M",
        }
    }

    /// Unwrap the v5 envelope, mapping `retCode` to a data error.
    async fn get_result(
        &self,
        path: &str,
        query: &[(&str, String)],
        symbol: Option<&str>,
    ) -> Result<Value, DataError> {
        let url = format!("{}{}", REST_URL, path);
        let reply = http::get_json(&self.client, &url, query).await?;
        if !reply.status.is_success() {
            return Err(reply.into_upstream());
        }

        let envelope: Envelope =
            serde_json::from_value(reply.body).map_err(|_| malformed("bybit response"))?;
        match (envelope.ret_code, symbol) {
            (0, _) => Ok(envelope.result),
            (PARAMS_ERROR, Some(symbol)) => Err(DataError::invalid_symbol(symbol, envelope.ret_msg)),
            (code, _) => Err(DataError::Upstream(format!(
                "Bybit API error {}: {}",
                code, envelope.ret_msg
            ))),
        }
    }
}

/// Parse the kline `result`; rows are `["start", "o", "h", "l", "c", "volume", "turnover"]`, newest first.
pub(crate) fn parse_klines(result: &Value) -> Result<Vec<Bar>, DataError> {
    let rows = result
        .get("list")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("kline"))?;

    let mut bars = rows
        .iter()
        .map(|row| {
            let field = |i: usize| row.get(i).ok_or_else(|| malformed("kline row"));
            Ok(Bar::new(
                as_i64(field(0)?).ok_or_else(|| malformed("kline start"))?,
                as_f64(field(1)?).ok_or_else(|| malformed("kline open"))?,
                as_f64(field(2)?).ok_or_else(|| malformed("kline high"))?,
                as_f64(field(3)?).ok_or_else(|| malformed("kline low"))?,
                as_f64(field(4)?).ok_or_else(|| malformed("kline close"))?,
                as_f64(field(5)?).ok_or_else(|| malformed("kline volume"))?,
            ))
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    bars.reverse();
    Ok(bars)
}

/// Parse the instruments-info `result` into unified symbols.
pub(crate) fn parse_instruments(result: &Value) -> Result<BTreeSet<String>, DataError> {
    let list = result
        .get("list")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("instruments-info"))?;

    Ok(list
        .iter()
        .filter(|i| i.get("status").and_then(Value::as_str) == Some("Trading"))
        .filter_map(|i| {
            let base = i.get("baseCoin")?.as_str()?;
            let quote = i.get("quoteCoin")?.as_str()?;
            Some(symbol::unify(base, quote))
        })
        .collect())
}

/// Parse a public-channel frame.
///
/// Kline pushes carry `topic: "kline.<iv>.<symbol>"` and a `data` array;
/// operation replies carry `success`, false when the topic was refused.
pub(crate) fn parse_stream_frame(text: &str) -> Result<Frame, DataError> {
    let value: Value = serde_json::from_str(text).map_err(DataError::upstream)?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = value
            .get("ret_msg")
            .and_then(Value::as_str)
            .unwrap_or("subscription refused");
        return Ok(Frame::Rejected(reason.to_string()));
    }

    let is_kline = value
        .get("topic")
        .and_then(Value::as_str)
        .is_some_and(|t| t.starts_with("kline."));
    if !is_kline {
        return Ok(Frame::Ignored);
    }

    let data = value
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("kline push"))?;

    let bars = data
        .iter()
        .map(|k| {
            let field = |name: &str| k.get(name).ok_or_else(|| malformed("kline push"));
            Ok(Bar::new(
                as_i64(field("start")?).ok_or_else(|| malformed("kline push start"))?,
                as_f64(field("open")?).ok_or_else(|| malformed("kline push open"))?,
                as_f64(field("high")?).ok_or_else(|| malformed("kline push high"))?,
                as_f64(field("low")?).ok_or_else(|| malformed("kline push low"))?,
                as_f64(field("close")?).ok_or_else(|| malformed("kline push close"))?,
                as_f64(field("volume")?).ok_or_else(|| malformed("kline push volume"))?,
            ))
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    Ok(Frame::Bars(bars))
}

#[async_trait]
impl ExchangeConnector for BybitConnector {
    fn id(&self) -> &str {
        "bybit"
    }

    fn supports_timeframe(&self, _timeframe: Timeframe) -> bool {
        true
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError> {
        let query = [
            ("category", "spot".to_string()),
            ("symbol", symbol::concat(symbol)),
            ("interval", Self::interval(timeframe).to_string()),
            ("limit", limit.min(MAX_KLINES).to_string()),
        ];

        let result = self
            .get_result("/v5/market/kline", &query, Some(symbol))
            .await?;
        let bars = parse_klines(&result)?;
        debug!("bybit returned {} klines for {}", bars.len(), symbol);
        Ok(bars)
    }

    async fn watch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Subscription, DataError> {
        let topic = format!(
            "kline.{}.{}",
            Self::interval(timeframe),
            symbol::concat(symbol)
        );

        KlineStream {
            url: WS_URL.to_string(),
            symbol: symbol.to_string(),
            subscribe: Some(serde_json::json!({"op": "subscribe", "args": [topic]}).to_string()),
            unsubscribe: Some(
                serde_json::json!({"op": "unsubscribe", "args": [topic]}).to_string(),
            ),
            heartbeat: Some(Heartbeat {
                every: self.settings.ping_interval,
                message: serde_json::json!({"op": "ping"}).to_string(),
            }),
            parse: parse_stream_frame,
        }
        .open(self.settings.channel_buffer)
        .await
    }

    async fn load_markets(&self) -> Result<BTreeSet<String>, DataError> {
        let query = [("category", "spot".to_string())];
        let result = self
            .get_result("/v5/market/instruments-info", &query, None)
            .await?;
        parse_instruments(&result)
    }
}
