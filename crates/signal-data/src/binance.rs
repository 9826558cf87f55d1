//! Binance spot market data (binance.com and binance.us).

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
use crate::ws::{Frame, KlineStream};

/// Largest page the klines endpoint serves.
const MAX_KLINES: usize = 1000;

/// Error codes Binance uses for an unknown or malformed symbol.
const SYMBOL_ERROR_CODES: [i64; 3] = [-1121, -1120, -1100];

/// Binance-protocol connector.
pub struct BinanceConnector {
    id: &'static str,
    rest_url: String,
    ws_url: String,
    client: Client,
    settings: ConnectorSettings,
}

impl BinanceConnector {
    /// binance.com
    pub fn global(settings: ConnectorSettings) -> Result<Self, DataError> {
        Self::with_urls(
            "binance",
            "https://api.binance.com",
            "wss://stream.binance.com:9443",
            settings,
        )
    }

    /// binance.us
    pub fn us(settings: ConnectorSettings) -> Result<Self, DataError> {
        Self::with_urls(
            "binanceus",
            "https://api.binance.us",
            "wss://stream.binance.us:9443",
            settings,
        )
    }

    fn with_urls(
        id: &'static str,
        rest_url: &str,
        ws_url: &str,
        settings: ConnectorSettings,
    ) -> Result<Self, DataError> {
        Ok(Self {
            id,
            rest_url: rest_url.to_string(),
            ws_url: ws_url.to_string(),
            client: http::build_client(settings.request_timeout)?,
            settings,
        })
    }

    fn interval(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Daily => "1d",
            Timeframe::Weekly => "1w",
            Timeframe::Monthly => "1M",
        }
    }

    fn stream_name(symbol: &str, timeframe: Timeframe) -> String {
        format!(
            "{}@kline_{}",
            symbol::concat(symbol).to_lowercase(),
            Self::interval(timeframe)
        )
    }
}

/// Map an error body (`{"code": -1121, "msg": "Invalid symbol."}`).
fn map_error(symbol: &str, reply: http::Reply) -> DataError {
    let code = reply.body.get("code").and_then(Value::as_i64);
    match code {
        Some(code) if SYMBOL_ERROR_CODES.contains(&code) => {
            let msg = reply.body.get("msg").and_then(Value::as_str).unwrap_or("rejected");
            DataError::invalid_symbol(symbol, msg)
        }
        _ => reply.into_upstream(),
    }
}

/// Parse `GET /api/v3/klines`: `[[openTime, "o", "h", "l", "c", "v", closeTime, ...], ...]`.
pub(crate) fn parse_klines(body: &Value) -> Result<Vec<Bar>, DataError> {
    let rows = body.as_array().ok_or_else(|| malformed("klines"))?;
    rows.iter()
        .map(|row| {
            let field = |i: usize| row.get(i).ok_or_else(|| malformed("kline row"));
            Ok(Bar::new(
                as_i64(field(0)?).ok_or_else(|| malformed("kline time"))?,
                as_f64(field(1)?).ok_or_else(|| malformed("kline open"))?,
                as_f64(field(2)?).ok_or_else(|| malformed("kline high"))?,
                as_f64(field(3)?).ok_or_else(|| malformed("kline low"))?,
                as_f64(field(4)?).ok_or_else(|| malformed("kline close"))?,
                as_f64(field(5)?).ok_or_else(|| malformed("kline volume"))?,
            ))
        })
        .collect()
}

/// Parse `GET /api/v3/exchangeInfo` into unified symbols of trading pairs.
pub(crate) fn parse_exchange_info(body: &Value) -> Result<BTreeSet<String>, DataError> {
    let symbols = body
        .get("symbols")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("exchangeInfo"))?;

    Ok(symbols
        .iter()
        .filter(|s| s.get("status").and_then(Value::as_str) == Some("TRADING"))
        .filter_map(|s| {
            let base = s.get("baseAsset")?.as_str()?;
            let quote = s.get("quoteAsset")?.as_str()?;
            Some(symbol::unify(base, quote))
        })
        .collect())
}

/// Parse a kline stream event; anything without a `k` object is control traffic.
pub(crate) fn parse_stream_frame(text: &str) -> Result<Frame, DataError> {
    let value: Value = serde_json::from_str(text).map_err(DataError::upstream)?;
    let Some(k) = value.get("k") else {
        return Ok(Frame::Ignored);
    };

    let field = |name: &str| k.get(name).ok_or_else(|| malformed("kline event"));
    let bar = Bar::new(
        as_i64(field("t")?).ok_or_else(|| malformed("kline event time"))?,
        as_f64(field("o")?).ok_or_else(|| malformed("kline event open"))?,
        as_f64(field("h")?).ok_or_else(|| malformed("kline event high"))?,
        as_f64(field("l")?).ok_or_else(|| malformed("kline event low"))?,
        as_f64(field("c")?).ok_or_else(|| malformed("kline event close"))?,
        as_f64(field("v")?).ok_or_else(|| malformed("kline event volume"))?,
    );
    Ok(Frame::Bars(vec![bar]))
}

#[async_trait]
impl ExchangeConnector for BinanceConnector {
    fn id(&self) -> &str {
        self.id
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
        let url = format!("{}/api/v3/klines", self.rest_url);
        let query = [
            ("symbol", symbol::concat(symbol)),
            ("interval", Self::interval(timeframe).to_string()),
            ("limit", limit.min(MAX_KLINES).to_string()),
        ];

        let reply = http::get_json(&self.client, &url, &query).await?;
        if !reply.status.is_success() {
            return Err(map_error(symbol, reply));
        }

        let bars = parse_klines(&reply.body)?;
        debug!("{} returned {} klines for {}", self.id, bars.len(), symbol);
        Ok(bars)
    }

    async fn watch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Subscription, DataError> {
        let stream = Self::stream_name(symbol, timeframe);
        let unsubscribe = serde_json::json!({
            "method": "UNSUBSCRIBE",
            "params": [stream],
            "id": 1
        });

        KlineStream {
            url: format!("{}/ws/{}", self.ws_url, stream),
            symbol: symbol.to_string(),
            subscribe: None,
            unsubscribe: Some(unsubscribe.to_string()),
            heartbeat: None,
            parse: parse_stream_frame,
        }
        .open(self.settings.channel_buffer)
        .await
    }

    async fn load_markets(&self) -> Result<BTreeSet<String>, DataError> {
        let url = format!("{}/api/v3/exchangeInfo", self.rest_url);
        let reply = http::get_json(&self.client, &url, &[]).await?;
        if !reply.status.is_success() {
            return Err(reply.into_upstream());
        }
        parse_exchange_info(&reply.body)
    }
}
