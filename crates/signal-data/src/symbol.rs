//! Unified symbol handling.
//!
//! Callers name markets as `BASE/QUOTE` (e.g. `BTC/USDT`). Exchanges use
//! their own spellings, so each connector maps through these helpers.

/// Split a unified symbol into upper-cased base and quote.
///
/// Returns `None` for a bare native symbol such as `BTCUSDT`.
pub fn split(symbol: &str) -> Option<(String, String)> {
    let (base, quote) = symbol.trim().split_once('/')?;
    if base.is_empty() || quote.is_empty() {
        return None;
    }
    Some((base.to_uppercase(), quote.to_uppercase()))
}

/// Build a unified symbol from its parts.
pub fn unify(base: &str, quote: &str) -> String {
    format!("{}/{}", base.to_uppercase(), quote.to_uppercase())
}

/// Concatenated native form used by Binance and Bybit (`BTCUSDT`).
///
/// A symbol without a slash is passed through upper-cased.
pub fn concat(symbol: &str) -> String {
    match split(symbol) {
        Some((base, quote)) => format!("{}{}", base, quote),
        None => symbol.trim().to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        assert_eq!(
            split("btc/usdt"),
            Some(("BTC".to_string(), "USDT".to_string()))
        );
        assert_eq!(split("BTCUSDT"), None);
        assert_eq!(split("/USDT"), None);
    }

    #[test]
    fn test_concat() {
        assert_eq!(concat("BTC/USDT"), "BTCUSDT");
        assert_eq!(concat("ethbtc"), "ETHBTC");
    }

    #[test]
    fn test_unify() {
        assert_eq!(unify("eth", "usd"), "ETH/USD");
    }
}
