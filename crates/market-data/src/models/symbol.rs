use crate::errors::MarketDataError;

/// Quote suffixes stripped from user input, longest first.
const QUOTE_SUFFIXES: &[&str] = &["/USDT", "-USDT", "USDT", "/USD", "-USD", "USD", "-PERP", "PERP"];

/// Normalise user input into a bare base-asset ticker.
///
/// `" btc/usd "`, `"BTCUSDT"`, `"XBT-PERP"` and `"btc"` all become `"BTC"`.
///
/// ```
/// use cryptodash_market_data::normalize_symbol;
///
/// assert_eq!(normalize_symbol("eth-usd").unwrap(), "ETH");
/// assert!(normalize_symbol("  ").is_err());
/// ```
pub fn normalize_symbol(input: &str) -> Result<String, MarketDataError> {
    let mut symbol = input.trim().to_uppercase();

    // Strip repeatedly so "BTCUSD-PERP" loses both parts.
    loop {
        let before = symbol.len();
        for suffix in QUOTE_SUFFIXES {
            if symbol.len() > suffix.len() {
                if let Some(stripped) = symbol.strip_suffix(suffix) {
                    symbol = stripped.to_string();
                    break;
                }
            }
        }
        if symbol.len() == before {
            break;
        }
    }

    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(MarketDataError::InvalidSymbol(input.trim().to_string()));
    }

    if symbol == "XBT" {
        symbol = "BTC".to_string();
    }

    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_quote_suffixes() {
        assert_eq!(normalize_symbol("BTCUSDT").unwrap(), "BTC");
        assert_eq!(normalize_symbol("btc/usd").unwrap(), "BTC");
        assert_eq!(normalize_symbol("SOL-USD").unwrap(), "SOL");
        assert_eq!(normalize_symbol("ETHUSD-PERP").unwrap(), "ETH");
        assert_eq!(normalize_symbol(" doge ").unwrap(), "DOGE");
    }

    #[test]
    fn test_maps_xbt_to_btc() {
        assert_eq!(normalize_symbol("XBT").unwrap(), "BTC");
        assert_eq!(normalize_symbol("xbtusd").unwrap(), "BTC");
    }

    #[test]
    fn test_does_not_strip_whole_symbol() {
        // A bare "USDT" query means the stablecoin itself.
        assert_eq!(normalize_symbol("USDT").unwrap(), "USDT");
        assert_eq!(normalize_symbol("usd").unwrap(), "USD");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            normalize_symbol(""),
            Err(MarketDataError::InvalidSymbol(_))
        ));
        assert!(matches!(
            normalize_symbol("BTC;DROP"),
            Err(MarketDataError::InvalidSymbol(_))
        ));
        assert!(normalize_symbol("B T C").is_err());
    }
}
