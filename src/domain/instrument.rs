use {
    crate::config::KNOWN_QUOTE_ASSETS,
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumString},
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarketKind {
    Spot,
    /// Perpetual swap / futures contract
    #[default]
    Swap,
}

/// A tradable symbol on one exchange market.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Exchange identifier, e.g. `BTCUSDT`.
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub kind: MarketKind,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        base: impl Into<String>,
        quote: impl Into<String>,
        kind: MarketKind,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            base: base.into(),
            quote: quote.into(),
            kind,
        }
    }

    /// Build an instrument from a bare concatenated symbol like `ETHUSDT`,
    /// splitting on the first known quote asset that suffixes it.
    pub fn from_concatenated(symbol: &str, kind: MarketKind) -> Option<Self> {
        let quote = get_quote(symbol)?;
        let base = symbol.strip_suffix(quote)?;
        if base.is_empty() {
            return None;
        }
        Some(Self::new(symbol, base, quote, kind))
    }
}

pub(crate) fn get_quote(text: &str) -> Option<&'static str> {
    KNOWN_QUOTE_ASSETS
        .iter()
        .find(|&&ext| text.ends_with(ext))
        .copied()
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({}/{} {})", self.symbol, self.base, self.quote, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_concatenated_symbols() {
        let ins = Instrument::from_concatenated("ETHUSDT", MarketKind::Spot).unwrap();
        assert_eq!(ins.base, "ETH");
        assert_eq!(ins.quote, "USDT");
        assert_eq!(ins.kind, MarketKind::Spot);
        assert!(Instrument::from_concatenated("USDT", MarketKind::Spot).is_none());
        assert!(Instrument::from_concatenated("FOOBAR", MarketKind::Spot).is_none());
    }

    #[test]
    fn market_kind_parses_lowercase() {
        assert_eq!("swap".parse::<MarketKind>().ok(), Some(MarketKind::Swap));
        assert_eq!(MarketKind::Spot.to_string(), "spot");
    }
}
