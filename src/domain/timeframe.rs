use {
    crate::utils::token_to_secs,
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter, EnumString, IntoStaticStr},
};

/// Candle aggregation interval, using the exchange-style tokens (case-sensitive: `1m` is a
/// minute, `1M` is a month).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    #[strum(serialize = "1m")]
    M1,
    #[serde(rename = "3m")]
    #[strum(serialize = "3m")]
    M3,
    #[serde(rename = "5m")]
    #[strum(serialize = "5m")]
    M5,
    #[serde(rename = "15m")]
    #[strum(serialize = "15m")]
    M15,
    #[serde(rename = "30m")]
    #[strum(serialize = "30m")]
    M30,
    #[serde(rename = "1h")]
    #[strum(serialize = "1h")]
    H1,
    #[serde(rename = "2h")]
    #[strum(serialize = "2h")]
    H2,
    #[serde(rename = "4h")]
    #[strum(serialize = "4h")]
    H4,
    #[serde(rename = "6h")]
    #[strum(serialize = "6h")]
    H6,
    #[serde(rename = "12h")]
    #[strum(serialize = "12h")]
    H12,
    #[serde(rename = "1d")]
    #[strum(serialize = "1d")]
    D1,
    #[serde(rename = "3d")]
    #[strum(serialize = "3d")]
    D3,
    #[serde(rename = "1w")]
    #[strum(serialize = "1w")]
    W1,
    #[serde(rename = "1M")]
    #[strum(serialize = "1M")]
    Month1,
}

impl Timeframe {
    pub fn token(self) -> &'static str {
        self.into()
    }

    /// Fixed candle length in seconds, used by the auto-run scheduler.
    /// Months have no fixed length so they never auto-trigger.
    pub fn duration_secs(self) -> Option<i64> {
        token_to_secs(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn token_set_round_trips_through_parse() {
        let tokens: Vec<&str> = Timeframe::iter().map(Timeframe::token).collect();
        assert_eq!(
            tokens,
            vec![
                "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "12h", "1d", "3d", "1w",
                "1M"
            ]
        );
        for tf in Timeframe::iter() {
            assert_eq!(tf.token().parse::<Timeframe>().ok(), Some(tf));
        }
    }

    #[test]
    fn month_is_case_sensitive_and_unscheduled() {
        assert_eq!("1M".parse::<Timeframe>().ok(), Some(Timeframe::Month1));
        assert_eq!("1m".parse::<Timeframe>().ok(), Some(Timeframe::M1));
        assert!("1H".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::Month1.duration_secs(), None);
        assert_eq!(Timeframe::H1.duration_secs(), Some(3600));
        assert_eq!(Timeframe::W1.duration_secs(), Some(604_800));
    }

    #[test]
    fn serde_uses_tokens() {
        let json = serde_json::to_string(&vec![Timeframe::M15, Timeframe::Month1]).unwrap();
        assert_eq!(json, r#"["15m","1M"]"#);
        let back: Vec<Timeframe> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Timeframe::M15, Timeframe::Month1]);
    }
}
