use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// Which side of the pair an amount edit or quote refers to.
///
/// `Sell` means the user is disposing of the sell token and typed the sell
/// amount; `Buy` means the buy amount is the authoritative one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum FormSide {
    Buy,
    Sell,
}

impl FormSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// Which panel of the trading view is showing. Navigation is folded through
/// the reducer like every other input so replays stay deterministic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum FormView {
    Trade,
    Settings,
    Finalization,
}

/// Product configuration for one form instance.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FormConfig {
    /// Slippage limit applied after any token or side change.
    pub default_slippage_limit: Decimal,
    /// Lower bound of the user-editable slippage limit.
    pub min_slippage_limit: Decimal,
    /// Upper bound of the user-editable slippage limit.
    pub max_slippage_limit: Decimal,
    /// Native currency symbol; trades selling it never need an allowance.
    pub native_token: String,
    /// Preferred quote-reference token for quotation labels (the stablecoin).
    pub primary_reference: String,
    /// Fallback quote-reference token when the primary is not in the pair.
    pub secondary_reference: String,
    /// Per-token minimum tradeable amount. Missing token means no minimum.
    pub dust_limits: BTreeMap<String, Decimal>,
    /// Per-token maximum tradeable amount. Missing token means no maximum.
    pub max_limits: BTreeMap<String, Decimal>,
    /// How long the driver may wait for a receipt before emitting `TimedOut`.
    pub receipt_timeout_secs: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        let mut dust_limits = BTreeMap::new();
        dust_limits.insert("ETH".to_string(), Decimal::new(1, 3));
        dust_limits.insert("DAI".to_string(), Decimal::from(1u64));

        Self {
            default_slippage_limit: Decimal::new(5, 2),
            min_slippage_limit: Decimal::new(1, 3),
            max_slippage_limit: Decimal::new(5, 1),
            native_token: "ETH".to_string(),
            primary_reference: "DAI".to_string(),
            secondary_reference: "WETH".to_string(),
            dust_limits,
            max_limits: BTreeMap::new(),
            receipt_timeout_secs: 600,
        }
    }
}

/// On-chain account facts sampled once, at submission time.
///
/// The transaction plan is decided from this snapshot and never re-evaluated
/// mid-sequence, even if proxy or allowance state changes out-of-band.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AccountSnapshot {
    /// Connected wallet address.
    pub address: String,
    /// Address of the account's proxy contract, if one has been created.
    pub proxy: Option<String>,
    /// Tokens the proxy is currently allowed to spend.
    pub allowances: BTreeMap<String, bool>,
}

impl AccountSnapshot {
    pub fn has_allowance(&self, token: &str) -> bool {
        self.allowances.get(token).copied().unwrap_or(false)
    }
}

/// Receipt facts for a settled trade step.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TradeReceipt {
    /// Amount of the sell token actually disposed of.
    pub sold: Decimal,
    /// Amount of the buy token actually received.
    pub bought: Decimal,
    /// Gas consumed by the trade transaction.
    pub gas_used: Decimal,
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn form_side_opposite_and_roundtrip() {
        assert_eq!(FormSide::Buy.opposite(), FormSide::Sell);
        assert_eq!(FormSide::Sell.opposite(), FormSide::Buy);
        assert_eq!("buy".parse::<FormSide>().unwrap(), FormSide::Buy);
        assert_eq!(FormSide::Sell.to_string(), "sell");
    }

    #[test]
    fn default_config_is_internally_consistent() {
        let config = FormConfig::default();
        assert!(config.min_slippage_limit < config.default_slippage_limit);
        assert!(config.default_slippage_limit < config.max_slippage_limit);
        assert_ne!(config.native_token, config.primary_reference);
    }

    #[test]
    fn account_snapshot_allowance_defaults_to_false() {
        let snapshot = AccountSnapshot {
            address: "0xabc".to_string(),
            proxy: None,
            allowances: BTreeMap::new(),
        };
        assert!(!snapshot.has_allowance("DAI"));
    }
}
