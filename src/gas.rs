use rust_decimal::Decimal;

use crate::types::FormSide;

const WEI_PER_GWEI_SCALE: u32 = 9;

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
pub enum GasEstimationStatus {
    Unset,
    Calculating,
    Calculated,
    Error,
}

/// Gas cost of the prospective trade, in the estimation pipeline's terms.
/// `eth`/`usd` are populated only while `status` is `Calculated`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GasEstimation {
    pub status: GasEstimationStatus,
    pub eth: Option<Decimal>,
    pub usd: Option<Decimal>,
}

impl GasEstimation {
    pub fn unset() -> Self {
        Self {
            status: GasEstimationStatus::Unset,
            eth: None,
            usd: None,
        }
    }

    pub fn calculating() -> Self {
        Self {
            status: GasEstimationStatus::Calculating,
            eth: None,
            usd: None,
        }
    }
}

impl Default for GasEstimation {
    fn default() -> Self {
        Self::unset()
    }
}

/// Result of one external `estimateGas` call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GasOutcome {
    Estimated { gas_units: Decimal },
    Failed { reason: String },
}

/// Parameters handed to the external gas estimation call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GasParams {
    pub side: FormSide,
    pub amount: Decimal,
    pub sell_token: String,
    pub buy_token: String,
    pub gas_price_gwei: Decimal,
}

/// Derive the ether (and, when an ether price is known, USD) cost of an
/// estimate. Gas prices arrive in gwei; one ether is `10^9` gwei.
pub fn derive_cost(
    gas_units: Decimal,
    gas_price_gwei: Decimal,
    ether_price_usd: Option<Decimal>,
) -> (Decimal, Option<Decimal>) {
    let gwei = gas_units * gas_price_gwei;
    let eth = gwei / Decimal::from(10u64.pow(WEI_PER_GWEI_SCALE));
    let usd = ether_price_usd.map(|price| eth * price);
    (eth, usd)
}

/// Flicker suppressor for values flowing to downstream consumers.
///
/// Passes every item the predicate does not suppress, and at most the first
/// item it does. Used to keep repeated `Calculating` frames from superseded
/// gas estimations away from the readiness gate.
#[derive(Debug)]
pub struct SettleFilter<F> {
    suppress: F,
    suppressed_once: bool,
}

impl<F> SettleFilter<F> {
    pub fn new(suppress: F) -> Self {
        Self {
            suppress,
            suppressed_once: false,
        }
    }

    pub fn admit<T>(&mut self, item: T) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        if (self.suppress)(&item) {
            if self.suppressed_once {
                return None;
            }
            self.suppressed_once = true;
        }
        Some(item)
    }

    pub fn reset(&mut self) {
        self.suppressed_once = false;
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        assert_eq!(
            "calculating".parse::<GasEstimationStatus>().ok(),
            Some(GasEstimationStatus::Calculating)
        );
        assert_eq!(GasEstimationStatus::Calculated.to_string(), "calculated");
        assert_eq!("pending".parse::<GasEstimationStatus>().ok(), None);
    }

    #[test]
    fn derive_cost_converts_gwei_to_eth() {
        // 21_000 gas at 50 gwei = 0.00105 ETH.
        let (eth, usd) = derive_cost(
            Decimal::from(21_000u64),
            Decimal::from(50u64),
            Some(Decimal::from(2000u64)),
        );
        assert_eq!(eth, Decimal::new(105, 5));
        assert_eq!(usd, Some(Decimal::new(21, 1)));
    }

    #[test]
    fn derive_cost_without_ether_price_has_no_usd() {
        let (eth, usd) = derive_cost(Decimal::from(100_000u64), Decimal::from(10u64), None);
        assert_eq!(eth, Decimal::new(1, 3));
        assert_eq!(usd, None);
    }

    #[test]
    fn settle_filter_passes_first_suppressed_item_only() {
        let mut filter = SettleFilter::new(|status: &GasEstimationStatus| {
            *status == GasEstimationStatus::Calculating
        });

        assert_eq!(
            filter.admit(GasEstimationStatus::Calculating),
            Some(GasEstimationStatus::Calculating)
        );
        assert_eq!(filter.admit(GasEstimationStatus::Calculating), None);
        assert_eq!(
            filter.admit(GasEstimationStatus::Calculated),
            Some(GasEstimationStatus::Calculated)
        );
        assert_eq!(filter.admit(GasEstimationStatus::Calculating), None);
        assert_eq!(
            filter.admit(GasEstimationStatus::Error),
            Some(GasEstimationStatus::Error)
        );
    }

    #[test]
    fn settle_filter_reset_allows_one_more_suppressed_item() {
        let mut filter = SettleFilter::new(|value: &u8| *value == 0);
        assert_eq!(filter.admit(0), Some(0));
        assert_eq!(filter.admit(0), None);
        filter.reset();
        assert_eq!(filter.admit(0), Some(0));
    }
}
