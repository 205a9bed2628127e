use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::form::change::Change;

/// Everything the wallet/oracle layer reports about the outside world,
/// sampled on a polling interval or on wallet events.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnvSnapshot {
    pub gas_price_gwei: Option<Decimal>,
    pub ether_price_usd: Option<Decimal>,
    pub balances: BTreeMap<String, Decimal>,
    pub allowances: BTreeMap<String, bool>,
    pub account: Option<String>,
    pub proxy: Option<String>,
}

/// Convert two consecutive snapshots into the uniform change events the
/// reducer folds. Field order is fixed (identity, prices, balances,
/// allowances) so that any two drivers observing the same snapshots emit the
/// same sequence; token maps iterate in key order for the same reason.
///
/// A token missing from the new snapshot reads as zero balance / revoked
/// allowance rather than silently keeping the stale value.
pub fn diff(previous: &EnvSnapshot, next: &EnvSnapshot) -> Vec<Change> {
    let mut changes = Vec::new();

    if previous.account != next.account {
        changes.push(Change::AccountChanged {
            address: next.account.clone(),
        });
    }
    if previous.proxy != next.proxy {
        changes.push(Change::ProxyChanged {
            proxy: next.proxy.clone(),
        });
    }
    if let Some(gwei) = next.gas_price_gwei
        && previous.gas_price_gwei != next.gas_price_gwei
    {
        changes.push(Change::GasPriceChanged { gwei });
    }
    if let Some(usd) = next.ether_price_usd
        && previous.ether_price_usd != next.ether_price_usd
    {
        changes.push(Change::EtherPriceChanged { usd });
    }

    for token in previous.balances.keys().chain(next.balances.keys()) {
        let old = previous.balances.get(token);
        let new = next.balances.get(token).copied().unwrap_or(Decimal::ZERO);
        if old.copied().unwrap_or(Decimal::ZERO) != new || old.is_none() {
            if changes.iter().any(|change| {
                matches!(change, Change::BalanceChanged { token: t, .. } if t == token)
            }) {
                continue;
            }
            changes.push(Change::BalanceChanged {
                token: token.clone(),
                balance: new,
            });
        }
    }

    for token in previous.allowances.keys().chain(next.allowances.keys()) {
        let old = previous.allowances.get(token);
        let new = next.allowances.get(token).copied().unwrap_or(false);
        if old.copied().unwrap_or(false) != new || old.is_none() {
            if changes.iter().any(|change| {
                matches!(change, Change::AllowanceChanged { token: t, .. } if t == token)
            }) {
                continue;
            }
            changes.push(Change::AllowanceChanged {
                token: token.clone(),
                granted: new,
            });
        }
    }

    changes
}
