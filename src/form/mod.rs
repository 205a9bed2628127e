pub mod change;
pub mod validate;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::form::change::Change;
use crate::form::validate::{Message, validate};
use crate::gas::{GasEstimation, GasEstimationStatus, GasOutcome, derive_cost};
use crate::progress::Progress;
use crate::quote::{QuoteOutcome, quotation_label};
use crate::types::{FormConfig, FormSide, FormView};

/// The whole form, folded from the ordered change sequence.
///
/// One long-lived instance per open form. Replaced wholesale on every
/// transition; `messages` and `ready_to_proceed` are projections recomputed
/// at the end of each fold step, never carried state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormState {
    /// Which amount field the user last edited (the authoritative one).
    pub side: FormSide,
    pub sell_token: String,
    pub buy_token: String,
    pub sell_amount: Option<Decimal>,
    pub buy_amount: Option<Decimal>,
    pub slippage_limit: Decimal,
    pub balances: BTreeMap<String, Decimal>,
    pub allowances: BTreeMap<String, bool>,
    pub account: Option<String>,
    pub proxy: Option<String>,
    pub gas_price_gwei: Option<Decimal>,
    pub ether_price_usd: Option<Decimal>,
    /// Buy-token units per one sell-token unit, from the latest quote.
    pub price: Option<Decimal>,
    pub quotation: Option<String>,
    pub price_impact: Option<Decimal>,
    pub liquidity_exhausted: bool,
    pub gas_estimation: GasEstimation,
    pub messages: Vec<Message>,
    pub ready_to_proceed: bool,
    pub progress: Option<Progress>,
    pub view: FormView,
}

impl FormState {
    pub fn new(config: &FormConfig) -> Self {
        let mut state = Self {
            side: FormSide::Sell,
            sell_token: config.native_token.clone(),
            buy_token: config.primary_reference.clone(),
            sell_amount: None,
            buy_amount: None,
            slippage_limit: config.default_slippage_limit,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            account: None,
            proxy: None,
            gas_price_gwei: None,
            ether_price_usd: None,
            price: None,
            quotation: None,
            price_impact: None,
            liquidity_exhausted: false,
            gas_estimation: GasEstimation::unset(),
            messages: Vec::new(),
            ready_to_proceed: false,
            progress: None,
            view: FormView::Trade,
        };
        state.messages = validate(&state, config);
        state
    }

    pub fn token(&self, side: FormSide) -> &str {
        match side {
            FormSide::Sell => &self.sell_token,
            FormSide::Buy => &self.buy_token,
        }
    }

    pub fn amount(&self, side: FormSide) -> Option<Decimal> {
        match side {
            FormSide::Sell => self.sell_amount,
            FormSide::Buy => self.buy_amount,
        }
    }

    /// The user-entered amount, on whichever side was last edited.
    pub fn authoritative_amount(&self) -> Option<Decimal> {
        self.amount(self.side)
    }

    fn set_amount(&mut self, side: FormSide, amount: Option<Decimal>) {
        match side {
            FormSide::Sell => self.sell_amount = amount,
            FormSide::Buy => self.buy_amount = amount,
        }
    }

    fn set_token(&mut self, side: FormSide, token: String) {
        match side {
            FormSide::Sell => self.sell_token = token,
            FormSide::Buy => self.buy_token = token,
        }
    }

    fn clear_quote(&mut self) {
        self.price = None;
        self.quotation = None;
        self.price_impact = None;
        self.liquidity_exhausted = false;
    }
}

/// Readiness gate: the form may submit only with an amount entered, no
/// validation messages, and a settled gas estimation.
pub fn is_ready(state: &FormState) -> bool {
    state.authoritative_amount().is_some()
        && state.messages.is_empty()
        && state.gas_estimation.status == GasEstimationStatus::Calculated
}

/// Pure, total state transition. Every change variant is handled; staleness
/// of derived async results is the caller's concern (stale resolutions are
/// dropped before ever reaching the fold).
pub fn apply_change(state: &FormState, change: &Change, config: &FormConfig) -> FormState {
    let mut next = state.clone();

    match change {
        Change::AmountEdited { side, amount } => {
            let entered = (*amount).filter(|value| !value.is_zero() && value.is_sign_positive());
            next.side = *side;
            match entered {
                Some(value) => {
                    next.set_amount(*side, Some(value));
                    next.set_amount(side.opposite(), None);
                }
                // empty or zero input clears both displayed amounts
                None => {
                    next.sell_amount = None;
                    next.buy_amount = None;
                }
            }
            next.clear_quote();
        }
        Change::TokenChosen { side, token } => {
            if token.as_str() == next.token(side.opposite()) {
                // picking the opposite side's token swaps the pair
                std::mem::swap(&mut next.sell_token, &mut next.buy_token);
            } else {
                next.set_token(*side, token.clone());
            }
            next.slippage_limit = config.default_slippage_limit;
            next.set_amount(next.side.opposite(), None);
            next.clear_quote();
        }
        Change::PairSwapped => {
            std::mem::swap(&mut next.sell_token, &mut next.buy_token);
            next.sell_amount = None;
            next.buy_amount = None;
            next.slippage_limit = config.default_slippage_limit;
            next.clear_quote();
        }
        Change::SlippageLimitEdited { limit } => {
            next.slippage_limit = *limit;
        }
        Change::ViewChanged { view } => {
            next.view = *view;
        }
        Change::FormReset => {
            next.progress = None;
            next.sell_amount = None;
            next.buy_amount = None;
            next.clear_quote();
            next.view = FormView::Trade;
        }
        Change::AccountChanged { address } => {
            next.account = address.clone();
        }
        Change::ProxyChanged { proxy } => {
            next.proxy = proxy.clone();
        }
        Change::GasPriceChanged { gwei } => {
            next.gas_price_gwei = Some(*gwei);
        }
        Change::EtherPriceChanged { usd } => {
            next.ether_price_usd = Some(*usd);
            if next.gas_estimation.status == GasEstimationStatus::Calculated {
                next.gas_estimation.usd = next.gas_estimation.eth.map(|eth| eth * usd);
            }
        }
        Change::BalanceChanged { token, balance } => {
            next.balances.insert(token.clone(), *balance);
        }
        Change::AllowanceChanged { token, granted } => {
            next.allowances.insert(token.clone(), *granted);
        }
        Change::QuoteResolved { request: _, outcome } => match outcome {
            QuoteOutcome::Filled {
                price,
                price_impact,
            } => {
                if let Some(amount) = next.authoritative_amount() {
                    let derived = match next.side {
                        FormSide::Sell => Some(amount * price),
                        FormSide::Buy => {
                            if price.is_zero() {
                                None
                            } else {
                                Some(amount / price)
                            }
                        }
                    };
                    next.set_amount(next.side.opposite(), derived);
                    next.price = Some(*price);
                    next.price_impact = Some(*price_impact);
                    next.quotation =
                        Some(quotation_label(&next.sell_token, &next.buy_token, config));
                    next.liquidity_exhausted = false;
                } else {
                    tracing::debug!("quote resolved for an empty amount, ignoring");
                }
            }
            QuoteOutcome::InsufficientLiquidity => {
                next.clear_quote();
                next.liquidity_exhausted = true;
                next.set_amount(next.side.opposite(), None);
            }
        },
        Change::GasEstimated { request: _, outcome } => match outcome {
            GasOutcome::Estimated { gas_units } => {
                if let Some(gwei) = next.gas_price_gwei {
                    let (eth, usd) = derive_cost(*gas_units, gwei, next.ether_price_usd);
                    next.gas_estimation = GasEstimation {
                        status: GasEstimationStatus::Calculated,
                        eth: Some(eth),
                        usd,
                    };
                } else {
                    next.gas_estimation = GasEstimation::unset();
                }
            }
            GasOutcome::Failed { reason } => {
                tracing::debug!(reason = %reason, "gas estimation failed");
                next.gas_estimation = GasEstimation {
                    status: GasEstimationStatus::Error,
                    eth: None,
                    usd: None,
                };
            }
        },
        Change::ProgressUpdated { progress } => {
            next.progress = Some(progress.clone());
        }
    }

    if change.gas_relevant() {
        retrigger_gas(&mut next);
    }

    next.messages = validate(&next, config);
    next.ready_to_proceed = is_ready(&next);
    next
}

/// A new estimation is outstanding whenever a gas-relevant field changed and
/// the pipeline has everything it needs; otherwise the status resets.
fn retrigger_gas(state: &mut FormState) {
    let usable = state.authoritative_amount().is_some()
        && state.gas_price_gwei.is_some()
        && state.account.is_some();
    state.gas_estimation = if usable {
        GasEstimation::calculating()
    } else {
        GasEstimation::unset()
    };
}
