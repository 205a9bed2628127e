use rust_decimal::Decimal;

use crate::form::FormState;
use crate::types::{FormConfig, FormSide, FormView};

/// Where a message is rendered relative to the form.
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
pub enum Placement {
    Top,
    Bottom,
}

/// The form field a message is attached to.
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
#[strum(serialize_all = "snake_case")]
pub enum Field {
    SellAmount,
    BuyAmount,
    Slippage,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MessageKind {
    InsufficientBalance { token: String },
    DustAmount { token: String, minimum: Decimal },
    AmountExceedsLimit { token: String, maximum: Decimal },
    LiquidityExhausted,
    MissingAllowance { token: String },
    NotConnected,
    SlippageOutOfRange { minimum: Decimal, maximum: Decimal },
}

/// One validation message. All produced messages stay queryable; `priority`
/// only decides which single message is primary per placement.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub field: Field,
    pub placement: Placement,
    pub priority: u8,
}

const PRIORITY_NOT_CONNECTED: u8 = 90;
const PRIORITY_LIQUIDITY: u8 = 70;
const PRIORITY_BALANCE: u8 = 60;
const PRIORITY_LIMITS: u8 = 50;
const PRIORITY_ALLOWANCE: u8 = 40;
const PRIORITY_SLIPPAGE: u8 = 30;

/// Pure projection of the folded state into validation messages. Runs after
/// every fold step; never stores anything.
pub fn validate(state: &FormState, config: &FormConfig) -> Vec<Message> {
    let mut messages = Vec::new();

    if state.account.is_none() {
        messages.push(Message {
            kind: MessageKind::NotConnected,
            field: Field::Form,
            placement: Placement::Top,
            priority: PRIORITY_NOT_CONNECTED,
        });
    }

    let authoritative_field = match state.side {
        FormSide::Sell => Field::SellAmount,
        FormSide::Buy => Field::BuyAmount,
    };

    if state.liquidity_exhausted {
        messages.push(Message {
            kind: MessageKind::LiquidityExhausted,
            field: authoritative_field,
            placement: Placement::Top,
            priority: PRIORITY_LIQUIDITY,
        });
    }

    if let (Some(sell_amount), Some(balance)) =
        (state.sell_amount, state.balances.get(&state.sell_token))
        && sell_amount > *balance
    {
        messages.push(Message {
            kind: MessageKind::InsufficientBalance {
                token: state.sell_token.clone(),
            },
            field: Field::SellAmount,
            placement: Placement::Top,
            priority: PRIORITY_BALANCE,
        });
    }

    if let Some(amount) = state.authoritative_amount() {
        let token = state.token(state.side);
        if let Some(minimum) = config.dust_limits.get(token)
            && amount < *minimum
        {
            messages.push(Message {
                kind: MessageKind::DustAmount {
                    token: token.to_string(),
                    minimum: *minimum,
                },
                field: authoritative_field,
                placement: Placement::Top,
                priority: PRIORITY_LIMITS,
            });
        }
        if let Some(maximum) = config.max_limits.get(token)
            && amount > *maximum
        {
            messages.push(Message {
                kind: MessageKind::AmountExceedsLimit {
                    token: token.to_string(),
                    maximum: *maximum,
                },
                field: authoritative_field,
                placement: Placement::Top,
                priority: PRIORITY_LIMITS,
            });
        }
    }

    // Allowance advisories belong to the settings panel; the trade flow
    // grants allowances through its own transaction step instead.
    if state.view == FormView::Settings
        && state.account.is_some()
        && state.proxy.is_some()
        && state.sell_token != config.native_token
        && state.allowances.get(&state.sell_token) == Some(&false)
    {
        messages.push(Message {
            kind: MessageKind::MissingAllowance {
                token: state.sell_token.clone(),
            },
            field: Field::Form,
            placement: Placement::Bottom,
            priority: PRIORITY_ALLOWANCE,
        });
    }

    if state.slippage_limit < config.min_slippage_limit
        || state.slippage_limit > config.max_slippage_limit
    {
        messages.push(Message {
            kind: MessageKind::SlippageOutOfRange {
                minimum: config.min_slippage_limit,
                maximum: config.max_slippage_limit,
            },
            field: Field::Slippage,
            placement: Placement::Bottom,
            priority: PRIORITY_SLIPPAGE,
        });
    }

    messages
}

/// The single message shown for a placement: highest priority wins, earlier
/// message wins ties.
pub fn primary(messages: &[Message], placement: Placement) -> Option<&Message> {
    let mut best: Option<&Message> = None;
    for message in messages.iter().filter(|m| m.placement == placement) {
        match best {
            Some(current) if current.priority >= message.priority => {}
            _ => best = Some(message),
        }
    }
    best
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::form::change::Change;
    use crate::form::apply_change;

    fn config() -> FormConfig {
        let mut config = FormConfig::default();
        config
            .max_limits
            .insert("ETH".to_string(), Decimal::from(100u64));
        config
    }

    fn base_state(config: &FormConfig) -> FormState {
        let state = FormState::new(config);
        let state = apply_change(
            &state,
            &Change::AccountChanged {
                address: Some("0xuser".to_string()),
            },
            config,
        );
        apply_change(
            &state,
            &Change::BalanceChanged {
                token: "ETH".to_string(),
                balance: Decimal::from(5u64),
            },
            config,
        )
    }

    fn kinds(messages: &[Message]) -> Vec<&MessageKind> {
        messages.iter().map(|m| &m.kind).collect()
    }

    #[test]
    fn disconnected_form_reports_not_connected() {
        let config = config();
        let state = FormState::new(&config);
        let messages = validate(&state, &config);
        assert_eq!(kinds(&messages), vec![&MessageKind::NotConnected]);
        assert_eq!(
            primary(&messages, Placement::Top).map(|m| &m.kind),
            Some(&MessageKind::NotConnected)
        );
    }

    #[test]
    fn connected_idle_form_is_clean() {
        let config = config();
        let state = base_state(&config);
        assert!(validate(&state, &config).is_empty());
    }

    #[test]
    fn amount_above_balance_is_insufficient() {
        let config = config();
        let state = apply_change(
            &base_state(&config),
            &Change::AmountEdited {
                side: FormSide::Sell,
                amount: Some(Decimal::from(6u64)),
            },
            &config,
        );
        assert_eq!(
            kinds(&state.messages),
            vec![&MessageKind::InsufficientBalance {
                token: "ETH".to_string()
            }]
        );
    }

    #[test]
    fn dust_amount_flags_below_minimum() {
        let config = config();
        let state = apply_change(
            &base_state(&config),
            &Change::AmountEdited {
                side: FormSide::Sell,
                amount: Some(Decimal::new(1, 4)),
            },
            &config,
        );
        assert!(matches!(
            state.messages.first().map(|m| &m.kind),
            Some(MessageKind::DustAmount { token, .. }) if token == "ETH"
        ));
    }

    #[test]
    fn amount_above_configured_maximum_is_flagged() {
        let config = config();
        let state = apply_change(
            &base_state(&config),
            &Change::BalanceChanged {
                token: "ETH".to_string(),
                balance: Decimal::from(500u64),
            },
            &config,
        );
        let state = apply_change(
            &state,
            &Change::AmountEdited {
                side: FormSide::Sell,
                amount: Some(Decimal::from(200u64)),
            },
            &config,
        );
        assert!(matches!(
            state.messages.first().map(|m| &m.kind),
            Some(MessageKind::AmountExceedsLimit { token, .. }) if token == "ETH"
        ));
    }

    #[test]
    fn slippage_out_of_range_is_flagged_at_the_bottom() {
        let config = config();
        let state = apply_change(
            &base_state(&config),
            &Change::SlippageLimitEdited {
                limit: Decimal::from(2u64),
            },
            &config,
        );
        let message = primary(&state.messages, Placement::Bottom).unwrap();
        assert!(matches!(
            message.kind,
            MessageKind::SlippageOutOfRange { .. }
        ));
        assert_eq!(message.field, Field::Slippage);
    }

    #[test]
    fn missing_allowance_only_appears_in_settings_view() {
        let config = config();
        let state = apply_change(
            &base_state(&config),
            &Change::TokenChosen {
                side: FormSide::Sell,
                token: "MKR".to_string(),
            },
            &config,
        );
        let state = apply_change(
            &state,
            &Change::ProxyChanged {
                proxy: Some("0xproxy".to_string()),
            },
            &config,
        );
        let state = apply_change(
            &state,
            &Change::AllowanceChanged {
                token: "MKR".to_string(),
                granted: false,
            },
            &config,
        );
        assert!(
            !state
                .messages
                .iter()
                .any(|m| matches!(m.kind, MessageKind::MissingAllowance { .. })),
            "trade view never blocks on allowances"
        );

        let settings = apply_change(
            &state,
            &Change::ViewChanged {
                view: FormView::Settings,
            },
            &config,
        );
        assert!(
            settings
                .messages
                .iter()
                .any(|m| matches!(&m.kind, MessageKind::MissingAllowance { token } if token == "MKR"))
        );
    }

    #[test]
    fn primary_picks_highest_priority_and_first_on_tie() {
        let messages = vec![
            Message {
                kind: MessageKind::LiquidityExhausted,
                field: Field::SellAmount,
                placement: Placement::Top,
                priority: 70,
            },
            Message {
                kind: MessageKind::NotConnected,
                field: Field::Form,
                placement: Placement::Top,
                priority: 90,
            },
            Message {
                kind: MessageKind::InsufficientBalance {
                    token: "ETH".to_string(),
                },
                field: Field::SellAmount,
                placement: Placement::Top,
                priority: 90,
            },
        ];
        assert_eq!(
            primary(&messages, Placement::Top).map(|m| &m.kind),
            Some(&MessageKind::NotConnected)
        );
        assert_eq!(primary(&messages, Placement::Bottom), None);
    }
}
