use rust_decimal::Decimal;

use crate::gas::GasOutcome;
use crate::progress::Progress;
use crate::quote::{QuoteOutcome, RequestId};
use crate::types::{FormSide, FormView};

/// Every input the form can fold, as one closed tagged union.
///
/// Manual edits, environment updates and derived async results are merged
/// into a single ordered sequence and applied left-to-right; the fold order
/// is the form state's only source of truth. The reducer matches
/// exhaustively, so an unhandled variant is a compile error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    // manual edits
    AmountEdited {
        side: FormSide,
        amount: Option<Decimal>,
    },
    TokenChosen {
        side: FormSide,
        token: String,
    },
    PairSwapped,
    SlippageLimitEdited {
        limit: Decimal,
    },
    ViewChanged {
        view: FormView,
    },
    FormReset,

    // environment updates
    AccountChanged {
        address: Option<String>,
    },
    ProxyChanged {
        proxy: Option<String>,
    },
    GasPriceChanged {
        gwei: Decimal,
    },
    EtherPriceChanged {
        usd: Decimal,
    },
    BalanceChanged {
        token: String,
        balance: Decimal,
    },
    AllowanceChanged {
        token: String,
        granted: bool,
    },

    // derived async results
    QuoteResolved {
        request: RequestId,
        outcome: QuoteOutcome,
    },
    GasEstimated {
        request: RequestId,
        outcome: GasOutcome,
    },
    ProgressUpdated {
        progress: Progress,
    },
}

impl Change {
    /// Whether this change can affect the gas cost of the prospective trade
    /// and must therefore re-trigger the estimation pipeline.
    pub fn gas_relevant(&self) -> bool {
        match self {
            Self::AmountEdited { .. }
            | Self::TokenChosen { .. }
            | Self::PairSwapped
            | Self::FormReset
            | Self::AccountChanged { .. }
            | Self::GasPriceChanged { .. }
            | Self::QuoteResolved { .. } => true,
            Self::SlippageLimitEdited { .. }
            | Self::ViewChanged { .. }
            | Self::ProxyChanged { .. }
            | Self::EtherPriceChanged { .. }
            | Self::BalanceChanged { .. }
            | Self::AllowanceChanged { .. }
            | Self::GasEstimated { .. }
            | Self::ProgressUpdated { .. } => false,
        }
    }

    /// Whether this change invalidates the current quote and must re-trigger
    /// the order-book quotation.
    pub fn quote_relevant(&self) -> bool {
        matches!(
            self,
            Self::AmountEdited { .. } | Self::TokenChosen { .. } | Self::PairSwapped
        )
    }
}
