#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod engine;
pub mod env;
pub mod error;
pub mod form;
pub mod gas;
pub mod progress;
pub mod quote;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use engine::{Command, FormEngine};
pub use env::{EnvSnapshot, diff};
pub use error::Error;
pub use form::change::Change;
pub use form::validate::{Field, Message, MessageKind, Placement, primary, validate};
pub use form::{FormState, apply_change, is_ready};
pub use gas::{
    GasEstimation, GasEstimationStatus, GasOutcome, GasParams, SettleFilter, derive_cost,
};
pub use progress::{
    Orchestrator, PlanKind, Progress, StepDecision, StepEvent, StepKind, StepProgress, TxStatus,
};
pub use quote::{
    QuoteOutcome, QuoteParams, RequestId, RequestTracker, quotation_label, quotation_pair,
};
pub use types::{AccountSnapshot, FormConfig, FormSide, FormView, TradeReceipt};
