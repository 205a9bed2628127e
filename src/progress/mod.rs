use rust_decimal::Decimal;

use crate::types::{AccountSnapshot, TradeReceipt};

/// Per-step transaction status.
///
/// Every step starts in `WaitingForApproval` (wallet signature pending),
/// moves to `WaitingForConfirmation` once a transaction hash is obtained,
/// and settles in exactly one of the terminal statuses.
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
#[strum(serialize_all = "snake_case")]
pub enum TxStatus {
    WaitingForApproval,
    WaitingForConfirmation,
    Success,
    Fiasco,
    CancelledByUser,
}

impl TxStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Fiasco | Self::CancelledByUser)
    }
}

/// The three transaction kinds a submission can be composed of.
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
#[strum(serialize_all = "snake_case")]
pub enum StepKind {
    CreateProxy,
    GrantAllowance,
    ExecuteTrade,
}

impl StepKind {
    /// The trade itself, once signed, cannot be cancelled from the form.
    pub fn cancellable(self) -> bool {
        !matches!(self, Self::ExecuteTrade)
    }
}

/// Which sub-sequence of transactions applies to a submission. Decided once
/// from the [`AccountSnapshot`] at submission time and never re-evaluated
/// mid-flight.
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
#[strum(serialize_all = "snake_case")]
pub enum PlanKind {
    TradeOnly,
    TradeWithAllowance,
    TradeWithProxy,
    TradeWithProxyAndAllowance,
}

impl PlanKind {
    /// Inspect the account's proxy/allowance state for the effective sell
    /// token. Selling the native currency never needs an allowance; a fresh
    /// proxy starts with none.
    pub fn decide(account: &AccountSnapshot, sell_token: &str, native_token: &str) -> Self {
        let needs_proxy = account.proxy.is_none();
        let needs_allowance =
            sell_token != native_token && (needs_proxy || !account.has_allowance(sell_token));

        match (needs_proxy, needs_allowance) {
            (false, false) => Self::TradeOnly,
            (false, true) => Self::TradeWithAllowance,
            (true, false) => Self::TradeWithProxy,
            (true, true) => Self::TradeWithProxyAndAllowance,
        }
    }

    pub fn steps(self) -> &'static [StepKind] {
        match self {
            Self::TradeOnly => &[StepKind::ExecuteTrade],
            Self::TradeWithAllowance => &[StepKind::GrantAllowance, StepKind::ExecuteTrade],
            Self::TradeWithProxy => &[StepKind::CreateProxy, StepKind::ExecuteTrade],
            Self::TradeWithProxyAndAllowance => &[
                StepKind::CreateProxy,
                StepKind::GrantAllowance,
                StepKind::ExecuteTrade,
            ],
        }
    }
}

/// One step of the submission sequence. `status` is `None` until the step
/// has been started by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StepProgress {
    pub kind: StepKind,
    pub status: Option<TxStatus>,
    pub tx_hash: Option<String>,
}

/// Aggregate progress of one submission attempt.
///
/// Snapshots of this record are folded back into the form state after every
/// transition; consumers never observe in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Progress {
    pub kind: PlanKind,
    pub steps: Vec<StepProgress>,
    pub done: bool,
    pub sold: Option<Decimal>,
    pub bought: Option<Decimal>,
    pub gas_used: Option<Decimal>,
}

impl Progress {
    fn new(kind: PlanKind) -> Self {
        let mut steps: Vec<StepProgress> = kind
            .steps()
            .iter()
            .map(|step_kind| StepProgress {
                kind: *step_kind,
                status: None,
                tx_hash: None,
            })
            .collect();
        if let Some(first) = steps.first_mut() {
            first.status = Some(TxStatus::WaitingForApproval);
        }

        Self {
            kind,
            steps,
            done: false,
            sold: None,
            bought: None,
            gas_used: None,
        }
    }
}

/// Receipt/wallet signal for one step of the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    /// The wallet signed and broadcast; a hash is known.
    HashObtained { tx_hash: String },
    /// Receipt observed for a prerequisite step (proxy or allowance).
    Settled,
    /// Receipt observed for the trade step, carrying the fill facts.
    TradeSettled { receipt: TradeReceipt },
    /// The wallet refused to sign.
    Rejected,
    /// The transaction landed and reverted.
    Reverted,
    /// No receipt within the configured bound; reported as `Fiasco`.
    TimedOut,
}

/// Outcome of feeding one event (or a cancellation) to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDecision {
    Applied,
    /// The event targets a step that is not the current one.
    IgnoredStale,
    /// The targeted step already settled, or the sequence already halted.
    IgnoredTerminal,
}

/// Drives one submission's step sequence.
///
/// Purely event-driven: the caller performs the wallet/provider calls and
/// feeds their signals in. Cancellation is a race: whichever of
/// [`cancel`](Self::cancel) and [`apply`](Self::apply) mutates the current
/// step first wins, and late completions after a loss are ignored rather
/// than resurrecting a stale status.
#[derive(Debug)]
pub struct Orchestrator {
    progress: Progress,
    current: usize,
}

impl Orchestrator {
    pub fn start(kind: PlanKind) -> Self {
        Self {
            progress: Progress::new(kind),
            current: 0,
        }
    }

    /// Current snapshot, cloned for folding into the form state.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    /// Index and kind of the step awaiting driver action, if any.
    pub fn current_step(&self) -> Option<(usize, StepKind)> {
        if self.progress.done {
            return None;
        }
        self.progress
            .steps
            .get(self.current)
            .filter(|step| matches!(step.status, Some(status) if !status.is_terminal()))
            .map(|step| (self.current, step.kind))
    }

    pub fn apply(&mut self, step_index: usize, event: StepEvent) -> StepDecision {
        if step_index != self.current {
            tracing::warn!(step_index, current = self.current, "event for non-current step");
            return StepDecision::IgnoredStale;
        }
        if self.progress.done {
            tracing::warn!(step_index, "event after sequence halted");
            return StepDecision::IgnoredTerminal;
        }
        let Some(step) = self.progress.steps.get_mut(step_index) else {
            return StepDecision::IgnoredStale;
        };
        let Some(status) = step.status else {
            return StepDecision::IgnoredStale;
        };
        if status.is_terminal() {
            tracing::warn!(step_index, %status, "event for settled step");
            return StepDecision::IgnoredTerminal;
        }

        match event {
            StepEvent::HashObtained { tx_hash } => {
                if status == TxStatus::WaitingForApproval {
                    step.status = Some(TxStatus::WaitingForConfirmation);
                    step.tx_hash = Some(tx_hash);
                }
            }
            StepEvent::Settled => {
                step.status = Some(TxStatus::Success);
                self.step_succeeded(step_index, None);
            }
            StepEvent::TradeSettled { receipt } => {
                step.status = Some(TxStatus::Success);
                self.step_succeeded(step_index, Some(receipt));
            }
            StepEvent::Rejected => {
                step.status = Some(TxStatus::CancelledByUser);
                self.halt();
            }
            StepEvent::Reverted | StepEvent::TimedOut => {
                step.status = Some(TxStatus::Fiasco);
                self.halt();
            }
        }
        StepDecision::Applied
    }

    /// Race a user cancellation against the current step's completion.
    pub fn cancel(&mut self) -> StepDecision {
        if self.progress.done {
            return StepDecision::IgnoredTerminal;
        }
        let Some(step) = self.progress.steps.get_mut(self.current) else {
            return StepDecision::IgnoredTerminal;
        };
        let Some(status) = step.status else {
            return StepDecision::IgnoredTerminal;
        };
        if status.is_terminal() || !step.kind.cancellable() {
            return StepDecision::IgnoredTerminal;
        }

        step.status = Some(TxStatus::CancelledByUser);
        self.halt();
        StepDecision::Applied
    }

    fn step_succeeded(&mut self, step_index: usize, receipt: Option<TradeReceipt>) {
        let is_last = step_index + 1 == self.progress.steps.len();
        if is_last {
            self.progress.done = true;
            if let Some(receipt) = receipt {
                self.progress.sold = Some(receipt.sold);
                self.progress.bought = Some(receipt.bought);
                self.progress.gas_used = Some(receipt.gas_used);
            }
            return;
        }

        self.current = step_index + 1;
        if let Some(next) = self.progress.steps.get_mut(self.current) {
            next.status = Some(TxStatus::WaitingForApproval);
        }
    }

    fn halt(&mut self) {
        self.progress.done = true;
    }
}
