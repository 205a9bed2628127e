use crate::error::Error;
use crate::form::change::Change;
use crate::form::{FormState, apply_change};
use crate::gas::{GasEstimationStatus, GasParams, SettleFilter};
use crate::progress::{Orchestrator, PlanKind, StepDecision, StepEvent, StepKind};
use crate::quote::{QuoteParams, RequestId, RequestTracker};
use crate::types::{AccountSnapshot, FormConfig};

/// An effect the driver must perform on the engine's behalf. The core never
/// blocks; every asynchronous collaborator is a command out and a change
/// back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the order-book quotation function for a price; resolve by folding
    /// `Change::QuoteResolved` with the same request id.
    RequestQuote {
        request: RequestId,
        params: QuoteParams,
    },
    /// Ask the call layer for a gas estimate; resolve by folding
    /// `Change::GasEstimated` with the same request id.
    RequestGasEstimate {
        request: RequestId,
        params: GasParams,
    },
    /// Sign and send the given transaction step, then feed its signals back
    /// through [`FormEngine::transaction_event`].
    SubmitStep { step: usize, kind: StepKind },
}

fn suppress_calculating(status: &GasEstimationStatus) -> bool {
    *status == GasEstimationStatus::Calculating
}

/// The reactive pipeline around the pure reducer.
///
/// Owns the single ordered fold: every input, from keystrokes to polled
/// environment updates to resolved quotes and transaction progress, goes
/// through [`apply`](Self::apply) in emission order, which is the state's
/// only timeline. Stale quote/gas resolutions are discarded here before
/// they ever reach the fold.
pub struct FormEngine {
    config: FormConfig,
    state: FormState,
    quote_requests: RequestTracker,
    gas_requests: RequestTracker,
    gas_feed: SettleFilter<fn(&GasEstimationStatus) -> bool>,
    last_gas_status: GasEstimationStatus,
    gas_frames: Vec<GasEstimationStatus>,
    orchestrator: Option<Orchestrator>,
}

impl FormEngine {
    pub fn new(config: FormConfig) -> Self {
        let state = FormState::new(&config);
        Self {
            config,
            state,
            quote_requests: RequestTracker::new(),
            gas_requests: RequestTracker::new(),
            gas_feed: SettleFilter::new(suppress_calculating),
            last_gas_status: GasEstimationStatus::Unset,
            gas_frames: Vec::new(),
            orchestrator: None,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Gas status frames that actually reached downstream consumers since
    /// the last call; superseded `Calculating` flicker never shows up here.
    pub fn take_gas_frames(&mut self) -> Vec<GasEstimationStatus> {
        std::mem::take(&mut self.gas_frames)
    }

    /// Fold one change and return the follow-up effects it requires.
    pub fn apply(&mut self, change: Change) -> Vec<Command> {
        match &change {
            Change::QuoteResolved { request, .. } => {
                if !self.quote_requests.accept(*request) {
                    return Vec::new();
                }
            }
            Change::GasEstimated { request, .. } => {
                if !self.gas_requests.accept(*request) {
                    return Vec::new();
                }
            }
            Change::FormReset => {
                self.quote_requests.reset();
                self.gas_requests.reset();
                self.gas_feed.reset();
                self.orchestrator = None;
            }
            _ => {}
        }

        self.fold(&change);

        let mut commands = Vec::new();
        if change.quote_relevant() {
            match self.quote_params() {
                Some(params) => {
                    let request = self.quote_requests.begin();
                    commands.push(Command::RequestQuote { request, params });
                }
                None => self.quote_requests.reset(),
            }
        }
        if change.gas_relevant() {
            match self.gas_params() {
                Some(params)
                    if self.state.gas_estimation.status == GasEstimationStatus::Calculating =>
                {
                    let request = self.gas_requests.begin();
                    commands.push(Command::RequestGasEstimate { request, params });
                }
                _ => self.gas_requests.reset(),
            }
        }
        commands
    }

    /// Decide the transaction plan from the account snapshot and start the
    /// sequence. The plan is never re-evaluated mid-flight.
    pub fn submit(&mut self, account: &AccountSnapshot) -> Result<Vec<Command>, Error> {
        if !self.state.ready_to_proceed {
            return Err(Error::Submit {
                reason: "form is not ready to proceed".to_string(),
            });
        }
        if self.orchestrator.is_some() {
            return Err(Error::Submit {
                reason: "a submission is already in flight".to_string(),
            });
        }

        let kind = PlanKind::decide(account, &self.state.sell_token, &self.config.native_token);
        let orchestrator = Orchestrator::start(kind);
        let progress = orchestrator.progress();
        let first = orchestrator.current_step();
        self.orchestrator = Some(orchestrator);
        self.fold(&Change::ProgressUpdated { progress });

        Ok(first
            .map(|(step, step_kind)| Command::SubmitStep {
                step,
                kind: step_kind,
            })
            .into_iter()
            .collect())
    }

    /// Feed a wallet/receipt signal for one step. Returns the next step's
    /// submission command once a prerequisite settles successfully.
    pub fn transaction_event(&mut self, step: usize, event: StepEvent) -> Vec<Command> {
        let Some(orchestrator) = self.orchestrator.as_mut() else {
            tracing::warn!(step, "transaction event without a submission");
            return Vec::new();
        };

        let before = orchestrator.current_step();
        if orchestrator.apply(step, event) != StepDecision::Applied {
            return Vec::new();
        }
        let progress = orchestrator.progress();
        let after = orchestrator.current_step();
        self.fold(&Change::ProgressUpdated { progress });

        match after {
            Some((next_step, kind)) if before.map(|(index, _)| index) != Some(next_step) => {
                vec![Command::SubmitStep {
                    step: next_step,
                    kind,
                }]
            }
            _ => Vec::new(),
        }
    }

    /// Race a user cancellation against the current step. Returns whether
    /// the cancellation won.
    pub fn cancel(&mut self) -> bool {
        let Some(orchestrator) = self.orchestrator.as_mut() else {
            return false;
        };
        if orchestrator.cancel() != StepDecision::Applied {
            return false;
        }
        let progress = orchestrator.progress();
        self.fold(&Change::ProgressUpdated { progress });
        true
    }

    fn fold(&mut self, change: &Change) {
        self.state = apply_change(&self.state, change, &self.config);

        let status = self.state.gas_estimation.status;
        if status != self.last_gas_status {
            self.last_gas_status = status;
            if let Some(frame) = self.gas_feed.admit(status) {
                self.gas_frames.push(frame);
            }
        }
    }

    fn quote_params(&self) -> Option<QuoteParams> {
        let amount = self.state.authoritative_amount()?;
        Some(QuoteParams {
            side: self.state.side,
            amount,
            sell_token: self.state.sell_token.clone(),
            buy_token: self.state.buy_token.clone(),
        })
    }

    fn gas_params(&self) -> Option<GasParams> {
        let amount = self.state.authoritative_amount()?;
        let gas_price_gwei = self.state.gas_price_gwei?;
        Some(GasParams {
            side: self.state.side,
            amount,
            sell_token: self.state.sell_token.clone(),
            buy_token: self.state.buy_token.clone(),
            gas_price_gwei,
        })
    }
}
