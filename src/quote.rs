use rust_decimal::Decimal;

use crate::types::{FormConfig, FormSide};

/// Monotonic id for one in-flight quote or gas-estimation request.
pub type RequestId = u64;

/// Last-request-wins bookkeeping for one asynchronous pipeline.
///
/// Each [`begin`](Self::begin) supersedes every earlier request; a resolution
/// is applied only if it carries the latest id. No cancellation of the
/// underlying call is required as long as its result is discarded here.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next: RequestId,
    latest: Option<RequestId>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the id for a new request, superseding any outstanding one.
    pub fn begin(&mut self) -> RequestId {
        self.next += 1;
        self.latest = Some(self.next);
        self.next
    }

    /// Accept a resolution. Returns `false` for stale or unknown ids.
    pub fn accept(&mut self, request: RequestId) -> bool {
        if self.latest == Some(request) {
            self.latest = None;
            true
        } else {
            tracing::debug!(request, latest = ?self.latest, "discarding stale resolution");
            false
        }
    }

    /// Drop any outstanding request without issuing a new one.
    pub fn reset(&mut self) {
        self.latest = None;
    }

    pub fn outstanding(&self) -> bool {
        self.latest.is_some()
    }
}

/// Parameters handed to the external order-book quotation function.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuoteParams {
    /// Which amount field is authoritative.
    pub side: FormSide,
    /// The authoritative amount.
    pub amount: Decimal,
    pub sell_token: String,
    pub buy_token: String,
}

/// Result of walking the order book for a requested amount.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QuoteOutcome {
    /// The book can fill the amount. `price` is buy-token units per one
    /// sell-token unit; `price_impact` is the fractional deviation from the
    /// best price.
    Filled {
        price: Decimal,
        price_impact: Decimal,
    },
    /// The requested amount exceeds what the book can fill.
    InsufficientLiquidity,
}

/// Base/quote ordering for the quotation label.
///
/// The reference token (the stablecoin, then the wrapped-native fallback)
/// always lands on the quote side, so the label is identical regardless of
/// which side the user is buying or selling. Pairs containing neither
/// reference are ordered lexicographically, which is equally side-blind.
pub fn quotation_pair<'a>(a: &'a str, b: &'a str, config: &FormConfig) -> (&'a str, &'a str) {
    if a == config.primary_reference {
        return (b, a);
    }
    if b == config.primary_reference {
        return (a, b);
    }
    if a == config.secondary_reference {
        return (b, a);
    }
    if b == config.secondary_reference {
        return (a, b);
    }
    if a <= b { (a, b) } else { (b, a) }
}

/// Human-readable `base/quote` quotation label for a pair.
pub fn quotation_label(sell_token: &str, buy_token: &str, config: &FormConfig) -> String {
    let (base, quote) = quotation_pair(sell_token, buy_token, config);
    format!("{base}/{quote}")
}
