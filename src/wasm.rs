use wasm_bindgen::prelude::*;

use crate::form::FormState;
use crate::form::validate::{Placement, primary, validate};
use crate::progress::{PlanKind, StepKind, TxStatus};
use crate::quote;
use crate::types::{AccountSnapshot, FormConfig};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js(value: &serde_json::Value) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

fn error_result(msg: &str) -> JsValue {
    let obj = serde_json::json!({"error": msg});
    to_js(&obj)
}

fn step_kind_str(kind: StepKind) -> &'static str {
    kind.as_ref()
}

/// Decide which transaction sub-sequence applies for an account snapshot.
#[wasm_bindgen]
pub fn decide_plan(account_json: &str, sell_token: &str) -> JsValue {
    let account: AccountSnapshot = match serde_json::from_str(account_json) {
        Ok(a) => a,
        Err(_) => return error_result("Invalid account snapshot"),
    };
    let config = FormConfig::default();
    let kind = PlanKind::decide(&account, sell_token, &config.native_token);
    let steps: Vec<serde_json::Value> = kind
        .steps()
        .iter()
        .map(|step| serde_json::Value::String(step_kind_str(*step).to_string()))
        .collect();
    to_js(&serde_json::json!({
        "plan": kind.as_ref(),
        "steps": steps,
    }))
}

/// List the step kinds of a named plan.
#[wasm_bindgen]
pub fn plan_steps(plan: &str) -> JsValue {
    let Ok(kind) = plan.parse::<PlanKind>() else {
        return error_result("Unknown plan kind");
    };
    let steps: Vec<serde_json::Value> = kind
        .steps()
        .iter()
        .map(|step| serde_json::Value::String(step_kind_str(*step).to_string()))
        .collect();
    to_js(&serde_json::Value::Array(steps))
}

/// Check whether a transaction status string is terminal.
#[wasm_bindgen]
pub fn tx_status_is_terminal(status: &str) -> bool {
    status
        .parse::<TxStatus>()
        .map(TxStatus::is_terminal)
        .unwrap_or(false)
}

/// The side-independent `base/quote` label for a pair.
#[wasm_bindgen]
pub fn quotation_label(sell_token: &str, buy_token: &str) -> String {
    quote::quotation_label(sell_token, buy_token, &FormConfig::default())
}

/// Validate a serialized form state; returns all messages plus the primary
/// one per placement.
#[wasm_bindgen]
pub fn validate_state(state_json: &str) -> JsValue {
    let state: FormState = match serde_json::from_str(state_json) {
        Ok(s) => s,
        Err(_) => return error_result("Invalid form state"),
    };
    let config = FormConfig::default();
    let messages = validate(&state, &config);

    let all = match serde_json::to_value(&messages) {
        Ok(v) => v,
        Err(_) => return error_result("Unserializable messages"),
    };
    let top = primary(&messages, Placement::Top)
        .and_then(|m| serde_json::to_value(m).ok())
        .unwrap_or(serde_json::Value::Null);
    let bottom = primary(&messages, Placement::Bottom)
        .and_then(|m| serde_json::to_value(m).ok())
        .unwrap_or(serde_json::Value::Null);

    to_js(&serde_json::json!({
        "messages": all,
        "primaryTop": top,
        "primaryBottom": bottom,
    }))
}
