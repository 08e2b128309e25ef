// src/reconstruct.rs
use crate::models::SignedFlow;

/// Historical balance at each timestamp, derived by walking back from
/// `current_balance` and undoing every flow that happened after it.
///
/// Both `timestamps` and `flows` must be ascending. Single backward sweep
/// with one shared cursor; output order matches `timestamps`.
pub fn historical_balances(timestamps: &[i64], current_balance: f64, flows: &[SignedFlow]) -> Vec<f64> {
    let mut balances = vec![0.0; timestamps.len()];
    let mut remaining = flows.iter().rev().peekable();
    let mut future_flow = 0.0;

    for (slot, &timestamp) in balances.iter_mut().zip(timestamps).rev() {
        while let Some(flow) = remaining.next_if(|flow| flow.timestamp > timestamp) {
            future_flow += flow.tokens;
        }
        *slot = (current_balance - future_flow).max(0.0);
    }

    balances
}
