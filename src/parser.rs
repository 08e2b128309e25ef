// src/parser.rs
use alloy::primitives::{utils::format_units, Address, U256};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::Deserialize;
use std::str::FromStr;

use crate::models::{SignedFlow, TokenTransfer};

/// One row of the explorer's `tokentx` result (all fields arrive as strings)
#[derive(Debug, Clone, Deserialize)]
pub struct RawTokenTransfer {
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    pub hash: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "isError", default = "not_errored")]
    pub is_error: String,
}

fn not_errored() -> String {
    "0".to_string()
}

/// Decode a single explorer row, `None` for errored or malformed rows
pub fn decode_transfer(raw: &RawTokenTransfer) -> Option<TokenTransfer> {
    if raw.is_error != "0" {
        return None;
    }

    let from = Address::from_str(raw.from.trim()).ok()?;
    let to = Address::from_str(raw.to.trim()).ok()?;
    let value_raw = if raw.value.is_empty() {
        U256::ZERO
    } else {
        U256::from_str(raw.value.trim()).ok()?
    };
    let seconds: i64 = raw.time_stamp.trim().parse().ok()?;

    Some(TokenTransfer {
        tx_hash: raw.hash.clone(),
        from,
        to,
        value_raw,
        timestamp: seconds.checked_mul(1000)?,
    })
}

/// Decodes all rows, keeping ascending timestamp order
pub fn decode_transfers(rows: &[RawTokenTransfer]) -> Vec<TokenTransfer> {
    let mut transfers: Vec<TokenTransfer> = rows.iter().filter_map(decode_transfer).collect();
    // stable: same-block transfers keep explorer order
    transfers.sort_by_key(|t| t.timestamp);
    transfers
}

/// Raw integer units → human readable token amount
pub fn to_token_units(raw: U256, decimals: u8) -> f64 {
    format_units(raw, decimals)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Same as [`to_token_units`] but exact where `Decimal` can hold the value
pub fn to_token_decimal(raw: U256, decimals: u8) -> Decimal {
    format_units(raw, decimals)
        .ok()
        .and_then(|s| Decimal::from_str(&s).ok())
        .map(|d| d.normalize())
        .or_else(|| Decimal::from_f64(to_token_units(raw, decimals)))
        .unwrap_or(Decimal::ZERO)
}

/// Signed flow of each transfer relative to `address`. Self-transfers net to zero.
pub fn signed_flows(transfers: &[TokenTransfer], address: Address, decimals: u8) -> Vec<SignedFlow> {
    transfers
        .iter()
        .map(|tx| {
            let tokens = to_token_units(tx.value_raw, decimals);
            let inflow = tx.to == address;
            let outflow = tx.from == address;

            let signed = match (inflow, outflow) {
                (true, false) => tokens,
                (false, true) => -tokens,
                _ => 0.0,
            };

            SignedFlow {
                timestamp: tx.timestamp,
                tokens: signed,
            }
        })
        .collect()
}
