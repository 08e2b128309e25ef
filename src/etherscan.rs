// src/etherscan.rs
use alloy::primitives::{Address, U256};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::models::TokenTransfer;
use crate::parser::{self, RawTokenTransfer};

const NO_TRANSACTIONS: &str = "No transactions found";

/// `{status, message, result}` wrapper every explorer response uses
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Option<Value>,
}

/// Etherscan-compatible explorer API, scoped to one token contract
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    client: Client,
    base_url: String,
    api_key: String,
    token_address: Address,
}

impl EtherscanClient {
    pub fn new(base_url: &str, api_key: &str, token_address: Address) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            token_address,
        })
    }

    /// Issue one GET and unwrap the envelope. `Ok(None)` means the explorer
    /// answered but had nothing for us.
    async fn call(&self, action: &str, params: &[(&str, String)]) -> Result<Option<Value>, FetchError> {
        info!("📡 Explorer action={} → {}", action, self.base_url);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("module", "account"), ("action", action)])
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status().as_u16(),
                action: action.to_string(),
            });
        }

        let text = resp.text().await?;
        debug!("📩 Raw explorer response for {}: {}", action, text);

        let envelope: Envelope = serde_json::from_str(&text).map_err(|e| FetchError::Decode {
            action: action.to_string(),
            message: e.to_string(),
        })?;

        unwrap_envelope(action, envelope)
    }

    /// Current token balance of `address` in raw integer units
    pub async fn fetch_token_balance(&self, address: Address) -> Result<U256, FetchError> {
        let params = [
            ("contractaddress", self.token_address.to_string()),
            ("address", address.to_string()),
            ("tag", "latest".to_string()),
        ];

        match self.call("tokenbalance", &params).await? {
            None => Ok(U256::ZERO),
            Some(Value::String(raw)) if raw.is_empty() => Ok(U256::ZERO),
            Some(Value::String(raw)) => U256::from_str(raw.trim()).map_err(|e| FetchError::Decode {
                action: "tokenbalance".to_string(),
                message: e.to_string(),
            }),
            Some(other) => Err(FetchError::Decode {
                action: "tokenbalance".to_string(),
                message: format!("unexpected result {other}"),
            }),
        }
    }

    /// Full transfer history of `address` for the token, oldest first
    pub async fn fetch_token_transfers(&self, address: Address) -> Result<Vec<TokenTransfer>, FetchError> {
        let params = [
            ("contractaddress", self.token_address.to_string()),
            ("address", address.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", "99999999".to_string()),
            ("sort", "asc".to_string()),
        ];

        let rows: Vec<RawTokenTransfer> = match self.call("tokentx", &params).await? {
            Some(result @ Value::Array(_)) => serde_json::from_value(result).map_err(|e| FetchError::Decode {
                action: "tokentx".to_string(),
                message: e.to_string(),
            })?,
            // the explorer reports "no data" as a bare string
            Some(_) | None => Vec::new(),
        };

        let transfers = parser::decode_transfers(&rows);
        info!("Fetched {} transfers ({} rows) for {}", transfers.len(), rows.len(), address);
        if let Some(latest) = transfers.last() {
            debug!("Latest transfer {} at {}", latest.tx_hash, latest.timestamp);
        }
        Ok(transfers)
    }
}

fn status_text(status: &Value) -> String {
    match status {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn unwrap_envelope(action: &str, envelope: Envelope) -> Result<Option<Value>, FetchError> {
    match status_text(&envelope.status).as_str() {
        "1" => Ok(envelope.result),
        "0" => {
            let result_text = envelope.result.as_ref().and_then(Value::as_str);
            let no_data = envelope.message == NO_TRANSACTIONS || result_text == Some(NO_TRANSACTIONS);

            if no_data {
                Ok(None)
            } else {
                Err(FetchError::Upstream {
                    action: action.to_string(),
                    message: result_text.map_or_else(|| envelope.message.clone(), str::to_string),
                })
            }
        }
        _ => Ok(envelope.result),
    }
}
