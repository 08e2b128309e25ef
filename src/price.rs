// src/price.rs
use alloy::primitives::Address;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;

#[derive(Debug, Default, Deserialize)]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Deserialize)]
pub struct DexPair {
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<String>,
    pub liquidity: Option<Liquidity>,
}

#[derive(Debug, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
}

/// Price of the most liquid pair that quotes a USD price
pub fn best_pair_price(resp: &DexScreenerResponse) -> Option<f64> {
    let pairs = resp.pairs.as_deref().unwrap_or_default();

    let best = pairs
        .iter()
        .filter(|p| p.price_usd.is_some())
        .max_by(|a, b| {
            let la = a.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);
            let lb = b.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);
            la.total_cmp(&lb)
        })?;

    best.price_usd
        .as_deref()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p > 0.0)
}

#[derive(Debug, Clone)]
pub struct PriceClient {
    client: Client,
    base_url: String,
    token_address: Address,
}

impl PriceClient {
    pub fn new(base_url: &str, token_address: Address) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_address,
        })
    }

    /// Current token/USD price from DexScreener
    pub async fn fetch_token_usd_price(&self) -> Result<f64, FetchError> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, self.token_address);
        debug!("📡 Price lookup → {}", url);

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status().as_u16(),
                action: "price".to_string(),
            });
        }

        let body: DexScreenerResponse = resp.json().await?;
        best_pair_price(&body).ok_or_else(|| FetchError::Decode {
            action: "price".to_string(),
            message: "no pair with a positive USD price".to_string(),
        })
    }
}
