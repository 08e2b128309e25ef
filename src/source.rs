// src/source.rs
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tracing::warn;

use crate::config::LiveConfig;
use crate::error::FetchError;
use crate::etherscan::EtherscanClient;
use crate::models::TokenTransfer;
use crate::price::PriceClient;

/// Upstream reads the portfolio needs. Implementations never fail: a broken
/// upstream degrades to a safe default instead.
#[async_trait]
pub trait WalletSource: Send + Sync {
    /// Raw integer token balance
    async fn current_balance(&self, address: Address) -> U256;

    /// Transfers touching `address`, ascending by timestamp
    async fn transfer_history(&self, address: Address) -> Vec<TokenTransfer>;

    /// Token/USD price, always positive
    async fn current_price(&self) -> f64;
}

/// Explorer + DexScreener backed source
pub struct LiveSource {
    explorer: EtherscanClient,
    prices: PriceClient,
    fallback_price: f64,
}

impl LiveSource {
    pub fn new(cfg: &LiveConfig) -> Result<Self, FetchError> {
        Ok(Self {
            explorer: EtherscanClient::new(&cfg.etherscan_base_url, &cfg.etherscan_api_key, cfg.token_address)?,
            prices: PriceClient::new(&cfg.dexscreener_base_url, cfg.token_address)?,
            fallback_price: cfg.fallback_token_usd_price,
        })
    }
}

#[async_trait]
impl WalletSource for LiveSource {
    async fn current_balance(&self, address: Address) -> U256 {
        self.explorer.fetch_token_balance(address).await.unwrap_or_else(|e| {
            warn!("Balance lookup failed for {}: {}", address, e);
            U256::ZERO
        })
    }

    async fn transfer_history(&self, address: Address) -> Vec<TokenTransfer> {
        self.explorer.fetch_token_transfers(address).await.unwrap_or_else(|e| {
            warn!("Transfer history failed for {}: {}", address, e);
            Vec::new()
        })
    }

    async fn current_price(&self) -> f64 {
        self.prices.fetch_token_usd_price().await.unwrap_or_else(|e| {
            warn!("Price lookup failed ({}), using fallback {}", e, self.fallback_price);
            self.fallback_price
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // nothing listens on port 1, so every request fails to connect
    fn unreachable_config() -> LiveConfig {
        LiveConfig {
            wallet_name: "Ops".to_string(),
            joined_at: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            tracked_address: Address::repeat_byte(0xAA),
            token_address: Address::repeat_byte(0x22),
            token_symbol: "USDC".to_string(),
            token_decimals: 6,
            etherscan_base_url: "http://127.0.0.1:1/api".to_string(),
            etherscan_api_key: "key".to_string(),
            dexscreener_base_url: "http://127.0.0.1:1".to_string(),
            fallback_token_usd_price: 0.97,
        }
    }

    #[tokio::test]
    async fn unreachable_upstream_degrades_to_defaults() {
        let cfg = unreachable_config();
        let source = LiveSource::new(&cfg).unwrap();

        assert_eq!(source.current_balance(cfg.tracked_address).await, U256::ZERO);
        assert!(source.transfer_history(cfg.tracked_address).await.is_empty());
        assert_eq!(source.current_price().await, 0.97);
    }
}
