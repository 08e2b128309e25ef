use alloy::primitives::Address;
use chrono::NaiveDate;
use dotenvy::dotenv;
use serde::Serialize;
use std::{env, str::FromStr, time::Duration};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::models::WalletIdentity;

/// Keys without which no live wallet can be read
pub const REQUIRED_KEYS: [&str; 3] = ["TRACKED_PUBLIC_KEY", "TOKEN_ADDRESS", "ETHERSCAN_API_KEY"];

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cache_ttl: Duration,
    pub live_data_threshold_usd: f64,
    pub live: Option<LiveConfig>, // None → every request is served from fallback
    pub status: ConfigStatus,
}

/// Everything needed to talk to the explorer and price APIs for one wallet
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub wallet_name: String,
    pub joined_at: NaiveDate,
    pub tracked_address: Address,
    pub token_address: Address,
    pub token_symbol: String,
    pub token_decimals: u8,
    pub etherscan_base_url: String,
    pub etherscan_api_key: String,
    pub dexscreener_base_url: String,
    pub fallback_token_usd_price: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStatus {
    pub is_ready: bool,
    pub missing_keys: Vec<String>,
    pub error: Option<String>,
}

impl LiveConfig {
    pub fn identity(&self) -> WalletIdentity {
        WalletIdentity {
            wallet_name: self.wallet_name.clone(),
            joined_at: self.joined_at.format("%Y-%m-%d").to_string(),
            public_key: self.tracked_address,
            token_symbol: self.token_symbol.clone(),
            token_address: self.token_address,
            token_decimals: self.token_decimals,
        }
    }

    /// Parses the live wallet settings from any key lookup
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let address = |key: &'static str, value: String| {
            Address::from_str(value.trim()).map_err(|_| ConfigError::InvalidAddress(key))
        };

        let tracked_address = address("TRACKED_PUBLIC_KEY", required("TRACKED_PUBLIC_KEY")?)?;
        let token_address = address("TOKEN_ADDRESS", required("TOKEN_ADDRESS")?)?;
        let etherscan_api_key = required("ETHERSCAN_API_KEY")?;

        let token_decimals = match get("TOKEN_DECIMALS") {
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|d| (1..=77).contains(d))
                .ok_or(ConfigError::InvalidNumber("TOKEN_DECIMALS"))?,
            None => 18,
        };

        let fallback_token_usd_price = match get("FALLBACK_TOKEN_USD_PRICE") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite() && *p > 0.0)
                .ok_or(ConfigError::InvalidNumber("FALLBACK_TOKEN_USD_PRICE"))?,
            None => 1.0,
        };

        let joined_at = match get("JOINED_AT") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| ConfigError::InvalidDate("JOINED_AT"))?,
            None => NaiveDate::from_ymd_opt(2025, 11, 1).ok_or(ConfigError::InvalidDate("JOINED_AT"))?,
        };

        Ok(LiveConfig {
            wallet_name: get("WALLET_NAME").unwrap_or_else(|| "My Wallet".to_string()),
            joined_at,
            tracked_address,
            token_address,
            token_symbol: get("TOKEN_SYMBOL").unwrap_or_else(|| "TOKEN".to_string()),
            token_decimals,
            etherscan_base_url: get("ETHERSCAN_BASE_URL")
                .unwrap_or_else(|| "https://api.etherscan.io/api".to_string()),
            etherscan_api_key,
            dexscreener_base_url: get("DEXSCREENER_BASE_URL")
                .unwrap_or_else(|| "https://api.dexscreener.com".to_string()),
            fallback_token_usd_price,
        })
    }
}

pub fn status_from_lookup<F>(get: F, live: &Result<LiveConfig, ConfigError>) -> ConfigStatus
where
    F: Fn(&str) -> Option<String>,
{
    let missing_keys: Vec<String> = REQUIRED_KEYS
        .into_iter()
        .filter(|key| get(*key).map_or(true, |v| v.trim().is_empty()))
        .map(|key| key.to_string())
        .collect();

    ConfigStatus {
        is_ready: live.is_ok(),
        missing_keys,
        error: live.as_ref().err().map(|e| e.to_string()),
    }
}

pub fn load() -> Config {
    dotenv().ok(); // load .env if present

    let lookup = |key: &str| env::var(key).ok();

    // API port (default: 8080)
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    // upstream cache lifetime (default: 60s)
    let cache_ttl_secs: u64 = env::var("CACHE_TTL_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);

    let live_data_threshold_usd: f64 = env::var("LIVE_DATA_THRESHOLD_USD")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
        .unwrap_or(1.0);

    let live = LiveConfig::from_lookup(lookup);
    let status = status_from_lookup(lookup, &live);

    match &live {
        Ok(live) => info!(
            "Tracking {} ({}) for token {} [{} decimals]",
            live.wallet_name, live.tracked_address, live.token_symbol, live.token_decimals
        ),
        Err(e) => warn!("Live wallet not configured ({}), serving fallback data", e),
    }

    let cfg = Config {
        port,
        cache_ttl: Duration::from_secs(cache_ttl_secs),
        live_data_threshold_usd,
        live: live.ok(),
        status,
    };

    info!(
        "Loaded config: port={} cache_ttl={:?} live_data_threshold_usd={}",
        cfg.port, cfg.cache_ttl, cfg.live_data_threshold_usd
    );

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TRACKED: &str = "0x1234567890abcdef1234567890abcdef12345678";
    const TOKEN: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("TRACKED_PUBLIC_KEY", TRACKED),
            ("TOKEN_ADDRESS", TOKEN),
            ("ETHERSCAN_API_KEY", "key"),
        ]
    }

    #[test]
    fn defaults_apply() {
        let cfg = LiveConfig::from_lookup(lookup(&base())).unwrap();

        assert_eq!(cfg.token_decimals, 18);
        assert_eq!(cfg.fallback_token_usd_price, 1.0);
        assert_eq!(cfg.wallet_name, "My Wallet");
        assert_eq!(cfg.identity().joined_at, "2025-11-01");
        assert_eq!(cfg.etherscan_base_url, "https://api.etherscan.io/api");
        assert_eq!(cfg.tracked_address, Address::from_str(TRACKED).unwrap());
    }

    #[test]
    fn missing_keys_are_reported() {
        let get = lookup(&[("TOKEN_ADDRESS", TOKEN)]);
        let live = LiveConfig::from_lookup(&get);
        assert_eq!(live.as_ref().unwrap_err(), &ConfigError::Missing("TRACKED_PUBLIC_KEY"));

        let status = status_from_lookup(&get, &live);
        assert!(!status.is_ready);
        assert_eq!(status.missing_keys, vec!["TRACKED_PUBLIC_KEY", "ETHERSCAN_API_KEY"]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut pairs = base();
        pairs[0] = ("TRACKED_PUBLIC_KEY", "0x1234");
        assert_eq!(
            LiveConfig::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::InvalidAddress("TRACKED_PUBLIC_KEY")
        );

        let mut pairs = base();
        pairs.push(("TOKEN_DECIMALS", "0"));
        assert_eq!(
            LiveConfig::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::InvalidNumber("TOKEN_DECIMALS")
        );

        let mut pairs = base();
        pairs.push(("FALLBACK_TOKEN_USD_PRICE", "-2"));
        assert_eq!(
            LiveConfig::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::InvalidNumber("FALLBACK_TOKEN_USD_PRICE")
        );

        let mut pairs = base();
        pairs.push(("JOINED_AT", "yesterday"));
        assert_eq!(
            LiveConfig::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::InvalidDate("JOINED_AT")
        );
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = base();
        pairs.extend([
            ("TOKEN_DECIMALS", "6"),
            ("TOKEN_SYMBOL", "USDC"),
            ("JOINED_AT", "2024-02-29"),
            ("FALLBACK_TOKEN_USD_PRICE", "0.998"),
        ]);
        let cfg = LiveConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(cfg.token_decimals, 6);
        assert_eq!(cfg.token_symbol, "USDC");
        assert_eq!(cfg.identity().joined_at, "2024-02-29");
        assert_eq!(cfg.fallback_token_usd_price, 0.998);
    }
}
