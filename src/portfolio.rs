// src/portfolio.rs
use alloy::primitives::{Address, U256};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::UpstreamCache;
use crate::fallback;
use crate::models::{
    ChartPoint, ChartSeries, DashboardData, SignedFlow, TimeRange, TokenTransfer, WalletIdentity, WalletMetrics,
};
use crate::parser::{signed_flows, to_token_decimal, to_token_units};
use crate::reconstruct::historical_balances;
use crate::source::WalletSource;
use crate::synthetic::{is_flat, synthesize, WaveProfile};
use crate::timeline;

/// Below this USD value an empty wallet is left flat rather than given a wave
const NEGLIGIBLE_ANCHOR_USD: f64 = 1.0;

/// Inputs to one chart, already converted to token units and USD
pub struct ChartInputs<'a> {
    pub range: TimeRange,
    pub timestamps: &'a [i64],
    pub current_balance: f64,
    pub token_price: f64,
    pub flows: &'a [SignedFlow],
}

/// Reconstructed (or synthetic) value points for one range.
///
/// The reconstruction is replaced by a synthetic wave when it is flat, except
/// for empty wallets with no transfer history, which only get their last
/// point pinned. A non-flat curve always ends at the live value.
pub fn build_chart_points(inputs: &ChartInputs<'_>) -> Vec<ChartPoint> {
    let current_value_usd = inputs.current_balance * inputs.token_price;

    let mut points: Vec<ChartPoint> = historical_balances(inputs.timestamps, inputs.current_balance, inputs.flows)
        .into_iter()
        .zip(inputs.timestamps)
        .map(|(balance, &timestamp)| ChartPoint {
            timestamp,
            value_usd: balance * inputs.token_price,
        })
        .collect();

    let worth_animating = !inputs.flows.is_empty() || current_value_usd > NEGLIGIBLE_ANCHOR_USD;
    if worth_animating && is_flat(&points, current_value_usd) {
        debug!("Flat {} curve at ${:.4}, substituting synthetic wave", inputs.range, current_value_usd);
        return synthesize(&points, current_value_usd, WaveProfile::for_range(inputs.range));
    }

    if let Some(last) = points.last_mut() {
        last.value_usd = current_value_usd;
    }
    points
}

/// Whether the dashboard reflects real funds worth showing
pub fn has_live_signal(threshold_usd: f64, balance_usd: f64, series: &[&ChartSeries]) -> bool {
    balance_usd > threshold_usd
        || series
            .iter()
            .any(|s| s.change_usd.abs() > threshold_usd || s.peak_value_usd() > threshold_usd)
}

/// Assembles charts and dashboards for wallets of one token
pub struct Portfolio {
    source: Arc<dyn WalletSource>,
    cache: UpstreamCache,
    identity: WalletIdentity,
    live_data_threshold_usd: f64,
}

impl Portfolio {
    /// `identity` names the default (tracked) wallet and the token
    pub fn new(
        source: Arc<dyn WalletSource>,
        cache: UpstreamCache,
        identity: WalletIdentity,
        live_data_threshold_usd: f64,
    ) -> Self {
        Self {
            source,
            cache,
            identity,
            live_data_threshold_usd,
        }
    }

    pub fn identity(&self) -> &WalletIdentity {
        &self.identity
    }

    async fn balance_raw(&self, address: Address) -> U256 {
        self.cache.balance(address, self.source.current_balance(address)).await
    }

    async fn transfers(&self, address: Address) -> Arc<Vec<TokenTransfer>> {
        self.cache.transfers(address, self.source.transfer_history(address)).await
    }

    async fn price(&self) -> f64 {
        self.cache.price(self.source.current_price()).await
    }

    /// Cached per (address, range) so repeated reads inside the TTL match exactly
    pub async fn chart_series(&self, address: Address, range: TimeRange) -> ChartSeries {
        self.cache.series(address, range, self.build_series(address, range)).await
    }

    async fn build_series(&self, address: Address, range: TimeRange) -> ChartSeries {
        let (balance_raw, transfers, price) =
            tokio::join!(self.balance_raw(address), self.transfers(address), self.price());

        let decimals = self.identity.token_decimals;
        let current_balance = to_token_units(balance_raw, decimals);
        let current_value_usd = current_balance * price;

        let window = timeline::resolve(range, &transfers, Utc::now().timestamp_millis());
        let timestamps = timeline::build_timestamps(window);
        let flows = signed_flows(&transfers, address, decimals);

        let points = build_chart_points(&ChartInputs {
            range,
            timestamps: &timestamps,
            current_balance,
            token_price: price,
            flows: &flows,
        });

        let series = ChartSeries::from_points(range, points, current_value_usd);
        info!(
            "Built {} series for {}: ${:.2} → ${:.2} ({} transfers)",
            range,
            address,
            series.start_value_usd,
            series.current_value_usd,
            transfers.len()
        );
        series
    }

    /// Wallet snapshot plus the requested chart; synthetic when the wallet
    /// carries no meaningful value
    pub async fn get_dashboard(&self, address: Option<Address>, range: TimeRange) -> DashboardData {
        let address = address.unwrap_or(self.identity.public_key);

        let (balance_raw, price, day, requested) = tokio::join!(
            self.balance_raw(address),
            self.price(),
            self.chart_series(address, TimeRange::OneDay),
            self.chart_series(address, range),
        );

        let decimals = self.identity.token_decimals;
        let balance_usd = to_token_units(balance_raw, decimals) * price;

        if !has_live_signal(self.live_data_threshold_usd, balance_usd, &[&day, &requested]) {
            info!("No live data for {} (${:.6}), serving fallback dashboard", address, balance_usd);
            let identity = WalletIdentity {
                public_key: address,
                ..self.identity.clone()
            };
            return fallback::build_dashboard(range, Some(identity), Utc::now().timestamp_millis());
        }

        DashboardData {
            metrics: WalletMetrics {
                identity: WalletIdentity {
                    public_key: address,
                    ..self.identity.clone()
                },
                balance: to_token_decimal(balance_raw, decimals),
                balance_usd,
                portfolio_value_usd: balance_usd,
                token_plus_portfolio_usd: balance_usd,
                pnl_today_usd: day.change_usd,
                pnl_today_percent: day.change_percent,
            },
            chart: requested,
        }
    }

    pub async fn get_chart(&self, address: Option<Address>, range: TimeRange) -> ChartSeries {
        let address = address.unwrap_or(self.identity.public_key);
        let series = self.chart_series(address, range).await;

        if !has_live_signal(self.live_data_threshold_usd, series.current_value_usd, &[&series]) {
            info!("No live data for {} {}, serving fallback chart", address, range);
            return fallback::build_chart(range, Utc::now().timestamp_millis());
        }

        series
    }
}
