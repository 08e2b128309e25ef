// src/fallback.rs
//! Fully synthetic dashboard, served when no live wallet is configured or
//! the live wallet holds nothing worth charting.

use alloy::primitives::Address;
use rust_decimal::Decimal;

use crate::models::{ChartPoint, ChartSeries, DashboardData, TimeRange, WalletIdentity, WalletMetrics};

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

pub const MOCK_CURRENT_VALUE_USD: f64 = 3361.42;

fn range_ms(range: TimeRange) -> i64 {
    match range {
        TimeRange::OneHour => HOUR_MS,
        TimeRange::SixHours => 6 * HOUR_MS,
        TimeRange::OneDay => DAY_MS,
        TimeRange::OneWeek => 7 * DAY_MS,
        TimeRange::OneMonth => 30 * DAY_MS,
        TimeRange::All => 120 * DAY_MS,
    }
}

fn range_count(range: TimeRange) -> usize {
    match range {
        TimeRange::OneHour => 16,
        TimeRange::SixHours | TimeRange::OneDay => 24,
        TimeRange::OneWeek => 30,
        TimeRange::OneMonth => 34,
        TimeRange::All => 36,
    }
}

/// Target total change over the range
pub fn range_change_usd(range: TimeRange) -> f64 {
    match range {
        TimeRange::OneHour => 42.37,
        TimeRange::SixHours | TimeRange::OneDay => 223.43,
        TimeRange::OneWeek => 488.62,
        TimeRange::OneMonth => 792.11,
        TimeRange::All => 1249.85,
    }
}

pub fn mock_identity() -> WalletIdentity {
    WalletIdentity {
        wallet_name: "My Wallet".to_string(),
        joined_at: "2025-11-01".to_string(),
        public_key: Address::repeat_byte(0x11),
        token_symbol: "USDC".to_string(),
        token_address: Address::repeat_byte(0x22),
        token_decimals: 6,
    }
}

pub fn build_chart(range: TimeRange, now: i64) -> ChartSeries {
    let duration = range_ms(range);
    let count = range_count(range);
    let step = duration as f64 / count.saturating_sub(1).max(1) as f64;

    let current_value_usd = MOCK_CURRENT_VALUE_USD;
    let change_target = range_change_usd(range);
    let start_value_usd = (current_value_usd - change_target).max(1.0);
    let amplitude = (change_target * 0.42).max(32.0);
    let span = count.saturating_sub(1).max(1) as f64;

    let mut points: Vec<ChartPoint> = (0..count)
        .map(|i| {
            let x = i as f64;
            let progress = x / span;
            let trend = start_value_usd + (current_value_usd - start_value_usd) * progress;
            let wave = (x * 0.38 + 0.9).sin() * amplitude * 0.35
                + (x * 0.22).cos() * amplitude * 0.2
                + (x * 0.77).sin() * amplitude * 0.12;

            ChartPoint {
                timestamp: (now as f64 - duration as f64 + x * step).round() as i64,
                value_usd: (trend + wave).max(0.0),
            }
        })
        .collect();

    if let Some(first) = points.first_mut() {
        first.value_usd = start_value_usd;
    }
    if let Some(last) = points.last_mut() {
        last.value_usd = current_value_usd;
    }

    ChartSeries::from_points(range, points, current_value_usd)
}

/// Synthetic dashboard. `identity` overrides the mock wallet identity when
/// a live wallet is configured but has no meaningful data.
pub fn build_dashboard(range: TimeRange, identity: Option<WalletIdentity>, now: i64) -> DashboardData {
    DashboardData {
        metrics: WalletMetrics {
            identity: identity.unwrap_or_else(mock_identity),
            balance: Decimal::new(98442, 2),
            balance_usd: MOCK_CURRENT_VALUE_USD,
            portfolio_value_usd: MOCK_CURRENT_VALUE_USD,
            token_plus_portfolio_usd: 0.01,
            pnl_today_usd: 23.43,
            pnl_today_percent: 5.2,
        },
        chart: build_chart(range, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000_000;

    #[test]
    fn chart_hits_target_change_exactly() {
        for range in TimeRange::ALL_RANGES {
            let chart = build_chart(range, NOW);
            let target = range_change_usd(range);

            assert_eq!(chart.points.len(), range_count(range));
            assert_eq!(chart.current_value_usd, MOCK_CURRENT_VALUE_USD);
            assert_eq!(chart.points[0].value_usd, chart.start_value_usd);
            assert!((chart.change_usd - target).abs() < 1e-9, "{range}");
            assert_eq!(chart.change_usd, chart.current_value_usd - chart.start_value_usd);
            assert!(chart.change_percent > 0.0);
        }
    }

    #[test]
    fn chart_timestamps_end_now() {
        let chart = build_chart(TimeRange::OneWeek, NOW);
        assert_eq!(chart.points.last().unwrap().timestamp, NOW);
        assert_eq!(chart.points[0].timestamp, NOW - 7 * DAY_MS);
        assert!(chart.points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn same_inputs_same_chart() {
        assert_eq!(build_chart(TimeRange::All, NOW), build_chart(TimeRange::All, NOW));
    }

    #[test]
    fn dashboard_keeps_given_identity() {
        let mut identity = mock_identity();
        identity.wallet_name = "Treasury".into();

        let dashboard = build_dashboard(TimeRange::OneDay, Some(identity.clone()), NOW);
        assert_eq!(dashboard.metrics.identity, identity);
        assert_eq!(dashboard.metrics.balance.to_string(), "984.42");

        let mock = build_dashboard(TimeRange::OneDay, None, NOW);
        assert_eq!(mock.metrics.identity.token_symbol, "USDC");
        assert_eq!(mock.chart.range, TimeRange::OneDay);
    }
}
