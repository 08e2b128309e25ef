// src/models.rs
use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{fmt, str::FromStr};

use crate::error::ParseRangeError;

/// Look-back window a chart can be requested for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TimeRange {
    #[serde(rename = "1H")]
    OneHour,
    #[serde(rename = "6H")]
    #[default]
    SixHours,
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "ALL")]
    All,
}

impl TimeRange {
    pub const ALL_RANGES: [TimeRange; 6] = [
        TimeRange::OneHour,
        TimeRange::SixHours,
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "1H",
            TimeRange::SixHours => "6H",
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::All => "ALL",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL_RANGES
            .into_iter()
            .find(|range| range.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRangeError(s.to_string()))
    }
}

/// A token transfer touching the tracked wallet, as reported by the explorer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub tx_hash: String,
    pub from: Address,
    pub to: Address,
    pub value_raw: U256,
    pub timestamp: i64, // ms since epoch
}

/// Signed token movement relative to one address
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedFlow {
    pub timestamp: i64,
    pub tokens: f64, // + inflow, - outflow
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub timestamp: i64,
    pub value_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub range: TimeRange,
    pub points: Vec<ChartPoint>,
    pub start_value_usd: f64,
    pub current_value_usd: f64,
    pub change_usd: f64,
    pub change_percent: f64,
}

impl ChartSeries {
    /// Builds the summary fields from the points. The current value is the
    /// last point's value; `fallback_value` is only used for an empty series.
    pub fn from_points(range: TimeRange, points: Vec<ChartPoint>, fallback_value: f64) -> Self {
        let start_value_usd = points.first().map_or(fallback_value, |p| p.value_usd);
        let current_value_usd = points.last().map_or(fallback_value, |p| p.value_usd);
        let change_usd = current_value_usd - start_value_usd;

        ChartSeries {
            range,
            points,
            start_value_usd,
            current_value_usd,
            change_usd,
            change_percent: percent_change(change_usd, start_value_usd),
        }
    }

    /// Highest point value, 0 for an empty series
    pub fn peak_value_usd(&self) -> f64 {
        self.points.iter().map(|p| p.value_usd).fold(0.0, f64::max)
    }
}

pub fn percent_change(change: f64, base: f64) -> f64 {
    if base.abs() < f64::EPSILON {
        0.0
    } else {
        change / base * 100.0
    }
}

/// Who the dashboard is about
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletIdentity {
    pub wallet_name: String,
    pub joined_at: String,
    pub public_key: Address,
    pub token_symbol: String,
    pub token_address: Address,
    pub token_decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletMetrics {
    #[serde(flatten)]
    pub identity: WalletIdentity,
    pub balance: Decimal,
    pub balance_usd: f64,
    pub portfolio_value_usd: f64,
    pub token_plus_portfolio_usd: f64,
    pub pnl_today_usd: f64,
    pub pnl_today_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub metrics: WalletMetrics,
    pub chart: ChartSeries,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parses_and_serializes_as_token() {
        assert_eq!("1h".parse::<TimeRange>().unwrap(), TimeRange::OneHour);
        assert_eq!("ALL".parse::<TimeRange>().unwrap(), TimeRange::All);
        assert!("2D".parse::<TimeRange>().is_err());

        let json = serde_json::to_string(&TimeRange::OneMonth).unwrap();
        assert_eq!(json, "\"1M\"");
    }

    #[test]
    fn series_summary_follows_points() {
        let points = vec![
            ChartPoint { timestamp: 1, value_usd: 80.0 },
            ChartPoint { timestamp: 2, value_usd: 100.0 },
        ];
        let series = ChartSeries::from_points(TimeRange::OneDay, points, 0.0);

        assert_eq!(series.start_value_usd, 80.0);
        assert_eq!(series.current_value_usd, 100.0);
        assert_eq!(series.change_usd, 20.0);
        assert!((series.change_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_start_gives_zero_percent() {
        let points = vec![
            ChartPoint { timestamp: 1, value_usd: 0.0 },
            ChartPoint { timestamp: 2, value_usd: 5.0 },
        ];
        let series = ChartSeries::from_points(TimeRange::OneHour, points, 0.0);

        assert_eq!(series.change_usd, 5.0);
        assert_eq!(series.change_percent, 0.0);
    }
}
