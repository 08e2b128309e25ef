// src/timeline.rs
use crate::models::{TimeRange, TokenTransfer};

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;
const ALL_RANGE_MIN_MS: i64 = 30 * DAY_MS;
const ALL_RANGE_POINTS: usize = 32;

/// Concrete `[start, end]` interval and sample count for a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    pub start: i64,
    pub end: i64,
    pub points: usize,
}

/// Fixed (duration ms, point count) for every range but ALL
fn fixed_window(range: TimeRange) -> Option<(i64, usize)> {
    match range {
        TimeRange::OneHour => Some((HOUR_MS, 16)),
        TimeRange::SixHours => Some((6 * HOUR_MS, 24)),
        TimeRange::OneDay => Some((DAY_MS, 24)),
        TimeRange::OneWeek => Some((7 * DAY_MS, 28)),
        TimeRange::OneMonth => Some((30 * DAY_MS, 30)),
        TimeRange::All => None,
    }
}

/// Resolves `range` against `now`. For ALL the window reaches back to the
/// oldest transfer (`transfers` is ascending), but never less than 30 days.
pub fn resolve(range: TimeRange, transfers: &[TokenTransfer], now: i64) -> RangeWindow {
    match fixed_window(range) {
        Some((duration, points)) => RangeWindow {
            start: now - duration,
            end: now,
            points,
        },
        None => {
            let month_ago = now - ALL_RANGE_MIN_MS;
            let start = transfers
                .first()
                .map_or(month_ago, |oldest| oldest.timestamp.min(month_ago));

            RangeWindow {
                start,
                end: now,
                points: ALL_RANGE_POINTS,
            }
        }
    }
}

/// Evenly spaced sample timestamps across the window, rounded to the ms
pub fn build_timestamps(window: RangeWindow) -> Vec<i64> {
    if window.points <= 1 {
        return vec![window.end];
    }

    let step = (window.end - window.start) as f64 / (window.points - 1) as f64;

    (0..window.points)
        .map(|i| (window.start as f64 + step * i as f64).round() as i64)
        .collect()
}
