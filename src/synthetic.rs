// src/synthetic.rs
use crate::models::{ChartPoint, TimeRange};

/// Floor for the flat threshold, so an empty wallet still counts as flat
const MIN_FLAT_THRESHOLD_USD: f64 = 0.0001;
const FLAT_THRESHOLD_RATIO: f64 = 0.002;
/// Never let the synthetic start dip below 10% of the anchor
const MAX_DELTA_RATIO: f64 = 0.9;

/// Shape of the synthetic wave for one range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveProfile {
    pub delta_ratio: f64,
    pub min_delta_usd: f64,
    pub amplitude_ratio: f64,
}

impl WaveProfile {
    pub fn for_range(range: TimeRange) -> Self {
        let (delta_ratio, min_delta_usd, amplitude_ratio) = match range {
            TimeRange::OneHour => (0.007, 10.0, 0.32),
            TimeRange::SixHours => (0.018, 24.0, 0.40),
            TimeRange::OneDay => (0.028, 40.0, 0.48),
            TimeRange::OneWeek => (0.055, 75.0, 0.56),
            TimeRange::OneMonth => (0.095, 125.0, 0.63),
            TimeRange::All => (0.14, 180.0, 0.70),
        };

        WaveProfile {
            delta_ratio,
            min_delta_usd,
            amplitude_ratio,
        }
    }

    /// Value the wave starts from when it ends at `anchor`
    pub fn start_value(&self, anchor: f64) -> f64 {
        let target_delta = (anchor * self.delta_ratio).max(self.min_delta_usd);
        let effective_delta = target_delta.min(anchor * MAX_DELTA_RATIO);
        (anchor - effective_delta).max(0.0)
    }
}

/// True when the curve moves too little (relative to `current_value_usd`)
/// to be worth showing
pub fn is_flat(points: &[ChartPoint], current_value_usd: f64) -> bool {
    if points.is_empty() {
        return true;
    }

    let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
        (min.min(p.value_usd), max.max(p.value_usd))
    });
    let threshold = (current_value_usd * FLAT_THRESHOLD_RATIO).max(MIN_FLAT_THRESHOLD_USD);

    max - min <= threshold
}

/// Deterministic trigonometric ripple added on top of the trend line
fn ripple(i: f64, amplitude: f64) -> f64 {
    (i * 0.45 + 1.2).sin() * amplitude
        + (i * 0.21 + 0.4).cos() * amplitude * 0.45
        + (i * 0.9).sin() * amplitude * 0.2
}

/// Replaces the values of `points` with a wave rising to `anchor`.
/// Timestamps are kept; first and last values are pinned to the trend ends.
pub fn synthesize(points: &[ChartPoint], anchor: f64, profile: WaveProfile) -> Vec<ChartPoint> {
    let Some(last) = points.len().checked_sub(1) else {
        return Vec::new();
    };

    let start_value = profile.start_value(anchor);
    let effective_delta = anchor - start_value;
    let amplitude = (effective_delta * profile.amplitude_ratio).max(1.0);
    let span = last.max(1) as f64;

    let mut wave: Vec<ChartPoint> = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let progress = i as f64 / span;
            let trend = start_value + (anchor - start_value) * progress;

            ChartPoint {
                timestamp: point.timestamp,
                value_usd: (trend + ripple(i as f64, amplitude)).max(0.0),
            }
        })
        .collect();

    wave[0].value_usd = start_value;
    wave[last].value_usd = anchor;
    wave
}
