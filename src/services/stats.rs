//! Summary statistics over computed cycle times.

use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Aggregate statistics for a batch of cycle times, in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleTimeSummary {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p75_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p90_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_days: Option<f64>,
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        return Some(sorted[lower]);
    }

    let fraction = rank - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Summarise a list of active-seconds values.
pub fn summarize_cycle_times(seconds: &[f64]) -> CycleTimeSummary {
    if seconds.is_empty() {
        return CycleTimeSummary {
            count: 0,
            avg_days: None,
            median_days: None,
            p75_days: None,
            p90_days: None,
            max_days: None,
        };
    }

    let days: Vec<f64> = seconds.iter().map(|s| s / SECONDS_PER_DAY).collect();
    let mean = days.iter().sum::<f64>() / days.len() as f64;
    let max = days.iter().cloned().fold(f64::MIN, f64::max);

    CycleTimeSummary {
        count: seconds.len(),
        avg_days: Some(mean),
        median_days: percentile(&days, 50.0),
        p75_days: percentile(&days, 75.0),
        p90_days: percentile(&days, 90.0),
        max_days: Some(max),
    }
}
