//! Channel statistics for keyword parameters (mean, median, ...).

use crate::models::Statistic;

/// Compute a statistic over a channel plane.
///
/// An empty plane yields 0.0 for every statistic.
pub fn compute_statistic(values: &[f32], stat: Statistic) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    match stat {
        Statistic::Mean => mean(values),
        Statistic::Median => median(values),
        Statistic::Min => values.iter().copied().fold(f32::INFINITY, f32::min),
        Statistic::Max => values.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        Statistic::Sum => values.iter().sum(),
        Statistic::Std => std_dev(values),
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// Median with the even-count convention of averaging the two middle values
fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation
fn std_dev(values: &[f32]) -> f32 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32;
    variance.sqrt()
}
