use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::analyzers::types::{DegreeCount, DistributionBin, RankedNode, Summary};

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Median of an already sorted slice. Returns 0.0 for empty input.
pub fn median(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// Count, mean, population stddev, extrema and median of `values`.
pub fn summarize<I>(values: I) -> Summary
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().collect();
    if sorted.is_empty() {
        return Summary::default();
    }
    sorted.sort_by(f64::total_cmp);

    let avg = mean(&sorted);
    Summary {
        count: sorted.len(),
        mean: avg,
        stddev: stddev(&sorted, avg),
        min: sorted[0],
        median: median(&sorted),
        max: sorted[sorted.len() - 1],
    }
}

/// The `k` highest-scoring nodes. Ties are broken by code so the ranking is
/// stable.
pub fn top_k<I>(scores: I, k: usize) -> Vec<RankedNode>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut ranked: Vec<RankedNode> = scores
        .into_iter()
        .map(|(code, score)| RankedNode { code, score })
        .collect();
    ranked.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.code.cmp(&b.code),
        other => other,
    });
    ranked.truncate(k);
    ranked
}

/// Equal-width histogram of `values` over `[lower, upper]` with `bins` buckets.
/// Values outside the range are clamped into the end buckets.
pub fn histogram(values: &[f64], lower: f64, upper: f64, bins: usize) -> Vec<DistributionBin> {
    if bins == 0 || upper <= lower {
        return Vec::new();
    }
    let width = (upper - lower) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let slot = ((v - lower) / width).floor();
        let slot = if slot.is_nan() || slot < 0.0 {
            0
        } else {
            (slot as usize).min(bins - 1)
        };
        counts[slot] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| DistributionBin {
            lower: lower + width * i as f64,
            upper: lower + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Degree → number of nodes with that degree, ascending by degree.
pub fn degree_distribution(degrees: &BTreeMap<String, usize>) -> Vec<DegreeCount> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &degree in degrees.values() {
        *counts.entry(degree).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(degree, count)| DegreeCount { degree, count })
        .collect()
}
