//! Daily time-series helpers: counting, trailing rolling mean, thresholding, ratio.
//!
//! Series are keyed by calendar day in a `BTreeMap`, so iteration is always in
//! date order and lookups by day are cheap when aligning two series.

use std::collections::{BTreeMap, VecDeque};

use chrono::NaiveDate;

pub type DailyCounts = BTreeMap<NaiveDate, usize>;
pub type DailySeries = BTreeMap<NaiveDate, f64>;

/// Count occurrences per day over every day from the first to the last, with
/// zeros for days that have none.
pub fn daily_counts<I>(days: I) -> DailyCounts
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut counts = DailyCounts::new();
    for day in days {
        *counts.entry(day).or_default() += 1;
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return counts;
    };
    for day in first.iter_days().take_while(|d| *d <= last) {
        counts.entry(day).or_default();
    }
    counts
}

/// Trailing mean over `window` consecutive days.
///
/// Days before the window is full have no value. `counts` must be contiguous
/// (as produced by `daily_counts`). A zero window yields an empty series.
pub fn rolling_mean(counts: &DailyCounts, window: usize) -> DailySeries {
    let mut out = DailySeries::new();
    if window == 0 {
        return out;
    }

    let mut buf: VecDeque<usize> = VecDeque::with_capacity(window);
    let mut sum = 0usize;
    for (&day, &count) in counts {
        buf.push_back(count);
        sum += count;
        if buf.len() > window {
            sum -= buf.pop_front().unwrap_or(0);
        }
        if buf.len() == window {
            out.insert(day, sum as f64 / window as f64);
        }
    }
    out
}

/// Keep only days whose value is strictly above `threshold`.
pub fn above(series: &DailySeries, threshold: f64) -> DailySeries {
    series
        .iter()
        .filter(|(_, v)| **v > threshold)
        .map(|(d, v)| (*d, *v))
        .collect()
}

/// Pointwise `numerator / denominator` over the union of both day sets.
///
/// Days present on one side only get `None`; they are gaps, not zeros.
pub fn ratio(numerator: &DailySeries, denominator: &DailySeries) -> Vec<(NaiveDate, Option<f64>)> {
    let mut days: Vec<NaiveDate> = numerator.keys().chain(denominator.keys()).copied().collect();
    days.sort();
    days.dedup();

    days.into_iter()
        .map(|day| {
            let value = match (numerator.get(&day), denominator.get(&day)) {
                (Some(n), Some(d)) if *d != 0.0 => Some(n / d),
                _ => None,
            };
            (day, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, day).unwrap()
    }

    #[test]
    fn counts_are_zero_filled() {
        let counts = daily_counts([d(1), d(1), d(4)]);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[&d(1)], 2);
        assert_eq!(counts[&d(2)], 0);
        assert_eq!(counts[&d(3)], 0);
        assert_eq!(counts[&d(4)], 1);
    }

    #[test]
    fn counts_of_nothing_are_empty() {
        assert!(daily_counts(std::iter::empty()).is_empty());
    }

    #[test]
    fn rolling_mean_needs_a_full_window() {
        let counts: DailyCounts = [(d(1), 3), (d(2), 6), (d(3), 0), (d(4), 9)].into_iter().collect();
        let rolled = rolling_mean(&counts, 3);

        assert_eq!(rolled.len(), 2);
        assert!(!rolled.contains_key(&d(2)));
        assert!((rolled[&d(3)] - 3.0).abs() < 1e-12);
        assert!((rolled[&d(4)] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn window_of_one_is_identity() {
        let counts: DailyCounts = [(d(1), 3), (d(2), 0)].into_iter().collect();
        let rolled = rolling_mean(&counts, 1);
        assert_eq!(rolled[&d(1)], 3.0);
        assert_eq!(rolled[&d(2)], 0.0);
    }

    #[test]
    fn window_longer_than_series_is_empty() {
        let counts: DailyCounts = [(d(1), 3), (d(2), 4)].into_iter().collect();
        assert!(rolling_mean(&counts, 7).is_empty());
        assert!(rolling_mean(&counts, 0).is_empty());
    }

    #[test]
    fn threshold_is_strict() {
        let s: DailySeries = [(d(1), 0.5), (d(2), 1.0), (d(3), 1.5)].into_iter().collect();
        let kept = above(&s, 1.0);
        assert_eq!(kept.keys().copied().collect::<Vec<_>>(), vec![d(3)]);
    }

    #[test]
    fn ratio_leaves_gaps_for_one_sided_days() {
        let num: DailySeries = [(d(2), 1.5), (d(3), 2.0)].into_iter().collect();
        let den: DailySeries = [(d(1), 4.0), (d(2), 3.0)].into_iter().collect();

        let r = ratio(&num, &den);
        assert_eq!(r, vec![(d(1), None), (d(2), Some(0.5)), (d(3), None)]);
    }
}
