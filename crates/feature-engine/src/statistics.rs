//! Lag and Rolling Window Computation
//!
//! Column-wise helpers over a time-ordered series. Undefined values are
//! represented as `None` until the missing-value fill runs.

/// Shift a series by `k` positions; the first `k` entries are undefined
pub fn lag(series: &[f64], k: usize) -> Vec<Option<f64>> {
    (0..series.len())
        .map(|i| if i >= k { Some(series[i - k]) } else { None })
        .collect()
}

/// Trailing maximum over up to `window` points (shrinks at the series start)
pub fn rolling_max(series: &[f64], window: usize) -> Vec<f64> {
    trailing(series, window)
        .map(|w| w.iter().cloned().fold(f64::MIN, f64::max))
        .collect()
}

/// Trailing mean over up to `window` points (shrinks at the series start)
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    trailing(series, window)
        .map(|w| w.iter().sum::<f64>() / w.len() as f64)
        .collect()
}

/// Fill each undefined entry with the nearest later defined entry.
/// Entries with no defined successor stay undefined.
pub fn back_fill(column: &mut [Option<f64>]) {
    let mut next = None;
    for value in column.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => *value = next,
        }
    }
}

fn trailing(series: &[f64], window: usize) -> impl Iterator<Item = &[f64]> {
    let window = window.max(1);
    (0..series.len()).map(move |i| {
        let start = (i + 1).saturating_sub(window);
        &series[start..=i]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_shifts_series() {
        let series = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(lag(&series, 1), vec![None, Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(lag(&series, 3), vec![None, None, None, Some(1.0)]);
        assert_eq!(lag(&series[..2], 3), vec![None, None]);
    }

    #[test]
    fn test_rolling_window_shrinks_at_start() {
        let series = [1.0, 3.0, 2.0, 5.0, 4.0, 0.5, 0.1, 0.2];
        let max = rolling_max(&series, 6);
        assert_eq!(max, vec![1.0, 3.0, 3.0, 5.0, 5.0, 5.0, 5.0, 5.0]);

        let mean = rolling_mean(&series, 6);
        assert!((mean[0] - 1.0).abs() < 1e-12);
        assert!((mean[1] - 2.0).abs() < 1e-12);
        // Window [3.0, 2.0, 5.0, 4.0, 0.5, 0.1] once full
        assert!((mean[6] - 14.6 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_max_all_negative() {
        assert_eq!(rolling_max(&[-2.0, -1.0], 6), vec![-2.0, -1.0]);
    }

    #[test]
    fn test_back_fill_uses_next_defined_value() {
        let mut column = vec![None, None, Some(1.5), None, Some(2.5), None];
        back_fill(&mut column);
        assert_eq!(
            column,
            vec![Some(1.5), Some(1.5), Some(1.5), Some(2.5), Some(2.5), None]
        );
    }

    #[test]
    fn test_empty_series() {
        assert!(lag(&[], 1).is_empty());
        assert!(rolling_max(&[], 6).is_empty());
        assert!(rolling_mean(&[], 6).is_empty());
    }
}
