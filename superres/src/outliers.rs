//! Statistical outlier detection over motion estimates.

use crate::motion::Motion;

/// Indices of the motions whose `diff` exceeds `mean + 1 * stddev` of all diffs.
///
/// Uses the population standard deviation. A high `diff` means the frame still
/// differs from the reference after alignment (occlusion, blur, or motion outside
/// the search window).
pub fn find_outliers(motions: &[Motion]) -> Vec<usize> {
    if motions.is_empty() {
        return Vec::new();
    }

    let n = motions.len() as f64;
    let mean = motions.iter().map(|m| m.diff).sum::<f64>() / n;
    let variance = motions
        .iter()
        .map(|m| (m.diff - mean).powi(2))
        .sum::<f64>()
        / n;
    let threshold = mean + variance.sqrt();

    motions
        .iter()
        .enumerate()
        .filter(|(_, m)| m.diff > threshold)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_diffs(diffs: &[f64]) -> Vec<Motion> {
        diffs.iter().map(|&d| Motion::new(0, 0, d)).collect()
    }

    #[test]
    fn test_flags_single_bad_frame() {
        let motions = with_diffs(&[
            0.017066, 0.001339, 0.001792, 0.002762, 0.002262, 0.001811, 0.002215, 0.002053,
        ]);
        assert_eq!(find_outliers(&motions), vec![0]);
    }

    #[test]
    fn test_uniform_diffs_have_no_outliers() {
        assert!(find_outliers(&with_diffs(&[0.5; 6])).is_empty());
    }

    #[test]
    fn test_empty_and_single() {
        assert!(find_outliers(&[]).is_empty());
        assert!(find_outliers(&with_diffs(&[3.0])).is_empty());
    }

    #[test]
    fn test_multiple_outliers_in_order() {
        let motions = with_diffs(&[0.9, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.8, 0.1, 0.1]);
        assert_eq!(find_outliers(&motions), vec![0, 7]);
    }
}
