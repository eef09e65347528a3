//! Positional features relative to a token's predicate

/// Head position used for tokens that have no predicate
pub const NO_PREDICATE: i64 = -1;

/// Bucket the signed offset between a token and its predicate.
///
/// Offsets up to `window` map to `max(offset + window + 1, 0)`; anything further after the
/// predicate collapses into the overflow bucket `2 * window + 2`. Tokens far *before* the
/// predicate clamp to bucket 0 rather than getting an overflow bucket of their own.
/// Arithmetic saturates, so extreme heads or windows never overflow.
pub fn distance_bucket(position: i64, predicate: i64, window: i64) -> i64 {
    let offset = position.saturating_sub(predicate);

    if offset <= window {
        offset.saturating_add(window).saturating_add(1).max(0)
    } else {
        window.saturating_mul(2).saturating_add(2)
    }
}

/// Distance buckets for every position against a single predicate
pub fn compute_distances(positions: &[i64], predicate: i64, window: i64) -> Vec<i64> {
    positions
        .iter()
        .map(|&position| distance_bucket(position, predicate, window))
        .collect()
}

/// 1 where the position is the predicate, 0 everywhere else
pub fn compute_predicate_indicator(positions: &[i64], predicate: i64) -> Vec<u8> {
    positions
        .iter()
        .map(|&position| u8::from(position == predicate))
        .collect()
}

/// Distance buckets where each token is measured against its own head
pub fn head_distances(heads: &[i64], window: i64) -> Vec<i64> {
    heads
        .iter()
        .zip(0_i64..)
        .map(|(&head, position)| distance_bucket(position, head, window))
        .collect()
}

/// 1 for each token that is its own head, 0 everywhere else
pub fn head_indicator(heads: &[i64]) -> Vec<u8> {
    heads
        .iter()
        .zip(0_i64..)
        .map(|(&head, position)| u8::from(position == head))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn buckets_follow_the_windowed_formula() {
        let positions: Vec<i64> = (0..=6).collect();

        // offsets -3..=2 give max(offset + 3, 0); offset 3 overflows to 2 * 2 + 2
        assert_eq!(compute_distances(&positions, 3, 2), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn overflow_is_only_reached_after_the_predicate() {
        let window = 2;

        // Far before the predicate clamps to 0
        assert_eq!(distance_bucket(0, 10, window), 0);
        assert_eq!(distance_bucket(7, 10, window), 0);
        assert_eq!(distance_bucket(8, 10, window), 1);

        // Far after the predicate collapses into the overflow bucket
        assert_eq!(distance_bucket(13, 10, window), 6);
        assert_eq!(distance_bucket(100, 10, window), 6);

        // The predicate itself sits in the middle
        assert_eq!(distance_bucket(10, 10, window), window + 1);
    }

    #[test]
    fn buckets_stay_in_range() {
        for window in 0..5 {
            for predicate in -1..12 {
                for position in 0..12 {
                    let bucket = distance_bucket(position, predicate, window);
                    assert!((0..=2 * window + 2).contains(&bucket));
                }
            }
        }
    }

    #[test]
    fn extreme_heads_and_windows_saturate() {
        assert_eq!(distance_bucket(0, i64::MIN, 2), 6);
        assert_eq!(distance_bucket(0, i64::MAX, 2), 0);
        assert_eq!(distance_bucket(5, 0, i64::MAX), i64::MAX);
        assert_eq!(distance_bucket(i64::MAX, i64::MIN, i64::MAX - 1), i64::MAX);
        assert_eq!(head_distances(&[i64::MIN, 0], 1), vec![4, 3]);
    }

    #[test]
    fn zero_window() {
        assert_eq!(compute_distances(&[0, 1, 2, 3], 1, 0), vec![0, 1, 2, 2]);
    }

    #[test]
    fn indicator_marks_the_predicate_once() {
        assert_eq!(compute_predicate_indicator(&[0, 1, 2, 3], 2), vec![0, 0, 1, 0]);
        assert_eq!(compute_predicate_indicator(&[0, 1, 2, 3], 7), vec![0, 0, 0, 0]);
        assert_eq!(compute_predicate_indicator(&[0, 1, 2, 3], NO_PREDICATE), vec![0; 4]);
        assert_eq!(compute_predicate_indicator(&[5, 5, 1], 5), vec![1, 1, 0]);
        assert!(compute_predicate_indicator(&[], 0).is_empty());
    }

    #[test]
    fn per_token_heads() {
        // Token 2 heads itself, the others point at it
        let heads = [2, 2, 2, 2, 2];

        assert_eq!(head_indicator(&heads), vec![0, 0, 1, 0, 0]);
        assert_eq!(head_distances(&heads, 1), vec![0, 1, 2, 3, 4]);

        let heads = [NO_PREDICATE, 0, 0];
        assert_eq!(head_indicator(&heads), vec![0, 0, 0]);
        assert_eq!(head_distances(&heads, 1), vec![3, 3, 4]);
    }
}
