//! The multi-tau lag table.

/// Compute the lag (in frames) of each cascade level: the geometric series
/// `1, t, t², …` that stays below `number_of_img`.
///
/// The table's length fixes `num_levels` for the whole computation; it is
/// determined once, before any frame is read, and never grows mid-run.
/// E.g. `lag_table(2, 4)` is `[1, 2]`: two levels.
pub fn lag_table(timebin_num: usize, number_of_img: usize) -> Vec<usize> {
    debug_assert!(timebin_num >= 2);
    debug_assert!(number_of_img >= 1);
    let mut lags = vec![1_usize];
    loop {
        let next = lags[lags.len() - 1] * timebin_num;
        if next >= number_of_img {
            break;
        }
        lags.push(next);
    }
    lags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubling_cascade() {
        assert_eq!(lag_table(2, 4), vec![1, 2]);
        assert_eq!(lag_table(2, 5), vec![1, 2, 4]);
        assert_eq!(lag_table(2, 50), vec![1, 2, 4, 8, 16, 32]);
    }

    #[test]
    fn single_level() {
        // too few frames for any averaged level
        assert_eq!(lag_table(2, 1), vec![1]);
        assert_eq!(lag_table(2, 2), vec![1]);
        assert_eq!(lag_table(8, 8), vec![1]);
    }

    #[test]
    fn wider_branching() {
        assert_eq!(lag_table(4, 64), vec![1, 4, 16]);
        assert_eq!(lag_table(4, 65), vec![1, 4, 16, 64]);
    }
}
