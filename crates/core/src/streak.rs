//! Daily-activity streak arithmetic.
//!
//! A streak is the number of consecutive calendar days with at least one
//! qualifying activity completion. The decision of how a new completion
//! affects the streak is pure; persistence lives in the engine crate.

use chrono::NaiveDate;

/// A user's streak counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakState {
    pub current: i32,
    pub longest: i32,
}

impl StreakState {
    pub fn new(current: i32, longest: i32) -> Self {
        Self { current, longest }
    }
}

/// Advance a streak for a completion happening `today`.
///
/// `last_other_completion` is the calendar date of the most recent *other*
/// completed activity (the one just completed excluded):
/// - yesterday: the streak continues and grows by one;
/// - today: a second completion on the same day leaves it unchanged;
/// - anything else (a gap of two or more days, or no history): reset to 1.
///
/// `longest` ratchets up, never down.
pub fn advance(
    state: StreakState,
    last_other_completion: Option<NaiveDate>,
    today: NaiveDate,
) -> StreakState {
    let yesterday = today.pred_opt().unwrap_or(today);

    let current = match last_other_completion {
        Some(last) if last == yesterday => state.current + 1,
        Some(last) if last == today => state.current,
        _ => 1,
    };

    StreakState {
        current,
        longest: state.longest.max(current),
    }
}

/// Recompute streak counters from a full completion history.
///
/// `dates` is the set of calendar days with at least one qualifying
/// completion, in any order and possibly with duplicates. The current
/// streak is the run ending at the most recent date; the longest is the
/// longest run anywhere in the history. Used by cache reconciliation.
pub fn compute_from_history(dates: &[NaiveDate]) -> StreakState {
    let mut days: Vec<NaiveDate> = dates.to_vec();
    days.sort_unstable();
    days.dedup();

    if days.is_empty() {
        return StreakState::new(0, 0);
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if pair[0].succ_opt() == Some(pair[1]) {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }

    // `run` now holds the length of the trailing run.
    StreakState::new(run, longest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn yesterday_extends_streak() {
        let state = advance(StreakState::new(3, 5), Some(d("2026-03-09")), d("2026-03-10"));
        assert_eq!(state, StreakState::new(4, 5));
    }

    #[test]
    fn extension_can_set_new_longest() {
        let state = advance(StreakState::new(5, 5), Some(d("2026-03-09")), d("2026-03-10"));
        assert_eq!(state, StreakState::new(6, 6));
    }

    #[test]
    fn same_day_completion_keeps_streak() {
        let state = advance(StreakState::new(3, 5), Some(d("2026-03-10")), d("2026-03-10"));
        assert_eq!(state, StreakState::new(3, 5));
    }

    #[test]
    fn gap_resets_to_one() {
        let state = advance(StreakState::new(7, 9), Some(d("2026-03-07")), d("2026-03-10"));
        assert_eq!(state, StreakState::new(1, 9));
    }

    #[test]
    fn no_history_starts_at_one() {
        let state = advance(StreakState::new(0, 0), None, d("2026-03-10"));
        assert_eq!(state, StreakState::new(1, 1));
    }

    // -- compute_from_history -------------------------------------------------

    #[test]
    fn history_empty() {
        assert_eq!(compute_from_history(&[]), StreakState::new(0, 0));
    }

    #[test]
    fn history_single_day() {
        assert_eq!(
            compute_from_history(&[d("2026-03-10")]),
            StreakState::new(1, 1)
        );
    }

    #[test]
    fn history_trailing_run_is_current() {
        let days = [
            d("2026-03-01"),
            d("2026-03-02"),
            d("2026-03-03"),
            // gap
            d("2026-03-09"),
            d("2026-03-10"),
        ];
        assert_eq!(compute_from_history(&days), StreakState::new(2, 3));
    }

    #[test]
    fn history_dedupes_same_day() {
        let days = [d("2026-03-09"), d("2026-03-09"), d("2026-03-10")];
        assert_eq!(compute_from_history(&days), StreakState::new(2, 2));
    }
}
