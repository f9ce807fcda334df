//! Course progress math and the sequential-unlock rule.

/// Minimum share of prior activities that must be passed before an
/// activity further along in the course unlocks.
pub const UNLOCK_THRESHOLD_PCT: f64 = 70.0;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of a course completed, given counts of qualifying
/// completions and active activities. Zero activities means zero percent.
pub fn completion_percentage(completed: usize, total_active: usize) -> f64 {
    if total_active == 0 {
        return 0.0;
    }
    round2(completed as f64 / total_active as f64 * 100.0)
}

/// Whether a completion percentage counts as a finished course.
pub fn is_complete(percentage: f64) -> bool {
    percentage >= 100.0
}

/// Sequential unlocking: an activity is accessible when it is the first in
/// its course, or when at least [`UNLOCK_THRESHOLD_PCT`] of the activities
/// before it have been passed.
pub fn unlock_requirement_met(passed_prior: usize, total_prior: usize) -> bool {
    if total_prior == 0 {
        return true;
    }
    completion_percentage(passed_prior, total_prior) >= UNLOCK_THRESHOLD_PCT
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
