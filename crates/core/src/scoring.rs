//! Point scoring arithmetic for activity and course completions.
//!
//! All functions here are pure; the ledger service in `skillforge-engine`
//! decides *whether* to award and this module decides *how much*.

// ---------------------------------------------------------------------------
// Activity type constants
// ---------------------------------------------------------------------------

pub const TYPE_QUIZ: &str = "quiz";
pub const TYPE_LESSON: &str = "lesson";
pub const TYPE_READING: &str = "reading";

/// Base points for an activity whose `points_value` is unset.
pub const DEFAULT_ACTIVITY_POINTS: i64 = 10;

/// Base points for a course whose `points_per_completion` is unset.
pub const DEFAULT_COURSE_POINTS: i64 = 100;

/// Minimum passing score for quiz-type activities (a percentage).
pub const QUIZ_PASSING_SCORE: i32 = 70;

/// Minimum passing score for everything else.
///
/// Non-quiz activities (lessons, readings) record `score = 1` on
/// completion rather than a percentage, so any non-zero score passes.
/// This dual use of the score column is inherited behavior; a separate
/// `passed` flag would be cleaner, but progression data already encodes
/// completions this way, so the threshold stays type-dependent.
pub const NON_QUIZ_PASSING_SCORE: i32 = 1;

// ---------------------------------------------------------------------------
// Passing threshold
// ---------------------------------------------------------------------------

/// The minimum score that counts as passing for an activity type.
pub fn passing_threshold(activity_type: &str) -> i32 {
    if activity_type == TYPE_QUIZ {
        QUIZ_PASSING_SCORE
    } else {
        NON_QUIZ_PASSING_SCORE
    }
}

/// Whether a score passes the threshold for the given activity type.
pub fn is_passing(activity_type: &str, score: i32) -> bool {
    score >= passing_threshold(activity_type)
}

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

/// Score-based bonus multiplier.
pub fn score_multiplier(score: i32) -> f64 {
    if score >= 95 {
        1.5
    } else if score >= 85 {
        1.3
    } else if score >= 75 {
        1.1
    } else {
        1.0
    }
}

/// Time-efficiency multiplier.
///
/// Applied only when both the time spent and the activity's expected
/// duration are known. Finishing in under 80% of the expected time earns a
/// 20% bonus; under 100% a 10% bonus; taking more than 150% costs 10%.
pub fn time_multiplier(time_spent_secs: Option<i64>, duration_minutes: Option<i32>) -> f64 {
    let (Some(spent), Some(minutes)) = (time_spent_secs, duration_minutes) else {
        return 1.0;
    };
    if spent <= 0 || minutes <= 0 {
        return 1.0;
    }

    let expected_secs = i64::from(minutes) * 60;
    let efficiency = spent as f64 / expected_secs as f64;

    if efficiency <= 0.8 {
        1.2
    } else if efficiency <= 1.0 {
        1.1
    } else if efficiency > 1.5 {
        0.9
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// Award amounts
// ---------------------------------------------------------------------------

/// Points awarded for a passing activity completion.
///
/// `base * score_multiplier * time_multiplier`, rounded to the nearest
/// whole point. The caller is responsible for checking [`is_passing`]
/// first; this function only computes the amount.
pub fn activity_points(
    points_value: Option<i32>,
    score: i32,
    time_spent_secs: Option<i64>,
    duration_minutes: Option<i32>,
) -> i64 {
    let base = points_value
        .map(i64::from)
        .unwrap_or(DEFAULT_ACTIVITY_POINTS);
    let total =
        base as f64 * score_multiplier(score) * time_multiplier(time_spent_secs, duration_minutes);
    total.round() as i64
}

/// Speed bonus for completing a course within `days_to_complete` days of
/// enrollment.
pub fn course_speed_bonus(days_to_complete: i64) -> i64 {
    if days_to_complete <= 7 {
        50
    } else if days_to_complete <= 14 {
        30
    } else if days_to_complete <= 21 {
        15
    } else {
        0
    }
}

/// Points awarded for completing a course: the configured base plus the
/// speed bonus.
pub fn course_points(points_per_completion: Option<i32>, days_to_complete: i64) -> i64 {
    let base = points_per_completion
        .map(i64::from)
        .unwrap_or(DEFAULT_COURSE_POINTS);
    base + course_speed_bonus(days_to_complete)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
