//! The level curve: a monotonic mapping from cumulative points to a level.
//!
//! Each level costs more to leave than the previous one; the cost grows by
//! a factor of 1.5 every ten levels. Levels are clamped to `1..=MAX_LEVEL`
//! and never decrease as points accumulate.

/// Cost to advance out of level 1.
pub const BASE_POINTS_PER_LEVEL: i64 = 100;

/// Growth factor applied across each band of ten levels.
pub const LEVEL_GROWTH: f64 = 1.5;

/// Upper bound on levels.
pub const MAX_LEVEL: i32 = 100;

/// Points needed to advance from `level` to `level + 1`.
pub fn points_to_advance_from(level: i32) -> i64 {
    let exponent = f64::from(level - 1) / 10.0;
    (BASE_POINTS_PER_LEVEL as f64 * LEVEL_GROWTH.powf(exponent)).round() as i64
}

/// Cumulative points required to have reached `level`.
///
/// Level 1 requires nothing; level N requires the sum of the advance costs
/// of levels `1..N`.
pub fn points_required_for_level(level: i32) -> i64 {
    if level <= 1 {
        return 0;
    }
    (1..level.min(MAX_LEVEL)).map(points_to_advance_from).sum()
}

/// The level reached with `total_points`: the largest level whose
/// cumulative requirement is satisfied.
pub fn level_for_points(total_points: i64) -> i32 {
    if total_points <= 0 {
        return 1;
    }

    let mut level = 1;
    let mut required: i64 = 0;
    while level < MAX_LEVEL {
        required += points_to_advance_from(level);
        if total_points < required {
            break;
        }
        level += 1;
    }
    level
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// Title thresholds, ascending. A learner holds the title of the highest
/// threshold at or below their level.
const LEVEL_TITLES: &[(i32, &str)] = &[
    (1, "Newcomer"),
    (5, "Student"),
    (10, "Dedicated"),
    (15, "Persistent"),
    (20, "Knowledgeable"),
    (25, "Expert"),
    (30, "Mentor"),
    (40, "Guru"),
    (50, "Master"),
    (75, "Legend"),
    (100, "Immortal"),
];

/// The display title for a level.
pub fn title_for_level(level: i32) -> &'static str {
    let mut title = LEVEL_TITLES[0].1;
    for &(threshold, name) in LEVEL_TITLES {
        if level >= threshold {
            title = name;
        } else {
            break;
        }
    }
    title
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
