//! Badge catalog types and criteria evaluation.
//!
//! A badge's `criteria` column is a JSON object; [`BadgeCriteria`] is its
//! typed form. Evaluation is a pure predicate over a [`LearnerSnapshot`]
//! (aggregates the engine reads from the store) plus the trigger context,
//! so every criterion can be unit tested without a database.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Badge type constants
// ---------------------------------------------------------------------------

pub const BADGE_ACTIVITY_COMPLETION: &str = "activity_completion";
pub const BADGE_COURSE_COMPLETION: &str = "course_completion";
pub const BADGE_SCORE_ACHIEVEMENT: &str = "score_achievement";
pub const BADGE_STREAK: &str = "streak";
pub const BADGE_LEVEL: &str = "level";
pub const BADGE_PARTICIPATION: &str = "participation";
pub const BADGE_SPECIAL: &str = "special";

/// Badge types evaluated when an activity completes.
pub const ACTIVITY_TRIGGERED_TYPES: &[&str] = &[
    BADGE_ACTIVITY_COMPLETION,
    BADGE_SCORE_ACHIEVEMENT,
    BADGE_PARTICIPATION,
];

/// Badge types evaluated when a course completes.
pub const COURSE_TRIGGERED_TYPES: &[&str] = &[BADGE_COURSE_COMPLETION, BADGE_PARTICIPATION];

/// Minimum current streak before streak badges are even considered.
pub const STREAK_BADGE_MIN_DAYS: i32 = 7;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Machine-checkable earning criteria, deserialized from `badges.criteria`.
///
/// Only the fields relevant to the badge's type are consulted; unknown
/// JSON keys are ignored so catalogs can evolve without breaking older
/// evaluators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BadgeCriteria {
    /// Total qualifying activity completions (activity_completion).
    pub activities_completed: Option<i64>,
    /// Cumulative point total (activity_completion milestones).
    pub total_points: Option<i64>,
    /// Require a 100% score on the triggering activity (activity_completion).
    pub perfect_score: Option<bool>,
    /// Minimum score on the triggering activity (activity_completion).
    pub min_score: Option<i32>,
    /// Minimum average score across completions (score_achievement).
    pub average_score: Option<f64>,
    /// Total completed courses (course_completion).
    pub courses_completed: Option<i64>,
    /// Total course enrollments (participation).
    pub enrollments_count: Option<i64>,
    /// Consecutive-day streak length (streak).
    pub streak_days: Option<i32>,
    /// Level reached (level).
    pub level: Option<i32>,
}

impl BadgeCriteria {
    /// Parse criteria from the stored JSON value. Malformed criteria
    /// evaluate as never-satisfied rather than failing the pipeline.
    pub fn from_json(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Aggregates about a learner consulted by badge criteria.
#[derive(Debug, Clone, Default)]
pub struct LearnerSnapshot {
    pub total_points: i64,
    pub level: i32,
    pub current_streak: i32,
    pub activities_completed: i64,
    pub average_score: Option<f64>,
    pub courses_completed: i64,
    pub enrollments_count: i64,
}

/// What triggered the evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerContext {
    /// Score of the activity just completed, when the trigger is an
    /// activity completion.
    pub score: Option<i32>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Whether a badge's criteria are satisfied.
///
/// The badge's already-granted check is the caller's concern (grants are
/// idempotent at the store layer); this predicate only answers "does the
/// learner qualify right now".
pub fn criteria_met(
    badge_type: &str,
    criteria: &BadgeCriteria,
    snapshot: &LearnerSnapshot,
    trigger: TriggerContext,
) -> bool {
    match badge_type {
        BADGE_ACTIVITY_COMPLETION => {
            if let Some(needed) = criteria.activities_completed {
                return snapshot.activities_completed >= needed;
            }
            if let Some(needed) = criteria.total_points {
                return snapshot.total_points >= needed;
            }
            if criteria.perfect_score == Some(true) {
                return trigger.score.is_some_and(|s| s >= 100);
            }
            if let Some(min) = criteria.min_score {
                return trigger.score.is_some_and(|s| s >= min);
            }
            false
        }
        BADGE_COURSE_COMPLETION => criteria
            .courses_completed
            .is_some_and(|needed| snapshot.courses_completed >= needed),
        BADGE_SCORE_ACHIEVEMENT => criteria.average_score.is_some_and(|needed| {
            snapshot.average_score.is_some_and(|avg| avg >= needed)
        }),
        BADGE_PARTICIPATION => criteria
            .enrollments_count
            .is_some_and(|needed| snapshot.enrollments_count >= needed),
        BADGE_STREAK => criteria
            .streak_days
            .is_some_and(|needed| snapshot.current_streak >= needed),
        BADGE_LEVEL => criteria
            .level
            .is_some_and(|needed| snapshot.level >= needed),
        // Special badges (e.g. the welcome badge) are granted explicitly,
        // never by criteria evaluation.
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> LearnerSnapshot {
        LearnerSnapshot {
            total_points: 250,
            level: 3,
            current_streak: 8,
            activities_completed: 5,
            average_score: Some(88.0),
            courses_completed: 1,
            enrollments_count: 2,
        }
    }

    #[test]
    fn activities_completed_criterion() {
        let criteria = BadgeCriteria {
            activities_completed: Some(5),
            ..Default::default()
        };
        assert!(criteria_met(
            BADGE_ACTIVITY_COMPLETION,
            &criteria,
            &snapshot(),
            TriggerContext::default(),
        ));

        let harder = BadgeCriteria {
            activities_completed: Some(6),
            ..Default::default()
        };
        assert!(!criteria_met(
            BADGE_ACTIVITY_COMPLETION,
            &harder,
            &snapshot(),
            TriggerContext::default(),
        ));
    }

    #[test]
    fn perfect_score_criterion_reads_trigger() {
        let criteria = BadgeCriteria {
            perfect_score: Some(true),
            ..Default::default()
        };
        assert!(criteria_met(
            BADGE_ACTIVITY_COMPLETION,
            &criteria,
            &snapshot(),
            TriggerContext { score: Some(100) },
        ));
        assert!(!criteria_met(
            BADGE_ACTIVITY_COMPLETION,
            &criteria,
            &snapshot(),
            TriggerContext { score: Some(99) },
        ));
        assert!(!criteria_met(
            BADGE_ACTIVITY_COMPLETION,
            &criteria,
            &snapshot(),
            TriggerContext::default(),
        ));
    }

    #[test]
    fn total_points_milestone_criterion() {
        let criteria = BadgeCriteria {
            total_points: Some(100),
            ..Default::default()
        };
        assert!(criteria_met(
            BADGE_ACTIVITY_COMPLETION,
            &criteria,
            &snapshot(),
            TriggerContext::default(),
        ));

        let harder = BadgeCriteria {
            total_points: Some(500),
            ..Default::default()
        };
        assert!(!criteria_met(
            BADGE_ACTIVITY_COMPLETION,
            &harder,
            &snapshot(),
            TriggerContext::default(),
        ));
    }

    #[test]
    fn average_score_criterion() {
        let criteria = BadgeCriteria {
            average_score: Some(85.0),
            ..Default::default()
        };
        assert!(criteria_met(
            BADGE_SCORE_ACHIEVEMENT,
            &criteria,
            &snapshot(),
            TriggerContext::default(),
        ));

        let mut no_history = snapshot();
        no_history.average_score = None;
        assert!(!criteria_met(
            BADGE_SCORE_ACHIEVEMENT,
            &criteria,
            &no_history,
            TriggerContext::default(),
        ));
    }

    #[test]
    fn streak_and_level_criteria() {
        let streak = BadgeCriteria {
            streak_days: Some(7),
            ..Default::default()
        };
        assert!(criteria_met(
            BADGE_STREAK,
            &streak,
            &snapshot(),
            TriggerContext::default(),
        ));

        let level = BadgeCriteria {
            level: Some(4),
            ..Default::default()
        };
        assert!(!criteria_met(
            BADGE_LEVEL,
            &level,
            &snapshot(),
            TriggerContext::default(),
        ));
    }

    #[test]
    fn special_badges_never_match_criteria() {
        assert!(!criteria_met(
            BADGE_SPECIAL,
            &BadgeCriteria::default(),
            &snapshot(),
            TriggerContext::default(),
        ));
    }

    #[test]
    fn empty_criteria_never_match() {
        for badge_type in [
            BADGE_ACTIVITY_COMPLETION,
            BADGE_COURSE_COMPLETION,
            BADGE_SCORE_ACHIEVEMENT,
            BADGE_PARTICIPATION,
            BADGE_STREAK,
            BADGE_LEVEL,
        ] {
            assert!(
                !criteria_met(
                    badge_type,
                    &BadgeCriteria::default(),
                    &snapshot(),
                    TriggerContext::default(),
                ),
                "empty criteria matched for {badge_type}"
            );
        }
    }

    #[test]
    fn malformed_criteria_json_is_inert() {
        let criteria = BadgeCriteria::from_json(&serde_json::json!("not an object"));
        assert!(criteria.activities_completed.is_none());

        let partial = BadgeCriteria::from_json(&serde_json::json!({
            "streak_days": 7,
            "unknown_key": true,
        }));
        assert_eq!(partial.streak_days, Some(7));
    }
}
