//! Default badge catalog seeded for every new tenant.

use serde_json::json;
use skillforge_core::badge::{
    BADGE_ACTIVITY_COMPLETION, BADGE_COURSE_COMPLETION, BADGE_SPECIAL, BADGE_STREAK,
};
use skillforge_db::models::badge::CreateBadge;
use skillforge_db::repositories::BadgeRepo;
use skillforge_db::TenantScope;

use crate::badges::WELCOME_BADGE_NAME;
use crate::error::EngineError;

/// Seed the active tenant's default badge catalog.
///
/// Idempotent: creation is keyed on (tenant, name), so re-seeding leaves
/// existing badges untouched. Returns the number of catalog entries
/// ensured.
pub async fn seed_default_badges(scope: &TenantScope) -> Result<usize, EngineError> {
    let defaults = default_badges();
    let count = defaults.len();
    for badge in &defaults {
        BadgeRepo::create(scope, badge).await?;
    }
    tracing::info!(count, "Default badge catalog seeded");
    Ok(count)
}

fn default_badges() -> Vec<CreateBadge> {
    vec![
        CreateBadge {
            name: "First Step".to_string(),
            description: Some("Complete your first activity".to_string()),
            icon: Some("footprints".to_string()),
            color: Some("green".to_string()),
            badge_type: BADGE_ACTIVITY_COMPLETION.to_string(),
            criteria: json!({ "activities_completed": 1 }),
            points_value: Some(10),
            is_repeatable: None,
        },
        CreateBadge {
            name: "Dedicated Student".to_string(),
            description: Some("Complete five activities".to_string()),
            icon: Some("book-open".to_string()),
            color: Some("blue".to_string()),
            badge_type: BADGE_ACTIVITY_COMPLETION.to_string(),
            criteria: json!({ "activities_completed": 5 }),
            points_value: Some(25),
            is_repeatable: None,
        },
        CreateBadge {
            name: "Point Collector".to_string(),
            description: Some("Accumulate 100 points".to_string()),
            icon: Some("coins".to_string()),
            color: Some("gold".to_string()),
            badge_type: BADGE_ACTIVITY_COMPLETION.to_string(),
            criteria: json!({ "total_points": 100 }),
            points_value: Some(20),
            is_repeatable: None,
        },
        CreateBadge {
            name: "Expert".to_string(),
            description: Some("Accumulate 500 points".to_string()),
            icon: Some("award".to_string()),
            color: Some("purple".to_string()),
            badge_type: BADGE_ACTIVITY_COMPLETION.to_string(),
            criteria: json!({ "total_points": 500 }),
            points_value: Some(50),
            is_repeatable: None,
        },
        CreateBadge {
            name: "Perfectionist".to_string(),
            description: Some("Score 100% on an activity".to_string()),
            icon: Some("target".to_string()),
            color: Some("red".to_string()),
            badge_type: BADGE_ACTIVITY_COMPLETION.to_string(),
            criteria: json!({ "perfect_score": true }),
            points_value: Some(30),
            is_repeatable: None,
        },
        CreateBadge {
            name: "Week Streak".to_string(),
            description: Some("Learn seven days in a row".to_string()),
            icon: Some("flame".to_string()),
            color: Some("orange".to_string()),
            badge_type: BADGE_STREAK.to_string(),
            criteria: json!({ "streak_days": 7 }),
            points_value: Some(40),
            is_repeatable: None,
        },
        CreateBadge {
            name: "Course Conqueror".to_string(),
            description: Some("Complete your first course".to_string()),
            icon: Some("graduation-cap".to_string()),
            color: Some("teal".to_string()),
            badge_type: BADGE_COURSE_COMPLETION.to_string(),
            criteria: json!({ "courses_completed": 1 }),
            points_value: Some(50),
            is_repeatable: None,
        },
        CreateBadge {
            name: WELCOME_BADGE_NAME.to_string(),
            description: Some("Enroll in your first course".to_string()),
            icon: Some("hand-wave".to_string()),
            color: Some("sky".to_string()),
            badge_type: BADGE_SPECIAL.to_string(),
            criteria: json!({}),
            points_value: Some(5),
            is_repeatable: None,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
