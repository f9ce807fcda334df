//! The gamification pipeline.
//!
//! One orchestrator invocation per completion signal, with internally
//! sequenced steps:
//!
//! `received -> points_awarded -> badges_evaluated -> level_checked ->
//!  streak_updated -> progress_recomputed (-> course sub-pipeline) ->
//!  notifications_dispatched -> done`
//!
//! Badges run after points (criteria may read totals) and before the
//! level check (level badges read the just-computed level); progress runs
//! last because a course completion nests a second points -> badges ->
//! level sequence scoped to the course. Every step is idempotent, so the
//! surrounding job system may retry the whole unit of work at least once
//! without double effects. Notification dispatch is best effort: failures
//! are logged and never roll anything back.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use skillforge_core::badge::STREAK_BADGE_MIN_DAYS;
use skillforge_core::scoring;
use skillforge_core::streak::StreakState;
use skillforge_core::types::{DbId, Timestamp};
use skillforge_db::models::activity::Activity;
use skillforge_db::models::badge::Badge;
use skillforge_db::models::course::Course;
use skillforge_db::models::enrollment::CourseEnrollment;
use skillforge_db::models::point::{CreatePoint, ENTRY_EARNED, SOURCE_ACTIVITY, SOURCE_COURSE};
use skillforge_db::models::user::User;
use skillforge_db::repositories::{ActivityRepo, CourseRepo, EnrollmentRepo, UserRepo};
use skillforge_db::{DbPool, TenantScope};
use skillforge_events::NotificationDispatcher;
use validator::Validate;

use crate::badges::BadgeEvaluator;
use crate::error::EngineError;
use crate::ledger::PointsLedger;
use crate::levels::{LevelOutcome, LevelService};
use crate::progress::ProgressAggregator;
use crate::signals::{ActivityCompletionSignal, CourseCompletionSignal};
use crate::streaks::StreakTracker;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What one activity-completion unit of work actually did.
#[derive(Debug, Clone)]
pub struct ActivityOutcome {
    /// Points granted for the activity itself; `None` below the passing
    /// threshold or when the award was a replay.
    pub points_awarded: Option<i64>,
    /// Names of badges newly earned during the unit of work.
    pub badges: Vec<String>,
    pub level_up: Option<LevelOutcome>,
    pub streak: StreakState,
    pub progress_percentage: Option<f64>,
    /// The nested course sub-pipeline's outcome, when this completion
    /// finished the course.
    pub course: Option<CourseOutcome>,
}

/// What a course-completion (sub-)pipeline did.
#[derive(Debug, Clone)]
pub struct CourseOutcome {
    pub points_awarded: Option<i64>,
    pub badges: Vec<String>,
    pub level_up: Option<LevelOutcome>,
}

/// Outcome of an enrollment (welcome + participation badges).
#[derive(Debug, Clone)]
pub struct EnrollmentOutcome {
    pub enrollment: CourseEnrollment,
    pub badges: Vec<String>,
}

// ---------------------------------------------------------------------------
// Pipeline state
// ---------------------------------------------------------------------------

/// Notifications gathered during the steps, dispatched together in the
/// final state so a dispatch failure cannot interleave with data
/// mutations.
enum PendingNote {
    ActivityCompleted { activity: Activity, score: i32 },
    BadgeEarned(Badge),
    LevelUp { old_level: i32, new_level: i32 },
    CourseCompleted(Course),
    StreakMilestone(i32),
}

/// Per-unit-of-work bookkeeping shared between the activity pipeline and
/// the nested course sub-pipeline.
struct PipelineState {
    /// Levels already announced in this unit of work. The nested course
    /// level check consults this so back-to-back checks cannot announce
    /// the same level twice.
    notified_levels: HashSet<i32>,
    pending: Vec<PendingNote>,
}

impl PipelineState {
    fn new() -> Self {
        Self {
            notified_levels: HashSet::new(),
            pending: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs the gamification pipeline for completion signals.
pub struct Orchestrator {
    notifier: Arc<dyn NotificationDispatcher>,
}

impl Orchestrator {
    pub fn new(notifier: Arc<dyn NotificationDispatcher>) -> Self {
        Self { notifier }
    }

    /// Re-establish the tenant scope from the acting user's persisted
    /// tenant id.
    ///
    /// Units of work run on background workers detached from the
    /// originating request, so the scope is always rebuilt here — never
    /// inherited from whatever ran on the worker last.
    async fn establish_scope(
        pool: &DbPool,
        user_id: DbId,
    ) -> Result<TenantScope, EngineError> {
        match UserRepo::tenant_of(pool, user_id).await? {
            None => Err(EngineError::EntityNotFound {
                entity: "user",
                id: user_id,
            }),
            Some(None) => Err(EngineError::InvalidSignal(format!(
                "user {user_id} has no tenant and cannot be a gamification subject"
            ))),
            Some(Some(tenant)) => Ok(TenantScope::for_tenant(pool.clone(), tenant)),
        }
    }

    /// Process one activity-completion signal as a full unit of work.
    pub async fn process_activity_completion(
        &self,
        pool: &DbPool,
        signal: &ActivityCompletionSignal,
    ) -> Result<ActivityOutcome, EngineError> {
        signal
            .validate()
            .map_err(|e| EngineError::InvalidSignal(e.to_string()))?;

        let scope = Self::establish_scope(pool, signal.user_id).await?;

        let user = UserRepo::find(&scope, signal.user_id).await?.ok_or(
            EngineError::EntityNotFound {
                entity: "user",
                id: signal.user_id,
            },
        )?;
        let activity = ActivityRepo::find(&scope, signal.activity_id).await?.ok_or(
            EngineError::EntityNotFound {
                entity: "activity",
                id: signal.activity_id,
            },
        )?;

        tracing::info!(
            user_id = user.id,
            activity_id = activity.id,
            score = signal.score,
            "Processing activity completion"
        );

        let mut state = PipelineState::new();
        state.pending.push(PendingNote::ActivityCompleted {
            activity: activity.clone(),
            score: signal.score,
        });

        // 1. Points — only a passing score earns them.
        let points_awarded = if scoring::is_passing(&activity.activity_type, signal.score) {
            let amount = scoring::activity_points(
                activity.points_value,
                signal.score,
                signal.time_spent_secs,
                activity.duration_minutes,
            );
            PointsLedger::award_once(
                &scope,
                &CreatePoint {
                    user_id: user.id,
                    amount,
                    entry_type: ENTRY_EARNED.to_string(),
                    source_kind: SOURCE_ACTIVITY.to_string(),
                    source_id: activity.id,
                    description: Some(format!(
                        "Completed activity: {} (Score: {}%)",
                        activity.title, signal.score
                    )),
                },
            )
            .await?
            .map(|_| amount)
        } else {
            None
        };

        // 2. Badges — after points so criteria can read the new total.
        let mut badge_names = Vec::new();
        let fresh = Self::refresh_user(&scope, &user).await?;
        for badge in
            BadgeEvaluator::evaluate_activity_badges(&scope, &fresh, &activity, signal.score)
                .await?
        {
            badge_names.push(badge.name.clone());
            state.pending.push(PendingNote::BadgeEarned(badge));
        }

        // 3. Level.
        let level_up = self.check_level(&scope, &mut state, user.id).await?;

        // 4. Streak.
        let previous_streak = user.current_streak;
        let streak = StreakTracker::update_streak(&scope, user.id, activity.id).await?;
        if streak.current >= STREAK_BADGE_MIN_DAYS {
            let fresh = Self::refresh_user(&scope, &user).await?;
            for badge in
                BadgeEvaluator::check_streak_badges(&scope, &fresh, streak.current).await?
            {
                badge_names.push(badge.name.clone());
                state.pending.push(PendingNote::BadgeEarned(badge));
            }
        }
        if streak.current != previous_streak && StreakTracker::is_milestone(streak.current) {
            state
                .pending
                .push(PendingNote::StreakMilestone(streak.current));
        }

        // 5. Progress — last, because completing the course nests a second
        //    points -> badges -> level sequence.
        let mut progress_percentage = None;
        let mut course_outcome = None;
        if let Some(progress) =
            ProgressAggregator::recompute(&scope, user.id, activity.course_id).await?
        {
            progress_percentage = Some(progress.percentage);
            if progress.just_completed {
                let outcome = self
                    .run_course_pipeline(
                        &scope,
                        &mut state,
                        user.id,
                        activity.course_id,
                        progress.enrollment.enrolled_at,
                    )
                    .await?;
                badge_names.extend(outcome.badges.iter().cloned());
                course_outcome = Some(outcome);
            }
        }

        // 6. Notifications — best effort, after all data mutations.
        self.dispatch_pending(&scope, &user, state).await;

        Ok(ActivityOutcome {
            points_awarded,
            badges: badge_names,
            level_up,
            streak,
            progress_percentage,
            course: course_outcome,
        })
    }

    /// Process a standalone course-completion signal (operational replay
    /// or an externally raised completion).
    pub async fn process_course_completion(
        &self,
        pool: &DbPool,
        signal: &CourseCompletionSignal,
    ) -> Result<CourseOutcome, EngineError> {
        let scope = Self::establish_scope(pool, signal.user_id).await?;
        let user = UserRepo::find(&scope, signal.user_id).await?.ok_or(
            EngineError::EntityNotFound {
                entity: "user",
                id: signal.user_id,
            },
        )?;

        let mut state = PipelineState::new();
        let outcome = self
            .run_course_pipeline(
                &scope,
                &mut state,
                signal.user_id,
                signal.course_id,
                signal.enrolled_at,
            )
            .await?;
        self.dispatch_pending(&scope, &user, state).await;
        Ok(outcome)
    }

    /// Enroll a user and evaluate enrollment-triggered badges (the
    /// welcome badge on a first enrollment, participation badges).
    pub async fn process_enrollment(
        &self,
        scope: &TenantScope,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<EnrollmentOutcome, EngineError> {
        let user = UserRepo::find(scope, user_id)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "user",
                id: user_id,
            })?;
        let course = CourseRepo::find(scope, course_id)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "course",
                id: course_id,
            })?;

        let first_enrollment = EnrollmentRepo::count_for_user(scope, user_id).await? == 0;
        let enrollment = EnrollmentRepo::enroll(scope, user_id, course_id).await?;

        let mut state = PipelineState::new();
        let mut badge_names = Vec::new();

        if first_enrollment {
            if let Some(badge) = BadgeEvaluator::award_welcome_badge(scope, &user).await? {
                badge_names.push(badge.name.clone());
                state.pending.push(PendingNote::BadgeEarned(badge));
            }
        }
        for badge in BadgeEvaluator::evaluate_enrollment_badges(scope, &user, &course).await? {
            badge_names.push(badge.name.clone());
            state.pending.push(PendingNote::BadgeEarned(badge));
        }

        self.dispatch_pending(scope, &user, state).await;

        Ok(EnrollmentOutcome {
            enrollment,
            badges: badge_names,
        })
    }

    // -----------------------------------------------------------------------
    // Sub-pipelines and helpers
    // -----------------------------------------------------------------------

    /// The course-completion sequence: points (with speed bonus) ->
    /// badges -> level, with the course as the reward source.
    async fn run_course_pipeline(
        &self,
        scope: &TenantScope,
        state: &mut PipelineState,
        user_id: DbId,
        course_id: DbId,
        enrolled_at: Timestamp,
    ) -> Result<CourseOutcome, EngineError> {
        let course = CourseRepo::find(scope, course_id)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "course",
                id: course_id,
            })?;

        let days_to_complete = (Utc::now() - enrolled_at).num_days();
        let amount = scoring::course_points(course.points_per_completion, days_to_complete);
        let bonus = scoring::course_speed_bonus(days_to_complete);

        let points_awarded = PointsLedger::award_once(
            scope,
            &CreatePoint {
                user_id,
                amount,
                entry_type: ENTRY_EARNED.to_string(),
                source_kind: SOURCE_COURSE.to_string(),
                source_id: course.id,
                description: Some(if bonus > 0 {
                    format!("Completed course: {} (Speed bonus: +{bonus})", course.title)
                } else {
                    format!("Completed course: {}", course.title)
                }),
            },
        )
        .await?
        .map(|_| amount);

        let mut badge_names = Vec::new();
        let user = UserRepo::find(scope, user_id)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "user",
                id: user_id,
            })?;
        for badge in
            BadgeEvaluator::evaluate_course_completion_badges(scope, &user, &course).await?
        {
            badge_names.push(badge.name.clone());
            state.pending.push(PendingNote::BadgeEarned(badge));
        }

        let level_up = self.check_level(scope, state, user_id).await?;

        state.pending.push(PendingNote::CourseCompleted(course));

        Ok(CourseOutcome {
            points_awarded,
            badges: badge_names,
            level_up,
        })
    }

    /// Level check shared by the activity pipeline and the course
    /// sub-pipeline. Emission is idempotent per (user, new level) within
    /// the unit of work: a second check that lands on an already-announced
    /// level stays silent.
    async fn check_level(
        &self,
        scope: &TenantScope,
        state: &mut PipelineState,
        user_id: DbId,
    ) -> Result<Option<LevelOutcome>, EngineError> {
        let Some(outcome) = LevelService::check_level_up(scope, user_id).await? else {
            return Ok(None);
        };
        if !state.notified_levels.insert(outcome.new_level) {
            return Ok(Some(outcome));
        }

        state.pending.push(PendingNote::LevelUp {
            old_level: outcome.old_level,
            new_level: outcome.new_level,
        });

        let user = UserRepo::find(scope, user_id)
            .await?
            .ok_or(EngineError::EntityNotFound {
                entity: "user",
                id: user_id,
            })?;
        if let Some(badge) =
            BadgeEvaluator::check_level_up_badge(scope, &user, outcome.new_level).await?
        {
            state.pending.push(PendingNote::BadgeEarned(badge));
        }

        Ok(Some(outcome))
    }

    /// Dispatch every gathered notification, logging failures and moving
    /// on. Nothing here can fail the unit of work.
    async fn dispatch_pending(&self, scope: &TenantScope, user: &User, state: PipelineState) {
        let user = match Self::refresh_user(scope, user).await {
            Ok(fresh) => fresh,
            Err(_) => user.clone(),
        };

        for note in state.pending {
            let result = match &note {
                PendingNote::ActivityCompleted { activity, score } => {
                    self.notifier
                        .notify_activity_completed(scope, &user, activity, *score)
                        .await
                }
                PendingNote::BadgeEarned(badge) => {
                    self.notifier.notify_badge_earned(scope, &user, badge).await
                }
                PendingNote::LevelUp {
                    old_level,
                    new_level,
                } => {
                    self.notifier
                        .notify_level_up(scope, &user, *old_level, *new_level)
                        .await
                }
                PendingNote::CourseCompleted(course) => {
                    self.notifier
                        .notify_course_completed(scope, &user, course)
                        .await
                }
                PendingNote::StreakMilestone(days) => {
                    self.notifier
                        .notify_streak_milestone(scope, &user, *days)
                        .await
                }
            };
            if let Err(e) = result {
                tracing::warn!(
                    user_id = user.id,
                    error = %e,
                    "Notification dispatch failed; gamification state is unaffected"
                );
            }
        }
    }

    /// Re-read the user so later steps see totals updated by earlier ones.
    async fn refresh_user(scope: &TenantScope, user: &User) -> Result<User, EngineError> {
        Ok(UserRepo::find(scope, user.id).await?.unwrap_or_else(|| user.clone()))
    }
}
