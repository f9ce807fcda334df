//! The outbound notification contract.
//!
//! The orchestrator calls a [`NotificationDispatcher`] once per event kind
//! and treats every failure as best-effort: dispatch errors are logged by
//! the caller and never roll back gamification state. The default
//! implementation, [`InAppDispatcher`], writes an in-app notification row
//! and publishes the matching [`DomainEvent`] on the bus for the durable
//! log and the external delivery channels.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use skillforge_db::models::activity::Activity;
use skillforge_db::models::badge::Badge;
use skillforge_db::models::course::Course;
use skillforge_db::models::notification::{
    CreateNotification, KIND_ACTIVITY_COMPLETED, KIND_BADGE_EARNED, KIND_COURSE_COMPLETED,
    KIND_LEVEL_UP, KIND_STREAK_MILESTONE,
};
use skillforge_db::models::user::User;
use skillforge_db::repositories::NotificationRepo;
use skillforge_db::{StoreError, TenantScope};
use skillforge_core::level;

use crate::bus::{
    DomainEvent, EventBus, EVENT_ACTIVITY_COMPLETED, EVENT_BADGE_EARNED, EVENT_COURSE_COMPLETED,
    EVENT_LEVEL_UP, EVENT_STREAK_EXTENDED,
};

/// Error type for notification dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to store notification: {0}")]
    Store(#[from] StoreError),
}

/// One call per outward event kind. `notify_badge_earned` is only invoked
/// for newly earned badges, never on replays of an already-held badge.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify_activity_completed(
        &self,
        scope: &TenantScope,
        user: &User,
        activity: &Activity,
        score: i32,
    ) -> Result<(), NotifyError>;

    async fn notify_badge_earned(
        &self,
        scope: &TenantScope,
        user: &User,
        badge: &Badge,
    ) -> Result<(), NotifyError>;

    async fn notify_level_up(
        &self,
        scope: &TenantScope,
        user: &User,
        old_level: i32,
        new_level: i32,
    ) -> Result<(), NotifyError>;

    async fn notify_course_completed(
        &self,
        scope: &TenantScope,
        user: &User,
        course: &Course,
    ) -> Result<(), NotifyError>;

    async fn notify_streak_milestone(
        &self,
        scope: &TenantScope,
        user: &User,
        streak_days: i32,
    ) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// InAppDispatcher
// ---------------------------------------------------------------------------

/// Default dispatcher: in-app notification rows plus bus publication.
pub struct InAppDispatcher {
    bus: Arc<EventBus>,
}

impl InAppDispatcher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    async fn store(
        &self,
        scope: &TenantScope,
        input: CreateNotification,
    ) -> Result<(), NotifyError> {
        NotificationRepo::create(scope, &input).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for InAppDispatcher {
    async fn notify_activity_completed(
        &self,
        scope: &TenantScope,
        user: &User,
        activity: &Activity,
        score: i32,
    ) -> Result<(), NotifyError> {
        self.store(
            scope,
            CreateNotification {
                user_id: user.id,
                kind: KIND_ACTIVITY_COMPLETED.to_string(),
                title: "Activity completed".to_string(),
                body: format!("You finished \"{}\" with a score of {score}.", activity.title),
                payload: json!({ "activity_id": activity.id, "score": score }),
            },
        )
        .await?;

        self.bus.publish(
            DomainEvent::new(EVENT_ACTIVITY_COMPLETED)
                .with_tenant(activity.tenant_id.clone())
                .with_source("activity", activity.id)
                .with_actor(user.id)
                .with_payload(json!({ "score": score })),
        );
        Ok(())
    }

    async fn notify_badge_earned(
        &self,
        scope: &TenantScope,
        user: &User,
        badge: &Badge,
    ) -> Result<(), NotifyError> {
        self.store(
            scope,
            CreateNotification {
                user_id: user.id,
                kind: KIND_BADGE_EARNED.to_string(),
                title: "New badge unlocked!".to_string(),
                body: format!("Congratulations! You earned the \"{}\" badge.", badge.name),
                payload: json!({
                    "badge_id": badge.id,
                    "badge_name": badge.name,
                    "icon": badge.icon,
                    "color": badge.color,
                    "points_value": badge.points_value,
                }),
            },
        )
        .await?;

        self.bus.publish(
            DomainEvent::new(EVENT_BADGE_EARNED)
                .with_tenant(badge.tenant_id.clone())
                .with_source("badge", badge.id)
                .with_actor(user.id)
                .with_payload(json!({ "badge_name": badge.name })),
        );
        Ok(())
    }

    async fn notify_level_up(
        &self,
        scope: &TenantScope,
        user: &User,
        old_level: i32,
        new_level: i32,
    ) -> Result<(), NotifyError> {
        let title = level::title_for_level(new_level);
        self.store(
            scope,
            CreateNotification {
                user_id: user.id,
                kind: KIND_LEVEL_UP.to_string(),
                title: "Level up!".to_string(),
                body: format!("You reached level {new_level} — you are now a {title}!"),
                payload: json!({
                    "old_level": old_level,
                    "new_level": new_level,
                    "level_title": title,
                    "total_points": user.total_points,
                }),
            },
        )
        .await?;

        if let Some(tenant) = scope.tenant() {
            self.bus.publish(
                DomainEvent::new(EVENT_LEVEL_UP)
                    .with_tenant(tenant)
                    .with_actor(user.id)
                    .with_payload(json!({ "old_level": old_level, "new_level": new_level })),
            );
        }
        Ok(())
    }

    async fn notify_course_completed(
        &self,
        scope: &TenantScope,
        user: &User,
        course: &Course,
    ) -> Result<(), NotifyError> {
        self.store(
            scope,
            CreateNotification {
                user_id: user.id,
                kind: KIND_COURSE_COMPLETED.to_string(),
                title: "Course completed!".to_string(),
                body: format!("You completed the course \"{}\".", course.title),
                payload: json!({ "course_id": course.id }),
            },
        )
        .await?;

        self.bus.publish(
            DomainEvent::new(EVENT_COURSE_COMPLETED)
                .with_tenant(course.tenant_id.clone())
                .with_source("course", course.id)
                .with_actor(user.id)
                .with_payload(json!({ "course_title": course.title })),
        );
        Ok(())
    }

    async fn notify_streak_milestone(
        &self,
        scope: &TenantScope,
        user: &User,
        streak_days: i32,
    ) -> Result<(), NotifyError> {
        self.store(
            scope,
            CreateNotification {
                user_id: user.id,
                kind: KIND_STREAK_MILESTONE.to_string(),
                title: "Streak milestone".to_string(),
                body: format!("{streak_days} days of learning in a row — keep it going!"),
                payload: json!({ "streak_days": streak_days }),
            },
        )
        .await?;

        if let Some(tenant) = scope.tenant() {
            self.bus.publish(
                DomainEvent::new(EVENT_STREAK_EXTENDED)
                    .with_tenant(tenant)
                    .with_actor(user.id)
                    .with_payload(json!({ "streak_days": streak_days })),
            );
        }
        Ok(())
    }
}
