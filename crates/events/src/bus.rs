//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`DomainEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillforge_core::types::{DbId, TenantId};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const EVENT_ACTIVITY_COMPLETED: &str = "activity.completed";
pub const EVENT_COURSE_COMPLETED: &str = "course.completed";
pub const EVENT_POINTS_AWARDED: &str = "points.awarded";
pub const EVENT_BADGE_EARNED: &str = "badge.earned";
pub const EVENT_LEVEL_UP: &str = "level.up";
pub const EVENT_STREAK_EXTENDED: &str = "streak.extended";

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the platform.
///
/// Constructed via [`DomainEvent::new`] and enriched with the builder
/// methods [`with_source`](DomainEvent::with_source),
/// [`with_actor`](DomainEvent::with_actor), and
/// [`with_payload`](DomainEvent::with_payload). The tenant travels inside
/// the event so subscribers never need ambient context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique id for cross-system correlation (webhook receivers, logs).
    pub event_id: uuid::Uuid,

    /// Dot-separated event name, e.g. `"activity.completed"`.
    pub event_type: String,

    /// Tenant the event belongs to, if any.
    pub tenant_id: Option<TenantId>,

    /// Optional source entity kind (e.g. `"activity"`, `"badge"`).
    pub source_kind: Option<String>,

    /// Optional source entity database id.
    pub source_id: Option<DbId>,

    /// Optional id of the user the event is about.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with only the required `event_type`.
    ///
    /// All optional fields default to `None` / empty object.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4(),
            event_type: event_type.into(),
            tenant_id: None,
            source_kind: None,
            source_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the owning tenant to the event.
    pub fn with_tenant(mut self, tenant_id: impl Into<TenantId>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Attach a source entity to the event.
    pub fn with_source(mut self, kind: impl Into<String>, id: DbId) -> Self {
        self.source_kind = Some(kind.into());
        self.source_id = Some(id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    /// The persistence subscriber (when running) ensures database capture.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
