//! Skillforge event bus and notification infrastructure.
//!
//! Building blocks for the platform-wide event system:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] — the canonical domain event envelope.
//! - [`EventPersistence`] — background service that durably writes every
//!   event to the `events` table.
//! - [`NotificationDispatcher`] — the outbound notification contract the
//!   gamification orchestrator calls; [`InAppDispatcher`] is the default
//!   implementation (notification rows + bus publication).
//! - [`delivery`] — external delivery channels (webhook, email).

pub mod bus;
pub mod delivery;
pub mod notifier;
pub mod persistence;

pub use bus::{DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::webhook::WebhookDelivery;
pub use notifier::{InAppDispatcher, NotificationDispatcher, NotifyError};
pub use persistence::EventPersistence;
