//! The Skillforge gamification engine.
//!
//! One [`Orchestrator`] invocation per completion signal runs the full
//! pipeline — points, badges, level, streak, progress, and the nested
//! course-completion sequence — with every step idempotent so the
//! surrounding job system can safely retry the whole unit of work.

pub mod badges;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod levels;
pub mod orchestrator;
pub mod progress;
pub mod reconcile;
pub mod signals;
pub mod streaks;

pub use error::EngineError;
pub use orchestrator::{ActivityOutcome, CourseOutcome, Orchestrator};
pub use signals::{ActivityCompletionSignal, CourseCompletionSignal};
