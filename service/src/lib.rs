use std::sync::Arc;

use thiserror::Error;

pub mod absence;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod event_bus;
pub mod journal;
pub mod orchestrator;
pub mod reporting;
pub mod rollover;
pub mod scheduler;
pub mod time_store;
pub mod user;
pub mod uuid_service;
pub mod vacation;

/// The error taxonomy from the engine's error-handling design: validation
/// errors surface immediately, store errors abort the enclosing transaction
/// and surface, event-bus errors are logged and never surfaced here.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(Arc<str>),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(Arc<str>),

    #[error("Not found: {0}")]
    NotFound(Arc<str>),

    #[error("Conflict: {0}")]
    Conflict(Arc<str>),

    /// Live recompute disagrees with the monthly cache by more than the
    /// 0.01h tolerance. Carries the per-day breakdown that was logged
    /// alongside this error so the caller does not have to re-derive it.
    #[error("Inconsistent balance for user {user_id} month {year}-{month:02}: cache={cached:.2}h live={live:.2}h")]
    Inconsistent {
        user_id: uuid::Uuid,
        year: u32,
        month: u8,
        cached: f64,
        live: f64,
    },

    #[error("Store busy, retry")]
    Transient,

    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] dao::DaoError),
}
