use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::Date;
use uuid::Uuid;

use crate::ServiceError;

/// Every mutation the engine reacts to, carrying just enough information to
/// derive its affected date set (spec 4.5 step 1).
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    TimeEntryChanged { date: Date },
    AbsenceDecided { start: Date, end: Date },
    CorrectionChanged { date: Date },
    /// A change to schedule, weekly hours, hire date or end date affects
    /// every date from the earliest effective date through today.
    UserProfileChanged { effective_from: Date },
}

#[derive(Clone, Debug, PartialEq)]
pub struct BalanceChanged {
    pub user_id: Uuid,
    pub dates: Arc<[Date]>,
    pub new_balance: f64,
}

/// The Recompute Orchestrator (spec C5). Receives handles for the journal,
/// calendar, time store and event bus by dependency injection; owns none of
/// their mutable state. Holds a per-user lock across the full
/// delete -> recompute -> re-chain -> cache-update -> publish sequence so
/// that, within one user, recomputes are linearizable (spec P8), while
/// distinct users proceed concurrently.
#[automock]
#[async_trait]
pub trait OrchestratorService {
    /// Expands `mutation` to its affected date set and recomputes the
    /// journal and monthly cache for every date in it, today's date bounding
    /// how far into the future any recompute may reach (spec P6). Running
    /// this twice for the same mutation is a no-op on the resulting state
    /// (spec: idempotence via delete-then-reinsert plus re-chaining).
    async fn recompute(
        &self,
        user_id: Uuid,
        mutation: Mutation,
    ) -> Result<BalanceChanged, ServiceError>;
}
