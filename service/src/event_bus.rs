use std::sync::Arc;

use time::PrimitiveDateTime;
use uuid::Uuid;

/// Event kinds the engine emits. `Overtime` is published once per
/// orchestrator recompute; the rest mirror the raw mutation that triggered
/// it, for clients that want finer-grained UI updates.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    OvertimeUpdated,
    TimeEntryCreated,
    TimeEntryUpdated,
    TimeEntryDeleted,
    AbsenceCreated,
    AbsenceApproved,
    AbsenceRejected,
    CorrectionCreated,
    CorrectionDeleted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LedgerEvent {
    pub kind: EventKind,
    pub user_id: Uuid,
    pub payload: Arc<str>,
    pub timestamp_utc: PrimitiveDateTime,
}

/// Best-effort, in-process fan-out to currently connected subscribers; no
/// persistence, no replay. Authentication of subscribers is performed by the
/// transport shim, not here. Delivery failures (a lagging or disconnected
/// receiver) are logged by the implementation and never surfaced to the
/// publisher - a publish always succeeds from the caller's point of view.
pub trait EventBusService: Send + Sync {
    fn publish(&self, event: LedgerEvent);
    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<LedgerEvent>;
}
