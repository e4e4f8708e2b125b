use service::event_bus::{EventBusService, LedgerEvent};

/// In-process fan-out over `tokio::sync::broadcast`. Capacity is sized for a
/// burst of recomputes during a batch rollover; a receiver that falls behind
/// drops the oldest events rather than blocking the publisher (spec §5).
const CHANNEL_CAPACITY: usize = 1024;

pub struct EventBusServiceImpl {
    sender: tokio::sync::broadcast::Sender<LedgerEvent>,
}

impl EventBusServiceImpl {
    pub fn new() -> Self {
        let (sender, _receiver) = tokio::sync::broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl Default for EventBusServiceImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBusService for EventBusServiceImpl {
    fn publish(&self, event: LedgerEvent) {
        // `send` only fails when there are no receivers; that is a normal
        // state (no websocket clients connected) and not an error.
        if self.sender.send(event).is_err() {
            tracing::debug!("published a ledger event with no active subscribers");
        }
    }

    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::macros::datetime;
    use uuid::Uuid;

    #[tokio::test]
    async fn a_published_event_reaches_an_active_subscriber() {
        let bus = EventBusServiceImpl::new();
        let mut receiver = bus.subscribe();
        bus.publish(LedgerEvent {
            kind: service::event_bus::EventKind::OvertimeUpdated,
            user_id: Uuid::nil(),
            payload: Arc::from("{}"),
            timestamp_utc: datetime!(2024-05-01 00:00),
        });
        let received = receiver.recv().await.unwrap();
        assert_eq!(received.user_id, Uuid::nil());
    }

    #[test]
    fn publishing_with_no_subscribers_does_not_panic() {
        let bus = EventBusServiceImpl::new();
        bus.publish(LedgerEvent {
            kind: service::event_bus::EventKind::OvertimeUpdated,
            user_id: Uuid::nil(),
            payload: Arc::from("{}"),
            timestamp_utc: datetime!(2024-05-01 00:00),
        });
    }
}
