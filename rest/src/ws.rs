use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use rest_types::{WsClientMessageTO, WsServerMessageTO};
use service::event_bus::EventBusService;
use tracing::instrument;

use crate::RestStateDef;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new().route("/", get(upgrade::<RestState>))
}

#[instrument(skip(rest_state, ws))]
pub async fn upgrade<RestState: RestStateDef>(ws: WebSocketUpgrade, State(rest_state): State<RestState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, rest_state))
}

/// Waits for `{type:"auth", userId}`, replies `{type:"auth:success"}`, then
/// relays this user's ledger events until the socket closes or a heartbeat
/// ping goes unanswered (spec.md §5 "dead connections are pruned").
async fn handle_socket<RestState: RestStateDef>(mut socket: WebSocket, rest_state: RestState) {
    let user_id = match authenticate(&mut socket).await {
        Some(user_id) => user_id,
        None => return,
    };

    let mut events = rest_state.event_bus_service().subscribe();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "ws subscriber lagged behind the event bus");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                if event.user_id != user_id {
                    continue;
                }
                let message = WsServerMessageTO::Event {
                    kind: format!("{:?}", event.kind).into(),
                    user_id: event.user_id,
                    data: event.payload.clone(),
                    timestamp: event.timestamp_utc,
                };
                if send_json(&mut socket, &message).await.is_err() {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                if socket.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }
}

async fn authenticate(socket: &mut WebSocket) -> Option<uuid::Uuid> {
    let message = socket.recv().await?.ok()?;
    let Message::Text(text) = message else {
        return None;
    };
    let WsClientMessageTO::Auth { user_id } = serde_json::from_str(&text).ok()?;
    send_json(socket, &WsServerMessageTO::AuthSuccess).await.ok()?;
    Some(user_id)
}

async fn send_json(socket: &mut WebSocket, message: &WsServerMessageTO) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).expect("ws server message always serializes");
    socket.send(Message::Text(text.into())).await
}
