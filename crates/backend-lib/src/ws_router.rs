// ============================
// coderoom-backend-lib/src/ws_router.rs
// ============================
//! WebSocket router and connection handling.
use crate::handlers::live;
use crate::metrics as keys;
use crate::transport::Transport;
use crate::validation;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use coderoom_common::ClientMessage;
use futures_util::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Create the relay router
pub fn create_router<T: Transport + Clone>(state: Arc<AppState<T>>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler::<T>))
        .route("/healthz", get(live::healthz))
        .route("/readyz", get(live::readyz::<T>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for WebSocket connections
pub async fn ws_handler<T: Transport + Clone>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<T>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection<T: Transport + Clone>(socket: WebSocket, state: Arc<AppState<T>>) {
    let connection_id = Uuid::new_v4().to_string();
    let (mut sink, mut stream) = socket.split();

    // Outbound channel: the coordinator emits into it, the writer task
    // drains it into the socket.
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.transport.register(connection_id.clone(), tx);

    counter!(keys::WS_CONNECTION).increment(1);
    gauge!(keys::WS_ACTIVE).increment(1.0);
    info!(connection_id, "connection open");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    warn!(%err, "dropping unserializable frame");
                    continue;
                },
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = stream.next().await {
        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => dispatch(&state, &connection_id, msg),
                Err(err) => {
                    // Malformed frames are dropped, never answered with an
                    // error event.
                    warn!(connection_id, %err, "dropping malformed frame");
                },
            },
            Message::Close(_) => break,
            _ => {},
        }
    }

    // The transport grouping still knows this connection's rooms, so the
    // disconnect fanout must run before the registry entry goes away.
    state.coordinator.disconnect(&connection_id);
    state.transport.unregister(&connection_id);

    gauge!(keys::WS_ACTIVE).decrement(1.0);
    info!(connection_id, "connection closed");

    send_task.abort();
}

fn dispatch<T: Transport + Clone>(state: &AppState<T>, connection_id: &str, msg: ClientMessage) {
    if let Err(err) = validation::validate_client_message(&msg, state.settings.max_content_bytes) {
        warn!(connection_id, %err, "dropping invalid frame");
        return;
    }

    match msg {
        ClientMessage::Join {
            room_id,
            display_name,
        } => state.coordinator.join(connection_id, &room_id, &display_name),
        ClientMessage::Leave { room_id } => state.coordinator.leave(connection_id, &room_id),
        ClientMessage::ContentChange { room_id, value } => {
            state.coordinator.update_content(connection_id, &room_id, value);
        },
        ClientMessage::GetContent { room_id } => {
            state.coordinator.fetch_content(connection_id, &room_id);
        },
    }
}
