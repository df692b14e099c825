//! services/api/src/web/join.rs
//!
//! The join view: a player who opened a game link follows the host's record live.

use crate::adapters::{RealtimeStore, RecordEvent};
use crate::web::{
    presenter::{send_message, WsSender},
    protocol::ServerMessage,
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::StreamExt;
use sage_core::domain::GameId;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    Mutex,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Deserialize, Debug)]
pub struct JoinParams {
    pub id: String,
}

/// The handler for upgrading `/ws/join?id=<game id>` to a WebSocket.
pub async fn join_ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<JoinParams>,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_join_socket(socket, app_state, params.id))
}

async fn handle_join_socket(socket: WebSocket, app_state: Arc<AppState>, raw_id: String) {
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    let Some(game_id) = GameId::parse(&raw_id) else {
        let _ = send_message(&ws_sender, &ServerMessage::error("Invalid game ID")).await;
        return;
    };
    let path = game_id.record_path();

    // Subscribe before the first read so no change slips in between.
    let events = app_state.store.subscribe();
    let Some(record) = app_state.store.read(&path).await else {
        let _ = send_message(&ws_sender, &ServerMessage::error("Game does not exist")).await;
        return;
    };
    let first = ServerMessage::GameUpdated {
        game_id: game_id.to_string(),
        record,
    };
    if send_message(&ws_sender, &first).await.is_err() {
        return;
    }
    info!("Player joined game {}", game_id);

    let token = CancellationToken::new();
    let follow_task = {
        let app_state = app_state.clone();
        let ws_sender = ws_sender.clone();
        let token = token.clone();
        let game_id = game_id.clone();
        tokio::spawn(async move {
            follow_game(app_state, ws_sender, events, game_id, token).await;
        })
    };

    // Incoming frames only matter for noticing that the player left.
    while let Some(Ok(msg)) = receiver.next().await {
        if matches!(msg, Message::Close(_)) {
            break;
        }
    }

    token.cancel();
    if let Err(e) = follow_task.await {
        error!("Join follower task failed: {:?}", e);
    }
    info!("Player left game {}", game_id);
}

async fn follow_game(
    app_state: Arc<AppState>,
    ws_sender: WsSender,
    mut events: broadcast::Receiver<RecordEvent>,
    game_id: GameId,
    token: CancellationToken,
) {
    let path = game_id.record_path();
    loop {
        let event = tokio::select! {
            _ = token.cancelled() => return,
            event = events.recv() => event,
        };

        let msg = match event {
            Ok(event) => match event_reply(&event, &path, &game_id) {
                Some(msg) => msg,
                None => continue,
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("Join view for {} lagged by {} events", game_id, skipped);
                resync_reply(&app_state.store, &path, &game_id).await
            }
            Err(RecvError::Closed) => return,
        };

        let ended = matches!(msg, ServerMessage::GameEnded { .. });
        if send_message(&ws_sender, &msg).await.is_err() || ended {
            return;
        }
    }
}

/// What a joined player is told about one store event; `None` for other records.
fn event_reply(event: &RecordEvent, path: &str, game_id: &GameId) -> Option<ServerMessage> {
    if event.path() != path {
        return None;
    }
    let msg = match event {
        RecordEvent::Changed { document, .. } => ServerMessage::GameUpdated {
            game_id: game_id.to_string(),
            record: document.clone(),
        },
        RecordEvent::Removed { .. } => ServerMessage::GameEnded {
            game_id: game_id.to_string(),
        },
    };
    Some(msg)
}

/// After missing events, the current record is the only thing worth sending.
async fn resync_reply(store: &RealtimeStore, path: &str, game_id: &GameId) -> ServerMessage {
    match store.read(path).await {
        Some(record) => ServerMessage::GameUpdated {
            game_id: game_id.to_string(),
            record,
        },
        None => ServerMessage::GameEnded {
            game_id: game_id.to_string(),
        },
    }
}
