//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a play connection.
//! Each connection owns one `PlaySession` and processes its messages one at a time.

use crate::web::{
    presenter::{WsPresenter, WsSender},
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::StreamExt;
use sage_core::error::PlayError;
use sage_core::play::{PlayPorts, PlaySession};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// The handler for upgrading HTTP requests to play WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));
    let presenter = Arc::new(WsPresenter::new(ws_sender.clone()));
    let store = app_state.store.client();
    info!("New play connection for client {}", store.client_id());

    let ports = PlayPorts {
        decks: app_state.decks.clone(),
        store: Arc::new(store.clone()),
        notifier: presenter.clone(),
        invites: presenter.clone(),
    };
    let mut session = PlaySession::new(ports, app_state.config.public_origin.clone());

    // --- 1. Initialization Phase ---
    let deck_id = match receiver.next().await {
        Some(Ok(Message::Text(init_json))) => {
            match serde_json::from_str::<ClientMessage>(init_json.as_str()) {
                Ok(ClientMessage::Init { deck_id }) => deck_id,
                _ => {
                    error!("First message was not a valid Init message.");
                    let _ = presenter
                        .send(&ServerMessage::error("Expected an init message."))
                        .await;
                    store.disconnect().await;
                    return;
                }
            }
        }
        _ => {
            info!("Client disconnected before sending Init message.");
            store.disconnect().await;
            return;
        }
    };

    info!("Initializing play session for deck {}", deck_id);
    match session.initialize(deck_id).await {
        Ok(()) => {
            let init_msg = ServerMessage::SessionInitialized {
                deck_id,
                card_count: session.page_count(),
            };
            let sent = async {
                presenter.send(&init_msg).await?;
                presenter.send(&ServerMessage::state_of(&session)).await
            }
            .await;
            if let Err(e) = sent {
                error!("Failed to send session initialized message: {}", e);
                store.disconnect().await;
                return;
            }
        }
        Err(e) => {
            error!("Failed to initialize play session: {:?}", e);
            let _ = presenter
                .send(&ServerMessage::error("Failed to load deck."))
                .await;
            store.disconnect().await;
            return;
        }
    }

    // --- 2. Main Message Loop ---
    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                handle_text_message(text.as_str(), &mut session, &presenter).await;
            }
            Some(Ok(Message::Close(_))) => {
                info!("Client sent close message.");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!("Play socket error: {}", e);
                break;
            }
            None => {
                info!("Client disconnected.");
                break;
            }
        }
    }

    // --- 3. Cleanup ---
    if let Err(e) = session.teardown().await {
        warn!("Failed to remove game record: {:?}", e);
    }
    store.disconnect().await;
    info!("Play connection closed.");
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(text: &str, session: &mut PlaySession, presenter: &WsPresenter) {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            return;
        }
    };

    let result = match client_msg {
        ClientMessage::SetPage { page } => session.set_page(page).await,
        ClientMessage::CompleteCard { page } => {
            session.advance_or_finish(page).await.map(|progress| {
                debug!("Completed page {}: {:?}", page, progress);
            })
        }
        ClientMessage::SetEmoji { page, emoji } => session.set_emoji(emoji, page).await,
        ClientMessage::SelectHints { page, hints } => session.select_hints(page, hints).await,
        ClientMessage::ShowGameId => match session.start_hosting().await {
            // The player has already been notified.
            Err(e) => {
                warn!("Hosting failed: {:?}", e);
                Ok(())
            }
            ok => ok,
        },
        ClientMessage::Init { .. } => {
            warn!("Received subsequent Init message, which is ignored.");
            return;
        }
    };

    if let Err(e) = result {
        report(e, presenter).await;
    }

    if let Err(e) = presenter.send(&ServerMessage::state_of(session)).await {
        error!("Failed to send state update: {}", e);
    }
}

/// Sync failures stay silent; only misuse of the protocol is echoed back.
fn error_reply(e: &PlayError) -> Option<ServerMessage> {
    match e {
        PlayError::NoCards
        | PlayError::NoActiveGame
        | PlayError::StoreWriteFailure(_)
        | PlayError::StoreReadFailure(_)
        | PlayError::GameIdExhausted(_)
        | PlayError::Encoding(_) => None,
        PlayError::PageOutOfRange { .. }
        | PlayError::SessionEnded
        | PlayError::InvalidDigitCount(_)
        | PlayError::DeckUnavailable(_) => Some(ServerMessage::error(e.to_string())),
    }
}

async fn report(e: PlayError, presenter: &WsPresenter) {
    let Some(reply) = error_reply(&e) else {
        match e {
            PlayError::NoCards | PlayError::NoActiveGame => debug!("Remote sync skipped: {}", e),
            _ => warn!("Remote sync failed: {}", e),
        }
        return;
    };
    warn!("Rejected play action: {}", e);
    if let Err(send_err) = presenter.send(&reply).await {
        error!("Failed to send error message: {}", send_err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sage_core::ports::PortError;

    #[test]
    fn sync_failures_are_not_echoed() {
        assert_eq!(error_reply(&PlayError::NoActiveGame), None);
        assert_eq!(error_reply(&PlayError::NoCards), None);
        assert_eq!(
            error_reply(&PlayError::StoreWriteFailure(PortError::Unavailable(
                "offline".to_string()
            ))),
            None
        );
        assert_eq!(error_reply(&PlayError::GameIdExhausted(8)), None);
    }

    #[test]
    fn protocol_misuse_gets_an_error_message() {
        assert_eq!(
            error_reply(&PlayError::PageOutOfRange { page: 7, count: 3 }),
            Some(ServerMessage::Error {
                message: "Page 7 is out of range for 3 cards".to_string()
            })
        );
        assert!(matches!(
            error_reply(&PlayError::SessionEnded),
            Some(ServerMessage::Error { .. })
        ));
    }
}
