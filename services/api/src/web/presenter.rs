//! services/api/src/web/presenter.rs
//!
//! Presents notifications and game invites over a client's WebSocket. This is the
//! socket-side implementation of the `NotificationService` and `InvitePresenter`
//! ports.

use crate::error::ApiError;
use crate::web::protocol::ServerMessage;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::{stream::SplitSink, SinkExt};
use sage_core::domain::GameInvite;
use sage_core::ports::{InvitePresenter, NotificationService};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

/// The write half of a socket, shared between the message loop and its tasks.
pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Serializes and sends one protocol message.
pub async fn send_message(ws_sender: &WsSender, msg: &ServerMessage) -> Result<(), ApiError> {
    let json = serde_json::to_string(msg)?;
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct WsPresenter {
    ws_sender: WsSender,
}

impl WsPresenter {
    pub fn new(ws_sender: WsSender) -> Self {
        Self { ws_sender }
    }

    pub async fn send(&self, msg: &ServerMessage) -> Result<(), ApiError> {
        send_message(&self.ws_sender, msg).await
    }

    async fn send_logged(&self, msg: ServerMessage) {
        if let Err(e) = self.send(&msg).await {
            error!("Failed to send {:?}: {}", msg, e);
        }
    }
}

#[async_trait]
impl NotificationService for WsPresenter {
    async fn show(&self, message: &str, duration_ms: u64) {
        self.send_logged(ServerMessage::Notification {
            message: message.to_string(),
            duration_ms,
        })
        .await;
    }
}

#[async_trait]
impl InvitePresenter for WsPresenter {
    async fn present_invite(&self, invite: &GameInvite) {
        self.send_logged(ServerMessage::GameInvite {
            game_id: invite.game_id.to_string(),
            game_url: invite.game_url.clone(),
            share_title: invite.share_title.clone(),
        })
        .await;
    }
}
