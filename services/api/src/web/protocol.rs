//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API
//! server for the play and join views.

use sage_core::domain::{Card, CardState};
use sage_core::play::PlaySession;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send on the play socket.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Loads and shuffles a deck. This must be the first message sent on the connection.
    Init { deck_id: Uuid },

    /// Turns to another page of the shuffled deck.
    SetPage { page: usize },

    /// Marks the card on `page` as answered.
    CompleteCard { page: usize },

    /// Picks an emoji reaction for the card on `page`.
    SetEmoji { page: usize, emoji: String },

    /// Replaces the hints shown for the card on `page`.
    SelectHints { page: usize, hints: Vec<String> },

    /// Starts hosting a multiplayer game, or shows the invite again.
    ShowGameId,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// One card as the play view shows it.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CardView {
    pub card: Card,
    pub is_complete: bool,
    pub selected_hints: Vec<String>,
    pub card_points: u32,
    pub emoji: Option<String>,
}

impl From<&CardState> for CardView {
    fn from(state: &CardState) -> Self {
        Self {
            card: state.play_card.clone(),
            is_complete: state.is_complete,
            selected_hints: state.selected_card_hints.clone(),
            card_points: state.card_points,
            emoji: state.emoji.clone(),
        }
    }
}

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the deck was loaded and shuffled.
    SessionInitialized { deck_id: Uuid, card_count: usize },

    /// The play view after a change.
    State {
        page: usize,
        page_count: usize,
        points: u32,
        multiplayer: bool,
        game_id: Option<String>,
        card: Option<CardView>,
    },

    /// A transient message for a snackbar.
    Notification { message: String, duration_ms: u64 },

    /// The invite dialog contents for a hosted game.
    GameInvite {
        game_id: String,
        game_url: String,
        share_title: String,
    },

    /// The latest record of a joined game.
    GameUpdated { game_id: String, record: Value },

    /// The host ended the game or disconnected.
    GameEnded { game_id: String },

    /// Reports an error to the client, which should display an error message.
    Error { message: String },
}

impl ServerMessage {
    pub fn state_of(session: &PlaySession) -> Self {
        ServerMessage::State {
            page: session.page_number(),
            page_count: session.page_count(),
            points: session.points(),
            multiplayer: session.is_multiplayer(),
            game_id: session.game_id().map(|id| id.to_string()),
            card: session.current_card().map(CardView::from),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
