//! crates/sage_core/src/ports.rs
//!
//! Defines the service contracts (traits) the play core depends on.
//! These traits form the boundary of the hexagonal architecture, so the core
//! never talks to a database, a realtime store or a UI toolkit directly.

use crate::domain::{Card, CardId, Deck, DeckId, GameInvite};
use async_trait::async_trait;
use serde_json::{Map, Value};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Card content that passed the editor's checks: trimmed, no blank list
/// entries, and a non-empty word. Only built from a `CardDraft`, so a deck
/// store never sees raw form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub(crate) word: String,
    pub(crate) synonym: Vec<String>,
    pub(crate) antonym: Vec<String>,
    pub(crate) general_sense: String,
    pub(crate) example_usage: String,
}

impl CardFields {
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn synonym(&self) -> &[String] {
        &self.synonym
    }

    pub fn antonym(&self) -> &[String] {
        &self.antonym
    }

    pub fn general_sense(&self) -> &str {
        &self.general_sense
    }

    pub fn example_usage(&self) -> &str {
        &self.example_usage
    }
}

#[async_trait]
pub trait DeckService: Send + Sync {
    /// Fetches the playable cards of a deck once. Later changes to the deck
    /// are not observed by the caller.
    async fn get_deck_play_cards(&self, deck_id: DeckId) -> PortResult<Vec<Card>>;

    async fn create_deck(&self, name: &str) -> PortResult<Deck>;

    async fn add_new_card(&self, deck_id: DeckId, fields: &CardFields) -> PortResult<Card>;

    async fn edit_card(
        &self,
        deck_id: DeckId,
        card_id: CardId,
        fields: &CardFields,
    ) -> PortResult<Card>;
}

/// A path-addressed document store shared between players.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, path: &str) -> PortResult<Option<Value>>;

    /// Overwrites the whole document at `path`.
    async fn set(&self, path: &str, document: Value) -> PortResult<()>;

    /// Merges `fields` into the document at `path`.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> PortResult<()>;

    async fn remove(&self, path: &str) -> PortResult<()>;

    /// Registers a store-side trigger that removes `path` when this client disconnects.
    async fn on_disconnect_remove(&self, path: &str) -> PortResult<()>;
}

/// How long transient notifications stay on screen.
pub const NOTIFICATION_DURATION_MS: u64 = 2000;

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Shows a transient message. Delivery failures are the presenter's concern.
    async fn show(&self, message: &str, duration_ms: u64);
}

#[async_trait]
pub trait InvitePresenter: Send + Sync {
    /// Presents the game code and join link to the hosting player.
    async fn present_invite(&self, invite: &GameInvite);
}
