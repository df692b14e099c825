//! crates/sage_core/src/error.rs
//!
//! Error types for the play session and the card editor.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    #[error("no cards")]
    NoCards,

    #[error("Game does not exist")]
    NoActiveGame,

    /// The record store rejected a write, update or removal.
    #[error("Store write failed: {0}")]
    StoreWriteFailure(#[source] PortError),

    #[error("Store read failed: {0}")]
    StoreReadFailure(#[source] PortError),

    /// Every generated game ID was already taken by a live game.
    #[error("No free game ID after {0} attempts")]
    GameIdExhausted(usize),

    #[error("Deck could not be loaded: {0}")]
    DeckUnavailable(#[source] PortError),

    #[error("Page {page} is out of range for {count} cards")]
    PageOutOfRange { page: usize, count: usize },

    #[error("Cannot produce a code with {0} digits")]
    InvalidDigitCount(u32),

    #[error("The play session has ended")]
    SessionEnded,

    #[error("Failed to encode game record: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type PlayResult<T> = Result<T, PlayError>;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("A card needs a word")]
    MissingWord,

    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),
}
