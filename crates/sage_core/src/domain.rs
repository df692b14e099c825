//! crates/sage_core/src/domain.rs
//!
//! Defines the core data structures for the game: decks, cards, the per-card
//! play state and the shared game record written for multiplayer sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a single card within the deck repository.
pub type CardId = Uuid;

/// Identifier of a deck.
pub type DeckId = Uuid;

/// Root under which every shared game record lives.
pub const GAMES_ROOT: &str = "games";

/// Number of digits in a shareable game code.
pub const GAME_ID_DIGITS: u32 = 6;

//=========================================================================================
// Decks and Cards
//=========================================================================================

/// A named, ordered collection of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// An immutable vocabulary-learning unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub word: String,
    pub synonym: Vec<String>,
    pub antonym: Vec<String>,
    pub general_sense: String,
    pub example_usage: String,
    pub points: u32,
}

//=========================================================================================
// Play State
//=========================================================================================

/// The mutable play state of one card during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardState {
    pub play_card: Card,
    pub is_complete: bool,
    pub selected_card_hints: Vec<String>,
    pub card_points: u32,
    pub emoji: Option<String>,
}

impl CardState {
    pub fn new(card: Card) -> Self {
        let card_points = card.points;
        Self {
            play_card: card,
            is_complete: false,
            selected_card_hints: Vec::new(),
            card_points,
            emoji: None,
        }
    }

    /// Latches the card as complete. Calling it again has no effect.
    pub fn mark_done(&mut self) {
        self.is_complete = true;
    }

    /// Replaces the selected hints. Completed cards keep their cleared list.
    pub fn select_hints(&mut self, hints: Vec<String>) -> bool {
        if self.is_complete {
            return false;
        }
        self.selected_card_hints = hints;
        true
    }
}

impl From<Card> for CardState {
    fn from(card: Card) -> Self {
        Self::new(card)
    }
}

//=========================================================================================
// Multiplayer
//=========================================================================================

/// A human-shareable numeric session code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wraps an existing code, e.g. one typed in by a joining player.
    /// Only non-empty all-digit strings are accepted.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the shared record for this game.
    pub fn record_path(&self) -> String {
        format!("{}/{}", GAMES_ROOT, self.0)
    }

    /// The URL other players open to join this game.
    pub fn join_url(&self, origin: &str) -> String {
        format!("{}/joingame?id={}", origin.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The shared document mirrored to every participant of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub card: Card,
    pub points: u32,
    #[serde(rename = "selectedHints")]
    pub selected_hints: Vec<String>,
    pub emoji: Option<String>,
}

impl GameRecord {
    pub fn snapshot(state: &CardState, points: u32) -> Self {
        Self {
            card: state.play_card.clone(),
            points,
            selected_hints: state.selected_card_hints.clone(),
            emoji: state.emoji.clone(),
        }
    }
}

/// Data handed to the invite presenter once a game is hosted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameInvite {
    pub game_id: GameId,
    pub game_url: String,
    pub share_title: String,
}

impl GameInvite {
    pub const SHARE_TITLE: &'static str = "Invite to SAGE game";

    pub fn new(game_id: GameId, game_url: String) -> Self {
        Self {
            game_id,
            game_url,
            share_title: Self::SHARE_TITLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(points: u32) -> Card {
        Card {
            id: Uuid::new_v4(),
            word: "laconic".to_string(),
            synonym: vec!["terse".to_string()],
            antonym: vec!["verbose".to_string()],
            general_sense: "using few words".to_string(),
            example_usage: "a laconic reply".to_string(),
            points,
        }
    }

    #[test]
    fn card_state_copies_points_and_starts_open() {
        let state = CardState::new(card(4));
        assert_eq!(state.card_points, 4);
        assert!(!state.is_complete);
        assert!(state.selected_card_hints.is_empty());
        assert!(state.emoji.is_none());
    }

    #[test]
    fn mark_done_is_a_latch() {
        let mut state = CardState::new(card(1));
        state.mark_done();
        state.mark_done();
        assert!(state.is_complete);
        assert!(!state.select_hints(vec!["synonym".to_string()]));
        assert!(state.selected_card_hints.is_empty());
    }

    #[test]
    fn game_id_paths_and_urls() {
        let id = GameId::parse(" 123456 ").unwrap();
        assert_eq!(id.as_str(), "123456");
        assert_eq!(id.record_path(), "games/123456");
        assert_eq!(
            id.join_url("https://sage.example/"),
            "https://sage.example/joingame?id=123456"
        );
        assert!(GameId::parse("12a4").is_none());
        assert_eq!(GameId::parse(" 654321 ").unwrap().as_str(), "654321");
    }

    #[test]
    fn game_record_uses_wire_field_names() {
        let mut state = CardState::new(card(2));
        state.emoji = Some("🔥".to_string());
        state.selected_card_hints = vec!["antonym".to_string()];
        let value = serde_json::to_value(GameRecord::snapshot(&state, 7)).unwrap();
        assert_eq!(value["points"], 7);
        assert_eq!(value["selectedHints"][0], "antonym");
        assert_eq!(value["emoji"], "🔥");
        assert_eq!(value["card"]["general_sense"], "using few words");
    }
}
