//! crates/sage_core/src/editor.rs
//!
//! Creating and editing deck entries from the card form.

use crate::domain::{Card, CardId, DeckId};
use crate::error::EditorError;
use crate::ports::{CardFields, DeckService, NotificationService, NOTIFICATION_DURATION_MS};
use std::sync::Arc;
use tracing::{error, info};

/// The values typed into the card form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDraft {
    pub word: String,
    pub synonym: Vec<String>,
    pub antonym: Vec<String>,
    pub general_sense: String,
    pub example_usage: String,
}

impl CardDraft {
    pub fn blank() -> Self {
        Self::default()
    }

    /// Prefills the form for editing an existing card.
    pub fn from_card(card: &Card) -> Self {
        Self {
            word: card.word.clone(),
            synonym: card.synonym.clone(),
            antonym: card.antonym.clone(),
            general_sense: card.general_sense.clone(),
            example_usage: card.example_usage.clone(),
        }
    }

}

impl TryFrom<CardDraft> for CardFields {
    type Error = EditorError;

    fn try_from(draft: CardDraft) -> Result<Self, Self::Error> {
        let word = draft.word.trim().to_string();
        if word.is_empty() {
            return Err(EditorError::MissingWord);
        }
        Ok(CardFields {
            word,
            synonym: clean_list(draft.synonym),
            antonym: clean_list(draft.antonym),
            general_sense: draft.general_sense.trim().to_string(),
            example_usage: draft.example_usage.trim().to_string(),
        })
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditMode {
    Adding,
    Editing,
}

impl EditMode {
    fn success(self) -> &'static str {
        match self {
            EditMode::Adding => "Added card",
            EditMode::Editing => "Edited card",
        }
    }

    fn failure(self) -> &'static str {
        match self {
            EditMode::Adding => "Error adding card",
            EditMode::Editing => "Error editing card",
        }
    }
}

/// Saves card drafts and tells the user how it went.
#[derive(Clone)]
pub struct CardEditor {
    decks: Arc<dyn DeckService>,
    notifier: Arc<dyn NotificationService>,
}

impl CardEditor {
    pub fn new(decks: Arc<dyn DeckService>, notifier: Arc<dyn NotificationService>) -> Self {
        Self { decks, notifier }
    }

    /// Adds a new card, or edits `editing` when it is given.
    pub async fn submit(
        &self,
        deck_id: DeckId,
        editing: Option<CardId>,
        draft: CardDraft,
    ) -> Result<Card, EditorError> {
        let mode = if editing.is_some() {
            EditMode::Editing
        } else {
            EditMode::Adding
        };

        let result = match CardFields::try_from(draft) {
            Ok(fields) => {
                let saved = match editing {
                    Some(card_id) => self.decks.edit_card(deck_id, card_id, &fields).await,
                    None => self.decks.add_new_card(deck_id, &fields).await,
                };
                saved.map_err(EditorError::from)
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(card) => {
                info!("{} '{}' in deck {}", mode.success(), card.word, deck_id);
                self.notifier
                    .show(mode.success(), NOTIFICATION_DURATION_MS)
                    .await;
            }
            Err(e) => {
                error!("{} in deck {}: {:?}", mode.failure(), deck_id, e);
                self.notifier
                    .show(mode.failure(), NOTIFICATION_DURATION_MS)
                    .await;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{card, CollectingPresenter, FakeDecks};
    use std::sync::atomic::Ordering;
    use uuid::Uuid;

    fn editor() -> (CardEditor, Arc<FakeDecks>, Arc<CollectingPresenter>) {
        let decks = Arc::new(FakeDecks::default());
        let presenter = Arc::new(CollectingPresenter::default());
        (
            CardEditor::new(decks.clone(), presenter.clone()),
            decks,
            presenter,
        )
    }

    fn draft(word: &str) -> CardDraft {
        CardDraft {
            word: word.to_string(),
            synonym: vec![" brief ".to_string(), "".to_string()],
            antonym: vec!["wordy".to_string()],
            general_sense: " short ".to_string(),
            example_usage: "a terse note".to_string(),
        }
    }

    #[test]
    fn drafts_are_normalized_into_fields() {
        let fields = CardFields::try_from(draft("  terse ")).unwrap();
        assert_eq!(fields.word(), "terse");
        assert_eq!(fields.synonym().to_vec(), vec!["brief"]);
        assert_eq!(fields.antonym().to_vec(), vec!["wordy"]);
        assert_eq!(fields.general_sense(), "short");

        let blank = CardDraft {
            word: "   ".to_string(),
            ..draft("x")
        };
        assert!(matches!(
            CardFields::try_from(blank),
            Err(EditorError::MissingWord)
        ));
    }

    #[tokio::test]
    async fn adding_a_card_notifies_success() {
        let (editor, decks, presenter) = editor();
        let deck_id = Uuid::new_v4();
        let saved = editor.submit(deck_id, None, draft("terse")).await.unwrap();

        assert_eq!(saved.word, "terse");
        assert_eq!(saved.synonym, vec!["brief"]);
        assert_eq!(saved.general_sense, "short");
        let calls = decks.saved.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, deck_id);
        assert_eq!(calls[0].1, None);
        assert_eq!(
            presenter.messages(),
            vec![("Added card".to_string(), NOTIFICATION_DURATION_MS)]
        );
    }

    #[tokio::test]
    async fn editing_keeps_the_card_id() {
        let (editor, decks, presenter) = editor();
        let existing = card("verbose", 2);
        let mut form = CardDraft::from_card(&existing);
        form.example_usage = "a verbose speech".to_string();

        let saved = editor
            .submit(Uuid::new_v4(), Some(existing.id), form)
            .await
            .unwrap();
        assert_eq!(saved.id, existing.id);
        assert_eq!(saved.example_usage, "a verbose speech");
        assert_eq!(decks.saved.lock().unwrap()[0].1, Some(existing.id));
        assert_eq!(presenter.messages()[0].0, "Edited card");
    }

    #[tokio::test]
    async fn store_failures_are_reported_per_mode() {
        let (editor, decks, presenter) = editor();
        decks.fail.store(true, Ordering::SeqCst);

        assert!(editor.submit(Uuid::new_v4(), None, draft("a")).await.is_err());
        assert!(editor
            .submit(Uuid::new_v4(), Some(Uuid::new_v4()), draft("b"))
            .await
            .is_err());
        let messages: Vec<String> = presenter.messages().into_iter().map(|m| m.0).collect();
        assert_eq!(messages, vec!["Error adding card", "Error editing card"]);
    }

    #[tokio::test]
    async fn blank_word_never_reaches_the_deck() {
        let (editor, decks, presenter) = editor();
        let err = editor
            .submit(Uuid::new_v4(), None, CardDraft::blank())
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::MissingWord));
        assert!(decks.saved.lock().unwrap().is_empty());
        assert_eq!(presenter.messages()[0].0, "Error adding card");
    }
}
