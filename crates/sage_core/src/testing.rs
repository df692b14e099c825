//! In-memory fakes of the ports, shared by the unit tests of this crate.

use crate::domain::{Card, CardId, Deck, DeckId, GameInvite};
use crate::ports::{
    CardFields, DeckService, InvitePresenter, NotificationService, PortError, PortResult,
    RecordStore,
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

pub fn card(word: &str, points: u32) -> Card {
    Card {
        id: Uuid::new_v4(),
        word: word.to_string(),
        synonym: vec![format!("{}-syn", word)],
        antonym: vec![format!("{}-ant", word)],
        general_sense: format!("sense of {}", word),
        example_usage: format!("use {} in a sentence", word),
        points,
    }
}

//=========================================================================================
// Deck Source
//=========================================================================================

#[derive(Default)]
pub struct FakeDecks {
    pub cards: Vec<Card>,
    pub fail: AtomicBool,
    pub fetches: AtomicUsize,
    pub saved: Mutex<Vec<(DeckId, Option<CardId>, CardFields)>>,
}

impl FakeDecks {
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards,
            ..Default::default()
        }
    }

    fn check(&self) -> PortResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("deck store offline".to_string()));
        }
        Ok(())
    }

    fn to_card(id: CardId, fields: &CardFields) -> Card {
        Card {
            id,
            word: fields.word().to_owned(),
            synonym: fields.synonym().to_vec(),
            antonym: fields.antonym().to_vec(),
            general_sense: fields.general_sense().to_owned(),
            example_usage: fields.example_usage().to_owned(),
            points: 1,
        }
    }
}

#[async_trait]
impl DeckService for FakeDecks {
    async fn get_deck_play_cards(&self, _deck_id: DeckId) -> PortResult<Vec<Card>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.cards.clone())
    }

    async fn create_deck(&self, name: &str) -> PortResult<Deck> {
        self.check()?;
        Ok(Deck {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn add_new_card(&self, deck_id: DeckId, fields: &CardFields) -> PortResult<Card> {
        self.check()?;
        self.saved
            .lock()
            .unwrap()
            .push((deck_id, None, fields.clone()));
        Ok(Self::to_card(Uuid::new_v4(), fields))
    }

    async fn edit_card(
        &self,
        deck_id: DeckId,
        card_id: CardId,
        fields: &CardFields,
    ) -> PortResult<Card> {
        self.check()?;
        self.saved
            .lock()
            .unwrap()
            .push((deck_id, Some(card_id), fields.clone()));
        Ok(Self::to_card(card_id, fields))
    }
}

//=========================================================================================
// Record Store
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Set(String),
    Update(String, Map<String, Value>),
    Remove(String),
    OnDisconnectRemove(String),
}

#[derive(Default)]
pub struct RecordingStore {
    pub docs: Mutex<HashMap<String, Value>>,
    pub calls: Mutex<Vec<StoreCall>>,
    pub fail_set: AtomicBool,
    pub fail_disconnect: AtomicBool,
    pub fail_get: AtomicBool,
    /// The next this-many reads report a record that some other game holds.
    pub taken_reads: AtomicUsize,
    pub reads: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::Set(_)))
            .count()
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn doc(&self, path: &str) -> Option<Value> {
        self.docs.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn get(&self, path: &str) -> PortResult<Option<Value>> {
        self.reads.lock().unwrap().push(path.to_string());
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("offline".to_string()));
        }
        let taken = self
            .taken_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if taken {
            return Ok(Some(serde_json::json!({ "points": 0 })));
        }
        Ok(self.doc(path))
    }

    async fn set(&self, path: &str, document: Value) -> PortResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Set(path.to_string()));
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("permission denied".to_string()));
        }
        self.docs.lock().unwrap().insert(path.to_string(), document);
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> PortResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Update(path.to_string(), fields.clone()));
        let mut docs = self.docs.lock().unwrap();
        let entry = docs
            .entry(path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(existing) = entry {
            existing.extend(fields);
        }
        Ok(())
    }

    async fn remove(&self, path: &str) -> PortResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Remove(path.to_string()));
        self.docs.lock().unwrap().remove(path);
        Ok(())
    }

    async fn on_disconnect_remove(&self, path: &str) -> PortResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::OnDisconnectRemove(path.to_string()));
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("offline".to_string()));
        }
        Ok(())
    }
}

//=========================================================================================
// Presenters
//=========================================================================================

#[derive(Default)]
pub struct CollectingPresenter {
    pub messages: Mutex<Vec<(String, u64)>>,
    pub invites: Mutex<Vec<GameInvite>>,
}

impl CollectingPresenter {
    pub fn messages(&self) -> Vec<(String, u64)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn invites(&self) -> Vec<GameInvite> {
        self.invites.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationService for CollectingPresenter {
    async fn show(&self, message: &str, duration_ms: u64) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), duration_ms));
    }
}

#[async_trait]
impl InvitePresenter for CollectingPresenter {
    async fn present_invite(&self, invite: &GameInvite) {
        self.invites.lock().unwrap().push(invite.clone());
    }
}
