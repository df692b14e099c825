//! crates/sage_core/src/play.rs
//!
//! The play session: a shuffled run through one deck, the running score and,
//! once a player hosts a game, the shared record other players follow.
//!
//! Store writes happen in the order the session issues them, but nothing orders
//! them across clients; the store may apply a page change and a following emoji
//! pick out of order.

use crate::domain::{CardState, DeckId, GameId, GameInvite, GameRecord};
use crate::error::{PlayError, PlayResult};
use crate::ports::{
    DeckService, InvitePresenter, NotificationService, RecordStore, NOTIFICATION_DURATION_MS,
};
use crate::random::shuffle_in_place;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown to the host when a game could not be opened.
pub const HOSTING_FAILED_MESSAGE: &str = "Error starting game";

/// How many IDs `start_hosting` draws before giving up on finding a free one.
pub const GAME_ID_ATTEMPTS: usize = 8;

/// The collaborators a session talks to.
#[derive(Clone)]
pub struct PlayPorts {
    pub decks: Arc<dyn DeckService>,
    pub store: Arc<dyn RecordStore>,
    pub notifier: Arc<dyn NotificationService>,
    pub invites: Arc<dyn InvitePresenter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Ready,
    Hosting,
    Ended,
}

/// What completing a card led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Advanced { page: usize },
    Finished,
    AlreadyComplete,
}

pub struct PlaySession {
    ports: PlayPorts,
    origin: String,
    rng: StdRng,
    deck_id: Option<DeckId>,
    card_states: Vec<CardState>,
    page_number: usize,
    points: u32,
    multiplayer: bool,
    game_id: Option<GameId>,
    game_url: Option<String>,
    ended: bool,
}

impl PlaySession {
    /// Creates a session whose join links are rooted at `origin`.
    pub fn new(ports: PlayPorts, origin: impl Into<String>) -> Self {
        Self::with_seed(ports, origin, None)
    }

    /// Like [`PlaySession::new`], with a fixed seed for reproducible shuffles and codes.
    pub fn with_seed(ports: PlayPorts, origin: impl Into<String>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            ports,
            origin: origin.into(),
            rng,
            deck_id: None,
            card_states: Vec::new(),
            page_number: 0,
            points: 0,
            multiplayer: false,
            game_id: None,
            game_url: None,
            ended: false,
        }
    }

    //=====================================================================================
    // Accessors
    //=====================================================================================

    pub fn phase(&self) -> SessionPhase {
        if self.ended {
            SessionPhase::Ended
        } else if self.deck_id.is_none() {
            SessionPhase::Loading
        } else if self.multiplayer {
            SessionPhase::Hosting
        } else {
            SessionPhase::Ready
        }
    }

    pub fn deck_id(&self) -> Option<DeckId> {
        self.deck_id
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_count(&self) -> usize {
        self.card_states.len()
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn is_multiplayer(&self) -> bool {
        self.multiplayer
    }

    pub fn game_id(&self) -> Option<&GameId> {
        self.game_id.as_ref()
    }

    pub fn game_url(&self) -> Option<&str> {
        self.game_url.as_deref()
    }

    pub fn card_states(&self) -> &[CardState] {
        &self.card_states
    }

    pub fn current_card(&self) -> Option<&CardState> {
        self.card_states.get(self.page_number)
    }

    //=====================================================================================
    // Operations
    //=====================================================================================

    /// Loads the deck once and shuffles it. An empty deck leaves nothing to play.
    pub async fn initialize(&mut self, deck_id: DeckId) -> PlayResult<()> {
        self.ensure_active()?;
        let cards = self
            .ports
            .decks
            .get_deck_play_cards(deck_id)
            .await
            .map_err(PlayError::DeckUnavailable)?;

        let mut states: Vec<CardState> = cards.into_iter().map(CardState::from).collect();
        shuffle_in_place(&mut self.rng, &mut states);
        if states.is_empty() {
            warn!("Deck {} has no cards to play.", deck_id);
        }
        info!("Loaded {} cards from deck {}", states.len(), deck_id);

        self.deck_id = Some(deck_id);
        self.card_states = states;
        self.page_number = 0;
        Ok(())
    }

    /// Moves to `page`, pushing the new current card when hosting.
    pub async fn set_page(&mut self, page: usize) -> PlayResult<()> {
        self.ensure_active()?;
        self.check_page(page)?;
        if page == self.page_number {
            return Ok(());
        }
        self.page_number = page;
        if self.multiplayer {
            self.sync_remote().await?;
        }
        Ok(())
    }

    /// Scores the card on `page` once, then advances or, on the last page,
    /// pushes the final state.
    pub async fn advance_or_finish(&mut self, page: usize) -> PlayResult<Progress> {
        self.ensure_active()?;
        let count = self.card_states.len();
        let state = self
            .card_states
            .get_mut(page)
            .ok_or(PlayError::PageOutOfRange { page, count })?;
        if state.is_complete {
            return Ok(Progress::AlreadyComplete);
        }

        self.points = self.points.saturating_add(state.card_points);
        state.selected_card_hints.clear();
        state.mark_done();
        debug!("Card on page {} complete, points now {}", page, self.points);

        if page + 1 < count {
            self.set_page(page + 1).await?;
            Ok(Progress::Advanced { page: page + 1 })
        } else {
            self.sync_remote().await?;
            Ok(Progress::Finished)
        }
    }

    /// Sets the emoji of a card. The emoji is merged into the game record
    /// whenever a game code exists, whether or not hosting succeeded.
    pub async fn set_emoji(&mut self, emoji: impl Into<String>, page: usize) -> PlayResult<()> {
        self.ensure_active()?;
        self.check_page(page)?;
        let emoji = emoji.into();
        self.card_states[page].emoji = Some(emoji.clone());

        if let Some(game_id) = &self.game_id {
            let mut fields = Map::new();
            fields.insert("emoji".to_string(), Value::String(emoji));
            self.ports
                .store
                .update(&game_id.record_path(), fields)
                .await
                .map_err(PlayError::StoreWriteFailure)?;
        }
        Ok(())
    }

    /// Replaces the hints picked on a card.
    pub async fn select_hints(&mut self, page: usize, hints: Vec<String>) -> PlayResult<()> {
        self.ensure_active()?;
        self.check_page(page)?;
        let changed = self.card_states[page].select_hints(hints);
        if changed && self.multiplayer && page == self.page_number {
            self.sync_remote().await?;
        }
        Ok(())
    }

    /// Overwrites the game record with the current card, points, hints and emoji.
    pub async fn sync_remote(&self) -> PlayResult<()> {
        self.ensure_active()?;
        let state = self.card_states.get(self.page_number).ok_or(PlayError::NoCards)?;
        let game_id = self.game_id.as_ref().ok_or(PlayError::NoActiveGame)?;

        let record = serde_json::to_value(GameRecord::snapshot(state, self.points))?;
        self.ports
            .store
            .set(&game_id.record_path(), record)
            .await
            .map_err(PlayError::StoreWriteFailure)
    }

    /// Opens the game for other players, or shows the invite again when already hosting.
    pub async fn start_hosting(&mut self) -> PlayResult<()> {
        self.ensure_active()?;
        if self.multiplayer {
            self.present_invite().await;
            return Ok(());
        }

        match self.claim_and_open().await {
            Ok(game_id) => {
                self.multiplayer = true;
                info!("Hosting game {}", game_id);
                self.present_invite().await;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to start game: {}", e);
                self.ports
                    .notifier
                    .show(HOSTING_FAILED_MESSAGE, NOTIFICATION_DURATION_MS)
                    .await;
                Err(e)
            }
        }
    }

    /// Ends the session, removing the game record if a code was ever assigned.
    pub async fn teardown(&mut self) -> PlayResult<()> {
        if self.ended {
            return Ok(());
        }
        self.ended = true;
        if let Some(game_id) = &self.game_id {
            info!("Removing game record {}", game_id);
            self.ports
                .store
                .remove(&game_id.record_path())
                .await
                .map_err(PlayError::StoreWriteFailure)?;
        }
        Ok(())
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    /// Picks an unused game ID, assigns it, and opens its record.
    async fn claim_and_open(&mut self) -> PlayResult<GameId> {
        let game_id = self.free_game_id().await?;
        self.game_id = Some(game_id.clone());
        self.game_url = Some(game_id.join_url(&self.origin));
        self.open_game(&game_id).await?;
        Ok(game_id)
    }

    /// The store is shared by every live game, so a fresh ID must not already hold a record.
    async fn free_game_id(&mut self) -> PlayResult<GameId> {
        for _ in 0..GAME_ID_ATTEMPTS {
            let game_id = GameId::generate(&mut self.rng)?;
            let existing = self
                .ports
                .store
                .get(&game_id.record_path())
                .await
                .map_err(PlayError::StoreReadFailure)?;
            if existing.is_none() {
                return Ok(game_id);
            }
            debug!("Game ID {} is taken, drawing another", game_id);
        }
        Err(PlayError::GameIdExhausted(GAME_ID_ATTEMPTS))
    }

    async fn open_game(&self, game_id: &GameId) -> PlayResult<()> {
        self.ports
            .store
            .on_disconnect_remove(&game_id.record_path())
            .await
            .map_err(PlayError::StoreWriteFailure)?;
        self.sync_remote().await
    }

    async fn present_invite(&self) {
        if let (Some(game_id), Some(game_url)) = (&self.game_id, &self.game_url) {
            let invite = GameInvite::new(game_id.clone(), game_url.clone());
            self.ports.invites.present_invite(&invite).await;
        }
    }

    fn ensure_active(&self) -> PlayResult<()> {
        if self.ended {
            return Err(PlayError::SessionEnded);
        }
        Ok(())
    }

    fn check_page(&self, page: usize) -> PlayResult<()> {
        let count = self.card_states.len();
        if page >= count {
            return Err(PlayError::PageOutOfRange { page, count });
        }
        Ok(())
    }
}
