//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every handler.

use crate::adapters::RealtimeStore;
use crate::config::Config;
use sage_core::ports::DeckService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub decks: Arc<dyn DeckService>,
    pub store: Arc<RealtimeStore>,
    pub config: Arc<Config>,
}
