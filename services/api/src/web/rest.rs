//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::adapters::ResponseNotifier;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use sage_core::domain::{Card, Deck, GameId};
use sage_core::editor::{CardDraft, CardEditor};
use sage_core::error::EditorError;
use sage_core::ports::PortError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_deck_handler,
        list_cards_handler,
        add_card_handler,
        edit_card_handler,
        get_game_handler,
    ),
    components(
        schemas(CreateDeckRequest, DeckResponse, CardPayload, CardResponse, SaveCardResponse, GameRecordResponse)
    ),
    tags(
        (name = "SAGE API", description = "Decks, cards and shared game records for the SAGE card game.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateDeckRequest {
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeckResponse {
    id: Uuid,
    name: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Deck> for DeckResponse {
    fn from(deck: Deck) -> Self {
        Self {
            id: deck.id,
            name: deck.name,
            created_at: deck.created_at,
        }
    }
}

/// The card form as submitted by the editor dialog.
#[derive(Deserialize, ToSchema)]
pub struct CardPayload {
    pub word: String,
    #[serde(default)]
    pub synonym: Vec<String>,
    #[serde(default)]
    pub antonym: Vec<String>,
    #[serde(default)]
    pub general_sense: String,
    #[serde(default)]
    pub example_usage: String,
}

impl From<CardPayload> for CardDraft {
    fn from(payload: CardPayload) -> Self {
        CardDraft {
            word: payload.word,
            synonym: payload.synonym,
            antonym: payload.antonym,
            general_sense: payload.general_sense,
            example_usage: payload.example_usage,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CardResponse {
    id: Uuid,
    word: String,
    synonym: Vec<String>,
    antonym: Vec<String>,
    general_sense: String,
    example_usage: String,
    points: u32,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            word: card.word,
            synonym: card.synonym,
            antonym: card.antonym,
            general_sense: card.general_sense,
            example_usage: card.example_usage,
            points: card.points,
        }
    }
}

/// The saved card together with the message the editor showed.
#[derive(Serialize, ToSchema)]
pub struct SaveCardResponse {
    card: CardResponse,
    message: String,
}

#[derive(Serialize, ToSchema)]
pub struct GameRecordResponse {
    game_id: String,
    /// `{ card, points, selectedHints, emoji }`
    #[schema(value_type = Object)]
    record: Value,
}

type HandlerError = (StatusCode, String);

fn port_status(e: &PortError) -> StatusCode {
    match e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new, empty deck.
#[utoipa::path(
    post,
    path = "/decks",
    request_body = CreateDeckRequest,
    responses(
        (status = 201, description = "Deck created", body = DeckResponse),
        (status = 400, description = "Missing deck name"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_deck_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateDeckRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Deck name is required".to_string()));
    }
    let deck = app_state.decks.create_deck(name).await.map_err(|e| {
        error!("Failed to create deck: {:?}", e);
        (port_status(&e), "Failed to create deck".to_string())
    })?;
    Ok((StatusCode::CREATED, Json(DeckResponse::from(deck))))
}

/// List the cards of a deck in creation order.
#[utoipa::path(
    get,
    path = "/decks/{deck_id}/cards",
    responses(
        (status = 200, description = "Cards of the deck", body = [CardResponse]),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("deck_id" = Uuid, Path, description = "The deck to list.")
    )
)]
pub async fn list_cards_handler(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let cards = app_state
        .decks
        .get_deck_play_cards(deck_id)
        .await
        .map_err(|e| {
            error!("Failed to list cards of deck {}: {:?}", deck_id, e);
            (port_status(&e), "Failed to list cards".to_string())
        })?;
    let cards: Vec<CardResponse> = cards.into_iter().map(CardResponse::from).collect();
    Ok(Json(cards))
}

/// Add a card to a deck.
#[utoipa::path(
    post,
    path = "/decks/{deck_id}/cards",
    request_body = CardPayload,
    responses(
        (status = 201, description = "Added card", body = SaveCardResponse),
        (status = 400, description = "The card has no word"),
        (status = 404, description = "Deck not found"),
        (status = 500, description = "Error adding card")
    ),
    params(
        ("deck_id" = Uuid, Path, description = "The deck to add to.")
    )
)]
pub async fn add_card_handler(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
    Json(payload): Json<CardPayload>,
) -> Result<impl IntoResponse, HandlerError> {
    save_card(&app_state, deck_id, None, payload.into())
        .await
        .map(|saved| (StatusCode::CREATED, Json(saved)))
}

/// Edit an existing card of a deck.
#[utoipa::path(
    put,
    path = "/decks/{deck_id}/cards/{card_id}",
    request_body = CardPayload,
    responses(
        (status = 200, description = "Edited card", body = SaveCardResponse),
        (status = 400, description = "The card has no word"),
        (status = 404, description = "Card not found in deck"),
        (status = 500, description = "Error editing card")
    ),
    params(
        ("deck_id" = Uuid, Path, description = "The deck holding the card."),
        ("card_id" = Uuid, Path, description = "The card to edit.")
    )
)]
pub async fn edit_card_handler(
    State(app_state): State<Arc<AppState>>,
    Path((deck_id, card_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CardPayload>,
) -> Result<impl IntoResponse, HandlerError> {
    save_card(&app_state, deck_id, Some(card_id), payload.into())
        .await
        .map(Json)
}

async fn save_card(
    app_state: &AppState,
    deck_id: Uuid,
    editing: Option<Uuid>,
    draft: CardDraft,
) -> Result<SaveCardResponse, HandlerError> {
    let notifier = Arc::new(ResponseNotifier::new());
    let editor = CardEditor::new(app_state.decks.clone(), notifier.clone());
    let result = editor.submit(deck_id, editing, draft).await;
    let message = notifier.last().await.unwrap_or_default();

    match result {
        Ok(card) => Ok(SaveCardResponse {
            card: card.into(),
            message,
        }),
        Err(EditorError::MissingWord) => Err((StatusCode::BAD_REQUEST, message)),
        Err(EditorError::Port(e)) => Err((port_status(&e), message)),
    }
}

/// Read the current record of a hosted game.
#[utoipa::path(
    get,
    path = "/games/{game_id}",
    responses(
        (status = 200, description = "The game's shared record", body = GameRecordResponse),
        (status = 404, description = "Game does not exist")
    ),
    params(
        ("game_id" = String, Path, description = "The six-digit game code.")
    )
)]
pub async fn get_game_handler(
    State(app_state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let not_found = || (StatusCode::NOT_FOUND, "Game does not exist".to_string());
    let game_id = GameId::parse(&game_id).ok_or_else(not_found)?;
    let record = app_state
        .store
        .read(&game_id.record_path())
        .await
        .ok_or_else(not_found)?;
    Ok(Json(GameRecordResponse {
        game_id: game_id.to_string(),
        record,
    }))
}
