//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DeckService` port from the `core` crate. It stores decks and their
//! cards in PostgreSQL using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sage_core::domain::{Card, CardId, Deck, DeckId};
use sage_core::ports::{CardFields, DeckService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Postgres error code for a violated foreign key (an unknown deck).
const FOREIGN_KEY_VIOLATION: &str = "23503";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DeckService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct DeckRecord {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}
impl DeckRecord {
    fn to_domain(self) -> Deck {
        Deck {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CardRecord {
    id: Uuid,
    word: String,
    synonym: Vec<String>,
    antonym: Vec<String>,
    general_sense: String,
    example_usage: String,
    points: i32,
}
impl CardRecord {
    fn to_domain(self) -> Card {
        Card {
            id: self.id,
            word: self.word,
            synonym: self.synonym,
            antonym: self.antonym,
            general_sense: self.general_sense,
            example_usage: self.example_usage,
            points: self.points.max(0) as u32,
        }
    }
}

const CARD_COLUMNS: &str = "id, word, synonym, antonym, general_sense, example_usage, points";

fn map_db_error(e: sqlx::Error, missing: impl FnOnce() -> String) -> PortError {
    match &e {
        sqlx::Error::RowNotFound => PortError::NotFound(missing()),
        sqlx::Error::Database(db)
            if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
        {
            PortError::NotFound(missing())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            PortError::Unavailable(e.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `DeckService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DeckService for DbAdapter {
    async fn get_deck_play_cards(&self, deck_id: DeckId) -> PortResult<Vec<Card>> {
        let records = sqlx::query_as::<_, CardRecord>(&format!(
            "SELECT {} FROM cards WHERE deck_id = $1 ORDER BY created_at ASC",
            CARD_COLUMNS
        ))
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("Deck {} not found", deck_id)))?;

        let cards = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(cards)
    }

    async fn create_deck(&self, name: &str) -> PortResult<Deck> {
        let record = sqlx::query_as::<_, DeckRecord>(
            "INSERT INTO decks (id, name) VALUES ($1, $2) RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn add_new_card(&self, deck_id: DeckId, fields: &CardFields) -> PortResult<Card> {
        let record = sqlx::query_as::<_, CardRecord>(&format!(
            "INSERT INTO cards (id, deck_id, word, synonym, antonym, general_sense, example_usage) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            CARD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(deck_id)
        .bind(fields.word())
        .bind(fields.synonym())
        .bind(fields.antonym())
        .bind(fields.general_sense())
        .bind(fields.example_usage())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("Deck {} not found", deck_id)))?;
        Ok(record.to_domain())
    }

    async fn edit_card(
        &self,
        deck_id: DeckId,
        card_id: CardId,
        fields: &CardFields,
    ) -> PortResult<Card> {
        let record = sqlx::query_as::<_, CardRecord>(&format!(
            "UPDATE cards SET word = $1, synonym = $2, antonym = $3, general_sense = $4, \
             example_usage = $5 WHERE id = $6 AND deck_id = $7 RETURNING {}",
            CARD_COLUMNS
        ))
        .bind(fields.word())
        .bind(fields.synonym())
        .bind(fields.antonym())
        .bind(fields.general_sense())
        .bind(fields.example_usage())
        .bind(card_id)
        .bind(deck_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_db_error(e, || format!("Card {} not found in deck {}", card_id, deck_id))
        })?;
        Ok(record.to_domain())
    }
}
