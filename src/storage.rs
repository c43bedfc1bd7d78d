use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Difficulty, Flashcard, FlashcardSetRecord};

/// Persistence boundary for generated flashcard sets. Failures surface to
/// callers as a single generic storage error; there is no retry.
#[async_trait]
pub trait FlashcardStore: Send + Sync {
    async fn insert_set(&self, record: &FlashcardSetRecord) -> Result<()>;
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        let db = Database { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS flashcard_sets (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                source_text TEXT NOT NULL,
                topic TEXT,
                difficulty TEXT NOT NULL,
                cards TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch all sets saved by an owner, newest first.
    pub async fn sets_for_owner(&self, owner_id: &str) -> Result<Vec<FlashcardSetRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, source_text, topic, difficulty, cards, created_at
            FROM flashcard_sets
            WHERE owner_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut sets = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let difficulty: String = row.get("difficulty");
            let cards_json: String = row.get("cards");
            let created_at: String = row.get("created_at");

            let cards: Vec<Flashcard> = serde_json::from_str(&cards_json)?;
            let difficulty: Difficulty = serde_json::from_value(Value::String(difficulty))?;

            sets.push(FlashcardSetRecord {
                id: Uuid::parse_str(&id)?,
                owner_id: row.get("owner_id"),
                source_text: row.get("source_text"),
                topic: row.get("topic"),
                difficulty,
                cards,
                created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
            });
        }

        Ok(sets)
    }
}

#[async_trait]
impl FlashcardStore for Database {
    async fn insert_set(&self, record: &FlashcardSetRecord) -> Result<()> {
        let cards_json = serde_json::to_string(&record.cards)?;

        sqlx::query(
            r#"
            INSERT INTO flashcard_sets (id, owner_id, source_text, topic, difficulty, cards, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.owner_id)
        .bind(&record.source_text)
        .bind(&record.topic)
        .bind(record.difficulty.to_string())
        .bind(&cards_json)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
