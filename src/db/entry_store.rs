use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

use crate::models::FoodEntry;

/// Persistence failure surfaced to the caller of a store mutation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable keyed collection of food entries with a live snapshot query.
///
/// Mutations are serialized behind `write_lock`: each insert/delete is
/// durable and the refreshed snapshot published before the next mutation is
/// accepted. Subscribers therefore only ever see fully-formed snapshots,
/// ordered by `logged_at` descending with ties broken by insertion order.
pub struct EntryStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
    snapshots: watch::Sender<Vec<FoodEntry>>,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: i64,
    name: String,
    calories: i64,
    protein: i64,
    logged_at: i64,
}

impl From<EntryRow> for FoodEntry {
    fn from(row: EntryRow) -> Self {
        FoodEntry {
            id: row.id,
            name: row.name,
            calories: row.calories,
            protein: row.protein,
            logged_at: DateTime::from_timestamp_millis(row.logged_at)
                .unwrap_or_else(Utc::now),
        }
    }
}

impl EntryStore {
    /// Opens the store over an initialized pool and loads the current
    /// snapshot so subscribers see it immediately.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        let initial = load_snapshot(&pool).await?;
        let (snapshots, _) = watch::channel(initial);
        Ok(Self {
            pool,
            write_lock: Mutex::new(()),
            snapshots,
        })
    }

    /// Upserts by id. An id of 0 lets sqlite assign the next rowid; an
    /// existing id replaces that row in place. Returns the stored entry
    /// with its assigned id.
    pub async fn insert(&self, entry: &FoodEntry) -> Result<FoodEntry, StoreError> {
        let _guard = self.write_lock.lock().await;
        let logged_at = entry.logged_at.timestamp_millis();

        let id = if entry.id == 0 {
            let result = sqlx::query(
                "INSERT INTO entries (name, calories, protein, logged_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&entry.name)
            .bind(entry.calories)
            .bind(entry.protein)
            .bind(logged_at)
            .execute(&self.pool)
            .await?;
            result.last_insert_rowid()
        } else {
            sqlx::query(
                r#"
                INSERT INTO entries (id, name, calories, protein, logged_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    calories = excluded.calories,
                    protein = excluded.protein,
                    logged_at = excluded.logged_at
                "#,
            )
            .bind(entry.id)
            .bind(&entry.name)
            .bind(entry.calories)
            .bind(entry.protein)
            .bind(logged_at)
            .execute(&self.pool)
            .await?;
            entry.id
        };

        self.refresh().await?;
        tracing::debug!(id, name = %entry.name, "entry stored");

        Ok(entry.clone().with_id(id))
    }

    /// Removes the entry if present. Deleting a missing id is a no-op.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.refresh().await?;
        tracing::debug!(id, "entry deleted");
        Ok(())
    }

    /// Live query: the receiver holds the current full collection at
    /// subscribe time and is re-sent the full collection (not a diff)
    /// after every mutation.
    pub fn observe(&self) -> watch::Receiver<Vec<FoodEntry>> {
        self.snapshots.subscribe()
    }

    /// The current snapshot, without subscribing.
    pub fn snapshot(&self) -> Vec<FoodEntry> {
        self.snapshots.borrow().clone()
    }

    async fn refresh(&self) -> Result<(), StoreError> {
        let rows = load_snapshot(&self.pool).await?;
        self.snapshots.send_replace(rows);
        Ok(())
    }
}

async fn load_snapshot(pool: &SqlitePool) -> Result<Vec<FoodEntry>, StoreError> {
    let rows: Vec<EntryRow> = sqlx::query_as(
        "SELECT id, name, calories, protein, logged_at FROM entries ORDER BY logged_at DESC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(FoodEntry::from).collect())
}
