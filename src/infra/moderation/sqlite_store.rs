// SQLite-backed moderation store.
//
// Tables:
// - submissions: Pending suggestions, unique per transport message id
// - moderators: Delegated reviewers, unique per user id
//
// Resolved submissions are deleted, so the submissions table only ever holds
// the live queue.

use crate::core::media::ContentKind;
use crate::core::moderation::{
    Moderator, ModeratorStore, NewSubmission, StoreError, Submission, SubmissionStatus,
    SubmissionStore,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteModerationStore {
    pool: Pool<Sqlite>,
}

impl SqliteModerationStore {
    /// Open (creating if needed) the database file and run migrations.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure the file exists if it's a file path
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&conn_str)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id INTEGER NOT NULL UNIQUE,
                content_kind TEXT NOT NULL,
                content_handle TEXT NOT NULL DEFAULT '',
                text TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                channel_id INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_submissions_status_created
                ON submissions(status, created_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS moderators (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL UNIQUE,
                display_name TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }
}

fn storage(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

/// Fixed-width timestamps so text ordering matches time ordering.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_submission(row: &SqliteRow) -> Result<Submission, StoreError> {
    let kind: String = row.get("content_kind");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    Ok(Submission {
        id: row.get::<i64, _>("id") as u64,
        message_id: row.get::<i64, _>("message_id") as u64,
        kind: ContentKind::parse(&kind)
            .ok_or_else(|| StoreError::Storage(format!("Unknown content kind: {}", kind)))?,
        content_handle: row.get("content_handle"),
        text: row.get("text"),
        status: SubmissionStatus::parse(&status)
            .ok_or_else(|| StoreError::Storage(format!("Unknown status: {}", status)))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Storage(format!("Bad timestamp {}: {}", created_at, e)))?,
        channel_id: row.get::<i64, _>("channel_id") as u64,
    })
}

#[async_trait]
impl SubmissionStore for SqliteModerationStore {
    async fn save(&self, submission: NewSubmission) -> Result<Submission, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO submissions (
                message_id, content_kind, content_handle, text, status, created_at, channel_id
            )
            VALUES (?, ?, ?, ?, 'pending', ?, ?)
            ON CONFLICT(message_id) DO UPDATE SET
                content_kind = excluded.content_kind,
                content_handle = excluded.content_handle,
                text = excluded.text,
                status = excluded.status,
                created_at = excluded.created_at,
                channel_id = excluded.channel_id
            RETURNING *
            "#,
        )
        .bind(submission.message_id as i64)
        .bind(submission.kind.as_str())
        .bind(&submission.content_handle)
        .bind(&submission.text)
        .bind(format_timestamp(&submission.created_at))
        .bind(submission.channel_id as i64)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        row_to_submission(&row)
    }

    async fn list_pending(&self) -> Result<Vec<Submission>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM submissions
            WHERE status = 'pending'
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(row_to_submission).collect()
    }

    async fn update_status(
        &self,
        message_id: u64,
        status: SubmissionStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE submissions SET status = ? WHERE message_id = ?")
            .bind(status.as_str())
            .bind(message_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(message_id));
        }
        Ok(())
    }

    async fn delete(&self, message_id: u64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM submissions WHERE message_id = ?")
            .bind(message_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn get_by_message_id(&self, message_id: u64) -> Result<Option<Submission>, StoreError> {
        let row = sqlx::query("SELECT * FROM submissions WHERE message_id = ?")
            .bind(message_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.as_ref().map(row_to_submission).transpose()
    }
}

#[async_trait]
impl ModeratorStore for SqliteModerationStore {
    async fn add_moderator(&self, user_id: u64, display_name: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO moderators (user_id, display_name)
            VALUES (?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user_id as i64)
        .bind(display_name)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::DuplicateModerator(user_id));
        }
        Ok(())
    }

    async fn remove_moderator(&self, user_id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM moderators WHERE user_id = ?")
            .bind(user_id as i64)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_moderator(&self, user_id: u64) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM moderators WHERE user_id = ?")
            .bind(user_id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        Ok(row.is_some())
    }

    async fn list_moderators(&self) -> Result<Vec<Moderator>, StoreError> {
        let rows = sqlx::query("SELECT id, user_id, display_name FROM moderators ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        Ok(rows
            .iter()
            .map(|row| Moderator {
                id: row.get::<i64, _>("id") as u64,
                user_id: row.get::<i64, _>("user_id") as u64,
                display_name: row.get("display_name"),
            })
            .collect())
    }
}
