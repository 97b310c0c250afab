//! Email content store.
//!
//! CRUD operations over the `email_contents` table. All content validation
//! lives here: callers get the same rules whether they arrive via the CLI or
//! the HTTP API.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::models::EmailDocument;

/// Maximum stored email body length in characters.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        bail!("content must not be empty");
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        bail!("content must not exceed {} characters", MAX_CONTENT_LENGTH);
    }
    Ok(())
}

fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> EmailDocument {
    let ts: i64 = row.get("created_at");
    EmailDocument {
        id: row.get("id"),
        content: row.get("content"),
        created_at: DateTime::from_timestamp(ts, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    }
}

/// List all emails, newest first.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<EmailDocument>> {
    let rows = sqlx::query(
        "SELECT id, content, created_at FROM email_contents ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_document).collect())
}

/// Fetch one email by id. Errors with a "not found" message when absent.
pub async fn get(pool: &SqlitePool, id: i64) -> Result<EmailDocument> {
    let row = sqlx::query("SELECT id, content, created_at FROM email_contents WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(row_to_document(&row)),
        None => bail!("email {} not found", id),
    }
}

/// Insert a new email and return it with its assigned id.
pub async fn create(pool: &SqlitePool, content: &str) -> Result<EmailDocument> {
    validate_content(content)?;

    let now = Utc::now().timestamp();
    let result = sqlx::query("INSERT INTO email_contents (content, created_at) VALUES (?, ?)")
        .bind(content)
        .bind(now)
        .execute(pool)
        .await?;

    get(pool, result.last_insert_rowid()).await
}

/// Replace the body of an existing email. `created_at` is preserved.
pub async fn update(pool: &SqlitePool, id: i64, content: &str) -> Result<EmailDocument> {
    validate_content(content)?;

    let result = sqlx::query("UPDATE email_contents SET content = ? WHERE id = ?")
        .bind(content)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        bail!("email {} not found", id);
    }

    get(pool, id).await
}

/// Delete an email by id.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM email_contents WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        bail!("email {} not found", id);
    }

    Ok(())
}

/// Count stored emails.
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_contents")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
