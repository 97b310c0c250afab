use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Apply the schema to an open pool. Idempotent; also used by tests against
/// in-memory databases.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Create email_contents table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS email_contents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_email_contents_created_at ON email_contents(created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
