//! CLI entry points for the email store (list, get, add, remove).

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::store;

/// Print every stored email, newest first.
pub async fn run_list(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let emails = store::list_all(&pool).await?;

    if emails.is_empty() {
        println!("no emails stored");
    } else {
        for email in &emails {
            let first_line = email.content.lines().next().unwrap_or("");
            println!(
                "{}\t{}\t{}",
                email.id,
                email.created_at.format("%Y-%m-%d %H:%M"),
                first_line
            );
        }
        println!();
        println!("{} emails", emails.len());
    }

    pool.close().await;
    Ok(())
}

/// Print one email's full body.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    let email = store::get(&pool, id).await?;

    println!("id: {}", email.id);
    println!("created_at: {}", email.created_at.to_rfc3339());
    println!();
    println!("{}", email.content);

    pool.close().await;
    Ok(())
}

/// Store a new email and print its assigned id.
pub async fn run_add(config: &Config, content: &str) -> Result<()> {
    let pool = db::connect(config).await?;
    let email = store::create(&pool, content).await?;
    println!("stored email {}", email.id);
    pool.close().await;
    Ok(())
}

/// Delete an email by id.
pub async fn run_remove(config: &Config, id: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    store::delete(&pool, id).await?;
    println!("deleted email {}", id);
    pool.close().await;
    Ok(())
}
