//! Deterministic sample data for local development.
//!
//! Seeds the store with fixture emails drawn from a fixed template list in a
//! fixed cycling order, so repeated runs against a fresh database produce the
//! same corpus. Seeding is skipped when the store already has content.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::store;

/// Fixture bodies, cycled in order. Written to resemble the kind of internal
/// mail a retrieval demo should be able to answer questions about.
const TEMPLATES: &[&str] = &[
    "Subject: Q3 revenue update\n\nTeam, quarterly revenue grew 12% over Q2, driven mostly by the \
     enterprise tier. Churn held steady at 2.1%. Full figures land in the board deck on Friday.",
    "Subject: Office move logistics\n\nThe move to the 4th floor happens the weekend of the 14th. \
     Pack your desk into the labelled crates by Thursday evening. IT will reconnect monitors and \
     docks before Monday morning.",
    "Subject: Incident 2417 postmortem\n\nRoot cause was a misconfigured connection pool limit \
     after the database upgrade. We saw elevated p99 latency for 43 minutes. Action items: add a \
     pool saturation alert and document the upgrade checklist.",
    "Subject: New starter introductions\n\nPlease welcome Priya to the platform team and Marcus to \
     support. Priya joins us from a payments company and will focus on the ingestion service. Say \
     hello in #introductions.",
    "Subject: Travel policy refresh\n\nEconomy remains the default for flights under six hours. \
     Hotel caps rise to 220 per night in tier-1 cities. Book through the portal so approvals and \
     invoices stay in one place.",
    "Subject: Release 3.8 shipped\n\nRelease 3.8 is live. Highlights: bulk export, faster search \
     indexing, and the long-requested dark mode. Rollback plan is in the runbook if error rates \
     move after the weekend.",
    "Subject: Reminder on security training\n\nAnnual security training is due by the end of the \
     month. It takes about forty minutes. Teams at 100% completion by the 20th get bragging rights \
     and not much else.",
    "Subject: Customer feedback roundup\n\nTop themes this month: users want saved filters, a \
     quieter notification digest, and clearer error messages on failed imports. Product is sizing \
     saved filters for next quarter.",
];

/// Insert `count` fixture emails if the store is empty.
///
/// Returns the number inserted (zero when seeding was skipped).
pub async fn run_seed(pool: &SqlitePool, count: usize) -> Result<usize> {
    let existing = store::count(pool).await?;
    if existing > 0 {
        println!("seed skipped: store already holds {} emails", existing);
        return Ok(0);
    }

    for i in 0..count {
        let body = fixture_body(i);
        store::create(pool, &body).await?;
    }

    println!("seeded {} emails", count);
    Ok(count)
}

/// The body for fixture slot `i`. Templates cycle; a reference line keeps
/// every row distinct and the mapping reproducible.
fn fixture_body(i: usize) -> String {
    let template = TEMPLATES[i % TEMPLATES.len()];
    format!("{}\n\nRef: MSG-{:04}", template, i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        migrate::apply_schema(&pool).await.unwrap();
        pool
    }

    #[test]
    fn test_fixture_bodies_are_deterministic_and_distinct() {
        assert_eq!(fixture_body(0), fixture_body(0));
        assert_ne!(fixture_body(0), fixture_body(TEMPLATES.len()));
        assert!(fixture_body(3).ends_with("Ref: MSG-0004"));
    }

    #[tokio::test]
    async fn test_seed_inserts_requested_count() {
        let pool = test_pool().await;
        let inserted = run_seed(&pool, 12).await.unwrap();
        assert_eq!(inserted, 12);
        assert_eq!(store::count(&pool).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_seed_skips_populated_store() {
        let pool = test_pool().await;
        store::create(&pool, "Pre-existing email.").await.unwrap();

        let inserted = run_seed(&pool, 12).await.unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seed_is_reproducible_across_fresh_stores() {
        let a = test_pool().await;
        let b = test_pool().await;
        run_seed(&a, 5).await.unwrap();
        run_seed(&b, 5).await.unwrap();

        let docs_a: Vec<String> = store::list_all(&a)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.content)
            .collect();
        let docs_b: Vec<String> = store::list_all(&b)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.content)
            .collect();
        assert_eq!(docs_a, docs_b);
    }
}
