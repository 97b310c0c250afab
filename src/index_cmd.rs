//! Bulk index run: chunk every stored email and upsert the chunks into the
//! vector index.
//!
//! Chunks are recomputed from scratch on every run and pushed in batches,
//! with a fixed pause between batches to stay under provider rate limits.
//! A failed batch is reported and skipped; the run continues and the summary
//! counts what made it in.

use anyhow::{bail, Result};
use serde::Serialize;
use std::time::Duration;

use crate::chunker;
use crate::config::Config;
use crate::db;
use crate::models::{EmailDocument, IndexRecord};
use crate::store;
use crate::vector;

/// Outcome of an index run, printed by the CLI and returned by the HTTP API.
#[derive(Debug, Clone, Serialize)]
pub struct IndexRunSummary {
    pub documents: usize,
    pub chunks: usize,
    pub upserted: usize,
    pub failed: usize,
    pub dry_run: bool,
}

/// Chunk every stored email and upsert the resulting records.
pub async fn run_index(config: &Config, dry_run: bool) -> Result<IndexRunSummary> {
    // Dry runs only chunk locally, so they work without an index configured.
    if !dry_run && !config.index.is_enabled() {
        bail!("Vector index is disabled. Set [index] provider in config.");
    }

    let pool = db::connect(config).await?;
    let documents = store::list_all(&pool).await?;
    pool.close().await;

    let records = build_records(&documents, config.chunking.max_chunk_size);

    if dry_run {
        let summary = IndexRunSummary {
            documents: documents.len(),
            chunks: records.len(),
            upserted: 0,
            failed: 0,
            dry_run: true,
        };
        print_summary(&summary);
        return Ok(summary);
    }

    let index = vector::create_index(&config.index)?;
    let namespace = &config.index.namespace;

    let mut upserted = 0usize;
    let mut failed = 0usize;

    let batches: Vec<&[IndexRecord]> = records.chunks(config.index.batch_size).collect();
    let batch_count = batches.len();

    for (i, batch) in batches.into_iter().enumerate() {
        match index.upsert(namespace, batch).await {
            Ok(()) => upserted += batch.len(),
            Err(e) => {
                eprintln!("Warning: upsert batch {} failed: {}", i + 1, e);
                failed += batch.len();
            }
        }

        if i + 1 < batch_count {
            tokio::time::sleep(Duration::from_millis(config.index.batch_delay_ms)).await;
        }
    }

    let summary = IndexRunSummary {
        documents: documents.len(),
        chunks: records.len(),
        upserted,
        failed,
        dry_run: false,
    };
    print_summary(&summary);
    Ok(summary)
}

fn print_summary(summary: &IndexRunSummary) {
    if summary.dry_run {
        println!("index run (dry-run)");
    } else {
        println!("index run");
    }
    println!("  documents: {}", summary.documents);
    println!("  chunks: {}", summary.chunks);
    if !summary.dry_run {
        println!("  upserted: {}", summary.upserted);
        println!("  failed: {}", summary.failed);
    }
}

/// Chunk every document and assign record ids.
///
/// Record ids take the form `doc_{document_id}_chunk_{n}` where `n` is a
/// counter over the whole run, starting at 1 and never resetting between
/// documents. Ids are therefore stable only for an unchanged corpus; a full
/// run always rewrites every record it produces.
pub fn build_records(documents: &[EmailDocument], max_chunk_size: usize) -> Vec<IndexRecord> {
    let mut records = Vec::new();
    let mut counter = 0usize;

    for doc in documents {
        for chunk in chunker::chunk_document(doc, max_chunk_size) {
            counter += 1;
            records.push(IndexRecord {
                id: format!("doc_{}_chunk_{}", doc.id, counter),
                text: chunk.text,
                metadata: serde_json::json!({
                    "document_id": chunk.source_document_id,
                    "chunk_index": chunk.index,
                    "total_chunks": chunk.total_chunks,
                    "size": chunk.size,
                }),
            });
        }
    }

    records
}
