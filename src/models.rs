//! Core data models used throughout mailrag.
//!
//! These types represent the emails, chunks, and passages that flow through
//! the indexing and retrieval-augmented query pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An email body stored in SQLite. Read-only from the pipeline's perspective;
/// only the CRUD surface mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDocument {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A bounded-length segment of an email body, tagged with provenance.
///
/// Chunks are ephemeral: they are recomputed on every index run and never
/// persisted locally. `index` is 1-based and contiguous within a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub source_document_id: i64,
    pub index: usize,
    pub total_chunks: usize,
    pub text: String,
    pub size: usize,
}

/// A chunk returned by the vector index search, carrying a relevance score
/// in `[0, 1]` and the provenance metadata stored at upsert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub id: String,
    pub text: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Value,
}

/// A passage that cleared the score threshold, ordered by descending score.
pub type RankedPassage = ScoredPassage;

/// The three logical sections of a retrieval-augmented prompt, in render order.
#[derive(Debug, Clone)]
pub struct AugmentedPrompt {
    pub instruction: String,
    pub context_blocks: Vec<String>,
    pub query: String,
}

/// The final response assembled by the query orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct AugmentedAnswer {
    pub answer_text: String,
    pub source_passages: Vec<RankedPassage>,
    pub top_score: f64,
    pub has_relevant_context: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_used: Option<String>,
}

/// A record submitted to the vector index during an upsert run.
#[derive(Debug, Clone, Serialize)]
pub struct IndexRecord {
    pub id: String,
    pub text: String,
    pub metadata: Value,
}
