//! Retrieval-augmented query orchestration.
//!
//! Sequences one request through the pipeline: similarity search → passage
//! ranking → prompt composition → completion → response assembly. The states
//! are `Start → Searched → {NoContext | Ranked → Composed → Answered}`, with
//! any external failure terminating the request as an error.
//!
//! The orchestrator holds no state between requests and never retries; each
//! external call is attempted exactly once.

use anyhow::{bail, Result};

use crate::completion::CompletionProvider;
use crate::config::RetrievalConfig;
use crate::models::AugmentedAnswer;
use crate::prompt;
use crate::rank::rank_passages;
use crate::vector::{VectorIndex, TEXT_FIELD};

/// Provenance fields requested back from the index alongside the chunk text.
const RETURN_FIELDS: &[&str] = &[TEXT_FIELD, "document_id", "chunk_index", "total_chunks", "size"];

/// Parameters for a single retrieval-augmented query.
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub question: String,
    pub top_k: usize,
    pub score_threshold: f64,
    pub max_passages: usize,
    pub include_prompt: bool,
}

impl QueryParams {
    /// Build params from the question and configured retrieval defaults,
    /// with per-request overrides applied where given.
    pub fn from_config(
        question: String,
        defaults: &RetrievalConfig,
        top_k: Option<usize>,
        score_threshold: Option<f64>,
        max_passages: Option<usize>,
        include_prompt: bool,
    ) -> Self {
        Self {
            question,
            top_k: top_k.unwrap_or(defaults.top_k),
            score_threshold: score_threshold.unwrap_or(defaults.score_threshold),
            max_passages: max_passages.unwrap_or(defaults.max_passages),
            include_prompt,
        }
    }

    /// Single validation gate, applied once before any external call.
    fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            bail!("question must not be empty");
        }
        if self.top_k < 1 {
            bail!("top_k must be >= 1");
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            bail!("score_threshold must be in [0.0, 1.0]");
        }
        if self.max_passages < 1 {
            bail!("max_passages must be >= 1");
        }
        Ok(())
    }
}

/// Answer a question from the indexed email corpus.
///
/// Searching is always performed first; if no candidate comes back, or none
/// clears the score threshold, the request terminates as `NoContext` and the
/// completion provider is never called. Otherwise the ranked passages are
/// composed into a prompt, completed once, and returned with source
/// provenance.
pub async fn answer_query(
    index: &dyn VectorIndex,
    completion: &dyn CompletionProvider,
    namespace: &str,
    params: &QueryParams,
) -> Result<AugmentedAnswer> {
    params.validate()?;

    // Search
    let candidates = index
        .search(namespace, &params.question, params.top_k, RETURN_FIELDS)
        .await?;

    if candidates.is_empty() {
        return Ok(no_context_answer());
    }

    // Rank
    let ranked = rank_passages(candidates, params.score_threshold, params.max_passages);
    if ranked.is_empty() {
        return Ok(no_context_answer());
    }

    // Compose
    let prompt_text = prompt::compose(&ranked, &params.question);

    // Complete
    let answer_text = completion.complete(&prompt_text).await?;

    // Assemble
    let top_score = ranked.first().map(|p| p.score).unwrap_or(0.0);

    Ok(AugmentedAnswer {
        answer_text,
        top_score,
        has_relevant_context: true,
        prompt_used: params.include_prompt.then_some(prompt_text),
        source_passages: ranked,
    })
}

/// The fixed response shape for the `NoContext` terminal state.
fn no_context_answer() -> AugmentedAnswer {
    AugmentedAnswer {
        answer_text: prompt::REFUSAL_SENTENCE.to_string(),
        source_passages: Vec::new(),
        top_score: 0.0,
        has_relevant_context: false,
        prompt_used: None,
    }
}
