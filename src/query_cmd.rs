//! CLI entry point for retrieval-augmented queries.

use anyhow::Result;

use crate::answer::{self, QueryParams};
use crate::completion;
use crate::config::Config;
use crate::vector;

/// Run one query against the indexed corpus and print the answer.
pub async fn run_query(
    config: &Config,
    question: &str,
    top_k: Option<usize>,
    score_threshold: Option<f64>,
    max_passages: Option<usize>,
    show_prompt: bool,
) -> Result<()> {
    let index = vector::create_index(&config.index)?;
    let provider = completion::create_provider(&config.completion)?;

    let params = QueryParams::from_config(
        question.to_string(),
        &config.retrieval,
        top_k,
        score_threshold,
        max_passages,
        show_prompt,
    );

    let result = answer::answer_query(
        index.as_ref(),
        provider.as_ref(),
        &config.index.namespace,
        &params,
    )
    .await?;

    if let Some(prompt) = &result.prompt_used {
        println!("--- prompt ---");
        println!("{}", prompt);
        println!("--- end prompt ---");
        println!();
    }

    println!("{}", result.answer_text);

    if result.has_relevant_context {
        println!();
        println!(
            "sources ({} passages, top score {:.3}):",
            result.source_passages.len(),
            result.top_score
        );
        for p in &result.source_passages {
            println!("  {} (score {:.3})", p.id, p.score);
        }
    }

    Ok(())
}
