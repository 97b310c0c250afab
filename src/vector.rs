//! Vector index abstraction and implementations.
//!
//! Defines the [`VectorIndex`] trait and concrete implementations:
//! - **[`DisabledIndex`]** — returns errors; used when no index is configured.
//! - **[`PineconeIndex`]** — talks to a Pinecone serverless index with
//!   integrated embedding: records are upserted as text and the index embeds
//!   them server-side, so search is also text-in, scored-hits-out.
//!
//! The rest of the pipeline never sees a provider wire format; search hits
//! are mapped to [`ScoredPassage`] at this boundary.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::IndexConfig;
use crate::models::{IndexRecord, ScoredPassage};

/// Trait for vector index backends.
///
/// Both calls are attempted exactly once; retry policy is the caller's
/// concern (and the pipeline deliberately has none).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert one batch of records under the given namespace.
    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> Result<()>;

    /// Text similarity search returning up to `top_k` scored candidates.
    /// `return_fields` selects which stored fields come back in metadata.
    async fn search(
        &self,
        namespace: &str,
        query_text: &str,
        top_k: usize,
        return_fields: &[&str],
    ) -> Result<Vec<ScoredPassage>>;
}

/// Create the appropriate [`VectorIndex`] based on configuration.
///
/// Returns an error for unknown provider names or if the Pinecone index
/// cannot be initialized (missing host or API key).
pub fn create_index(config: &IndexConfig) -> Result<Box<dyn VectorIndex>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledIndex)),
        "pinecone" => Ok(Box::new(PineconeIndex::new(config)?)),
        other => bail!("Unknown index provider: {}", other),
    }
}

// ============ Disabled index ============

/// A no-op index that always returns errors. Used when
/// `index.provider = "disabled"` in the configuration.
pub struct DisabledIndex;

#[async_trait]
impl VectorIndex for DisabledIndex {
    async fn upsert(&self, _namespace: &str, _records: &[IndexRecord]) -> Result<()> {
        bail!("Vector index is disabled. Set [index] provider in config.")
    }

    async fn search(
        &self,
        _namespace: &str,
        _query_text: &str,
        _top_k: usize,
        _return_fields: &[&str],
    ) -> Result<Vec<ScoredPassage>> {
        bail!("Vector index is disabled. Set [index] provider in config.")
    }
}

// ============ Pinecone index ============

const PINECONE_API_VERSION: &str = "2025-01";

/// The record field that holds chunk text; the index's integrated embedding
/// is mapped to this field, so the name is part of the index contract.
pub const TEXT_FIELD: &str = "chunk_text";

/// Index backend for a Pinecone serverless index with integrated embedding.
///
/// Requires the `PINECONE_API_KEY` environment variable and the index
/// data-plane host in config.
pub struct PineconeIndex {
    host: String,
    api_key: String,
    client: reqwest::Client,
}

impl PineconeIndex {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let host = config
            .host
            .clone()
            .ok_or_else(|| anyhow::anyhow!("index.host required for Pinecone index"))?;

        let api_key = std::env::var("PINECONE_API_KEY")
            .map_err(|_| anyhow::anyhow!("PINECONE_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            host,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Records endpoint takes NDJSON: one record object per line, with
        // the text under the field the index embeds.
        let mut body = String::new();
        for record in records {
            let mut obj = serde_json::Map::new();
            obj.insert("_id".to_string(), serde_json::json!(record.id));
            obj.insert(TEXT_FIELD.to_string(), serde_json::json!(record.text));
            if let Some(meta) = record.metadata.as_object() {
                for (k, v) in meta {
                    obj.insert(k.clone(), v.clone());
                }
            }
            body.push_str(&serde_json::Value::Object(obj).to_string());
            body.push('\n');
        }

        let url = format!(
            "https://{}/records/namespaces/{}/upsert",
            self.host, namespace
        );

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Pinecone upsert error {}: {}", status, body_text);
        }

        Ok(())
    }

    async fn search(
        &self,
        namespace: &str,
        query_text: &str,
        top_k: usize,
        return_fields: &[&str],
    ) -> Result<Vec<ScoredPassage>> {
        let url = format!(
            "https://{}/records/namespaces/{}/search",
            self.host, namespace
        );

        let payload = serde_json::json!({
            "query": {
                "inputs": { "text": query_text },
                "top_k": top_k,
            },
            "fields": return_fields,
        });

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Pinecone search error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_search_response(&json)
    }
}

/// Map Pinecone search hits onto [`ScoredPassage`]s.
///
/// The hit's stored fields become the passage metadata; the text field is
/// lifted out so downstream code never touches the provider shape.
fn parse_search_response(json: &serde_json::Value) -> Result<Vec<ScoredPassage>> {
    let hits = json
        .pointer("/result/hits")
        .and_then(|h| h.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid Pinecone response: missing result.hits"))?;

    let mut passages = Vec::with_capacity(hits.len());

    for hit in hits {
        let id = hit
            .get("_id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let score = hit.get("_score").and_then(|v| v.as_f64()).unwrap_or(0.0);

        let fields = hit
            .get("fields")
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        let text = fields
            .get(TEXT_FIELD)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut metadata = fields;
        if let Some(obj) = metadata.as_object_mut() {
            obj.remove(TEXT_FIELD);
        }

        passages.push(ScoredPassage {
            id,
            text,
            score,
            metadata,
        });
    }

    Ok(passages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = serde_json::json!({
            "result": {
                "hits": [
                    {
                        "_id": "doc_1_chunk_1",
                        "_score": 0.87,
                        "fields": {
                            "chunk_text": "Quarterly revenue grew.",
                            "document_id": 1,
                            "chunk_index": 1,
                        }
                    },
                    {
                        "_id": "doc_2_chunk_4",
                        "_score": 0.41,
                        "fields": { "chunk_text": "Meeting moved to Thursday." }
                    }
                ]
            }
        });

        let passages = parse_search_response(&json).unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].id, "doc_1_chunk_1");
        assert_eq!(passages[0].text, "Quarterly revenue grew.");
        assert!((passages[0].score - 0.87).abs() < 1e-9);
        // Text field is lifted out of metadata; provenance stays.
        assert!(passages[0].metadata.get("chunk_text").is_none());
        assert_eq!(passages[0].metadata["document_id"], 1);
    }

    #[test]
    fn test_parse_search_response_empty_hits() {
        let json = serde_json::json!({ "result": { "hits": [] } });
        let passages = parse_search_response(&json).unwrap();
        assert!(passages.is_empty());
    }

    #[test]
    fn test_parse_search_response_missing_hits_is_error() {
        let json = serde_json::json!({ "unexpected": true });
        assert!(parse_search_response(&json).is_err());
    }

    #[tokio::test]
    async fn test_disabled_index_errors() {
        let index = DisabledIndex;
        assert!(index.upsert("emails", &[]).await.is_err());
        assert!(index.search("emails", "q", 10, &[]).await.is_err());
    }
}
