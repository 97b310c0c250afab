//! # mailrag
//!
//! A retrieval-augmented query service over an email content store.
//!
//! mailrag keeps email bodies in SQLite, chunks them on sentence boundaries,
//! pushes the chunks into a text-embedding vector index, and answers natural
//! language questions by composing the best-scoring passages into a grounded
//! prompt for a completion provider.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌───────────────┐
//! │  SQLite   │──▶│  Chunker     │──▶│ Vector index  │
//! │  emails   │   │ (sentences)  │   │ (text upsert) │
//! └──────────┘   └──────────────┘   └──────┬────────┘
//!                                          │ search
//!                  ┌───────────────────────▼────────┐
//!                  │ rank → compose → complete      │
//!                  │ (retrieval-augmented answer)   │
//!                  └───────────────┬────────────────┘
//!                                  ▼
//!                         CLI and HTTP server
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mailrag init                  # create database
//! mailrag seed                  # load deterministic sample emails
//! mailrag index run             # chunk and upsert into the vector index
//! mailrag query "what changed in release 3.8?"
//! mailrag serve                 # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Core data types |
//! | [`chunker`] | Sentence-boundary text chunking |
//! | [`rank`] | Passage threshold/sort/cap ranking |
//! | [`prompt`] | Retrieval-augmented prompt composition |
//! | [`answer`] | Query orchestration |
//! | [`vector`] | Vector index abstraction (Pinecone) |
//! | [`completion`] | Completion provider abstraction (OpenAI) |
//! | [`store`] | Email CRUD over SQLite |
//! | [`index_cmd`] | Bulk chunk-and-upsert runs |
//! | [`server`] | HTTP API server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod answer;
pub mod chunker;
pub mod completion;
pub mod config;
pub mod db;
pub mod emails_cmd;
pub mod index_cmd;
pub mod migrate;
pub mod models;
pub mod prompt;
pub mod query_cmd;
pub mod rank;
pub mod seed;
pub mod server;
pub mod store;
pub mod vector;
