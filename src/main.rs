//! # mailrag CLI
//!
//! The `mailrag` binary manages the email store, drives index runs, and
//! answers questions from the indexed corpus.
//!
//! ## Usage
//!
//! ```bash
//! mailrag --config ./config/mailrag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mailrag init` | Create the SQLite database and run schema migrations |
//! | `mailrag seed` | Load deterministic sample emails into an empty store |
//! | `mailrag list` | List stored emails |
//! | `mailrag get <id>` | Print one email in full |
//! | `mailrag add "<content>"` | Store a new email |
//! | `mailrag remove <id>` | Delete an email |
//! | `mailrag index run` | Chunk every email and upsert into the vector index |
//! | `mailrag query "<question>"` | Answer a question from the indexed corpus |
//! | `mailrag serve` | Start the HTTP API server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mailrag::{config, emails_cmd, index_cmd, migrate, query_cmd, seed, server};

/// mailrag — a retrieval-augmented query service over an email content store.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/mailrag.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "mailrag",
    about = "mailrag — retrieval-augmented queries over an email content store",
    version,
    long_about = "mailrag stores email bodies in SQLite, chunks them on sentence boundaries, \
    indexes the chunks in a text-embedding vector index, and answers natural language questions \
    by grounding a completion provider in the best-scoring passages."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mailrag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the email_contents table.
    /// This command is idempotent — running it multiple times is safe.
    Init,

    /// Load deterministic sample emails.
    ///
    /// Inserts fixture emails drawn from a fixed template list in a fixed
    /// order, so repeated runs against a fresh database produce the same
    /// corpus. Skipped if the store already has content.
    Seed {
        /// Number of sample emails to insert.
        #[arg(long, default_value_t = 20)]
        count: usize,
    },

    /// List stored emails, newest first.
    List,

    /// Print one email in full.
    Get {
        /// Email id.
        id: i64,
    },

    /// Store a new email.
    Add {
        /// Email body text (at most 10000 characters).
        content: String,
    },

    /// Delete an email.
    Remove {
        /// Email id.
        id: i64,
    },

    /// Manage the vector index.
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },

    /// Answer a question from the indexed corpus.
    ///
    /// Searches the vector index, keeps passages above the score threshold,
    /// and asks the completion provider to answer using only those passages.
    /// Unset flags fall back to the `[retrieval]` config section.
    Query {
        /// The question to answer.
        question: String,

        /// Number of candidates to fetch from the index.
        #[arg(long)]
        top_k: Option<usize>,

        /// Minimum relevance score in [0.0, 1.0] a passage must reach.
        #[arg(long)]
        threshold: Option<f64>,

        /// Maximum number of passages to put in the prompt.
        #[arg(long)]
        max_passages: Option<usize>,

        /// Print the composed prompt before the answer.
        #[arg(long)]
        show_prompt: bool,
    },

    /// Start the HTTP API server.
    ///
    /// Binds to the address configured in `[server].bind` and exposes the
    /// email store, index runs, and queries as a JSON API.
    Serve,
}

/// Index management subcommands.
#[derive(Subcommand)]
enum IndexAction {
    /// Chunk every stored email and upsert the chunks into the vector index.
    ///
    /// Records are pushed in batches with a pause between batches; a failed
    /// batch is reported and skipped, and the run continues.
    Run {
        /// Show document and chunk counts without contacting the index.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Seed { count } => {
            let pool = mailrag::db::connect(&cfg).await?;
            seed::run_seed(&pool, count).await?;
            pool.close().await;
        }
        Commands::List => {
            emails_cmd::run_list(&cfg).await?;
        }
        Commands::Get { id } => {
            emails_cmd::run_get(&cfg, id).await?;
        }
        Commands::Add { content } => {
            emails_cmd::run_add(&cfg, &content).await?;
        }
        Commands::Remove { id } => {
            emails_cmd::run_remove(&cfg, id).await?;
        }
        Commands::Index { action } => match action {
            IndexAction::Run { dry_run } => {
                index_cmd::run_index(&cfg, dry_run).await?;
            }
        },
        Commands::Query {
            question,
            top_k,
            threshold,
            max_passages,
            show_prompt,
        } => {
            query_cmd::run_query(&cfg, &question, top_k, threshold, max_passages, show_prompt)
                .await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
