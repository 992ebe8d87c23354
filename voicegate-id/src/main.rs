//! voicegate-id - Speaker Identity Service
//!
//! Command-line shell around the identity store and matcher. Audio
//! capture and embedding extraction live upstream; this binary consumes
//! embeddings that have already been extracted.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use voicegate_id::config::{CliOverrides, IdConfig};
use voicegate_id::{Evictor, IdentityStore, Session};

#[derive(Parser)]
#[command(name = "voicegate-id", version, about = "Speaker identity store and matcher")]
struct Cli {
    /// Folder holding one profile file per identity
    #[arg(long, value_name = "DIR")]
    catalog_folder: Option<PathBuf>,

    /// Days an identity may go unseen before the startup sweep evicts it
    #[arg(long)]
    expiry_days: Option<i64>,

    /// Minimum cosine similarity for a returning-speaker match
    #[arg(long)]
    similarity_threshold: Option<f32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Delete expired profiles and exit
    Sweep,
    /// List known identities
    List,
    /// Identify an embedding (JSON array of floats) against the catalog
    Identify {
        /// File containing the embedding as a JSON array
        embedding_file: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting voicegate-id (Speaker Identity)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let config = IdConfig::resolve(&CliOverrides {
        catalog_folder: cli.catalog_folder.clone(),
        expiry_days: cli.expiry_days,
        similarity_threshold: cli.similarity_threshold,
    })?;
    info!("Catalog folder: {}", config.catalog_folder.display());

    voicegate_common::config::ensure_catalog_folder(&config.catalog_folder)?;

    match cli.command {
        Command::Sweep => {
            let store = IdentityStore::new(&config.catalog_folder);
            let deleted = Evictor::new(config.expiry_days).sweep(&store)?;
            println!("Evicted {} expired profile(s)", deleted);
        }
        Command::List => {
            let session = Session::open(&config)?;
            println!(
                "{} known identit{} (evicted {} at startup)",
                session.catalog().len(),
                if session.catalog().len() == 1 { "y" } else { "ies" },
                session.evicted_at_start()
            );
            for entry in session.catalog().entries() {
                println!(
                    "{}\tlast seen {}\tdim {}",
                    entry.record.id,
                    entry.record.last_seen.to_rfc3339(),
                    entry.record.embedding.len()
                );
            }
        }
        Command::Identify { embedding_file } => {
            let content = std::fs::read_to_string(&embedding_file)?;
            let embedding: Vec<f32> = serde_json::from_str(&content)?;
            if embedding.is_empty() {
                return Err(voicegate_common::Error::InvalidInput(format!(
                    "Embedding file {} holds an empty vector",
                    embedding_file.display()
                ))
                .into());
            }

            let mut session = Session::open(&config)?;
            let outcome = session.identify(&embedding)?;
            println!("{}", serde_json::to_string(&outcome)?);
        }
    }

    Ok(())
}
