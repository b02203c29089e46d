//! ankigen-cg - Card Generator service
//!
//! Generates language-learning flashcards from a free-text context: word
//! candidates come from an external generation service, pass a duplicate and
//! quality filter chain, get pronunciation audio attached, and land in a deck
//! with a durable per-run session record.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ankigen_cg::db::{SqliteCardStore, SqliteDeckStore, SqliteSessionStore};
use ankigen_cg::services::{CardGenerator, GoogleTtsClient, OpenAiWordGenerator};
use ankigen_cg::AppState;
use ankigen_common::config::{self, Settings};

/// Command-line arguments for ankigen-cg
#[derive(Parser, Debug)]
#[command(name = "ankigen-cg")]
#[command(about = "Card Generator service for ankigen")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5810", env = "ANKIGEN_CG_PORT")]
    port: u16,

    /// Root folder for database, audio clips, and settings
    #[arg(short, long, env = "ANKIGEN_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting ankigen Card Generator v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    config::ensure_root_folder(&root_folder)
        .with_context(|| format!("Failed to initialize root folder {}", root_folder.display()))?;
    info!("Root folder: {}", root_folder.display());

    let settings = Settings::load(&root_folder)?;
    if settings.openai_api_key.trim().is_empty() {
        tracing::warn!(
            "No OpenAI API key configured; card generation will fail until one is set \
             in ankigen.toml or {}",
            config::OPENAI_API_KEY_ENV
        );
    }

    let db_path = config::database_path(&root_folder);
    info!("Database: {}", db_path.display());
    let pool = ankigen_common::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let decks = Arc::new(SqliteDeckStore::new(pool.clone()));
    let cards = Arc::new(SqliteCardStore::new(pool.clone()));
    let sessions = Arc::new(SqliteSessionStore::new(pool.clone()));

    let word_gen = Arc::new(
        OpenAiWordGenerator::new(&settings)
            .map_err(|e| anyhow::anyhow!("Failed to build word generation client: {}", e))?,
    );
    let tts = Arc::new(
        GoogleTtsClient::new(&settings, &root_folder)
            .map_err(|e| anyhow::anyhow!("Failed to build TTS client: {}", e))?,
    );

    let generator = Arc::new(CardGenerator::new(
        decks.clone(),
        cards.clone(),
        sessions.clone(),
        word_gen,
        tts,
        settings.clone(),
    ));

    let state = AppState::new(settings, decks, cards, sessions, generator);
    let app = ankigen_cg::build_router(state);

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
