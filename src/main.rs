//! Little Learners - Unified CLI
//!
//! Plays the game in a terminal and manages the illustration cache.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{BackupAction, Cli, Command, parse_roster};
use little_learners::{
    AppConfig, CompletionBackend, GeminiImageGenerator, ImageCache, TaskEvaluator, export_backup,
    illustrate_missing, import_backup, run_tui,
};
use little_learners_board::{BoardLayout, TileCatalog};
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(db) = cli.db {
        config = config.with_database_path(db);
    }

    match cli.command {
        Command::Play { players, seed } => {
            let roster = parse_roster(&players)?;
            run_tui(config, roster, seed).await
        }
        Command::Board => print_board(),
        Command::Illustrate => {
            init_logging();
            illustrate(&config).await
        }
        Command::Evaluate { tile, answer } => {
            init_logging();
            evaluate(&config, tile, &answer).await
        }
        Command::Backup { action } => {
            init_logging();
            backup(&config, action)
        }
    }
}

/// Logs to stderr; the TUI installs its own file logger instead.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,little_learners=debug")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_board() -> Result<()> {
    let catalog = TileCatalog::standard();
    let layout = BoardLayout::standard();
    for row in layout.visual_rows(catalog.tiles()) {
        let cells: Vec<String> = row
            .into_iter()
            .map(|tile| match tile {
                Some(tile) => format!("{:>2} {:<18}", tile.id(), tile.title()),
                None => format!("{:21}", ""),
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
    Ok(())
}

#[instrument(skip(config))]
async fn illustrate(config: &AppConfig) -> Result<()> {
    let Some(client) = config.gemini_client() else {
        bail!("GEMINI_API_KEY is not set; cannot generate illustrations");
    };
    let catalog = TileCatalog::standard();
    let cache = ImageCache::open(config.database_path())?;
    let generator = GeminiImageGenerator::new(client, config.image_model());
    let generated = illustrate_missing(&catalog, &cache, &generator, config.illustration_delay()).await?;
    println!("Generated {} illustration(s).", generated.len());
    Ok(())
}

#[instrument(skip(config, answer))]
async fn evaluate(config: &AppConfig, tile_id: u32, answer: &str) -> Result<()> {
    let catalog = TileCatalog::standard();
    let tile = catalog
        .get(tile_id)
        .with_context(|| format!("No tile with id {}", tile_id))?;
    let evaluator = TaskEvaluator::from_option(
        config
            .llm_client()
            .map(|client| Arc::new(client) as Arc<dyn CompletionBackend>),
    );
    let verdict = evaluator.evaluate(tile, answer).await;
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}

#[instrument(skip(config))]
fn backup(config: &AppConfig, action: BackupAction) -> Result<()> {
    let cache = ImageCache::open(config.database_path())?;
    match action {
        BackupAction::Export { out } => {
            let json = export_backup(&cache)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Backup written");
                }
                None => println!("{}", json),
            }
        }
        BackupAction::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let count = import_backup(&cache, &text)?;
            println!("Imported {} image(s).", count);
        }
    }
    Ok(())
}
