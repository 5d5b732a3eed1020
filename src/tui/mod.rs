//! Terminal UI for Little Learners.

mod app;
mod input;
mod ui;

use crate::audio::ChannelSink;
use crate::config::AppConfig;
use crate::db::ImageCache;
use crate::driver::GameDriver;
use crate::evaluation::TaskEvaluator;
use crate::illustration::{GeminiImageGenerator, illustrate_missing};
use crate::llm_client::CompletionBackend;
use crate::review::NoVoiceInput;
use crate::speech::SpeechSynthesizer;
use anyhow::Result;
use app::{App, AppEvent, Flow};
use input::action_for;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use little_learners_board::{Player, RandomDice, TileCatalog, TurnEngine};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Runs the game in the terminal until the user quits.
pub async fn run_tui(config: AppConfig, roster: Vec<Player>, seed: Option<u64>) -> Result<()> {
    // Log to a file so output does not tear the screen
    let log_file = std::fs::File::create("little_learners.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,little_learners=debug")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(players = roster.len(), "Starting Little Learners TUI");

    let catalog = TileCatalog::standard();
    let app = build_app(&config, catalog, roster, seed);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = ?err, "Game loop error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn build_app(config: &AppConfig, catalog: TileCatalog, roster: Vec<Player>, seed: Option<u64>) -> App {
    let dice = match seed {
        Some(seed) => RandomDice::seeded(seed),
        None => RandomDice::new(),
    };
    let engine = TurnEngine::new(catalog.clone(), config.engine_pacing(), dice);
    let (sink, effects_rx) = ChannelSink::new();
    let (handle, _driver) = GameDriver::spawn(engine, Arc::new(sink));

    let evaluator = TaskEvaluator::from_option(
        config
            .llm_client()
            .map(|client| Arc::new(client) as Arc<dyn CompletionBackend>),
    );
    let gemini = config.gemini_client();
    let speech = SpeechSynthesizer::new(gemini.clone(), config.speech_model(), config.speech_voice());

    let (cache, illustrations) = match ImageCache::open(config.database_path()) {
        Ok(cache) => {
            let images = cache.load_valid(&catalog).unwrap_or_else(|e| {
                warn!(error = %e, "Could not read illustration cache");
                BTreeMap::new()
            });
            (Some(cache), images)
        }
        Err(e) => {
            warn!(error = %e, "Illustration cache unavailable");
            (None, BTreeMap::new())
        }
    };

    let app = App::new(
        handle,
        catalog.clone(),
        roster,
        illustrations,
        evaluator,
        speech,
        Arc::new(NoVoiceInput),
        effects_rx,
    );

    if let (Some(cache), Some(client)) = (cache, gemini) {
        let generator = GeminiImageGenerator::new(client, config.image_model());
        let delay = config.illustration_delay();
        let events = app.events();
        tokio::spawn(async move {
            match illustrate_missing(&catalog, &cache, &generator, delay).await {
                Ok(images) if !images.is_empty() => {
                    let _ = events.send(AppEvent::Illustrations(images));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Illustration batch failed"),
            }
        });
    }

    app
}

#[instrument(skip_all)]
async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.pump();
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = action_for(key, app.screen());
                if app.apply(action) == Flow::Quit {
                    info!("User quit");
                    return Ok(());
                }
            }
        }

        // Let spawned work and the driver run between frames
        tokio::task::yield_now().await;
    }
}
