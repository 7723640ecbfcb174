mod config;
mod controller;
mod error;
mod logging;
mod model;
mod platform;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::{Cli, Command};
use controller::AppController;
use model::AppModel;
use platform::audio::{AudioOutput, RodioBackend};
use platform::http::{HttpCatalog, HttpModelAssets, NewTrack};
use platform::replay::{ReplayCamera, ReplayExpressionModel};
use platform::Platform;
use view::{AppView, ViewLayout};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init_logging(&cli.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== moodtune starting ===");

    let client = reqwest::Client::builder()
        .user_agent(concat!("moodtune/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Unable to build HTTP client")?;
    let catalog = HttpCatalog::new(client.clone(), cli.api_url.clone());

    match cli.command {
        Some(Command::Songs { mood }) => {
            let songs = catalog.fetch_songs(mood).await?;
            println!("{}", serde_json::to_string_pretty(&songs)?);
            return Ok(());
        }
        Some(Command::Upload { title, artist, mood, audio }) => {
            catalog
                .upload(NewTrack { title, artist, mood, audio })
                .await?;
            println!("Uploaded");
            return Ok(());
        }
        None => {}
    }

    let (audio_output, audio_handle) = match AudioOutput::open() {
        Ok((output, handle)) => (Some(output), Some(handle)),
        Err(e) => {
            tracing::warn!(error = %e, "Audio output unavailable, playback disabled");
            (None, None)
        }
    };
    let platform = Platform {
        model: Arc::new(ReplayExpressionModel::new(HttpModelAssets::new(
            client.clone(),
            cli.model_url.clone(),
        ))),
        camera: Arc::new(ReplayCamera::new(cli.captures.clone())),
        catalog: Arc::new(catalog),
        media: Arc::new(RodioBackend::new(client, audio_handle)),
    };

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let model = Arc::new(Mutex::new(AppModel::new()));
    let controller = AppController::new(model.clone(), platform);

    let controller_for_init = controller.clone();
    tokio::spawn(async move {
        controller_for_init.initialize().await;
    });

    let res = run_app(&mut terminal, model, controller.clone()).await;

    controller.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    drop(audio_output);

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("moodtune shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let snapshot = model.lock().await.clone();

        let mut layout = ViewLayout::default();
        terminal.draw(|f| {
            layout = AppView::render(f, &snapshot);
        })?;

        if snapshot.should_quit() {
            break;
        }

        // Short poll keeps progress updates smooth
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => controller.handle_key_event(key).await,
                Event::Mouse(mouse) => controller.handle_mouse_event(mouse, layout).await,
                _ => {}
            }
        }
    }

    Ok(())
}
