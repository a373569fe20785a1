//! Terminal chess board for a remote game server.
//!
//! Pieces are moved by dragging them with the mouse, or by picking them up
//! and putting them down with the keyboard. The server decides what is legal.

#![warn(missing_docs)]

mod app;
mod cli;
mod input;
mod picker;
mod ui;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use chess_client::{ClientConfig, GameController, GameService, RestGameClient};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, instrument};
use tracing_subscriber::EnvFilter;

use app::App;
use cli::{Cli, Command, GamesCommand};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.client_config()?;

    match cli.command {
        Command::Play { game, .. } => run_board(config, game).await,
        Command::Games { action } => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                )
                .with_writer(io::stderr)
                .init();
            run_games_command(config, action).await
        }
    }
}

/// Opens the board screen, showing the game picker first if needed.
async fn run_board(config: ClientConfig, game: Option<String>) -> Result<()> {
    // Setup logging to file to avoid interfering with TUI
    let log_file = std::fs::File::create("chess_tui.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    info!(server_url = %config.server_url(), player = %config.player(), "Starting chess TUI");

    let service: Arc<dyn GameService> = Arc::new(RestGameClient::from_config(&config)?);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_screens(&mut terminal, service, &config, game).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!(error = %e, "Chess TUI exited with error");
    }
    info!("Chess TUI shutting down");
    res
}

async fn run_screens(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: Arc<dyn GameService>,
    config: &ClientConfig,
    game: Option<String>,
) -> Result<()> {
    let game = match game {
        Some(game) => game,
        None => match picker::pick_game(terminal, service.as_ref()).await? {
            Some(game) => game,
            None => return Ok(()),
        },
    };

    let controller = GameController::new(service, &game, config);
    App::new(controller).run(terminal).await
}

/// Runs one of the `games` management commands.
#[instrument(skip(config))]
async fn run_games_command(config: ClientConfig, action: GamesCommand) -> Result<()> {
    let client = RestGameClient::from_config(&config)?;
    match action {
        GamesCommand::List => {
            let games = client.list_games().await?;
            if games.is_empty() {
                println!("No games.");
            }
            for game in games {
                println!("{}", game);
            }
        }
        GamesCommand::Create { name } => {
            client.create_game(&name).await?;
            println!("Created game '{}'", name);
        }
        GamesCommand::Delete { name } => {
            client.delete_game(&name).await?;
            println!("Deleted game '{}'", name);
        }
    }
    Ok(())
}
