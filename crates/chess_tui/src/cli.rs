//! Command-line interface for chess_tui.

use std::path::PathBuf;

use chess_client::{ClientConfig, PlayerAssignment};
use clap::{Parser, Subcommand};
use tracing::{debug, instrument};

/// Chess TUI - Drag pieces to propose moves to a remote chess server
#[derive(Parser, Debug)]
#[command(name = "chess_tui")]
#[command(about = "Terminal chess board for a remote game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the client config file (optional)
    #[arg(long, global = true, default_value = "chess_client.toml")]
    pub config: PathBuf,

    /// Game server URL, overriding config file and environment
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the board for a game
    Play {
        /// Game to open. If not provided, a game picker is shown.
        #[arg(long)]
        game: Option<String>,

        /// Side(s) you move: white, black or both
        #[arg(long)]
        player: Option<PlayerAssignment>,

        /// Ask the server for the opponent's reply after each of your moves
        #[arg(long)]
        auto_respond: bool,
    },

    /// Manage games on the server
    Games {
        /// Game action
        #[command(subcommand)]
        action: GamesCommand,
    },
}

/// Game management actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum GamesCommand {
    /// List all games
    List,

    /// Create a game
    Create {
        /// Name of the new game
        name: String,
    },

    /// Delete a game
    Delete {
        /// Name of the game to delete
        name: String,
    },
}

impl Cli {
    /// Builds the client configuration: config file, then environment, then
    /// command-line flags.
    #[instrument(skip(self), fields(config = %self.config.display()))]
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::load_or_default(&self.config)?;
        config.apply_env()?;
        if let Some(url) = &self.server_url {
            config = config.with_server_url(url.clone());
        }
        if let Command::Play {
            player,
            auto_respond,
            ..
        } = &self.command
        {
            if let Some(player) = player {
                config = config.with_player(*player);
            }
            if *auto_respond {
                config = config.with_auto_respond(true);
            }
        }
        debug!(?config, "Resolved client config");
        Ok(config)
    }
}
