//! Client configuration.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::types::PlayerAssignment;

/// Environment variable overriding [`ClientConfig::server_url`].
pub const ENV_SERVER_URL: &str = "CHESS_SERVER_URL";
/// Environment variable overriding [`ClientConfig::player`].
pub const ENV_PLAYER: &str = "CHESS_PLAYER";
/// Environment variable overriding [`ClientConfig::auto_respond`].
pub const ENV_AUTO_RESPOND: &str = "CHESS_AUTO_RESPOND";

/// Settings for talking to the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the game server.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// Interval between whose-turn checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// Deadline for every remote request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,

    /// Ask the server for an automated opponent reply after each move.
    #[serde(default)]
    auto_respond: bool,

    /// Which side(s) the local user moves.
    #[serde(default)]
    player: PlayerAssignment,
}

#[instrument]
fn default_server_url() -> String {
    "http://127.0.0.1:5100".to_string()
}

#[instrument]
fn default_poll_interval_ms() -> u64 {
    1000
}

#[instrument]
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            auto_respond: false,
            player: PlayerAssignment::default(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ClientError::config(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ClientError::config(format!("Failed to parse config: {}", e))
        })?;

        config.validate()?;
        info!(server_url = %config.server_url, player = %config.player, "Config loaded successfully");
        Ok(config)
    }

    /// Loads from `path` if it exists, otherwise starts from defaults.
    ///
    /// A file that exists but does not parse is still an error.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies `CHESS_*` environment overrides.
    #[instrument(skip(self))]
    pub fn apply_env(&mut self) -> Result<(), ClientError> {
        if let Ok(url) = std::env::var(ENV_SERVER_URL) {
            debug!(server_url = %url, "Server URL from environment");
            self.server_url = url;
        }
        if let Ok(player) = std::env::var(ENV_PLAYER) {
            self.player = player.parse().map_err(|_| {
                ClientError::config(format!("{} must be white, black or both, got {:?}", ENV_PLAYER, player))
            })?;
        }
        if let Ok(flag) = std::env::var(ENV_AUTO_RESPOND) {
            self.auto_respond = match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    warn!(value = other, "Unrecognized auto-respond flag");
                    return Err(ClientError::config(format!(
                        "{} must be a boolean, got {:?}",
                        ENV_AUTO_RESPOND, other
                    )));
                }
            };
        }
        self.validate()
    }

    /// Overrides the server URL.
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Overrides the player assignment.
    pub fn with_player(mut self, player: PlayerAssignment) -> Self {
        self.player = player;
        self
    }

    /// Overrides the auto-respond option.
    pub fn with_auto_respond(mut self, auto_respond: bool) -> Self {
        self.auto_respond = auto_respond;
        self
    }

    /// Overrides the poll interval.
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Overrides the request timeout.
    pub fn with_request_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
        self.request_timeout_ms = request_timeout_ms;
        self
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&self) -> Result<(), ClientError> {
        if self.poll_interval_ms == 0 {
            return Err(ClientError::config("poll_interval_ms must be positive"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClientError::config("request_timeout_ms must be positive"));
        }
        if self.server_url.trim().is_empty() {
            return Err(ClientError::config("server_url must not be empty"));
        }
        Ok(())
    }
}
