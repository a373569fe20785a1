//! HTTP client for the game server's REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::service::{GameService, GameSnapshot};
use crate::types::{Coordinate, Move, PlayerAssignment, TurnIndicator};

#[derive(Debug, Deserialize)]
struct GamesResponse {
    games: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TurnResponse {
    #[serde(default)]
    turn: TurnIndicator,
}

#[derive(Debug, Deserialize)]
struct LegalMovesResponse {
    targets: Vec<Coordinate>,
}

#[derive(Debug, Serialize)]
struct CreateGameRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SubmitMoveRequest {
    #[serde(rename = "move")]
    mv: Move,
    player: PlayerAssignment,
}

#[derive(Debug, Serialize)]
struct CursorRequest {
    ply: usize,
}

/// Type-safe HTTP game client.
#[derive(Debug, Clone)]
pub struct RestGameClient {
    base_url: Url,
    client: reqwest::Client,
}

impl RestGameClient {
    /// Creates a client for `base_url` whose requests give up after `timeout`.
    #[instrument(skip_all, fields(base_url = %base_url.as_ref(), timeout_ms = timeout.as_millis() as u64))]
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.as_ref()).map_err(|e| {
            ClientError::invalid_input(format!("Invalid server URL {:?}: {}", base_url.as_ref(), e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::invalid_input(format!(
                "Server URL {} cannot carry a path",
                base_url
            )));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!("Created REST game client");
        Ok(Self { base_url, client })
    }

    /// Creates a client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(config.server_url(), config.request_timeout())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::invalid_input(format!("Server URL {} cannot carry a path", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let (status, body) = self.send(request).await?;
        decode_response(status, &body)
    }

    async fn acknowledge(&self, request: RequestBuilder) -> Result<(), ClientError> {
        let (status, body) = self.send(request).await?;
        decode_acknowledgment(status, &body)
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), ClientError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed before a response arrived");
            ClientError::from(e)
        })?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body = %body, "Received response");
        Ok((status, body))
    }
}

/// Turns a raw response into a payload.
///
/// The error field is checked before anything else, whatever the status;
/// then the status; then the payload shape.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ClientError> {
    let value = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(e) if status.is_success() => {
                return Err(ClientError::decode(format!("Invalid JSON response: {}", e)));
            }
            Err(_) => {
                return Err(ClientError::server_rejected(format!("HTTP {}", status)));
            }
        }
    };

    if let Some(message) = error_message(&value) {
        warn!(status = %status, error = %message, "Server returned error");
        return Err(ClientError::server_rejected(message));
    }

    if !status.is_success() {
        warn!(status = %status, "Server returned failure status");
        return Err(ClientError::server_rejected(format!("HTTP {}", status)));
    }

    serde_json::from_value(value).map_err(ClientError::from)
}

/// Checks a response whose payload is ignored.
///
/// Same order as [`decode_response`], except that a success status with a
/// body that is not JSON (a bare `OK`, say) still counts as accepted.
pub fn decode_acknowledgment(status: StatusCode, body: &str) -> Result<(), ClientError> {
    let trimmed = body.trim();
    if status.is_success() && !trimmed.is_empty() && serde_json::from_str::<Value>(trimmed).is_err() {
        debug!(status = %status, "Non-JSON success body taken as acknowledgment");
        return Ok(());
    }
    decode_response::<IgnoredAny>(status, body).map(|_| ())
}

fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(
            other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        ),
    }
}

#[async_trait]
impl GameService for RestGameClient {
    #[instrument(skip(self))]
    async fn list_games(&self) -> Result<Vec<String>, ClientError> {
        let url = self.endpoint(&["api", "games"])?;
        let response: GamesResponse = self.execute(self.client.get(url)).await?;
        debug!(count = response.games.len(), "Listed games");
        Ok(response.games)
    }

    #[instrument(skip(self))]
    async fn create_game(&self, game: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "games"])?;
        self.acknowledge(self.client.post(url).json(&CreateGameRequest { name: game }))
            .await?;
        info!("Game created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, game: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "games", game])?;
        self.acknowledge(self.client.delete(url)).await?;
        info!("Game deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_snapshot(&self, game: &str) -> Result<GameSnapshot, ClientError> {
        let url = self.endpoint(&["api", "games", game])?;
        let snapshot: GameSnapshot = self.execute(self.client.get(url)).await?;
        if snapshot.cursor > snapshot.history.len() {
            return Err(ClientError::decode(format!(
                "History cursor {} is past the end of {} moves",
                snapshot.cursor,
                snapshot.history.len()
            )));
        }
        debug!(turn = %snapshot.turn, plies = snapshot.history.len(), cursor = snapshot.cursor, "Fetched snapshot");
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    async fn whose_turn(&self, game: &str) -> Result<TurnIndicator, ClientError> {
        let url = self.endpoint(&["api", "games", game, "turn"])?;
        let response: TurnResponse = self.execute(self.client.get(url)).await?;
        Ok(response.turn)
    }

    #[instrument(skip(self), fields(source = %source))]
    async fn legal_moves(&self, game: &str, source: Coordinate) -> Result<Vec<Coordinate>, ClientError> {
        let row = source.row().to_string();
        let col = source.col().to_string();
        let url = self.endpoint(&["api", "games", game, "legal_moves", &row, &col])?;
        let response: LegalMovesResponse = self.execute(self.client.get(url)).await?;
        debug!(count = response.targets.len(), "Fetched legal moves");
        Ok(response.targets)
    }

    #[instrument(skip(self), fields(mv = %mv, player = %player))]
    async fn submit_move(
        &self,
        game: &str,
        mv: Move,
        player: PlayerAssignment,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "games", game, "moves"])?;
        self.acknowledge(self.client.post(url).json(&SubmitMoveRequest { mv, player }))
            .await?;
        info!("Move accepted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn request_auto_reply(&self, game: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "games", game, "auto_move"])?;
        self.acknowledge(self.client.post(url).json(&serde_json::json!({})))
            .await?;
        info!("Automated reply applied");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_history_cursor(&self, game: &str, ply: usize) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "games", game, "cursor"])?;
        self.acknowledge(self.client.put(url).json(&CursorRequest { ply }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_wins_over_success_status() {
        let result: Result<IgnoredAny, _> =
            decode_response(StatusCode::OK, r#"{"error": "Not your turn"}"#);
        let err = result.unwrap_err();
        assert_eq!(err.user_message(), "Server rejected request: Not your turn");
    }

    #[test]
    fn test_structured_error_field_uses_message() {
        let result: Result<IgnoredAny, _> = decode_response(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"code": 7, "message": "Illegal move"}}"#,
        );
        assert_eq!(
            result.unwrap_err().user_message(),
            "Server rejected request: Illegal move"
        );
    }

    #[test]
    fn test_null_error_field_is_success() {
        let result: Result<IgnoredAny, _> = decode_response(StatusCode::OK, r#"{"error": null}"#);
        assert!(result.is_ok());
    }

    #[test]
    fn test_failure_status_without_json() {
        let result: Result<IgnoredAny, _> =
            decode_response(StatusCode::NOT_FOUND, "<html>not found</html>");
        assert_eq!(
            result.unwrap_err().user_message(),
            "Server rejected request: HTTP 404 Not Found"
        );
    }

    #[test]
    fn test_empty_ack_body() {
        let result: Result<IgnoredAny, _> = decode_response(StatusCode::NO_CONTENT, "");
        assert!(result.is_ok());
    }

    #[test]
    fn test_plain_text_success_is_acknowledgment() {
        assert!(decode_acknowledgment(StatusCode::OK, "OK").is_ok());
        assert!(decode_acknowledgment(StatusCode::CREATED, "").is_ok());
    }

    #[test]
    fn test_acknowledgment_still_honours_errors() {
        let err = decode_acknowledgment(StatusCode::OK, r#"{"error": "Not your turn"}"#).unwrap_err();
        assert_eq!(err.user_message(), "Server rejected request: Not your turn");
        let err = decode_acknowledgment(StatusCode::CONFLICT, "busy").unwrap_err();
        assert_eq!(err.user_message(), "Server rejected request: HTTP 409 Conflict");
    }

    #[test]
    fn test_wrong_payload_shape_is_decode_error() {
        let result: Result<GamesResponse, _> = decode_response(StatusCode::OK, r#"{"names": []}"#);
        let err = result.unwrap_err();
        assert!(matches!(err.kind, crate::error::ClientErrorKind::Decode(_)));
    }

    #[test]
    fn test_endpoint_encodes_game_names() {
        let client = RestGameClient::new("http://localhost:5100/", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["api", "games", "my game/1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5100/api/games/my%20game%2F1");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(RestGameClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(RestGameClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }
}
