//! Chess board client - drag-driven move proposal against a remote game server
//!
//! The server owns every rule of chess. This library keeps a local view of
//! one game in sync with it and turns drag gestures into move proposals.
//!
//! # Architecture
//!
//! - **Service**: the [`GameService`] contract and its REST binding
//! - **Dispatch**: every remote call runs as its own task and reports back as a [`ClientEvent`]
//! - **Controller**: [`GameController`] applies completions on a single control flow
//! - **Drag**: drag sessions, legal-target highlighting and drop submission
//! - **Polling**: detects the opponent's move while the user waits
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chess_client::{ClientConfig, GameController, RestGameClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let service = Arc::new(RestGameClient::from_config(&config)?);
//! let mut controller = GameController::new(service, "game1", &config);
//! controller.open();
//! controller.process_next().await;
//! println!("{} plies played", controller.view_model().history().len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod controller;
mod dispatch;
mod drag;
mod error;
mod polling;
mod render;
mod rest_client;
mod service;
mod submission;
mod types;
mod view_model;

// Crate-level exports - Configuration
pub use config::{ClientConfig, ENV_AUTO_RESPOND, ENV_PLAYER, ENV_SERVER_URL};

// Crate-level exports - Errors
pub use error::{ClientError, ClientErrorKind};

// Crate-level exports - Domain types
pub use types::{
    BoardState, Coordinate, LegalMoveSet, Move, MoveRecord, Piece, PieceKind, PlayerAssignment,
    Side, TurnIndicator, BOARD_SIZE, MAX_PIECE_CODE,
};

// Crate-level exports - Remote service
pub use rest_client::{decode_acknowledgment, decode_response, RestGameClient};
pub use service::{GameService, GameSnapshot};

// Crate-level exports - Request dispatch
pub use dispatch::{ClientEvent, RefreshReason, RequestDispatcher};

// Crate-level exports - Board components
pub use drag::{DragMoveController, DragSession, DragSessionId, DragState, Highlight, LegalTargets, Legality};
pub use polling::{TickOutcome, TurnPollingLoop};
pub use submission::MoveSubmissionService;
pub use view_model::BoardViewModel;

// Crate-level exports - Rendering
pub use render::{board_tiles, Orientation, Shade, Tile};

// Crate-level exports - Controller
pub use controller::{ControllerStep, GameController, Notification};
