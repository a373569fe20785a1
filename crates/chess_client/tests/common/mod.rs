//! Scripted game service shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use chess_client::{
    BoardState, ClientConfig, ClientError, Coordinate, GameController, GameService, GameSnapshot,
    Move, MoveRecord, PlayerAssignment, TurnIndicator,
};

/// One call the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListGames,
    CreateGame(String),
    DeleteGame(String),
    Snapshot,
    WhoseTurn,
    LegalMoves(Coordinate),
    Submit(Move, PlayerAssignment),
    AutoReply,
    Cursor(usize),
}

#[derive(Debug, Default)]
struct FakeState {
    games: Vec<String>,
    snapshot: Option<GameSnapshot>,
    snapshot_errors: VecDeque<String>,
    turn: TurnIndicator,
    turn_error: Option<String>,
    legal: HashMap<Coordinate, Vec<Coordinate>>,
    legal_error: Option<String>,
    submit_error: Option<String>,
    auto_reply_error: Option<String>,
    cursor_error: Option<String>,
    apply_submissions: bool,
    hang_turn: bool,
    hang_legal: bool,
    hang_all: bool,
    calls: Vec<Call>,
}

/// In-memory [`GameService`] whose answers are set up by each test.
#[derive(Debug, Default)]
pub struct FakeService {
    state: Mutex<FakeState>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().expect("fake state poisoned");
        f(&mut state)
    }

    pub fn set_games(&self, games: &[&str]) {
        self.with(|s| s.games = games.iter().map(|g| g.to_string()).collect());
    }

    pub fn set_snapshot(&self, snapshot: GameSnapshot) {
        self.with(|s| s.snapshot = Some(snapshot));
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.with(|s| s.snapshot.clone()).unwrap_or_else(initial_snapshot)
    }

    pub fn fail_next_snapshot(&self, message: &str) {
        self.with(|s| s.snapshot_errors.push_back(message.to_string()));
    }

    pub fn set_turn(&self, turn: TurnIndicator) {
        self.with(|s| s.turn = turn);
    }

    pub fn fail_turn(&self, message: &str) {
        self.with(|s| s.turn_error = Some(message.to_string()));
    }

    pub fn set_legal(&self, source: Coordinate, targets: Vec<Coordinate>) {
        self.with(|s| {
            s.legal.insert(source, targets);
        });
    }

    pub fn fail_legal(&self, message: &str) {
        self.with(|s| s.legal_error = Some(message.to_string()));
    }

    pub fn reject_moves(&self, message: &str) {
        self.with(|s| s.submit_error = Some(message.to_string()));
    }

    pub fn fail_auto_reply(&self, message: &str) {
        self.with(|s| s.auto_reply_error = Some(message.to_string()));
    }

    pub fn reject_cursor(&self, message: &str) {
        self.with(|s| s.cursor_error = Some(message.to_string()));
    }

    /// Accepted moves are played on the stored snapshot.
    pub fn apply_submissions(&self) {
        self.with(|s| s.apply_submissions = true);
    }

    pub fn hang_turn(&self) {
        self.with(|s| s.hang_turn = true);
    }

    pub fn hang_legal(&self, hang: bool) {
        self.with(|s| s.hang_legal = hang);
    }

    pub fn hang_all(&self) {
        self.with(|s| s.hang_all = true);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.with(|s| s.calls.iter().filter(|c| matches(c)).count())
    }

    pub fn snapshot_calls(&self) -> usize {
        self.count(|c| *c == Call::Snapshot)
    }

    pub fn submissions(&self) -> Vec<Move> {
        self.with(|s| {
            s.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Submit(mv, _) => Some(*mv),
                    _ => None,
                })
                .collect()
        })
    }

    /// Records the call and reports whether it should never answer.
    fn record(&self, call: Call) -> bool {
        self.with(|s| {
            let hang = s.hang_all
                || (s.hang_turn && call == Call::WhoseTurn)
                || (s.hang_legal && matches!(call, Call::LegalMoves(_)));
            s.calls.push(call);
            hang
        })
    }

    async fn answer<T>(&self, call: Call, f: impl FnOnce(&mut FakeState) -> Result<T, ClientError>) -> Result<T, ClientError> {
        if self.record(call) {
            std::future::pending::<()>().await;
        }
        self.with(f)
    }
}

fn scripted_error(message: &Option<String>) -> Result<(), ClientError> {
    match message {
        Some(message) => Err(ClientError::server_rejected(message.clone())),
        None => Ok(()),
    }
}

#[async_trait]
impl GameService for FakeService {
    async fn list_games(&self) -> Result<Vec<String>, ClientError> {
        self.answer(Call::ListGames, |s| Ok(s.games.clone())).await
    }

    async fn create_game(&self, game: &str) -> Result<(), ClientError> {
        let name = game.to_string();
        self.answer(Call::CreateGame(name.clone()), move |s| {
            if s.games.contains(&name) {
                return Err(ClientError::server_rejected("Game already exists"));
            }
            s.games.push(name);
            Ok(())
        })
        .await
    }

    async fn delete_game(&self, game: &str) -> Result<(), ClientError> {
        let name = game.to_string();
        self.answer(Call::DeleteGame(name.clone()), move |s| {
            s.games.retain(|g| *g != name);
            Ok(())
        })
        .await
    }

    async fn fetch_snapshot(&self, _game: &str) -> Result<GameSnapshot, ClientError> {
        self.answer(Call::Snapshot, |s| match s.snapshot_errors.pop_front() {
            Some(message) => Err(ClientError::transport(message)),
            None => Ok(s.snapshot.clone().unwrap_or_else(initial_snapshot)),
        })
        .await
    }

    async fn whose_turn(&self, _game: &str) -> Result<TurnIndicator, ClientError> {
        self.answer(Call::WhoseTurn, |s| match &s.turn_error {
            Some(message) => Err(ClientError::transport(message.clone())),
            None => Ok(s.turn),
        })
        .await
    }

    async fn legal_moves(&self, _game: &str, source: Coordinate) -> Result<Vec<Coordinate>, ClientError> {
        self.answer(Call::LegalMoves(source), move |s| {
            scripted_error(&s.legal_error)?;
            Ok(s.legal.get(&source).cloned().unwrap_or_default())
        })
        .await
    }

    async fn submit_move(
        &self,
        _game: &str,
        mv: Move,
        player: PlayerAssignment,
    ) -> Result<(), ClientError> {
        self.answer(Call::Submit(mv, player), move |s| {
            scripted_error(&s.submit_error)?;
            if s.apply_submissions {
                let mut snapshot = s.snapshot.clone().unwrap_or_else(initial_snapshot);
                play(&mut snapshot, mv);
                s.turn = snapshot.turn;
                s.snapshot = Some(snapshot);
            }
            Ok(())
        })
        .await
    }

    async fn request_auto_reply(&self, _game: &str) -> Result<(), ClientError> {
        self.answer(Call::AutoReply, |s| scripted_error(&s.auto_reply_error))
            .await
    }

    async fn set_history_cursor(&self, _game: &str, ply: usize) -> Result<(), ClientError> {
        self.answer(Call::Cursor(ply), move |s| {
            scripted_error(&s.cursor_error)?;
            let mut snapshot = s.snapshot.clone().unwrap_or_else(initial_snapshot);
            snapshot.cursor = ply.min(snapshot.history.len());
            s.snapshot = Some(snapshot);
            Ok(())
        })
        .await
    }
}

/// Shorthand for a valid square.
pub fn sq(row: u8, col: u8) -> Coordinate {
    Coordinate::new(row, col).expect("square on the board")
}

/// Opening position, white to move.
pub fn initial_snapshot() -> GameSnapshot {
    GameSnapshot::new(BoardState::initial(), TurnIndicator::White, Vec::new(), 0)
}

/// Plays `mv` on the snapshot board without any rule checks.
pub fn play(snapshot: &mut GameSnapshot, mv: Move) {
    let piece = snapshot.board.code_at(mv.source);
    let captured = snapshot.board.code_at(mv.target);
    snapshot.board.set(mv.target, piece).expect("valid code");
    snapshot.board.set(mv.source, 0).expect("valid code");
    snapshot
        .history
        .push(MoveRecord::new(piece, Some(captured), mv));
    snapshot.cursor = snapshot.history.len();
    snapshot.turn = match snapshot.turn {
        TurnIndicator::White => TurnIndicator::Black,
        TurnIndicator::Black => TurnIndicator::White,
        TurnIndicator::Undetermined => TurnIndicator::Undetermined,
    };
}

/// Config for `player` with a generous timeout.
pub fn config_for(player: PlayerAssignment) -> ClientConfig {
    ClientConfig::default()
        .with_player(player)
        .with_request_timeout_ms(5_000)
}

/// Routes client logs to the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Controller over `service` for game "g1".
pub fn controller(service: &Arc<FakeService>, config: &ClientConfig) -> GameController {
    init_tracing();
    GameController::new(service.clone(), "g1", config)
}

/// Applies completions until `done` holds.
pub async fn pump_until(controller: &mut GameController, mut done: impl FnMut(&GameController) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done(&*controller) {
            if !controller.process_next().await {
                break;
            }
        }
    })
    .await
    .expect("condition not reached in time");
    assert!(done(&*controller), "event channel closed before condition held");
}

/// Opens the game and waits for the first snapshot.
pub async fn opened(controller: &mut GameController) {
    controller.open();
    pump_until(controller, |c| c.view_model().snapshots_applied() >= 1).await;
}

/// Lets spawned requests run without applying anything.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
