//! Application state and input handling for the board screen.

use anyhow::Result;
use chess_client::{ControllerStep, Coordinate, GameController};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::Backend};
use tokio::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::input::{self, ScreenSquare};
use crate::ui::{self, BoardLayout};

const INPUT_SLICE: Duration = Duration::from_millis(50);

/// Board screen state: the game controller plus the keyboard cursor.
#[derive(Debug)]
pub struct App {
    controller: GameController,
    cursor: ScreenSquare,
    board_layout: BoardLayout,
    should_quit: bool,
}

impl App {
    /// Creates the board screen for an already constructed controller.
    pub fn new(controller: GameController) -> Self {
        Self {
            controller,
            cursor: (6, 4),
            board_layout: BoardLayout::default(),
            should_quit: false,
        }
    }

    /// Game controller.
    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    /// Keyboard cursor in screen coordinates.
    pub fn cursor(&self) -> ScreenSquare {
        self.cursor
    }

    /// Stored coordinate under the keyboard cursor.
    pub fn cursor_coordinate(&self) -> Option<Coordinate> {
        self.controller
            .view_model()
            .orientation()
            .from_display(self.cursor.0, self.cursor.1)
    }

    /// Whether the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Runs the board event loop until the user quits.
    #[instrument(skip(self, terminal), fields(game = %self.controller.view_model().game()))]
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        <B as Backend>::Error: Send + Sync + 'static,
    {
        info!("Starting board event loop");
        self.controller.open();
        let mut timer = self.controller.poll_timer();

        while !self.should_quit {
            self.controller.process_pending();

            let mut layout = self.board_layout;
            let app = &*self;
            terminal.draw(|f| layout = ui::draw(f, app))?;
            self.board_layout = layout;

            // Bounded wait keeps the keyboard responsive between completions.
            match tokio::time::timeout(INPUT_SLICE, self.controller.step(&mut timer)).await {
                Ok(ControllerStep::Ticked(outcome)) => debug!(%outcome, "Polling tick"),
                Ok(ControllerStep::Closed) => {
                    warn!("Request channel closed");
                    self.should_quit = true;
                }
                Ok(ControllerStep::Applied) | Err(_) => {}
            }

            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        info!("Board event loop finished");
        Ok(())
    }

    /// Applies one key press.
    ///
    /// While a notification is showing, any key only dismisses it.
    #[instrument(skip(self), fields(code = ?key.code))]
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.controller.notification().is_some() {
            self.controller.dismiss_notification();
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                info!("User quit");
                self.should_quit = true;
            }
            code if input::is_arrow(code) => {
                self.cursor = input::move_cursor(self.cursor, code);
                if self.controller.is_dragging()
                    && let Some(target) = self.cursor_coordinate()
                {
                    self.controller.hover_target(target);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let Some(square) = self.cursor_coordinate() else {
                    return;
                };
                if self.controller.is_dragging() {
                    self.controller.drop_on(square);
                    self.controller.end_drag();
                } else {
                    self.controller.begin_drag(square);
                }
            }
            KeyCode::Esc => self.controller.end_drag(),
            KeyCode::Char('[') => {
                self.controller.step_history(-1);
            }
            KeyCode::Char(']') => {
                self.controller.step_history(1);
            }
            KeyCode::Char('a') => {
                let enabled = self.controller.toggle_auto_respond();
                info!(enabled, "Auto-respond toggled");
            }
            KeyCode::Char('r') => self.controller.refresh(),
            _ => {}
        }
    }

    /// Applies one mouse event against the last drawn board.
    ///
    /// Releasing the button off the board abandons the drag without a request.
    #[instrument(skip(self), fields(kind = ?mouse.kind, column = mouse.column, row = mouse.row))]
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.controller.notification().is_some() {
            return;
        }
        let square = self.board_layout.square_at(mouse.column, mouse.row);
        let coordinate = square.and_then(|(row, col)| {
            self.controller
                .view_model()
                .orientation()
                .from_display(row, col)
        });

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let (Some(screen), Some(source)) = (square, coordinate) {
                    self.cursor = screen;
                    self.controller.begin_drag(source);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let (Some(screen), Some(target)) = (square, coordinate) {
                    self.cursor = screen;
                    self.controller.hover_target(target);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(target) = coordinate {
                    self.controller.drop_on(target);
                } else {
                    debug!("Released off the board");
                }
                self.controller.end_drag();
            }
            _ => {}
        }
    }

    /// Replaces the board geometry used to map mouse positions.
    pub fn set_board_layout(&mut self, layout: BoardLayout) {
        self.board_layout = layout;
    }
}
