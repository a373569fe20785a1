//! Game picker shown when no game is named on the command line.

use anyhow::Result;
use chess_client::{ClientError, GameService};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tokio::time::Duration;
use tracing::{info, instrument, warn};

/// What a key press asks the picker loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    /// Nothing beyond local state.
    None,
    /// Fetch the game list again.
    Reload,
    /// Open this game.
    Open(String),
    /// Leave without choosing.
    Quit,
}

/// List of games with a selection.
#[derive(Debug, Default)]
pub struct GamePicker {
    games: Vec<String>,
    selected: usize,
    message: Option<String>,
}

impl GamePicker {
    /// Creates an empty picker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Games on offer.
    pub fn games(&self) -> &[String] {
        &self.games
    }

    /// Index of the highlighted game.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Status or error line.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Replaces the list with a fresh answer from the server.
    pub fn set_games(&mut self, result: Result<Vec<String>, ClientError>) {
        match result {
            Ok(games) => {
                self.message = games
                    .is_empty()
                    .then(|| "No games on the server. Create one with `chess_tui games create NAME`.".to_string());
                self.selected = self.selected.min(games.len().saturating_sub(1));
                self.games = games;
            }
            Err(e) => {
                warn!(error = %e, "Could not list games");
                self.message = Some(e.user_message());
            }
        }
    }

    /// Applies one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> PickerAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => PickerAction::Quit,
            KeyCode::Char('r') => PickerAction::Reload,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                PickerAction::None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.games.len() {
                    self.selected += 1;
                }
                PickerAction::None
            }
            KeyCode::Enter => match self.games.get(self.selected) {
                Some(game) => PickerAction::Open(game.clone()),
                None => PickerAction::None,
            },
            _ => PickerAction::None,
        }
    }

    /// Renders the picker.
    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(3),    // Games
                Constraint::Length(1), // Message
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        let title = Paragraph::new("Chess - choose a game")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        let items: Vec<ListItem> = self.games.iter().map(|g| ListItem::new(g.as_str())).collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Games "))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .highlight_symbol("> ");
        let mut state = ListState::default()
            .with_selected((!self.games.is_empty()).then_some(self.selected));
        frame.render_stateful_widget(list, chunks[1], &mut state);

        if let Some(message) = &self.message {
            let line = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            frame.render_widget(line, chunks[2]);
        }

        let help = Paragraph::new("Up/Down select  Enter open  r reload  q quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(help, chunks[3]);
    }
}

/// Lets the user choose a game. Returns `None` if they quit.
#[instrument(skip_all)]
pub async fn pick_game<B: Backend>(
    terminal: &mut Terminal<B>,
    service: &dyn GameService,
) -> Result<Option<String>>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    let mut picker = GamePicker::new();
    picker.set_games(service.list_games().await);

    loop {
        terminal.draw(|f| picker.draw(f))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match picker.handle_key(key) {
                PickerAction::None => {}
                PickerAction::Reload => picker.set_games(service.list_games().await),
                PickerAction::Open(game) => {
                    info!(game = %game, "Game chosen");
                    return Ok(Some(game));
                }
                PickerAction::Quit => return Ok(None),
            }
        }
    }
}
