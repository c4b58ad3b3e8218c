//! Terminal UI: one human against the completion-backed opponent.

mod app;
mod input;
mod ui;

pub use app::App;
pub use input::{Action, action_for, key_to_move, move_cursor};

use crate::engine::Engine;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{error, info, instrument};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Runs the game until the player quits, restoring the terminal afterwards.
pub async fn run(engine: Engine) -> Result<()> {
    info!("Starting tic-tac-toe TUI");

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_game(&mut terminal, App::new(engine)).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

#[instrument(skip_all)]
async fn run_game(terminal: &mut Tui, mut app: App) -> Result<()> {
    loop {
        if app.wants_opponent_turn() {
            app.set_thinking();
            terminal.draw(|f| ui::draw(f, &app))?;
            app.play_opponent_turn().await;
            // Drop keys pressed while waiting on the opponent.
            while event::poll(Duration::ZERO)? {
                event::read()?;
            }
            continue;
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match action_for(key, app.cursor()) {
            Action::Quit => {
                info!("User quit");
                return Ok(());
            }
            Action::Reset => app.restart(),
            Action::RetryOpponent => app.retry_opponent(),
            Action::Place(mv) => app.place(mv),
            Action::Cursor(mv) => app.set_cursor(mv),
            Action::Ignore => {}
        }
    }
}
