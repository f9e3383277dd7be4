//! Terminal user interface
//!
//! Renders the live leaderboard in the alternate screen, refreshed on the
//! configured interval. The event loop is synchronous: the core runs on
//! its own OS threads and the UI only takes snapshots.

mod app;
mod log_capture;
mod ui;

pub use app::TuiApp;
pub use log_capture::{LogBuffer, LogMakeWriter, LogWriter};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

/// Run the TUI until the user quits (q, Esc or Ctrl+C).
pub fn run(mut app: TuiApp) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut TuiApp,
) -> Result<()> {
    loop {
        app.refresh_if_due();
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(app.tick_timeout())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }
    }
    Ok(())
}
