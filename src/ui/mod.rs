// Terminal UI - the face of the dashboard
// One continuously redrawn region on the alternate screen, no scrollback spam

mod app;        // tick loop: input -> fetch -> merge -> art -> render
mod draw;       // DashboardView -> ratatui widgets
pub mod events; // non-blocking keys + playback commands
pub mod view;   // pure frame layout

pub use app::{App, TickOutcome};
pub use events::{Command, Input, InputMultiplexer, KeySource, TerminalKeys};
pub use view::{format_time, render, DashboardView};

use anyhow::Result;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

/// Where finished frames go.
pub trait FrameSink {
    fn show(&mut self, view: &DashboardView<'_>) -> Result<()>;
}

pub struct TerminalManager {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    _cleanup_guard: CleanupGuard,
}

struct CleanupGuard;

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        // Restore no matter how we got here - stdout may already be half gone
        let _ = disable_raw_mode();

        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }
}

impl TerminalManager {
    pub fn new() -> Result<Self> {
        // Ensure clean terminal state first
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);

        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            _cleanup_guard: CleanupGuard,
        })
    }
}

impl FrameSink for TerminalManager {
    fn show(&mut self, view: &DashboardView<'_>) -> Result<()> {
        self.terminal.draw(|f| draw::draw_dashboard(f, view))?;
        Ok(())
    }
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        let _ = self.terminal.clear();
        let _ = self.terminal.show_cursor();
        // CleanupGuard will handle the rest
    }
}
