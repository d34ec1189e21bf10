//! Generic error screen for displaying human-readable error messages.
//!
//! Full-screen error display used for fatal startup problems (bad config,
//! missing credentials) before the practice screen can take over.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use std::io::{self, Stdout};

/// Full-screen error display, dismissed by any key press.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized or raw mode enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Displays the message centered on a red background and waits for any
    /// key press to dismiss it.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                let message = format!("{error_message}\n\nPress any key to continue...");

                let paragraph = Paragraph::new(message)
                    .style(Style::default().fg(Color::White).bg(Color::Red))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });

                let vertical_pad = area.height.saturating_sub(6) / 2;
                let centered = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + vertical_pad,
                    width: area.width - area.width / 5,
                    height: area.height.saturating_sub(vertical_pad * 2),
                };

                frame.render_widget(
                    Paragraph::new("").style(Style::default().bg(Color::Red)),
                    area,
                );
                frame.render_widget(paragraph, centered);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Leaves the alternate screen and restores the terminal.
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
