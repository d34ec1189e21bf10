//! Terminal UI for the practice screen.
//!
//! Renders the four phases of the recording workflow (idle, recording,
//! scoring, result) and translates key presses into [`ScreenCommand`]s. All
//! state decisions live in the command handler, not here.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use std::io::{stdout, Stdout};

use crate::feedback::{self, FeedbackTier, ResultPanel};
use crate::playback::PlaybackState;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// User input command during the practice workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCommand {
    /// No key pressed; keep rendering.
    Continue,
    /// Start or stop recording (Space or 'r').
    ToggleRecord,
    /// Cancel the in-flight scoring request ('c').
    CancelScoring,
    /// Toggle playback of the recorded artifact ('p').
    PlayPause,
    /// Seek one second backward (Left arrow).
    SeekBack,
    /// Seek one second forward (Right arrow).
    SeekForward,
    /// Dismiss the result panel ('d' or Escape).
    Dismiss,
    /// Exit the screen ('q').
    Quit,
}

/// Which part of the workflow the screen is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recording,
    Scoring,
    Result,
}

/// Everything one frame needs. Borrowed from the command handler's state so
/// the TUI itself stays stateless apart from the terminal and spinner.
pub struct ScreenView<'a> {
    pub phase: Phase,
    pub elapsed_seconds: u64,
    pub panel: &'a ResultPanel,
    pub playback: PlaybackState,
    pub notice: Option<&'a str>,
}

/// Terminal UI for the pronunciation practice screen.
pub struct PracticeTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    spinner_frame: usize,
}

impl PracticeTui {
    /// Creates the TUI and enters alternate screen mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized or raw mode enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(out);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            spinner_frame: 0,
        })
    }

    /// Polls for one key press, mapping it to a command. Returns `Continue`
    /// when no key arrived within the frame budget.
    ///
    /// # Errors
    /// - If reading terminal events fails
    pub fn handle_input(&mut self) -> anyhow::Result<ScreenCommand> {
        if !event::poll(std::time::Duration::from_millis(50))? {
            return Ok(ScreenCommand::Continue);
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(ScreenCommand::Continue);
            }
            let command = match key.code {
                KeyCode::Char(' ') | KeyCode::Char('r') => ScreenCommand::ToggleRecord,
                KeyCode::Char('c') => ScreenCommand::CancelScoring,
                KeyCode::Char('p') => ScreenCommand::PlayPause,
                KeyCode::Left => ScreenCommand::SeekBack,
                KeyCode::Right => ScreenCommand::SeekForward,
                KeyCode::Char('d') | KeyCode::Esc => ScreenCommand::Dismiss,
                KeyCode::Char('q') => ScreenCommand::Quit,
                _ => ScreenCommand::Continue,
            };
            return Ok(command);
        }

        Ok(ScreenCommand::Continue)
    }

    /// Renders one frame of the current phase.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, view: &ScreenView) -> anyhow::Result<()> {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        let spinner = SPINNER_FRAMES[self.spinner_frame];

        self.terminal.draw(|frame| {
            let [title_area, body_area, notice_area] = Layout::vertical([
                Constraint::Length(2),
                Constraint::Min(8),
                Constraint::Length(2),
            ])
            .areas(frame.area());

            let title = Paragraph::new("Pronunciation Rater")
                .style(Style::default().fg(Color::Green).bold());
            frame.render_widget(title, title_area);

            match view.phase {
                Phase::Idle => render_idle(frame, body_area),
                Phase::Recording => render_recording(frame, body_area, view.elapsed_seconds),
                Phase::Scoring => render_scoring(frame, body_area, spinner),
                Phase::Result => render_result(frame, body_area, view),
            }

            if let Some(notice) = view.notice {
                let paragraph = Paragraph::new(notice)
                    .style(Style::default().fg(Color::Yellow))
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, notice_area);
            }
        })?;

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

fn render_idle(frame: &mut Frame, area: Rect) {
    let text = "Press Space to start recording.\n\nq: quit";
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        area,
    );
}

fn render_recording(frame: &mut Frame, area: Rect, elapsed_seconds: u64) {
    let text = format!(
        "● Recording...\n\n{elapsed_seconds}s\n\nPress Space to stop and score"
    );
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center),
        area,
    );
}

fn render_scoring(frame: &mut Frame, area: Rect, spinner: &str) {
    let text = format!("{spinner} Scoring pronunciation...\n\nc: cancel");
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        area,
    );
}

fn render_result(frame: &mut Frame, area: Rect, view: &ScreenView) {
    let Some(result) = view.panel.result() else {
        return;
    };

    let scaled = result.scaled_score();
    let tier = FeedbackTier::from_scaled(scaled);

    let [feedback_area, gauge_area, text_area, player_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(area);

    let feedback = format!("{}\n{}", tier.stars(), tier.label());
    frame.render_widget(
        Paragraph::new(feedback)
            .style(Style::default().fg(Color::Green))
            .alignment(Alignment::Center),
        feedback_area,
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Score"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(feedback::gauge_ratio(scaled))
        .label(format!("{} / 100", feedback::gauge_value(scaled)));
    frame.render_widget(gauge, gauge_area);

    frame.render_widget(
        Paragraph::new(result.recognized_text.as_str())
            .block(Block::default().borders(Borders::ALL).title("Recognized"))
            .wrap(Wrap { trim: true }),
        text_area,
    );

    let playback = view.playback;
    let position_secs = playback.position_millis / 1000;
    let duration_secs = playback.duration_millis / 1000;
    let ratio = if playback.duration_millis > 0 {
        playback.position_millis as f64 / playback.duration_millis as f64
    } else {
        0.0
    };
    let play_icon = if playback.is_playing { "⏸" } else { "▶" };
    let scrubber = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "{play_icon} {position_secs}s / {duration_secs}s   p: play/pause  ←/→: seek  d: dismiss"
        )))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio.clamp(0.0, 1.0))
        .label("");
    frame.render_widget(scrubber, player_area);
}
