// Answer display
// Renders the answer, a mode-derived status line, the bottom banner and the retry control

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::api::BackendMode;
use crate::controller::SessionState;

pub const LIVE_STATUS: &str = "Source: OpenAI API (live model)";
pub const MOCK_STATUS: &str = "Source: Mock / Fallback (live model not used)";
pub const UNKNOWN_STATUS: &str = "Source: Unknown (backend status unavailable)";

pub const RETRY_HINT: &str = "[Ctrl+R] Retry with OpenAI";

/// Status line for a mode; nothing is shown until a mode is known.
pub fn status_line(mode: Option<BackendMode>) -> Option<&'static str> {
    mode.map(|mode| match mode {
        BackendMode::OpenAI => LIVE_STATUS,
        BackendMode::Mock => MOCK_STATUS,
        BackendMode::Unknown => UNKNOWN_STATUS,
    })
}

/// The retry control exists only after a mock/fallback answer.
pub fn retry_visible(mode: Option<BackendMode>) -> bool {
    mode == Some(BackendMode::Mock)
}

pub struct AnswerDisplay<'a> {
    session: &'a SessionState,
    answered_at: Option<&'a str>,
}

impl<'a> AnswerDisplay<'a> {
    pub fn new(session: &'a SessionState, answered_at: Option<&'a str>) -> Self {
        Self { session, answered_at }
    }

    /// Lines below the answer text
    pub fn footer_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        if let Some(status) = status_line(self.session.backend_mode) {
            let color = match self.session.backend_mode {
                Some(BackendMode::OpenAI) => Color::Green,
                Some(BackendMode::Mock) => Color::Yellow,
                _ => Color::Gray,
            };
            lines.push(Line::from(Span::styled(status, Style::default().fg(color))));
        }

        if let Some(bottom) = &self.session.bottom_banner {
            lines.push(Line::from(Span::styled(
                bottom.clone(),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        if retry_visible(self.session.backend_mode) {
            lines.push(Line::from(Span::styled(
                RETRY_HINT,
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )));
        }

        lines
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = self
            .session
            .current_answer
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect();

        let footer = self.footer_lines();
        if !footer.is_empty() {
            lines.push(Line::from(""));
            lines.extend(footer);
        }

        let title = match self.answered_at {
            Some(time) => format!("Answer ({})", time),
            None => "Answer".to_string(),
        };

        let answer = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });

        frame.render_widget(answer, area);
    }
}
