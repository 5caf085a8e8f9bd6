// Question submission form
// Collects the question text and prompt style, hands them to the controller on Enter

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::api::PromptStyle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Submit { question: String, style: PromptStyle },
}

/// Local, ephemeral form state. Submitting neither clears nor validates it.
#[derive(Debug, Default)]
pub struct QuestionForm {
    question: String,
    style: PromptStyle,
}

impl QuestionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormAction> {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.question.push(c);
                None
            }
            KeyCode::Backspace => {
                self.question.pop();
                None
            }
            KeyCode::Tab => {
                self.style = self.style.next();
                None
            }
            KeyCode::BackTab => {
                self.style = self.style.previous();
                None
            }
            KeyCode::Enter => Some(FormAction::Submit {
                question: self.question.clone(),
                style: self.style,
            }),
            _ => None,
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" Style: ")];
        for style in PromptStyle::ALL {
            let label = format!(" {} ", style);
            if style == self.style {
                spans.push(Span::styled(
                    label,
                    Style::default().fg(Color::Black).bg(Color::Blue).add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(label, Style::default().fg(Color::DarkGray)));
            }
        }

        let question_line = if self.question.is_empty() {
            Line::from(Span::styled(
                "Ask a question about movies...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        } else {
            Line::from(self.question.as_str())
        };

        let form = Paragraph::new(vec![question_line, Line::from(spans)])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Question (Enter to ask, Tab to change style)"),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(form, area);
    }
}
