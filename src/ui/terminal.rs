// Terminal UI implementation with ratatui
// Top banner, title, question form and answer display driven by session events

use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal as RatatuiTerminal,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io;
use tokio::sync::mpsc;

use super::answer::{retry_visible, AnswerDisplay};
use super::form::{FormAction, QuestionForm};
use crate::api::{BackendMode, PromptStyle};
use crate::controller::{Controller, SessionEvent, SessionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UIEvent {
    Ask { question: String, style: PromptStyle },
    RetryLive,
    Quit,
}

/// Presentation state, rebuilt from the controller's session events
pub struct App {
    form: QuestionForm,
    session: SessionState,
    answered_at: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            form: QuestionForm::new(),
            session: SessionState::default(),
            answered_at: None,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn apply(&mut self, event: &SessionEvent) {
        if matches!(event, SessionEvent::AnswerChanged(_)) {
            self.answered_at = Some(chrono::Local::now().format("%H:%M:%S").to_string());
        }
        self.session.apply(event);
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<UIEvent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(UIEvent::Quit),
                KeyCode::Char('r') if retry_visible(self.session.backend_mode) => {
                    Some(UIEvent::RetryLive)
                }
                _ => None,
            };
        }

        if key.code == KeyCode::Esc {
            return Some(UIEvent::Quit);
        }

        self.form.handle_key(key).map(|action| match action {
            FormAction::Submit { question, style } => UIEvent::Ask { question, style },
        })
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let banner_height = if self.session.top_banner.is_some() { 3 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(banner_height), // Top banner
                Constraint::Length(1),             // Title
                Constraint::Length(4),             // Question form
                Constraint::Min(6),                // Answer
            ])
            .split(area);

        self.draw_top_banner(frame, chunks[0]);
        self.draw_title(frame, chunks[1]);
        self.form.draw(frame, chunks[2]);
        AnswerDisplay::new(&self.session, self.answered_at.as_deref()).draw(frame, chunks[3]);
    }

    fn draw_top_banner(&self, frame: &mut Frame, area: Rect) {
        let Some(top) = &self.session.top_banner else {
            return;
        };

        let banner = Paragraph::new(top.as_str())
            .style(banner_style(self.session.backend_mode))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });

        frame.render_widget(banner, area);
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(Span::styled(
            "KnowledgeBot",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);

        frame.render_widget(title, area);
    }
}

/// Top banner colour: green for live answers, yellow for mock, gray otherwise
pub fn banner_style(mode: Option<BackendMode>) -> Style {
    let background = match mode {
        Some(BackendMode::OpenAI) => Color::Green,
        Some(BackendMode::Mock) => Color::Yellow,
        _ => Color::Gray,
    };
    Style::default().fg(Color::Black).bg(background)
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the terminal UI event loop
pub async fn run_ui_loop(
    mut app: App,
    controller: Controller,
    mut rx: mpsc::UnboundedReceiver<SessionEvent>,
) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = RatatuiTerminal::new(backend)?;

    // Startup probes never block input
    tokio::spawn({
        let controller = controller.clone();
        async move { controller.initialize().await }
    });

    let result = event_loop(&mut terminal, &mut app, &controller, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut RatatuiTerminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    controller: &Controller,
    rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            app.draw(f, area);
        })?;

        // Handle events (non-blocking)
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_input(key) {
                        Some(UIEvent::Quit) => break,
                        Some(UIEvent::Ask { question, style }) => {
                            let controller = controller.clone();
                            tokio::spawn(async move { controller.ask(&question, style).await });
                        }
                        Some(UIEvent::RetryLive) => {
                            let controller = controller.clone();
                            tokio::spawn(async move { controller.retry_with_live_model().await });
                        }
                        None => {}
                    }
                }
            }
        }

        drain_events(app, rx);
    }

    Ok(())
}

/// Apply pending session events. Stops after a mode clear so the next frame
/// draws the indicator absent before the new mode arrives.
pub fn drain_events(app: &mut App, rx: &mut mpsc::UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.apply(&event);
        if event.is_mode_clear() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert_eq!(app.session(), &SessionState::default());
        assert!(app.answered_at.is_none());
    }

    #[test]
    fn test_submit_becomes_ask() {
        let mut app = App::new();
        app.handle_input(key(KeyCode::Char('h')));
        app.handle_input(key(KeyCode::Char('i')));
        app.handle_input(key(KeyCode::Tab));

        assert_eq!(
            app.handle_input(key(KeyCode::Enter)),
            Some(UIEvent::Ask {
                question: "hi".to_string(),
                style: PromptStyle::Detailed,
            })
        );
    }

    #[test]
    fn test_retry_requires_mock_mode() {
        let mut app = App::new();
        assert_eq!(app.handle_input(ctrl('r')), None);

        app.apply(&SessionEvent::ModeChanged(Some(BackendMode::OpenAI)));
        assert_eq!(app.handle_input(ctrl('r')), None);

        app.apply(&SessionEvent::ModeChanged(Some(BackendMode::Mock)));
        assert_eq!(app.handle_input(ctrl('r')), Some(UIEvent::RetryLive));
    }

    #[test]
    fn test_banner_colour_follows_mode() {
        assert_eq!(banner_style(Some(BackendMode::OpenAI)).bg, Some(Color::Green));
        assert_eq!(banner_style(Some(BackendMode::Mock)).bg, Some(Color::Yellow));
        assert_eq!(banner_style(Some(BackendMode::Unknown)).bg, Some(Color::Gray));
        assert_eq!(banner_style(None).bg, Some(Color::Gray));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new();
        assert_eq!(app.handle_input(key(KeyCode::Esc)), Some(UIEvent::Quit));
        assert_eq!(app.handle_input(ctrl('c')), Some(UIEvent::Quit));
    }

    #[test]
    fn test_answer_change_stamps_time() {
        let mut app = App::new();
        app.apply(&SessionEvent::AnswerChanged("2010".to_string()));
        assert_eq!(app.session().current_answer, "2010");
        assert!(app.answered_at.is_some());
    }

    #[test]
    fn test_drain_stops_after_mode_clear() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new();

        tx.send(SessionEvent::ModeChanged(Some(BackendMode::Mock))).unwrap();
        tx.send(SessionEvent::AnswerChanged("2010".to_string())).unwrap();
        tx.send(SessionEvent::ModeChanged(None)).unwrap();
        tx.send(SessionEvent::ModeChanged(Some(BackendMode::Mock))).unwrap();

        drain_events(&mut app, &mut rx);
        assert_eq!(app.session().backend_mode, None);
        assert_eq!(app.session().current_answer, "2010");

        drain_events(&mut app, &mut rx);
        assert_eq!(app.session().backend_mode, Some(BackendMode::Mock));
    }
}
