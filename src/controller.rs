// Interaction controller
// Owns the session state and turns user actions into backend calls

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::api::protocol::CONNECTIVITY_ERROR;
use crate::api::{AskRequest, Backend, BackendMode, PromptStyle};

/// Everything the client knows about the conversation.
///
/// Created fresh for each process and only ever changed through
/// [`SessionState::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub last_question: String,
    pub last_prompt_type: PromptStyle,
    pub current_answer: String,

    /// `None` until the first probe or ask completes, and briefly while a
    /// new mode is being applied
    pub backend_mode: Option<BackendMode>,

    pub top_banner: Option<String>,
    pub bottom_banner: Option<String>,
}

/// A single change to the session state, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RequestRecorded {
        question: String,
        prompt_type: PromptStyle,
    },
    AnswerChanged(String),
    ModeChanged(Option<BackendMode>),
    BannersChanged {
        top: Option<String>,
        bottom: Option<String>,
    },
}

impl SessionEvent {
    /// True for the transient clear that precedes every post-ask mode update
    pub fn is_mode_clear(&self) -> bool {
        matches!(self, SessionEvent::ModeChanged(None))
    }
}

impl SessionState {
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::RequestRecorded { question, prompt_type } => {
                self.last_question = question.clone();
                self.last_prompt_type = *prompt_type;
            }
            SessionEvent::AnswerChanged(answer) => {
                self.current_answer = answer.clone();
            }
            SessionEvent::ModeChanged(mode) => {
                self.backend_mode = *mode;
            }
            SessionEvent::BannersChanged { top, bottom } => {
                self.top_banner = top.clone();
                self.bottom_banner = bottom.clone();
            }
        }
    }
}

/// Mediates between user actions and the backend.
///
/// Cloning is cheap and every clone shares one session, so each action can
/// run as its own task. Overlapping asks are not ordered: whichever
/// response completes last decides the displayed answer and mode.
#[derive(Clone)]
pub struct Controller {
    backend: Arc<dyn Backend>,
    state: Arc<Mutex<SessionState>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    banners_enabled: bool,
}

impl Controller {
    pub fn new(
        backend: Arc<dyn Backend>,
        banners_enabled: bool,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            backend,
            state: Arc::new(Mutex::new(SessionState::default())),
            events,
            banners_enabled,
        };
        (controller, rx)
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Probe backend status (and banners) once at startup.
    ///
    /// Failures only leave the mode as `Unknown`; nothing else is surfaced.
    pub async fn initialize(&self) {
        tokio::join!(self.probe_status(), self.refresh_banners());
    }

    /// Ask a new question. Empty questions are sent as-is.
    pub async fn ask(&self, question: &str, prompt_type: PromptStyle) {
        // Recorded before the call so a retry has context even if this fails
        self.emit(SessionEvent::RequestRecorded {
            question: question.to_string(),
            prompt_type,
        })
        .await;

        self.submit(AskRequest::new(question, prompt_type)).await;
    }

    /// Re-send the last question, forcing the live model. No-op before the
    /// first question.
    pub async fn retry_with_live_model(&self) {
        let (question, prompt_type) = {
            let state = self.state.lock().await;
            (state.last_question.clone(), state.last_prompt_type)
        };

        if question.is_empty() {
            tracing::debug!("retry requested with no previous question");
            return;
        }

        self.submit(AskRequest::live(question, prompt_type)).await;
    }

    async fn submit(&self, request: AskRequest) {
        match self.backend.ask(&request).await {
            Ok(response) => {
                self.emit(SessionEvent::AnswerChanged(response.display_text())).await;
                if let Some(error) = response.error.as_deref().filter(|e| !e.is_empty()) {
                    tracing::warn!(error, "backend answered with fallback");
                }
                self.refresh_mode(response.resolve_mode()).await;
                self.refresh_banners().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, force_live = request.force_live, "ask failed");
                self.emit(SessionEvent::AnswerChanged(CONNECTIVITY_ERROR.to_string())).await;
                self.emit(SessionEvent::ModeChanged(Some(BackendMode::Unknown))).await;
            }
        }
    }

    /// Clear the mode, give the scheduler a turn, then set the new value.
    /// Observers always see the indicator pass through absent, even when
    /// the mode did not change.
    async fn refresh_mode(&self, mode: BackendMode) {
        self.emit(SessionEvent::ModeChanged(None)).await;
        tokio::task::yield_now().await;
        self.emit(SessionEvent::ModeChanged(Some(mode))).await;
    }

    async fn probe_status(&self) {
        let mode = match self.backend.status().await {
            Ok(status) => status.resolve_mode(),
            Err(e) => {
                tracing::warn!(error = %e, "status fetch failed");
                BackendMode::Unknown
            }
        };
        self.emit(SessionEvent::ModeChanged(Some(mode))).await;
    }

    /// Banner failures keep whatever banners were shown before.
    async fn refresh_banners(&self) {
        if !self.banners_enabled {
            return;
        }

        match self.backend.banner().await {
            Ok(banner) => {
                self.emit(SessionEvent::BannersChanged {
                    top: banner.top_text(),
                    bottom: banner.bottom_text(),
                })
                .await;
            }
            Err(e) => tracing::warn!(error = %e, "banner fetch failed"),
        }
    }

    async fn emit(&self, event: SessionEvent) {
        // Apply and publish under the lock so subscribers see state order
        let mut state = self.state.lock().await;
        state.apply(&event);
        // One-shot CLI commands drop the receiver; the state is still kept
        let _ = self.events.send(event);
    }
}
