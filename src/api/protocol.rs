// Wire contract for the KnowledgeBot backend
// JSON responses from GET /, GET /banner and POST /ask; form-encoded ask body

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Shown in place of an answer when the backend could not be reached.
pub const CONNECTIVITY_ERROR: &str = "Error contacting backend. Make sure it is running.";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown prompt style: {0} (expected concise, detailed or bullet)")]
    UnknownPromptStyle(String),
}

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Live language-model call
    OpenAI,

    /// Simulated or fallback answer
    Mock,

    /// Backend unreachable or mode not reported
    Unknown,
}

impl BackendMode {
    /// Map the backend's mode text onto the closed set of modes.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "OpenAI" | "OpenAIMode" => BackendMode::OpenAI,
            "Mock" | "MockMode" => BackendMode::Mock,
            _ => BackendMode::Unknown,
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::OpenAI => write!(f, "OpenAI"),
            BackendMode::Mock => write!(f, "Mock"),
            BackendMode::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Answer formatting preference, passed through to the backend uninterpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    #[default]
    Concise,
    Detailed,
    Bullet,
}

impl PromptStyle {
    pub const ALL: [PromptStyle; 3] = [PromptStyle::Concise, PromptStyle::Detailed, PromptStyle::Bullet];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Concise => "concise",
            PromptStyle::Detailed => "detailed",
            PromptStyle::Bullet => "bullet",
        }
    }

    pub fn next(self) -> Self {
        match self {
            PromptStyle::Concise => PromptStyle::Detailed,
            PromptStyle::Detailed => PromptStyle::Bullet,
            PromptStyle::Bullet => PromptStyle::Concise,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            PromptStyle::Concise => PromptStyle::Bullet,
            PromptStyle::Detailed => PromptStyle::Concise,
            PromptStyle::Bullet => PromptStyle::Detailed,
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStyle {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProtocolError::UnknownPromptStyle(s.to_string()))
    }
}

/// Response of the status probe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub mode: Option<String>,
}

impl StatusResponse {
    /// A status without a mode is treated as unknown.
    pub fn resolve_mode(&self) -> BackendMode {
        self.mode
            .as_deref()
            .map(BackendMode::from_wire)
            .unwrap_or(BackendMode::Unknown)
    }
}

/// Response of the banner probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BannerResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub top: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub bottom: Option<String>,
}

impl BannerResponse {
    pub fn top_text(&self) -> Option<String> {
        non_empty(self.top.as_deref())
    }

    pub fn bottom_text(&self) -> Option<String> {
        non_empty(self.bottom.as_deref())
    }
}

/// Form body of POST /ask
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    pub question: String,

    pub prompt_type: PromptStyle,

    /// Sent as `force_openai=true`; omitted entirely when false
    #[serde(rename = "force_openai", skip_serializing_if = "is_false")]
    pub force_live: bool,
}

impl AskRequest {
    pub fn new(question: impl Into<String>, prompt_type: PromptStyle) -> Self {
        Self {
            question: question.into(),
            prompt_type,
            force_live: false,
        }
    }

    /// Same request, asking the backend to use the live model
    pub fn live(question: impl Into<String>, prompt_type: PromptStyle) -> Self {
        Self {
            force_live: true,
            ..Self::new(question, prompt_type)
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Response of POST /ask
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub answer: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub mode: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub error: Option<String>,
}

impl AskResponse {
    /// An ask response without a mode came from the mock path.
    pub fn resolve_mode(&self) -> BackendMode {
        self.mode
            .as_deref()
            .map(BackendMode::from_wire)
            .unwrap_or(BackendMode::Mock)
    }

    /// Text to display for this response.
    ///
    /// When the backend reports an error, both the error and the fallback
    /// answer are kept.
    pub fn display_text(&self) -> String {
        compose_answer(
            self.answer.as_deref().unwrap_or_default(),
            self.error.as_deref(),
        )
    }
}

pub fn compose_answer(answer: &str, error: Option<&str>) -> String {
    match error {
        Some(error) if !error.is_empty() => {
            format!("[Error] {}\n\nMock Answer: {}", error, answer)
        }
        _ => answer.to_string(),
    }
}

/// Accept any JSON value for a text field: null is absent, strings are kept,
/// anything else is carried as its JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_wire() {
        assert_eq!(BackendMode::from_wire("OpenAI"), BackendMode::OpenAI);
        assert_eq!(BackendMode::from_wire("OpenAIMode"), BackendMode::OpenAI);
        assert_eq!(BackendMode::from_wire("Mock"), BackendMode::Mock);
        assert_eq!(BackendMode::from_wire("MockMode"), BackendMode::Mock);
        assert_eq!(BackendMode::from_wire("Turbo"), BackendMode::Unknown);
        assert_eq!(BackendMode::from_wire(""), BackendMode::Unknown);
    }

    #[test]
    fn test_prompt_style_parsing() {
        assert_eq!("concise".parse::<PromptStyle>(), Ok(PromptStyle::Concise));
        assert_eq!("Detailed".parse::<PromptStyle>(), Ok(PromptStyle::Detailed));
        assert_eq!(" bullet ".parse::<PromptStyle>(), Ok(PromptStyle::Bullet));
        assert_eq!(
            "verbose".parse::<PromptStyle>(),
            Err(ProtocolError::UnknownPromptStyle("verbose".to_string()))
        );
    }

    #[test]
    fn test_prompt_style_cycle() {
        let mut style = PromptStyle::default();
        assert_eq!(style, PromptStyle::Concise);

        for _ in 0..3 {
            style = style.next();
        }
        assert_eq!(style, PromptStyle::Concise);
        assert_eq!(PromptStyle::Concise.previous(), PromptStyle::Bullet);
    }

    #[test]
    fn test_status_missing_mode_is_unknown() {
        let status: StatusResponse =
            serde_json::from_str(r#"{"app":"KnowledgeBot","status":"running"}"#).unwrap();
        assert_eq!(status.resolve_mode(), BackendMode::Unknown);

        let status: StatusResponse = serde_json::from_str(r#"{"mode":"OpenAI"}"#).unwrap();
        assert_eq!(status.resolve_mode(), BackendMode::OpenAI);
    }

    #[test]
    fn test_ask_missing_mode_is_mock() {
        let response: AskResponse = serde_json::from_str(r#"{"answer":"2010"}"#).unwrap();
        assert_eq!(response.resolve_mode(), BackendMode::Mock);
        assert_eq!(response.display_text(), "2010");
    }

    #[test]
    fn test_ask_error_composition() {
        let response: AskResponse = serde_json::from_str(
            r#"{"answer":"I don't know","mode":"MockMode","error":"rate limited"}"#,
        )
        .unwrap();
        assert_eq!(
            response.display_text(),
            "[Error] rate limited\n\nMock Answer: I don't know"
        );
    }

    #[test]
    fn test_empty_error_keeps_raw_answer() {
        assert_eq!(compose_answer("2010", Some("")), "2010");
        assert_eq!(compose_answer("2010", None), "2010");
    }

    #[test]
    fn test_null_answer_displays_empty() {
        let response: AskResponse = serde_json::from_str(r#"{"answer":null}"#).unwrap();
        assert_eq!(response.display_text(), "");
    }

    #[test]
    fn test_wrongly_typed_mode_keeps_answer() {
        let response: AskResponse = serde_json::from_str(r#"{"answer":"2010","mode":1}"#).unwrap();
        assert_eq!(response.display_text(), "2010");
        assert_eq!(response.resolve_mode(), BackendMode::Unknown);
    }

    #[test]
    fn test_non_string_answer_rendered_as_json() {
        let response: AskResponse = serde_json::from_str(r#"{"answer":2010,"mode":"Mock"}"#).unwrap();
        assert_eq!(response.display_text(), "2010");
        assert_eq!(response.resolve_mode(), BackendMode::Mock);

        let response: AskResponse =
            serde_json::from_str(r#"{"answer":["Nolan","Villeneuve"],"error":{"code":429}}"#).unwrap();
        assert_eq!(
            response.display_text(),
            "[Error] {\"code\":429}\n\nMock Answer: [\"Nolan\",\"Villeneuve\"]"
        );
    }

    #[test]
    fn test_wrongly_typed_status_mode_is_unknown() {
        let status: StatusResponse = serde_json::from_str(r#"{"mode":true}"#).unwrap();
        assert_eq!(status.resolve_mode(), BackendMode::Unknown);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(BackendMode::OpenAI.to_string(), "OpenAI");
        assert_eq!(BackendMode::Mock.to_string(), "Mock");
        assert_eq!(BackendMode::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_empty_banners_are_absent() {
        let banner: BannerResponse = serde_json::from_str(r#"{"top":"","bottom":"Powered by mocks"}"#).unwrap();
        assert_eq!(banner.top_text(), None);
        assert_eq!(banner.bottom_text(), Some("Powered by mocks".to_string()));
    }

    #[test]
    fn test_ask_request_constructors() {
        let plain = AskRequest::new("Who directed Heat?", PromptStyle::Bullet);
        assert!(!plain.force_live);

        let live = AskRequest::live("Who directed Heat?", PromptStyle::Bullet);
        assert!(live.force_live);
        assert_eq!(live.question, plain.question);
        assert_eq!(live.prompt_type, PromptStyle::Bullet);
    }
}
