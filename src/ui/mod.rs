// Terminal UI module
// Question form, answer display and the interactive event loop

pub mod answer;
pub mod form;
pub mod terminal;

pub use answer::{retry_visible, status_line, AnswerDisplay};
pub use form::{FormAction, QuestionForm};
pub use terminal::{run_ui_loop, App, UIEvent};
