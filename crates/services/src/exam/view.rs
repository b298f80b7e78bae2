use exam_core::ExamSession;
use serde::Serialize;

/// Presentation-agnostic snapshot of a live exam.
///
/// Holds no pre-formatted strings; the front end decides how to render the
/// countdown and option labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamView {
    pub index: usize,
    pub total: usize,
    pub question: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub answered: usize,
    pub remaining_seconds: u32,
    pub is_last: bool,
    pub is_running: bool,
}

impl ExamView {
    #[must_use]
    pub fn from_session(session: &ExamSession) -> Self {
        let question = session.current_question();
        Self {
            index: session.current_index(),
            total: session.total_questions(),
            question: question.text().to_owned(),
            options: question.options().iter().map(|o| o.text.clone()).collect(),
            selected: session.current_answer(),
            answered: session.answered_count(),
            remaining_seconds: session.remaining_seconds(),
            is_last: session.is_last_question(),
            is_running: session.is_running(),
        }
    }
}
