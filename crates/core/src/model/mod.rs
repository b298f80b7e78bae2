mod application;
mod attempt;
mod ids;
mod question;
mod result;

pub use ids::{ApplicationId, ParseIdError, UserId};

pub use application::{ApplicationRecord, first_active, is_active_status};
pub use attempt::{Attempt, AttemptError, Score};
pub use question::{AnswerOption, Question, QuestionError};
pub use result::{ExamOutcome, ExamResult};
