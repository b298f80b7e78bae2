mod handle;
mod runner;
mod view;

// Public API of the exam subsystem.
pub use crate::error::ExamError;
pub use handle::{Advance, ExamCompletion, ExamHandle};
pub use runner::{ExamRunner, ExamStart, REQUIRED_ROLE};
pub use view::ExamView;
