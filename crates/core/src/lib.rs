#![forbid(unsafe_code)]

pub mod bank;
pub mod cooldown;
pub mod model;
pub mod scorer;
pub mod session;
pub mod time;

pub use bank::{BankError, QuestionBank};
pub use cooldown::{CooldownLock, Eligibility, RESET_DAYS};
pub use session::{EXAM_DURATION_SECS, EndReason, ExamSession, Navigation, SessionError, SessionPhase, Tick};
pub use time::Clock;
