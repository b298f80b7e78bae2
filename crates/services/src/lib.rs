#![forbid(unsafe_code)]

pub mod app_services;
pub mod cooldown_gate;
pub mod error;
pub mod exam;
pub mod handoff;
pub mod identity;
pub mod publisher;

pub use exam_core::Clock;

pub use app_services::ExamServices;
pub use cooldown_gate::CooldownGate;
pub use error::{AppServicesError, ExamError};
pub use exam::{Advance, ExamCompletion, ExamHandle, ExamRunner, ExamStart, ExamView};
pub use handoff::ResultHandoff;
pub use identity::{Identity, Role, StaticIdentity};
pub use publisher::{ApplicationWrite, PublishReceipt, ResultPublisher};
