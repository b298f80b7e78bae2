//! Plain-text rendering of exam screens.

use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use exam_core::CooldownLock;
use exam_core::model::ExamResult;
use services::ExamView;

/// Countdown as `mm:ss`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Coarse duration such as `6d 23h 59m`; minutes round up so a lock never
/// reads as `0m` while it still holds.
#[must_use]
pub fn format_wait(wait: Duration) -> String {
    let minutes = (wait.num_seconds().max(0) + 59) / 60;
    let (days, rest) = (minutes / (24 * 60), minutes % (24 * 60));
    let (hours, minutes) = (rest / 60, rest % 60);
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[must_use]
pub fn render_question(view: &ExamView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] Question {}/{}  ({} answered)",
        format_clock(view.remaining_seconds),
        view.index + 1,
        view.total,
        view.answered
    );
    let _ = writeln!(out, "{}", view.question);
    for (i, option) in view.options.iter().enumerate() {
        let marker = if view.selected == Some(i) { '*' } else { ' ' };
        let _ = writeln!(out, " {marker} {}) {option}", i + 1);
    }
    let moves = if view.is_last { "s submit" } else { "n next, s submit" };
    let _ = write!(out, "1-{} answer, p previous, {moves}, q quit", view.options.len());
    out
}

#[must_use]
pub fn render_lock(lock: &CooldownLock, now: DateTime<Utc>) -> String {
    let last = lock.last_attempt.score();
    format!(
        "You already took the exam on {}, scoring {:.1}% ({}/{}).\n\
         Next attempt available {} (in {}).",
        lock.last_attempt.completed_at().format("%Y-%m-%d %H:%M UTC"),
        last.percentage,
        last.correct,
        last.total,
        lock.retry_at.format("%Y-%m-%d %H:%M UTC"),
        format_wait(lock.remaining(now)),
    )
}

#[must_use]
pub fn render_result(result: &ExamResult) -> String {
    let verdict = if result.passed { "PASSED" } else { "NOT PASSED" };
    let mut out = format!(
        "{verdict}: {:.1}% ({} of {} correct)",
        result.percentage, result.correct, result.total
    );
    if let Some(id) = result.application_id {
        let _ = write!(out, "\nRecorded on application {id}.");
    }
    out
}
