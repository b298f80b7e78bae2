use anyhow::bail;
use exam_core::{EndReason, SessionError};
use services::{
    Advance, ApplicationWrite, Clock, ExamCompletion, ExamError, ExamHandle, ExamStart,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::open_services;
use crate::config::AppConfig;
use crate::display;

/// One line typed during the exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    /// Zero-based option index.
    Select(usize),
    Next,
    Previous,
    Submit,
    Quit,
    View,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Ok(number) = line.parse::<usize>() {
            return match number.checked_sub(1) {
                Some(index) => Input::Select(index),
                None => Input::Unknown,
            };
        }
        match line.to_ascii_lowercase().as_str() {
            "n" | "next" => Input::Next,
            "p" | "prev" | "previous" => Input::Previous,
            "s" | "submit" => Input::Submit,
            "q" | "quit" => Input::Quit,
            "" | "v" | "view" => Input::View,
            _ => Input::Unknown,
        }
    }
}

enum Event {
    Finished(Result<ExamCompletion, ExamError>),
    Line(std::io::Result<Option<String>>),
}

pub async fn execute(config: &AppConfig) -> anyhow::Result<()> {
    let clock = Clock::default_clock();
    let services = open_services(config, clock).await?;

    let handle = match services.runner().begin().await {
        Ok(ExamStart::Started(handle)) => handle,
        Ok(ExamStart::Locked(lock)) => {
            println!("{}", display::render_lock(&lock, clock.now()));
            return Ok(());
        }
        Err(ExamError::IdentityMissing) => {
            bail!("sign in as a candidate first (--user / --role or EXAM_USER_ID / EXAM_ROLE)")
        }
        Err(e) => return Err(e.into()),
    };

    let limit = display::format_clock(handle.snapshot().await.remaining_seconds);
    println!("The exam has started. Time limit: {limit}.");
    let Some(completion) = run_session(&handle).await? else {
        handle.abandon();
        println!("Attempt abandoned; nothing was recorded.");
        return Ok(());
    };

    if completion.reason == EndReason::TimedOut {
        println!("\nTime is up. Your answers were submitted automatically.");
    }
    if !completion.receipt.attempt_saved {
        warn!("attempt record was not saved");
        println!("Warning: your attempt could not be recorded.");
    }
    if completion.receipt.application == ApplicationWrite::Failed {
        println!("Warning: the result could not be attached to your application.");
    }

    let result = services
        .handoff()
        .take()
        .unwrap_or(completion.receipt.result);
    println!("{}", display::render_result(&result));
    Ok(())
}

/// Drive the session from stdin until it ends. `None` means the user quit.
async fn run_session(handle: &ExamHandle) -> anyhow::Result<Option<ExamCompletion>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", display::render_question(&handle.snapshot().await));

    loop {
        let event = tokio::select! {
            done = handle.wait_finished() => Event::Finished(done),
            line = lines.next_line() => Event::Line(line),
        };

        let line = match event {
            Event::Finished(done) => return Ok(Some(done?)),
            Event::Line(line) => line?,
        };
        let Some(line) = line else {
            return Ok(None);
        };

        let outcome = match Input::parse(&line) {
            Input::Select(index) => handle.select_answer(index).await.map(|()| None),
            Input::Next => handle.go_to_next().await.map(|advance| match advance {
                Advance::Moved(_) => None,
                Advance::Finished(done) => Some(done),
            }),
            Input::Previous => handle.go_to_previous().await.map(|_| None),
            Input::Submit => handle.submit().await.map(Some),
            Input::Quit => return Ok(None),
            Input::View => Ok(None),
            Input::Unknown => {
                println!("Unrecognized input: {:?}", line.trim());
                continue;
            }
        };

        match outcome {
            Ok(Some(done)) => return Ok(Some(done)),
            Ok(None) => {}
            // The countdown ended the exam first; wait_finished picks it up.
            Err(ExamError::Session(SessionError::NotRunning)) => continue,
            Err(ExamError::Session(SessionError::OptionOutOfRange { option, available })) => {
                println!("There is no option {}; choose 1-{available}.", option + 1);
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        println!("{}", display::render_question(&handle.snapshot().await));
    }
}
