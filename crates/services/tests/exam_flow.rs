use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use exam_core::model::{AnswerOption, ApplicationId, ApplicationRecord, Attempt, Question, Score, UserId};
use exam_core::time::fixed_now;
use exam_core::{EXAM_DURATION_SECS, EndReason, QuestionBank, SessionError};
use services::{
    Advance, ApplicationWrite, Clock, ExamError, ExamHandle, ExamServices, ExamStart, Role,
    StaticIdentity,
};
use storage::repository::{
    ApplicationRepository, AttemptRepository, InMemoryRepository, Storage, StorageError,
};
use tokio::time::Instant;

fn user() -> UserId {
    UserId::new(1)
}

fn bank() -> Arc<QuestionBank> {
    let questions = (0..16)
        .map(|i| {
            let options = (0..3)
                .map(|o| AnswerOption::new(format!("Option {o}"), o == correct_option(i)))
                .collect();
            Question::new(format!("Question {i}"), options).unwrap()
        })
        .collect();
    Arc::new(QuestionBank::new(questions))
}

fn correct_option(question: usize) -> usize {
    question % 3
}

/// Counts attempt writes so double publishing is visible. A non-zero
/// `write_delay` makes every save take that long.
#[derive(Clone, Default)]
struct CountingAttempts {
    inner: InMemoryRepository,
    puts: Arc<AtomicUsize>,
    write_delay: Duration,
}

#[async_trait]
impl AttemptRepository for CountingAttempts {
    async fn get_attempt(&self, user_id: UserId) -> Result<Option<Attempt>, StorageError> {
        self.inner.get_attempt(user_id).await
    }

    async fn put_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }
        self.inner.put_attempt(attempt).await
    }
}

struct Harness {
    services: ExamServices,
    repo: InMemoryRepository,
    attempts: CountingAttempts,
}

fn harness_with(clock: Clock, identity: StaticIdentity) -> Harness {
    build_harness(clock, identity, Duration::ZERO)
}

fn build_harness(clock: Clock, identity: StaticIdentity, write_delay: Duration) -> Harness {
    let repo = InMemoryRepository::new();
    let attempts = CountingAttempts {
        inner: repo.clone(),
        puts: Arc::new(AtomicUsize::new(0)),
        write_delay,
    };
    let storage = Storage {
        attempts: Arc::new(attempts.clone()),
        applications: Arc::new(repo.clone()),
    };
    let services = ExamServices::from_storage(&storage, clock, bank(), Arc::new(identity));
    Harness {
        services,
        repo,
        attempts,
    }
}

fn harness() -> Harness {
    harness_with(
        Clock::fixed(fixed_now()),
        StaticIdentity::signed_in(user(), Role::Candidate),
    )
}

async fn begin(h: &Harness) -> ExamHandle {
    match h.services.runner().begin().await.expect("begin") {
        ExamStart::Started(handle) => handle,
        ExamStart::Locked(lock) => panic!("unexpected cooldown lock until {}", lock.retry_at),
    }
}

#[tokio::test(start_paused = true)]
async fn all_correct_answers_pass() {
    let h = harness();
    h.repo
        .upsert_application(&ApplicationRecord::new(
            ApplicationId::new(5),
            user(),
            "pending",
            fixed_now(),
        ))
        .await
        .unwrap();
    let handle = begin(&h).await;

    let mut completion = None;
    for i in 0..16 {
        assert_eq!(handle.snapshot().await.index, i);
        handle.select_answer(correct_option(i)).await.unwrap();
        match handle.go_to_next().await.unwrap() {
            Advance::Moved(next) => assert_eq!(next, i + 1),
            Advance::Finished(done) => completion = Some(done),
        }
    }

    let completion = completion.expect("last next submits");
    let result = &completion.receipt.result;
    assert_eq!(completion.reason, EndReason::Submitted);
    assert_eq!((result.correct, result.total), (16, 16));
    assert_eq!(result.percentage, 100.0);
    assert!(result.passed);
    assert_eq!(result.application_id, Some(ApplicationId::new(5)));
    assert_eq!(
        completion.receipt.application,
        ApplicationWrite::Attached(ApplicationId::new(5))
    );

    let stored = h.repo.get_attempt(user()).await.unwrap().expect("attempt saved");
    assert_eq!(stored.score(), Score::from_counts(16, 16));
    let app = h.repo.get_application(ApplicationId::new(5)).await.unwrap();
    assert!(app.exam.expect("outcome attached").passed);

    let handoff = h.services.handoff();
    assert_eq!(handoff.take().as_ref(), Some(result));
    assert!(handoff.take().is_none());
}

#[tokio::test(start_paused = true)]
async fn eleven_of_sixteen_fails() {
    let h = harness();
    let handle = begin(&h).await;

    for i in 0..16 {
        if i < 11 {
            handle.select_answer(correct_option(i)).await.unwrap();
        }
        if i < 15 {
            handle.go_to_next().await.unwrap();
        }
    }
    let completion = handle.submit().await.unwrap();
    let result = completion.receipt.result;
    assert_eq!(result.correct, 11);
    assert_eq!(result.total, 16);
    assert_eq!(result.percentage, 68.8);
    assert!(!result.passed);
    assert_eq!(completion.receipt.application, ApplicationWrite::Skipped);
}

#[tokio::test(start_paused = true)]
async fn idle_exam_times_out_after_300_seconds() {
    let h = harness();
    let started = Instant::now();
    let handle = begin(&h).await;

    let completion = handle.wait_finished().await.unwrap();
    assert_eq!(started.elapsed(), Duration::from_secs(u64::from(EXAM_DURATION_SECS)));
    assert_eq!(completion.reason, EndReason::TimedOut);
    assert_eq!(completion.receipt.result.percentage, 0.0);
    assert!(!completion.receipt.result.passed);
    assert!(completion.receipt.attempt_saved);
    assert_eq!(h.attempts.puts.load(Ordering::SeqCst), 1);

    let view = handle.snapshot().await;
    assert_eq!(view.remaining_seconds, 0);
    assert!(!view.is_running);
    assert_eq!(handle.completion(), Some(completion));
}

#[tokio::test(start_paused = true)]
async fn one_second_left_after_299_ticks() {
    let h = harness();
    let handle = begin(&h).await;

    let early = tokio::time::timeout(Duration::from_millis(299_500), handle.wait_finished()).await;
    assert!(early.is_err(), "exam must still be running");
    let view = handle.snapshot().await;
    assert_eq!(view.remaining_seconds, 1);
    assert!(view.is_running);

    let completion = handle.wait_finished().await.unwrap();
    assert_eq!(completion.reason, EndReason::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn navigation_does_not_pause_the_clock() {
    let h = harness();
    let handle = begin(&h).await;

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(handle.go_to_next().await.unwrap(), Advance::Moved(1));
    assert_eq!(handle.go_to_previous().await.unwrap(), 0);
    assert_eq!(handle.go_to_previous().await.unwrap(), 0);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let view = handle.snapshot().await;
    assert_eq!(view.index, 0);
    assert_eq!(view.remaining_seconds, EXAM_DURATION_SECS - 7);
}

#[tokio::test(start_paused = true)]
async fn submit_stops_countdown_and_publishes_once() {
    let h = harness();
    let handle = begin(&h).await;

    handle.select_answer(correct_option(0)).await.unwrap();
    let completion = handle.submit().await.unwrap();
    assert_eq!(completion.reason, EndReason::Submitted);
    assert_eq!(completion.receipt.result.correct, 1);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(h.attempts.puts.load(Ordering::SeqCst), 1);
    assert_eq!(handle.wait_finished().await.unwrap(), completion);

    let err = handle.submit().await.unwrap_err();
    assert!(matches!(err, ExamError::Session(SessionError::NotRunning)));
    let err = handle.select_answer(0).await.unwrap_err();
    assert!(matches!(err, ExamError::Session(SessionError::NotRunning)));
}

#[tokio::test(start_paused = true)]
async fn out_of_range_option_is_rejected() {
    let h = harness();
    let handle = begin(&h).await;

    let err = handle.select_answer(7).await.unwrap_err();
    assert!(matches!(
        err,
        ExamError::Session(SessionError::OptionOutOfRange {
            option: 7,
            available: 3
        })
    ));
    assert_eq!(handle.snapshot().await.selected, None);
}

#[tokio::test(start_paused = true)]
async fn abandoned_exam_records_nothing() {
    let h = harness();
    let handle = begin(&h).await;
    handle.select_answer(0).await.unwrap();
    handle.abandon();

    tokio::time::sleep(Duration::from_secs(400)).await;
    assert_eq!(h.attempts.puts.load(Ordering::SeqCst), 0);
    assert!(h.repo.get_attempt(user()).await.unwrap().is_none());
    assert!(h.services.handoff().peek().is_none());
}

async fn seed_pending_application(h: &Harness, id: u64) {
    h.repo
        .upsert_application(&ApplicationRecord::new(
            ApplicationId::new(id),
            user(),
            "pending",
            fixed_now(),
        ))
        .await
        .unwrap();
}

fn slow_store_harness() -> Harness {
    build_harness(
        Clock::fixed(fixed_now()),
        StaticIdentity::signed_in(user(), Role::Candidate),
        Duration::from_secs(2),
    )
}

#[tokio::test(start_paused = true)]
async fn timed_out_attempt_is_saved_even_if_abandoned_mid_save() {
    let h = slow_store_harness();
    seed_pending_application(&h, 9).await;
    let handle = begin(&h).await;

    // Time is up, but the attempt write is still in flight.
    tokio::time::sleep(Duration::from_millis(300_500)).await;
    assert!(handle.completion().is_none());
    assert_eq!(h.attempts.puts.load(Ordering::SeqCst), 1);
    handle.abandon();

    tokio::time::sleep(Duration::from_secs(60)).await;
    let stored = h.repo.get_attempt(user()).await.unwrap().expect("timed-out attempt saved");
    assert_eq!(stored.score(), Score::from_counts(0, 16));
    let app = h.repo.get_application(ApplicationId::new(9)).await.unwrap();
    assert!(!app.exam.expect("outcome attached").passed);
    let staged = h.services.handoff().take().expect("result staged");
    assert_eq!(staged.application_id, Some(ApplicationId::new(9)));
}

#[tokio::test(start_paused = true)]
async fn timed_out_attempt_is_saved_even_if_handle_dropped_mid_save() {
    let h = slow_store_harness();
    let handle = begin(&h).await;
    handle.select_answer(correct_option(0)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(301_000)).await;
    drop(handle);

    tokio::time::sleep(Duration::from_secs(60)).await;
    let stored = h.repo.get_attempt(user()).await.unwrap().expect("timed-out attempt saved");
    assert_eq!(stored.score().correct, 1);
    assert_eq!(h.attempts.puts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn recent_attempt_locks_until_reset() {
    let day0 = fixed_now();
    let h = harness_with(
        Clock::fixed(day0 + ChronoDuration::days(6)),
        StaticIdentity::signed_in(user(), Role::Candidate),
    );
    h.repo
        .put_attempt(&Attempt::new(user(), day0, Score::from_counts(9, 16)))
        .await
        .unwrap();

    match h.services.runner().begin().await.unwrap() {
        ExamStart::Locked(lock) => {
            assert_eq!(lock.retry_at, day0 + ChronoDuration::days(7));
            assert_eq!(lock.last_attempt.score().correct, 9);
        }
        ExamStart::Started(_) => panic!("cooldown should deny the attempt"),
    }
}

#[tokio::test]
async fn missing_or_wrong_identity_is_refused() {
    let h = harness_with(Clock::fixed(fixed_now()), StaticIdentity::anonymous());
    let err = h.services.runner().begin().await.unwrap_err();
    assert!(matches!(err, ExamError::IdentityMissing));

    let h = harness_with(
        Clock::fixed(fixed_now()),
        StaticIdentity::signed_in(user(), Role::Reviewer),
    );
    let err = h.services.runner().begin().await.unwrap_err();
    assert!(matches!(err, ExamError::IdentityMissing));
}

#[tokio::test]
async fn sqlite_backed_services_record_attempt() {
    let services = ExamServices::new_sqlite(
        "sqlite:file:memdb_services_flow?mode=memory&cache=shared",
        Clock::fixed(fixed_now()),
        bank(),
        Arc::new(StaticIdentity::signed_in(user(), Role::Candidate)),
    )
    .await
    .expect("sqlite services");

    let ExamStart::Started(handle) = services.runner().begin().await.unwrap() else {
        panic!("fresh database must allow the exam");
    };
    handle.select_answer(correct_option(0)).await.unwrap();
    let completion = handle.submit().await.unwrap();
    assert!(completion.receipt.attempt_saved);

    let (_, eligibility) = services.runner().eligibility().await.unwrap();
    assert!(!eligibility.is_allowed());
}
