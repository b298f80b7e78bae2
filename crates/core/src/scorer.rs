//! Pure scoring of a finished attempt.

use crate::model::{Question, Score};

/// Minimum percentage required to pass.
pub const PASS_PERCENTAGE: f64 = 75.0;

/// Scale the percentage is reported on.
pub const MAX_SCORE: f64 = 100.0;

/// Score `answers` against `questions`.
///
/// `total` is always the number of questions. Unanswered entries, and entries
/// missing because `answers` is shorter than `questions`, count as incorrect.
#[must_use]
pub fn score(questions: &[Question], answers: &[Option<usize>]) -> Score {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, question)| {
            answers
                .get(*i)
                .copied()
                .flatten()
                .is_some_and(|option| question.is_correct(option))
        })
        .count();

    Score::from_counts(saturating_u32(correct), saturating_u32(questions.len()))
}

fn saturating_u32(v: usize) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    fn bank(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    format!("Question {i}"),
                    vec![
                        AnswerOption::new("A", i % 2 == 0),
                        AnswerOption::new("B", i % 2 == 1),
                        AnswerOption::new("C", false),
                    ],
                )
                .unwrap()
            })
            .collect()
    }

    fn all_correct(questions: &[Question]) -> Vec<Option<usize>> {
        questions.iter().map(|q| Some(q.correct_index())).collect()
    }

    #[test]
    fn perfect_attempt_passes() {
        let questions = bank(16);
        let s = score(&questions, &all_correct(&questions));
        assert_eq!(s.correct, 16);
        assert_eq!(s.total, 16);
        assert_eq!(s.percentage, 100.0);
        assert!(s.passed());
    }

    #[test]
    fn unanswered_questions_count_against_total() {
        let questions = bank(16);
        let mut answers = all_correct(&questions);
        for a in answers.iter_mut().skip(11) {
            *a = None;
        }
        let s = score(&questions, &answers);
        assert_eq!(s.correct, 11);
        assert_eq!(s.total, 16);
        assert_eq!(s.percentage, 68.8);
        assert!(!s.passed());
    }

    #[test]
    fn wrong_answers_do_not_score() {
        let questions = bank(4);
        let answers = vec![Some(2), Some(2), Some(0), Some(1)];
        let s = score(&questions, &answers);
        assert_eq!(s.correct, 2);
        assert_eq!(s.percentage, 50.0);
    }

    #[test]
    fn short_answer_slice_treated_as_unanswered() {
        let questions = bank(4);
        let s = score(&questions, &[Some(0)]);
        assert_eq!(s.correct, 1);
        assert_eq!(s.total, 4);
    }

    #[test]
    fn scoring_is_idempotent() {
        let questions = bank(5);
        let answers = vec![Some(0), None, Some(0), Some(0), None];
        assert_eq!(score(&questions, &answers), score(&questions, &answers));
    }

    #[test]
    fn empty_bank_scores_zero() {
        let s = score(&[], &[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.percentage, 0.0);
    }
}
