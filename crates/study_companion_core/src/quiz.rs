//! crates/study_companion_core/src/quiz.rs
//!
//! Scoring for a finished quiz.

use crate::domain::{QuizQuestion, QuizResult};
use chrono::Utc;

impl QuizQuestion {
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_answer_index
    }
}

impl QuizResult {
    /// Score as a whole percentage. An empty quiz scores 0.
    pub fn percentage(&self) -> u8 {
        if self.total_questions == 0 {
            return 0;
        }
        let ratio = self.correct_answers as f64 / self.total_questions as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Grades `answers` positionally against `questions`.
///
/// A `None` or missing answer counts as wrong. Answers beyond the last
/// question are ignored.
pub fn grade_quiz(
    topic: &str,
    questions: &[QuizQuestion],
    answers: &[Option<usize>],
) -> QuizResult {
    let correct_answers = questions
        .iter()
        .zip(answers.iter().copied().chain(std::iter::repeat(None)))
        .filter(|(question, answer)| answer.is_some_and(|selected| question.is_correct(selected)))
        .count();

    QuizResult {
        total_questions: questions.len(),
        correct_answers,
        topic: topic.to_string(),
        date: Utc::now(),
    }
}
