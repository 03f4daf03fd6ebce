//! One attempt at a quiz: answer collection, submission, scoring and retry.
//!
//! The session performs no I/O. A front end feeds it selections and renders
//! whatever `phase`, `feedback` and `score` report.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::quiz::Quiz;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    /// No question has a selection yet.
    Unanswered,
    /// Some selections recorded, not submitted.
    InProgress,
    /// Score computed; selections are frozen until `retry`.
    Submitted,
}

/// Per-question verdict shown next to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feedback {
    Correct,
    Wrong,
}

/// How a submitted score should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Perfect,
    Partial,
    /// The quiz had no questions; neither perfect nor partial.
    NoQuestions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn outcome(&self) -> Outcome {
        if self.total == 0 {
            Outcome::NoQuestions
        } else if self.correct == self.total {
            Outcome::Perfect
        } else {
            Outcome::Partial
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    quiz: Quiz,
    selections: Vec<Option<String>>,
    score: Option<Score>,
}

impl QuizSession {
    pub fn new(quiz: Quiz) -> Self {
        let selections = vec![None; quiz.len()];
        Self {
            quiz,
            selections,
            score: None,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn phase(&self) -> SessionPhase {
        if self.score.is_some() {
            SessionPhase::Submitted
        } else if self.selections.iter().any(Option::is_some) {
            SessionPhase::InProgress
        } else {
            SessionPhase::Unanswered
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.score.is_some()
    }

    /// Record `answer` as the choice for question `index`, replacing any earlier choice.
    ///
    /// Rejected without touching state when the session is submitted, the index
    /// is out of range, or `answer` is not one of the question's options.
    pub fn select_answer(&mut self, index: usize, answer: &str) -> Result<(), SessionError> {
        if self.is_submitted() {
            return Err(SessionError::AlreadySubmitted);
        }
        let question = self.quiz.question(index).ok_or(SessionError::QuestionOutOfRange {
            index,
            len: self.quiz.len(),
        })?;
        if !question.has_option(answer) {
            return Err(SessionError::UnknownAnswer {
                index,
                answer: answer.to_string(),
            });
        }

        debug!(index, answer, "answer selected");
        self.selections[index] = Some(answer.to_string());
        Ok(())
    }

    /// The recorded choice for question `index`, `None` when unanswered.
    pub fn selection(&self, index: usize) -> Option<&str> {
        self.selections.get(index).and_then(|s| s.as_deref())
    }

    pub fn answered_count(&self) -> usize {
        self.selections.iter().filter(|s| s.is_some()).count()
    }

    /// Verdict for the current selection of question `index`; `None` when unanswered.
    pub fn feedback(&self, index: usize) -> Option<Feedback> {
        let question = self.quiz.question(index)?;
        let selected = self.selection(index)?;
        Some(if question.is_correct_text(selected) {
            Feedback::Correct
        } else {
            Feedback::Wrong
        })
    }

    /// Score the attempt and freeze it. Calling again returns the stored score unchanged.
    pub fn submit(&mut self) -> Score {
        if let Some(score) = self.score {
            debug!(%score, "submit ignored, already submitted");
            return score;
        }

        let correct = self
            .quiz
            .questions()
            .iter()
            .zip(&self.selections)
            .filter(|(question, selected)| {
                selected
                    .as_deref()
                    .is_some_and(|text| question.is_correct_text(text))
            })
            .count();
        let score = Score {
            correct,
            total: self.quiz.len(),
        };

        info!(%score, outcome = ?score.outcome(), "quiz submitted");
        self.score = Some(score);
        score
    }

    /// The submitted score, if any.
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    /// Start a fresh attempt at the same quiz. Only valid after `submit`.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        if !self.is_submitted() {
            return Err(SessionError::NotSubmitted);
        }
        info!("starting a new attempt");
        self.selections = vec![None; self.quiz.len()];
        self.score = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Answer, Question};

    fn question(prompt: &str, options: &[&str], correct: usize) -> Question {
        Question::new(
            prompt,
            options
                .iter()
                .enumerate()
                .map(|(i, text)| Answer::new(*text, i == correct))
                .collect(),
        )
    }

    fn three_question_quiz() -> Quiz {
        Quiz::new(vec![
            question("Ocean color?", &["Red", "Blue"], 1),
            question("Capital of Korea?", &["Seoul", "Tokyo", "Bangkok"], 0),
            question("Avatar release?", &["2007", "2009", "1998"], 1),
        ])
    }

    #[test]
    fn starts_unanswered_and_moves_to_in_progress() {
        let mut session = QuizSession::new(three_question_quiz());
        assert_eq!(session.phase(), SessionPhase::Unanswered);
        assert_eq!(session.score(), None);

        session.select_answer(0, "Blue").unwrap();
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn all_correct_is_a_perfect_score() {
        let mut session = QuizSession::new(three_question_quiz());
        session.select_answer(0, "Blue").unwrap();
        session.select_answer(1, "Seoul").unwrap();
        session.select_answer(2, "2009").unwrap();

        let score = session.submit();
        assert_eq!(score, Score { correct: 3, total: 3 });
        assert_eq!(score.outcome(), Outcome::Perfect);
        assert_eq!(session.phase(), SessionPhase::Submitted);
        assert_eq!(score.to_string(), "3/3");
    }

    #[test]
    fn unanswered_and_wrong_questions_do_not_count() {
        let mut session = QuizSession::new(three_question_quiz());
        session.select_answer(0, "Red").unwrap();
        session.select_answer(1, "Seoul").unwrap();

        let score = session.submit();
        assert_eq!(score, Score { correct: 1, total: 3 });
        assert_eq!(score.outcome(), Outcome::Partial);
    }

    #[test]
    fn submitting_without_answers_scores_zero() {
        let mut session = QuizSession::new(three_question_quiz());
        assert_eq!(session.submit(), Score { correct: 0, total: 3 });
    }

    #[test]
    fn later_selection_replaces_earlier_one() {
        let mut session = QuizSession::new(three_question_quiz());
        session.select_answer(0, "Red").unwrap();
        assert_eq!(session.feedback(0), Some(Feedback::Wrong));
        session.select_answer(0, "Blue").unwrap();
        assert_eq!(session.feedback(0), Some(Feedback::Correct));
        assert_eq!(session.feedback(1), None);
        assert_eq!(session.submit().correct, 1);
    }

    #[test]
    fn submit_is_idempotent() {
        let mut session = QuizSession::new(three_question_quiz());
        session.select_answer(1, "Seoul").unwrap();
        let first = session.submit();
        let second = session.submit();
        assert_eq!(first, second);
        assert_eq!(session.score(), Some(first));
    }

    #[test]
    fn selections_are_frozen_after_submit() {
        let mut session = QuizSession::new(three_question_quiz());
        session.submit();
        assert_eq!(session.select_answer(0, "Blue"), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.selection(0), None);
    }

    #[test]
    fn invalid_selections_leave_state_untouched() {
        let mut session = QuizSession::new(three_question_quiz());
        assert_eq!(
            session.select_answer(3, "Blue"),
            Err(SessionError::QuestionOutOfRange { index: 3, len: 3 })
        );
        assert!(matches!(
            session.select_answer(0, "Purple"),
            Err(SessionError::UnknownAnswer { index: 0, .. })
        ));
        assert_eq!(session.phase(), SessionPhase::Unanswered);
    }

    #[test]
    fn retry_restores_a_fresh_session() {
        let quiz = three_question_quiz();
        let mut session = QuizSession::new(quiz.clone());
        session.select_answer(0, "Blue").unwrap();
        session.select_answer(2, "1998").unwrap();
        session.submit();

        session.retry().unwrap();
        assert_eq!(session, QuizSession::new(quiz));
        assert_eq!(session.phase(), SessionPhase::Unanswered);
    }

    #[test]
    fn retry_is_allowed_after_a_perfect_score() {
        let mut session = QuizSession::new(Quiz::new(vec![question("Q", &["a", "b"], 0)]));
        session.select_answer(0, "a").unwrap();
        assert_eq!(session.submit().outcome(), Outcome::Perfect);
        assert!(session.retry().is_ok());
    }

    #[test]
    fn retry_before_submit_is_rejected() {
        let mut session = QuizSession::new(three_question_quiz());
        session.select_answer(0, "Blue").unwrap();
        assert_eq!(session.retry(), Err(SessionError::NotSubmitted));
        assert_eq!(session.selection(0), Some("Blue"));
    }

    #[test]
    fn empty_quiz_reports_no_questions() {
        let mut session = QuizSession::new(Quiz::default());
        let score = session.submit();
        assert_eq!(score, Score { correct: 0, total: 0 });
        assert_eq!(score.outcome(), Outcome::NoQuestions);
    }

    #[test]
    fn duplicate_option_texts_are_indistinguishable() {
        let quiz = Quiz::new(vec![Question::new(
            "Q",
            vec![Answer::new("same", false), Answer::new("same", true)],
        )]);
        let mut session = QuizSession::new(quiz);
        session.select_answer(0, "same").unwrap();
        assert_eq!(session.submit().correct, 1);
    }
}
