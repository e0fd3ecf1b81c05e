//! Quiz run state machine.
//!
//! A [`QuizSession`] is one run over a fixed selection of questions: the
//! main quiz or one review round. It only changes through
//! [`QuizSession::submit_answer`] and [`QuizSession::advance`]; calls that
//! arrive in the wrong phase are ignored and leave the score untouched.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Label, Question};

use super::presentation::{Feedback, Presentation};
use super::random::{sample_without_replacement, RandomSource};

/// Which kind of run this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Main,
    /// Re-asking missed questions. The first round after the main run is 1.
    Review { round: u32 },
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Main => f.write_str("Quiz"),
            Mode::Review { round } => write!(f, "Review missed (Round {})", round),
        }
    }
}

/// Run options from the settings collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Requested question count; clamped to the pool. `None` asks the whole pool.
    pub count: Option<usize>,
    pub shuffle_choices: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("there are no questions to start a run with")]
    EmptyPool,
    #[error("no missed questions to review")]
    NothingToReview,
    #[error("the current run has not finished")]
    RunInProgress,
}

/// Externally visible phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Presenting,
    Answered,
    Finished,
}

#[derive(Debug, Clone)]
enum Phase {
    Presenting(Presentation),
    Answered {
        presentation: Presentation,
        feedback: Feedback,
    },
    Finished,
}

/// Result screen data for a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub score: usize,
    pub total: usize,
    pub missed: Vec<Question>,
    pub mode: Mode,
    pub can_review: bool,
}

impl Summary {
    pub fn review_round(&self) -> Option<u32> {
        match self.mode {
            Mode::Main => None,
            Mode::Review { round } => Some(round),
        }
    }

    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.score as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// One-line result, e.g. `Quiz complete • Score: 3/5 (60.0%) • Missed: 2`.
    pub fn headline(&self) -> String {
        let score = format!("Score: {}/{} ({:.1}%)", self.score, self.total, self.percent());
        match self.mode {
            Mode::Main => format!(
                "Quiz complete • {} • Missed: {}",
                score,
                self.missed.len()
            ),
            Mode::Review { round } if self.missed.is_empty() => format!(
                "Review round {} • {} • All missed questions cleared!",
                round, score
            ),
            Mode::Review { round } => format!(
                "Review round {} • {} • Still missed: {}",
                round,
                score,
                self.missed.len()
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    run_id: Uuid,
    mode: Mode,
    shuffle_choices: bool,
    selected: Vec<Question>,
    cursor: usize,
    score: usize,
    missed: Vec<Question>,
    phase: Phase,
}

impl QuizSession {
    /// Starts a run over `pool` and presents the first question.
    ///
    /// Main runs draw `count` questions (clamped into `1..=pool.len()`);
    /// review runs always take the whole pool in a fresh random order.
    pub fn start<R: RandomSource + ?Sized>(
        pool: &[Question],
        mode: Mode,
        config: RunConfig,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        Self::begin(Uuid::new_v4(), pool, mode, config, rng)
    }

    fn begin<R: RandomSource + ?Sized>(
        run_id: Uuid,
        pool: &[Question],
        mode: Mode,
        config: RunConfig,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if pool.is_empty() {
            return Err(match mode {
                Mode::Main => SessionError::EmptyPool,
                Mode::Review { .. } => SessionError::NothingToReview,
            });
        }

        let count = match mode {
            Mode::Main => config.count.unwrap_or(pool.len()).clamp(1, pool.len()),
            Mode::Review { .. } => pool.len(),
        };
        let selected = sample_without_replacement(pool, count, rng);
        let first = Presentation::build(&selected[0], config.shuffle_choices, rng);

        info!(
            run = %run_id,
            mode = %mode,
            questions = count,
            pool = pool.len(),
            shuffle = config.shuffle_choices,
            "starting quiz run"
        );

        Ok(Self {
            run_id,
            mode,
            shuffle_choices: config.shuffle_choices,
            selected,
            cursor: 0,
            score: 0,
            missed: Vec::new(),
            phase: Phase::Presenting(first),
        })
    }

    /// Next review round over this run's missed questions. The main run leads
    /// to round 1, each review round to the one after it.
    pub fn start_review<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<Self, SessionError> {
        if !self.is_finished() {
            return Err(SessionError::RunInProgress);
        }
        if !self.can_review() {
            return Err(SessionError::NothingToReview);
        }

        let round = match self.mode {
            Mode::Main => 1,
            Mode::Review { round } => round + 1,
        };
        let config = RunConfig {
            count: None,
            shuffle_choices: self.shuffle_choices,
        };
        Self::begin(self.run_id, &self.missed, Mode::Review { round }, config, rng)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected(&self) -> &[Question] {
        &self.selected
    }

    pub fn total(&self) -> usize {
        self.selected.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn missed(&self) -> &[Question] {
        &self.missed
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Presenting(_) => SessionState::Presenting,
            Phase::Answered { .. } => SessionState::Answered,
            Phase::Finished => SessionState::Finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Questions answered so far, counting one awaiting [`advance`](Self::advance).
    pub fn answered(&self) -> usize {
        match self.phase {
            Phase::Answered { .. } => self.cursor + 1,
            _ => self.cursor,
        }
    }

    /// The question on screen, while presenting or showing feedback.
    pub fn presentation(&self) -> Option<&Presentation> {
        match &self.phase {
            Phase::Presenting(presentation) | Phase::Answered { presentation, .. } => {
                Some(presentation)
            }
            Phase::Finished => None,
        }
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        match &self.phase {
            Phase::Answered { feedback, .. } => Some(feedback),
            _ => None,
        }
    }

    /// Scores `display_label` against the presentation the user saw.
    ///
    /// Returns `None` without touching the score when nothing is awaiting an
    /// answer, so a second submit for the same question is ignored.
    pub fn submit_answer(&mut self, display_label: Label) -> Option<&Feedback> {
        let presentation = match std::mem::replace(&mut self.phase, Phase::Finished) {
            Phase::Presenting(presentation) => presentation,
            other => {
                self.phase = other;
                debug!(run = %self.run_id, cursor = self.cursor, "answer ignored: no question awaiting one");
                return None;
            }
        };

        let feedback = presentation.feedback_for(display_label);
        if feedback.correct {
            self.score += 1;
        } else {
            self.missed.push(presentation.question().clone());
        }
        debug!(
            run = %self.run_id,
            cursor = self.cursor,
            id = %presentation.question().id,
            chosen = %display_label,
            correct = feedback.correct,
            "answer submitted"
        );

        self.phase = Phase::Answered {
            presentation,
            feedback,
        };
        self.feedback()
    }

    /// Moves past an answered question, presenting the next one or finishing
    /// the run. Returns `false` (and does nothing) before an answer is in.
    pub fn advance<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !matches!(self.phase, Phase::Answered { .. }) {
            debug!(run = %self.run_id, cursor = self.cursor, "advance ignored: current question unanswered");
            return false;
        }

        self.cursor += 1;
        self.phase = match self.selected.get(self.cursor) {
            Some(question) => Phase::Presenting(Presentation::build(question, self.shuffle_choices, rng)),
            None => {
                info!(
                    run = %self.run_id,
                    mode = %self.mode,
                    score = self.score,
                    total = self.selected.len(),
                    missed = self.missed.len(),
                    "quiz run finished"
                );
                Phase::Finished
            }
        };
        true
    }

    /// Whether a further review round can follow this run.
    pub fn can_review(&self) -> bool {
        !self.missed.is_empty()
    }

    /// Final figures, once the run is finished.
    pub fn summary(&self) -> Option<Summary> {
        if !self.is_finished() {
            return None;
        }
        Some(Summary {
            score: self.score,
            total: self.selected.len(),
            missed: self.missed.clone(),
            mode: self.mode,
            can_review: self.can_review(),
        })
    }

    /// `Quiz • Score: 2/3 • Question: 4/10`; an answered question counts
    /// toward the score denominator right away.
    pub fn status_line(&self) -> String {
        let total = self.selected.len();
        format!(
            "{} • Score: {}/{} • Question: {}/{}",
            self.mode,
            self.score,
            self.answered().min(total),
            (self.cursor + 1).min(total),
            total
        )
    }

    /// Label for the button that follows feedback.
    pub fn next_label(&self) -> &'static str {
        if self.cursor + 1 >= self.selected.len() {
            "View results"
        } else {
            "Next"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::models::{AnswerKey, Choices};
    use crate::session::random::{RngSource, ScriptedSource};

    fn bank(size: usize) -> Vec<Question> {
        (0..size)
            .map(|i| Question {
                id: format!("q{:04}", i + 1),
                chapter: None,
                question_number: None,
                prompt: format!("Question {}", i + 1),
                choices: Choices::new(["a".into(), "b".into(), "c".into(), "d".into()]),
                answer: AnswerKey {
                    letter: Label::from_index(i % 4).unwrap(),
                    text: None,
                },
                images: Vec::new(),
            })
            .collect()
    }

    fn main_config(count: usize) -> RunConfig {
        RunConfig {
            count: Some(count),
            shuffle_choices: true,
        }
    }

    fn wrong_label(session: &QuizSession) -> Label {
        let correct = session.presentation().unwrap().correct_display_label();
        Label::from_index((correct.index() + 1) % 4).unwrap()
    }

    /// Answers the current question, correctly or not, and checks the
    /// counters along the way.
    fn answer(session: &mut QuizSession, correct: bool, rng: &mut RngSource<rand::rngs::StdRng>) {
        let label = if correct {
            session.presentation().unwrap().correct_display_label()
        } else {
            wrong_label(session)
        };
        let feedback = session.submit_answer(label).unwrap().clone();
        assert_eq!(feedback.correct, correct);
        assert_eq!(session.score() + session.missed().len(), session.answered());
        assert!(session.score() <= session.answered());

        assert!(session.advance(rng));
        assert_eq!(session.score() + session.missed().len(), session.cursor());
        assert!(session.cursor() <= session.total());
    }

    #[test]
    fn test_main_run_scores_and_offers_review() {
        let pool = bank(5);
        let mut rng = RngSource::seeded(5);
        let mut session = QuizSession::start(&pool, Mode::Main, main_config(5), &mut rng).unwrap();

        for correct in [true, false, true, false, true] {
            assert_eq!(session.state(), SessionState::Presenting);
            answer(&mut session, correct, &mut rng);
        }

        assert_eq!(session.state(), SessionState::Finished);
        let summary = session.summary().unwrap();
        assert_eq!(summary.score, 3);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.missed.len(), 2);
        assert!(summary.can_review);
        assert!(session.can_review());
        assert_eq!(summary.headline(), "Quiz complete • Score: 3/5 (60.0%) • Missed: 2");
    }

    #[test]
    fn test_review_rounds() {
        let pool = bank(5);
        let mut rng = RngSource::seeded(11);
        let mut main = QuizSession::start(&pool, Mode::Main, main_config(5), &mut rng).unwrap();
        for correct in [true, false, true, false, true] {
            answer(&mut main, correct, &mut rng);
        }

        let mut review = main.start_review(&mut rng).unwrap();
        assert_eq!(review.mode(), Mode::Review { round: 1 });
        assert_eq!(review.run_id(), main.run_id());
        assert_eq!(review.score(), 0);
        assert!(review.missed().is_empty());

        let mut missed_ids: Vec<&str> = main.missed().iter().map(|q| q.id.as_str()).collect();
        let mut review_ids: Vec<&str> = review.selected().iter().map(|q| q.id.as_str()).collect();
        missed_ids.sort();
        review_ids.sort();
        assert_eq!(missed_ids, review_ids);

        answer(&mut review, false, &mut rng);
        answer(&mut review, true, &mut rng);
        assert!(review.can_review());
        assert_eq!(
            review.summary().unwrap().headline(),
            "Review round 1 • Score: 1/2 (50.0%) • Still missed: 1"
        );

        let still_missed = review.missed()[0].clone();
        let mut again = review.start_review(&mut rng).unwrap();
        assert_eq!(again.mode(), Mode::Review { round: 2 });
        assert_eq!(again.selected(), &[still_missed][..]);
        assert!(again.missed().is_empty());

        answer(&mut again, true, &mut rng);
        let summary = again.summary().unwrap();
        assert!(!summary.can_review);
        assert_eq!(summary.review_round(), Some(2));
        assert_eq!(
            summary.headline(),
            "Review round 2 • Score: 1/1 (100.0%) • All missed questions cleared!"
        );
        assert_eq!(again.start_review(&mut rng).unwrap_err(), SessionError::NothingToReview);
    }

    #[test]
    fn test_count_is_clamped() {
        let pool = bank(4);
        let mut rng = RngSource::seeded(2);

        let session = QuizSession::start(&pool, Mode::Main, main_config(0), &mut rng).unwrap();
        assert_eq!(session.total(), 1);

        let session = QuizSession::start(&pool, Mode::Main, main_config(40), &mut rng).unwrap();
        assert_eq!(session.total(), 4);

        let config = RunConfig {
            count: None,
            shuffle_choices: false,
        };
        let session = QuizSession::start(&pool, Mode::Main, config, &mut rng).unwrap();
        assert_eq!(session.total(), 4);
    }

    #[test]
    fn test_main_selection_is_distinct_subset() {
        let pool = bank(30);
        let mut rng = RngSource::seeded(8);
        for count in [1, 7, 30] {
            let session = QuizSession::start(&pool, Mode::Main, main_config(count), &mut rng).unwrap();
            let ids: HashSet<&str> = session.selected().iter().map(|q| q.id.as_str()).collect();
            assert_eq!(ids.len(), count);
            assert!(session.selected().iter().all(|q| pool.contains(q)));
        }
    }

    #[test]
    fn test_review_mode_ignores_count() {
        let pool = bank(6);
        let session = QuizSession::start(
            &pool,
            Mode::Review { round: 1 },
            main_config(2),
            &mut RngSource::seeded(4),
        )
        .unwrap();
        assert_eq!(session.total(), 6);
    }

    #[test]
    fn test_empty_pools_are_refused() {
        let mut rng = ScriptedSource::identity();
        let config = main_config(3);
        assert_eq!(
            QuizSession::start(&[], Mode::Main, config, &mut rng).unwrap_err(),
            SessionError::EmptyPool
        );
        assert_eq!(
            QuizSession::start(&[], Mode::Review { round: 1 }, config, &mut rng).unwrap_err(),
            SessionError::NothingToReview
        );
    }

    #[test]
    fn test_out_of_order_calls_are_ignored() {
        let pool = bank(2);
        let mut rng = ScriptedSource::identity();
        let mut session = QuizSession::start(&pool, Mode::Main, main_config(2), &mut rng).unwrap();

        assert!(!session.advance(&mut rng));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.start_review(&mut rng).unwrap_err(), SessionError::RunInProgress);

        let wrong = wrong_label(&session);
        assert!(session.submit_answer(wrong).is_some());
        assert!(session.submit_answer(wrong).is_none());
        let correct = session.presentation().unwrap().correct_display_label();
        assert!(session.submit_answer(correct).is_none());
        assert_eq!(session.score(), 0);
        assert_eq!(session.missed().len(), 1);

        assert!(session.feedback().is_some());
        assert!(session.advance(&mut rng));
        assert!(!session.advance(&mut rng));
        assert_eq!(session.cursor(), 1);
        assert!(session.summary().is_none());

        let correct = session.presentation().unwrap().correct_display_label();
        session.submit_answer(correct);
        session.advance(&mut rng);
        assert!(session.is_finished());
        assert!(session.presentation().is_none());
        assert!(session.submit_answer(Label::A).is_none());
        assert!(!session.advance(&mut rng));
        assert_eq!(session.score(), 1);
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn test_missed_keeps_canonical_question() {
        let pool = bank(1);
        let mut rng = ScriptedSource::new(&[0.0]);
        let mut session = QuizSession::start(&pool, Mode::Main, main_config(1), &mut rng).unwrap();

        let presentation = session.presentation().unwrap();
        assert_ne!(presentation.correct_display_label(), Label::A);
        session.submit_answer(wrong_label(&session));

        assert_eq!(session.missed(), &pool[..]);
    }

    #[test]
    fn test_status_line_and_next_label() {
        let pool = bank(2);
        let mut rng = ScriptedSource::identity();
        let config = RunConfig {
            count: Some(2),
            shuffle_choices: false,
        };
        let mut session = QuizSession::start(&pool, Mode::Main, config, &mut rng).unwrap();
        assert_eq!(session.status_line(), "Quiz • Score: 0/0 • Question: 1/2");
        assert_eq!(session.next_label(), "Next");

        let correct = session.presentation().unwrap().correct_display_label();
        session.submit_answer(correct);
        assert_eq!(session.status_line(), "Quiz • Score: 1/1 • Question: 1/2");

        session.advance(&mut rng);
        assert_eq!(session.next_label(), "View results");
        session.submit_answer(wrong_label(&session));
        session.advance(&mut rng);
        assert_eq!(session.status_line(), "Quiz • Score: 1/2 • Question: 2/2");
    }

    #[test]
    fn test_presentations_match_canonical_answers() {
        let pool = bank(12);
        let mut rng = RngSource::seeded(21);
        let mut session = QuizSession::start(&pool, Mode::Main, main_config(12), &mut rng).unwrap();

        while let Some(presentation) = session.presentation() {
            let question = presentation.question();
            assert_eq!(
                presentation.display_text(presentation.correct_display_label()),
                question.choices.get(question.correct_label())
            );
            let label = presentation.correct_display_label();
            session.submit_answer(label);
            session.advance(&mut rng);
        }
        assert_eq!(session.score(), 12);
    }
}
