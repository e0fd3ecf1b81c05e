//! Quiz runs: selection, presentation, scoring and review rounds.

mod presentation;
mod quiz;
mod random;

pub use presentation::{choice_order, Feedback, Presentation};
pub use quiz::{Mode, QuizSession, RunConfig, SessionError, SessionState, Summary};
pub use random::{sample_without_replacement, shuffle_in_place, RandomSource, RngSource};

#[cfg(test)]
pub(crate) use random::ScriptedSource;
