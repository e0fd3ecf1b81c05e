mod question;

pub use question::{AnswerKey, Choices, Label, Question};

/// Screen the terminal UI is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Bank totals and run settings, waiting for the user to start.
    Welcome,
    /// A main or review run is in progress.
    Quiz,
    /// The run finished; summary and review offer.
    Result,
    /// The bank could not be used. Nothing else is reachable.
    Failed,
}
