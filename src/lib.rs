//! # quizbank
//!
//! Multiple-choice quizzes over a loosely structured JSON question bank,
//! with optional answer shuffling and repeated "review missed" rounds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quizbank::{load_bank, App, Quiz, QuizError, RngSource, RunSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     // Normalize whatever shape the bank was written in
//!     let bank = load_bank("question_bank.json").await?;
//!     bank.require_questions()?;
//!
//!     let app = App::new(bank, RunSettings::default(), Box::new(RngSource::thread()));
//!
//!     // Run the quiz in the terminal
//!     Quiz::new(app).run()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! The normalizer and the run state machine work without a terminal:
//!
//! ```rust
//! use quizbank::{parse_bank, Mode, QuizSession, RngSource, RunConfig};
//!
//! let bank = parse_bank(r#"[{"question":"2+2?","choices":["3","4","5","6"],"answer":"B"}]"#)
//!     .unwrap();
//! let mut rng = RngSource::seeded(1);
//! let config = RunConfig { count: Some(1), shuffle_choices: true };
//! let mut session = QuizSession::start(&bank.questions, Mode::Main, config, &mut rng).unwrap();
//!
//! let correct = session.presentation().unwrap().correct_display_label();
//! assert!(session.submit_answer(correct).unwrap().correct);
//! session.advance(&mut rng);
//! assert_eq!(session.summary().unwrap().score, 1);
//! ```

mod app;
mod data;
mod models;
mod session;
mod settings;
pub mod terminal;
mod ui;

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use thiserror::Error;

pub use app::App;
pub use data::{
    extract_payload, load_bank, normalize, normalize_record, parse_bank, BankError, LoadError,
    Payload, PayloadSource, QuestionBank, RecordError, DEFAULT_BANK_PATH,
};
pub use models::{AnswerKey, AppState, Choices, Label, Question};
pub use session::{
    choice_order, sample_without_replacement, shuffle_in_place, Feedback, Mode, Presentation,
    QuizSession, RandomSource, RngSource, RunConfig, SessionError, SessionState, Summary,
};
pub use settings::{RunSettings, SettingsError, DEFAULT_NUM_QUESTIONS};
pub use ui::resolve_image_src;

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The bank could not be read or decoded.
    #[error("Failed to load questions: {0}")]
    Load(#[from] LoadError),
    /// The bank decoded fine but no question survived validation.
    #[error("{0}")]
    Bank(#[from] BankError),
    /// Settings could not be saved.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    /// IO error during quiz execution.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A quiz instance that can be run in the terminal.
pub struct Quiz {
    app: App,
}

impl Quiz {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Run the quiz in the terminal.
    ///
    /// This will take over the terminal, display the quiz UI, and return
    /// when the user quits.
    pub fn run(mut self) -> Result<(), QuizError> {
        let mut term = terminal::TerminalGuard::enter()?;
        run_event_loop(&mut term, &mut self.app)
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

fn run_event_loop(terminal: &mut terminal::AppTerminal, app: &mut App) -> Result<(), QuizError> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if handle_input(app, key.code) {
                break;
            }
        }
    }

    Ok(())
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    match app.state {
        AppState::Welcome => handle_welcome_input(app, key),
        AppState::Quiz => handle_quiz_input(app, key),
        AppState::Result => handle_result_input(app, key),
        AppState::Failed => handle_failed_input(key),
    }
}

fn handle_welcome_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Enter => {
            app.start_quiz();
            false
        }
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
            app.increase_count();
            false
        }
        KeyCode::Char('-') | KeyCode::Left => {
            app.decrease_count();
            false
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            app.toggle_shuffle();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

fn handle_quiz_input(app: &mut App, key: KeyCode) -> bool {
    if let KeyCode::Char('q') | KeyCode::Char('Q') = key {
        return true;
    }

    if app.awaiting_next() {
        if let KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') | KeyCode::Right = key {
            app.next_question();
        }
        return false;
    }

    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => app.submit_answer(),
        KeyCode::Char(c) => {
            if let Some(label) = answer_key(c) {
                app.answer(label);
            }
        }
        _ => {}
    }
    false
}

/// `a`-`d` or `1`-`4`.
fn answer_key(c: char) -> Option<Label> {
    match c {
        '1'..='4' => Label::from_index(c as usize - '1' as usize),
        _ => Label::from_key(c.encode_utf8(&mut [0; 4])),
    }
}

fn handle_result_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_results_down();
            false
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_results_up();
            false
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            if app.can_review() {
                app.start_review();
            }
            false
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            app.restart();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        _ => false,
    }
}

fn handle_failed_input(key: KeyCode) -> bool {
    matches!(
        key,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter
    )
}
