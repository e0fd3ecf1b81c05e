use std::path::PathBuf;

use tracing::{info, warn};

use crate::data::QuestionBank;
use crate::models::{AppState, Label, Question};
use crate::session::{Mode, QuizSession, RandomSource, RngSource, SessionState};
use crate::settings::RunSettings;

const NUM_OPTIONS: usize = 4;

pub struct App {
    pub state: AppState,
    questions: Vec<Question>,
    skipped: usize,
    settings: RunSettings,
    settings_path: Option<PathBuf>,
    rng: Box<dyn RandomSource>,
    session: Option<QuizSession>,
    selected_option: usize,
    result_scroll: usize,
    error: Option<String>,
}

impl App {
    /// An app over a loaded bank. An empty bank lands on the error screen.
    pub fn new(bank: QuestionBank, settings: RunSettings, rng: Box<dyn RandomSource>) -> Self {
        let error = bank.require_questions().err().map(|err| err.to_string());
        let state = if error.is_some() {
            AppState::Failed
        } else {
            AppState::Welcome
        };
        let settings = RunSettings {
            num_questions: settings.num_questions.clamp(1, bank.questions.len().max(1)),
            ..settings
        };

        Self {
            state,
            questions: bank.questions,
            skipped: bank.skipped,
            settings,
            settings_path: None,
            rng,
            session: None,
            selected_option: 0,
            result_scroll: 0,
            error,
        }
    }

    /// An app that can only show `message`, for banks that failed to load.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            state: AppState::Failed,
            questions: Vec::new(),
            skipped: 0,
            settings: RunSettings::default(),
            settings_path: None,
            rng: Box::new(RngSource::thread()),
            session: None,
            selected_option: 0,
            result_scroll: 0,
            error: Some(message.into()),
        }
    }

    /// Saves the settings to `path` each time a main run starts.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn increase_count(&mut self) {
        if self.settings.num_questions < self.questions.len() {
            self.settings.num_questions += 1;
        }
    }

    pub fn decrease_count(&mut self) {
        if self.settings.num_questions > 1 {
            self.settings.num_questions -= 1;
        }
    }

    pub fn toggle_shuffle(&mut self) {
        self.settings.shuffle_choices = !self.settings.shuffle_choices;
    }

    pub fn select_next_option(&mut self) {
        self.selected_option = (self.selected_option + 1) % NUM_OPTIONS;
    }

    pub fn select_previous_option(&mut self) {
        self.selected_option = (self.selected_option + NUM_OPTIONS - 1) % NUM_OPTIONS;
    }

    /// Starts a main run with the current settings.
    pub fn start_quiz(&mut self) {
        let config = self.settings.run_config();
        match QuizSession::start(&self.questions, Mode::Main, config, self.rng.as_mut()) {
            Ok(session) => {
                self.save_settings();
                self.enter_run(session);
            }
            Err(err) => warn!(error = %err, "cannot start quiz"),
        }
    }

    fn save_settings(&mut self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        let stamped = self.settings.clone().stamped();
        match stamped.save(path) {
            Ok(()) => {
                info!(path = %path.display(), "saved run settings");
                self.settings = stamped;
            }
            Err(err) => warn!(error = %err, "cannot save run settings"),
        }
    }

    /// Starts the next review round from the finished run's missed questions.
    pub fn start_review(&mut self) {
        let Some(finished) = &self.session else {
            return;
        };
        match finished.start_review(self.rng.as_mut()) {
            Ok(session) => self.enter_run(session),
            Err(err) => warn!(error = %err, "cannot start review"),
        }
    }

    fn enter_run(&mut self, session: QuizSession) {
        self.session = Some(session);
        self.selected_option = 0;
        self.result_scroll = 0;
        self.state = AppState::Quiz;
    }

    /// Submits the highlighted choice.
    pub fn submit_answer(&mut self) {
        if let Some(label) = Label::from_index(self.selected_option) {
            self.answer(label);
        }
    }

    /// Submits `label` directly, highlighting it.
    pub fn answer(&mut self, label: Label) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.submit_answer(label).is_some() {
            self.selected_option = label.index();
        }
    }

    /// Moves on after feedback; shows the results when the run is over.
    pub fn next_question(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.advance(self.rng.as_mut()) {
            return;
        }
        self.selected_option = 0;
        if session.is_finished() {
            self.state = AppState::Result;
        }
    }

    /// Whether the current question is waiting for the user to move on.
    pub fn awaiting_next(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.state() == SessionState::Answered)
    }

    pub fn can_review(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.is_finished() && session.can_review())
    }

    pub fn scroll_results_down(&mut self) {
        let missed = self.session.as_ref().map_or(0, |session| session.missed().len());
        if self.result_scroll + 1 < missed {
            self.result_scroll += 1;
        }
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    /// Drops the finished run and goes back to the welcome screen.
    pub fn restart(&mut self) {
        self.state = AppState::Welcome;
        self.session = None;
        self.selected_option = 0;
        self.result_scroll = 0;
    }
}
