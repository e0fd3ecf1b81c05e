use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use quizbank::{
    load_bank, App, Quiz, QuizError, QuestionBank, RandomSource, RngSource, RunSettings,
    DEFAULT_BANK_PATH,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file to load the question bank from
    #[arg(short, long, default_value = DEFAULT_BANK_PATH)]
    bank: PathBuf,

    /// Number of questions in the main run (clamped to the bank size)
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Shuffle the answer choices of every question
    #[arg(long, conflicts_with = "no_shuffle")]
    shuffle: bool,

    /// Keep answer choices in bank order
    #[arg(long)]
    no_shuffle: bool,

    /// Seed for reproducible question order and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file holding saved run settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective run settings back to the settings file
    #[arg(long, requires = "settings")]
    save_settings: bool,

    /// Print the normalized bank and exit instead of starting a quiz
    #[arg(long)]
    list: bool,

    /// Append log output to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn run_settings(&self) -> RunSettings {
        let mut settings = self
            .settings
            .as_deref()
            .map(RunSettings::load_or_default)
            .unwrap_or_default();

        if let Some(count) = self.count {
            settings.num_questions = count;
        }
        if self.shuffle {
            settings.shuffle_choices = true;
        }
        if self.no_shuffle {
            settings.shuffle_choices = false;
        }
        settings
    }

    fn random_source(&self) -> Box<dyn RandomSource> {
        match self.seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::thread()),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.log_file.as_deref(), args.list) {
        eprintln!("Failed to open log file: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), QuizError> {
    let settings = args.run_settings();
    if let (true, Some(path)) = (args.save_settings, &args.settings) {
        settings.clone().stamped().save(path)?;
    }

    let loaded = load_bank(&args.bank).await;

    if args.list {
        let bank = loaded?;
        print!("{}", format_listing(&bank));
        bank.require_questions()?;
        return Ok(());
    }

    let app = match loaded {
        Ok(bank) => {
            let app = App::new(bank, settings, args.random_source());
            match args.settings {
                Some(path) => app.with_settings_path(path),
                None => app,
            }
        }
        Err(e) => App::failed(e.to_string()),
    };
    Quiz::new(app).run()
}

fn format_listing(bank: &QuestionBank) -> String {
    let mut out = String::new();
    for question in &bank.questions {
        out.push_str(&format!(
            "{:<12} {:<18} [{}] {}\n",
            question.id,
            question.meta_line(),
            question.correct_label(),
            question.prompt
        ));
    }
    out.push_str(&format!(
        "{} questions, {} skipped ({})\n",
        bank.questions.len(),
        bank.skipped,
        bank.source
    ));
    out
}

fn init_tracing(log_file: Option<&Path>, to_stderr: bool) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}
