mod error;
mod quiz;
mod result;
mod welcome;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::models::AppState;

pub use quiz::resolve_image_src;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.state {
        AppState::Welcome => welcome::render(frame, area, app),
        AppState::Quiz => quiz::render(frame, area, app),
        AppState::Result => result::render(frame, area, app),
        AppState::Failed => error::render(frame, area, app.error_message().unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::data::parse_bank;
    use crate::session::ScriptedSource;
    use crate::settings::RunSettings;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let bank = parse_bank(
            r#"[
                {"question": "Which sign is an octagon?", "chapter": 2, "number": 4,
                 "choices": ["Stop", "Yield", "Merge", "Detour"], "answer": "A",
                 "images": ["question_images/stop.png"]},
                {"question": "broken", "choices": ["x"], "answer": "A"}
            ]"#,
        )
        .unwrap();
        let settings = RunSettings {
            shuffle_choices: false,
            ..RunSettings::default()
        };
        App::new(bank, settings, Box::new(ScriptedSource::identity()))
    }

    #[test]
    fn test_welcome_screen() {
        let text = screen_text(&app());
        assert!(text.contains("1 questions"));
        assert!(text.contains("1 skipped"));
        assert!(text.contains(&format!("v{}", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn test_quiz_screen_and_feedback() {
        let mut app = app();
        app.start_quiz();
        let text = screen_text(&app);
        assert!(text.contains("Quiz • Score: 0/0 • Question: 1/1"));
        assert!(text.contains("Chapter 2 • Q4"));
        assert!(text.contains("Which sign is an octagon?"));
        assert!(text.contains("static/question_images/stop.png"));
        assert!(text.contains("A. Stop"));

        app.answer(crate::models::Label::B);
        let text = screen_text(&app);
        assert!(text.contains("Incorrect. Correct answer: A. Stop"));
        assert!(text.contains("View results"));
    }

    #[test]
    fn test_result_screen() {
        let mut app = app();
        app.start_quiz();
        app.answer(crate::models::Label::C);
        app.next_question();

        let text = screen_text(&app);
        assert!(text.contains("Quiz complete • Score: 0/1 (0.0%) • Missed: 1"));
        assert!(text.contains("r review missed"));
    }

    #[test]
    fn test_error_screen() {
        let text = screen_text(&App::failed("failed to read question_bank.json"));
        assert!(text.contains("failed to read question_bank.json"));
    }
}
