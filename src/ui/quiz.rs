use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::session::{Feedback, Presentation, QuizSession};

const URL_PREFIXES: [&str; 4] = ["http:", "https:", "data:", "blob:"];
const ASSET_DIR: &str = "static/";

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session() else {
        return;
    };
    let Some(presentation) = session.presentation() else {
        return;
    };
    let images = &presentation.question().images;
    let chunks = create_layout(area, images.len());

    render_status(frame, chunks[0], session);
    render_meta(frame, chunks[1], presentation);
    render_question_text(frame, chunks[2], &presentation.question().prompt);
    render_images(frame, chunks[3], images);
    render_options(frame, chunks[4], presentation, app.selected_option(), session.feedback());
    render_feedback(frame, chunks[5], session);
    render_controls(frame, chunks[6], session.feedback().is_some());
}

fn create_layout(area: Rect, image_count: usize) -> std::rc::Rc<[Rect]> {
    let image_height = if image_count == 0 {
        0
    } else {
        image_count.min(4) as u16 + 2
    };

    Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Length(image_height),
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area)
}

fn render_status(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let widget = Paragraph::new(session.status_line())
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn render_meta(frame: &mut Frame, area: Rect, presentation: &Presentation) {
    let widget = Paragraph::new(presentation.question().meta_line()).fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_images(frame: &mut Frame, area: Rect, images: &[String]) {
    if images.is_empty() {
        return;
    }

    let lines: Vec<Line> = images
        .iter()
        .map(|path| Line::from(Span::styled(resolve_image_src(path), Style::default().fg(Color::Yellow))))
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title("Images")
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    presentation: &Presentation,
    selected: usize,
    feedback: Option<&Feedback>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(8);

    for (label, option) in presentation.display_choices() {
        let is_selected = label.index() == selected;
        let style = match feedback {
            Some(_) if label == presentation.correct_display_label() => {
                Style::default().fg(Color::Green).bold()
            }
            Some(feedback) if label == feedback.chosen => Style::default().fg(Color::Red).bold(),
            Some(_) => Style::default().fg(Color::DarkGray),
            None if is_selected => Style::default().fg(Color::Cyan).bold(),
            None => Style::default().fg(Color::Gray),
        };
        let marker = if is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", label), style),
            Span::styled(option, style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_feedback(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let Some(feedback) = session.feedback() else {
        return;
    };
    let color = if feedback.correct {
        Color::Green
    } else {
        Color::Red
    };

    let content = vec![
        Line::from(Span::styled(
            feedback.message(),
            Style::default().fg(color).bold(),
        )),
        Line::from(Span::styled(
            format!("enter {}", session.next_label()),
            Style::default().fg(Color::Cyan),
        )),
    ];
    frame.render_widget(Paragraph::new(content), area);
}

fn render_controls(frame: &mut Frame, area: Rect, answered: bool) {
    let hint = if answered {
        "enter continue  ·  q quit"
    } else {
        "j/k navigate  ·  enter select  ·  a-d answer  ·  q quit"
    };
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

/// Where a bank image path points for display. URLs, absolute paths and
/// paths already under `static/` are kept; other paths live under `static/`.
pub fn resolve_image_src(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        return String::new();
    }

    let is_url = URL_PREFIXES.iter().any(|prefix| {
        path.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    });
    if is_url || path.starts_with('/') || path.starts_with(ASSET_DIR) {
        return path.to_string();
    }

    format!("{}{}", ASSET_DIR, path)
}
