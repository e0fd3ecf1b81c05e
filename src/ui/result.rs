use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::session::{Mode, Summary};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(summary) = app.session().and_then(|session| session.summary()) else {
        return;
    };
    let grade_color = get_grade_color(summary.percent());

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], &summary, grade_color);
    render_missed_list(frame, chunks[2], &summary, app.result_scroll());
    render_controls(frame, chunks[3], &summary);
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, summary: &Summary, grade_color: Color) {
    let title = match summary.review_round() {
        None => "RESULTS".to_string(),
        Some(round) => format!("REVIEW ROUND {}", round),
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            summary.headline(),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_missed_list(frame: &mut Frame, area: Rect, summary: &Summary, scroll: usize) {
    let lines: Vec<Line> = summary
        .missed
        .iter()
        .map(|question| {
            Line::from(vec![
                Span::styled(" - ", Style::default().fg(Color::Red)),
                Span::styled(
                    format!("{:>10}  ", question.meta_line()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    truncate_question(&question.prompt),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("  ({}. {})", question.correct_label(), question.correct_text()),
                    Style::default().fg(Color::Green),
                ),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect, summary: &Summary) {
    let hint = match summary.mode {
        _ if !summary.can_review => "j/k scroll  ·  n new quiz  ·  q quit",
        Mode::Main => "j/k scroll  ·  r review missed  ·  n new quiz  ·  q quit",
        Mode::Review { .. } => {
            "j/k scroll  ·  r review again  ·  n new quiz  ·  q quit"
        }
    };
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
