use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(14),
        Constraint::Fill(1),
    ])
    .split(area);

    let settings = app.settings();
    let bank_line = if app.skipped() > 0 {
        format!(
            "{} questions · {} skipped",
            app.total_questions(),
            app.skipped()
        )
    } else {
        format!("{} questions", app.total_questions())
    };
    let shuffle = if settings.shuffle_choices { "on" } else { "off" };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "QUESTION BANK QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(bank_line, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Questions per run: ", Style::default().fg(Color::Gray)),
            Span::styled(
                settings.num_questions.to_string(),
                Style::default().fg(Color::White).bold(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Shuffle choices: ", Style::default().fg(Color::Gray)),
            Span::styled(shuffle, Style::default().fg(Color::White).bold()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from("to start".fg(Color::DarkGray)),
        Line::from(""),
        Line::from("+/- count  ·  s shuffle  ·  q quit".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .title_bottom(
                Line::from(format!(" v{} ", env!("CARGO_PKG_VERSION"))).right_aligned(),
            ),
    );

    frame.render_widget(widget, chunks[1]);
}
