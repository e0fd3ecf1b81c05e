use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame, area: Rect, message: &str) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(9),
        Constraint::Fill(1),
    ])
    .margin(2)
    .split(area);

    let content = vec![
        Line::from(Span::styled(
            "CANNOT START QUIZ",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(message.fg(Color::Gray)),
        Line::from(""),
        Line::from("q quit".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::Red)
                .padding(Padding::uniform(1)),
        );
    frame.render_widget(widget, chunks[1]);
}
