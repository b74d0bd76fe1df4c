use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::app::App;
use crate::timer::format_clock;

use super::palette;

const PALETTE_WIDTH: u16 = 28;
const LOW_TIME_SECS: u64 = 5 * 60;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::horizontal([Constraint::Fill(1), Constraint::Length(PALETTE_WIDTH)])
        .split(area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(columns[0]);

    render_header(frame, chunks[0], app);
    render_question_text(frame, chunks[1], app);
    render_options(frame, chunks[2], app);
    render_controls(frame, chunks[3], app);
    palette::render(frame, columns[1], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let halves = Layout::horizontal([Constraint::Fill(1), Constraint::Length(24)]).split(area);

    let mut title = vec![Span::styled(
        format!("Question {}", app.current_question_number()),
        Style::default().fg(Color::White).bold(),
    )];
    if session.current_marked() {
        title.push(Span::styled("  [marked]", Style::default().fg(Color::Magenta)));
    }
    frame.render_widget(Paragraph::new(Line::from(title)), halves[0]);

    let remaining = session.remaining_seconds();
    let clock_color = if remaining <= LOW_TIME_SECS {
        Color::Red
    } else {
        Color::Yellow
    };
    let status = Line::from(vec![
        Span::styled(
            format!("{}  ", session.language().code().to_uppercase()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format_clock(remaining), Style::default().fg(clock_color).bold()),
    ]);
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Right), halves[1]);
}

fn render_question_text(frame: &mut Frame, area: Rect, app: &App) {
    let text = app.current_question().text(app.session().language());
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> char {
    char::from_u32('A' as u32 + index as u32).unwrap_or('?')
}

fn render_options(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let options = app.current_question().options(session.language());
    let answered = session.current_answer();
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_cursor = index == app.selected_option();
        let is_answer = answered == Some(index);
        let style = match (is_cursor, is_answer) {
            (_, true) => Style::default().fg(Color::Green).bold(),
            (true, false) => Style::default().fg(Color::Cyan).bold(),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let marker = if is_cursor { ">" } else { " " };
        let radio = if is_answer { "(•)" } else { "( )" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{} {}. ", radio, option_label(index)), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let widget = if app.is_confirming_submit() {
        Paragraph::new("Submit test? y / n")
            .alignment(Alignment::Center)
            .fg(Color::Yellow)
            .bold()
    } else if !app.jump_input().is_empty() {
        Paragraph::new(format!("go to question {}_  (g to jump, esc to cancel)", app.jump_input()))
            .alignment(Alignment::Center)
            .fg(Color::Cyan)
    } else {
        Paragraph::new(
            "h/l prev/next · j/k move · enter select · c clear · m mark · t language · s submit · q quit",
        )
        .alignment(Alignment::Center)
        .fg(Color::DarkGray)
    };
    frame.render_widget(widget, area);
}
