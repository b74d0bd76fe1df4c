use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::models::PaletteStatus;

const PER_ROW: usize = 5;

fn status_style(status: PaletteStatus) -> Style {
    match status {
        PaletteStatus::NotVisited => Style::default().fg(Color::DarkGray),
        PaletteStatus::Marked => Style::default().fg(Color::Magenta),
        PaletteStatus::NotAnswered => Style::default().fg(Color::Red),
        PaletteStatus::Answered => Style::default().fg(Color::Green),
    }
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let current = session.current_question().index;

    let entries: Vec<Span> = session
        .palette()
        .map(|(index, status)| {
            let mut style = status_style(status);
            if index == current {
                style = style.bold().reversed();
            }
            Span::styled(format!("{:>3} ", index + 1), style)
        })
        .collect();

    let mut lines: Vec<Line> = entries
        .chunks(PER_ROW)
        .map(|row| Line::from(row.to_vec()))
        .collect();

    lines.push(Line::from(""));
    for (label, status) in [
        ("answered", PaletteStatus::Answered),
        ("not answered", PaletteStatus::NotAnswered),
        ("marked", PaletteStatus::Marked),
        ("not visited", PaletteStatus::NotVisited),
    ] {
        lines.push(Line::from(Span::styled(format!("■ {}", label), status_style(status))));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(" Palette ")
            .borders(Borders::LEFT)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
