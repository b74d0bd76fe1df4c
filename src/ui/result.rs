use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::models::{Question, Score};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let score = app.score();
    let grade_color = get_grade_color(score.percentage());

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(9),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], &score, grade_color);
    render_question_breakdown(frame, chunks[2], app, app.result_scroll());
    render_controls(frame, chunks[3]);
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, score: &Score, grade_color: Color) {
    let muted = Style::default().fg(Color::DarkGray);
    let content = vec![
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Score {}  ({:.0}%)", score.score, score.percentage()),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Total {}  ·  Answered {}", score.total, score.answered),
            muted,
        )),
        Line::from(vec![
            Span::styled(format!("Correct {}", score.correct), Style::default().fg(Color::Green)),
            Span::styled("  ·  ", muted),
            Span::styled(format!("Wrong {}", score.wrong), Style::default().fg(Color::Red)),
            Span::styled("  ·  ", muted),
            Span::styled(format!("Unattempted {}", score.unattempted), muted),
        ]),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn outcome(question: &Question, answer: Option<usize>) -> (&'static str, Color) {
    match answer {
        None => ("·", Color::DarkGray),
        Some(option) if question.is_correct(option) => ("+", Color::Green),
        Some(_) => ("-", Color::Red),
    }
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, app: &App, scroll: usize) {
    let session = app.session();
    let lines: Vec<Line> = session
        .questions()
        .iter()
        .zip(session.answers().iter())
        .map(|(question, answer)| {
            let (symbol, color) = outcome(question, *answer);
            let preview = truncate_question(question.text(session.language()));

            Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", question.index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(preview, Style::default().fg(Color::Gray)),
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

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Localized;
    use crate::session::ExamSession;
    use crate::storage::{MemoryStore, RecordStore};
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), app))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_breakdown_follows_display_language() {
        let question = Question {
            index: 0,
            text: Localized {
                en: "English wording".to_string(),
                hi: "Hindi wording".to_string(),
            },
            options: Localized {
                en: vec!["a".to_string(), "b".to_string()],
                hi: vec!["a".to_string(), "b".to_string()],
            },
            correct_option: 0,
        };
        let store: Box<dyn RecordStore> = Box::new(MemoryStore::new());
        let session = ExamSession::new(vec![question], Some(60), store, "lang_2020").unwrap();
        let mut app = App::new(session, "LANG");

        app.start_exam();
        app.switch_language();
        app.finish();

        let text = screen_text(&app);
        assert!(text.contains("Hindi wording"));
        assert!(!text.contains("English wording"));
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let hindi = "प्र".repeat(30);
        let truncated = truncate_question(&hindi);
        assert_eq!(truncated.chars().count(), QUESTION_PREVIEW_LENGTH + 3);
        assert_eq!(truncate_question("short"), "short");
    }

    #[test]
    fn test_grade_colors() {
        assert_eq!(get_grade_color(95.0), Color::Green);
        assert_eq!(get_grade_color(75.0), Color::Cyan);
        assert_eq!(get_grade_color(55.0), Color::Yellow);
        assert_eq!(get_grade_color(0.0), Color::Red);
    }
}
