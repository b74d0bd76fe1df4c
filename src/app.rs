use tracing::debug;

use crate::models::{Question, Score};
use crate::session::{ExamSession, Tick};
use crate::storage::RecordStore;

/// Which screen the terminal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Welcome,
    Exam,
    Result,
}

/// Longest question number that can be typed for a palette jump.
const MAX_JUMP_DIGITS: usize = 4;

pub type BoxedSession = ExamSession<Box<dyn RecordStore>>;

pub struct App {
    pub state: AppState,
    session: BoxedSession,
    title: String,
    selected_option: usize,
    confirm_submit: bool,
    jump_input: String,
    result_scroll: usize,
}

impl App {
    pub fn new(session: BoxedSession, title: impl Into<String>) -> Self {
        let selected_option = session.current_answer().unwrap_or(0);
        Self {
            state: AppState::Welcome,
            session,
            title: title.into(),
            selected_option,
            confirm_submit: false,
            jump_input: String::new(),
            result_scroll: 0,
        }
    }

    pub fn session(&self) -> &BoxedSession {
        &self.session
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn current_question(&self) -> &Question {
        self.session.current_question()
    }

    pub fn current_question_number(&self) -> usize {
        self.session.current_position() + 1
    }

    pub fn total_questions(&self) -> usize {
        self.session.total_questions()
    }

    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn is_confirming_submit(&self) -> bool {
        self.confirm_submit
    }

    pub fn jump_input(&self) -> &str {
        &self.jump_input
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn is_resumed(&self) -> bool {
        self.session.visited().iter().filter(|v| **v).count() > 1
            || self.session.answers().iter().any(Option::is_some)
    }

    pub fn start_exam(&mut self) {
        if self.session.is_finished() {
            self.state = AppState::Result;
        } else {
            self.state = AppState::Exam;
        }
    }

    fn sync_cursor(&mut self) {
        self.selected_option = self.session.current_answer().unwrap_or(0);
    }

    fn option_count(&self) -> usize {
        self.current_question().option_count()
    }

    pub fn select_next_option(&mut self) {
        let count = self.option_count();
        self.selected_option = (self.selected_option + 1) % count;
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        self.selected_option = (self.selected_option + count - 1) % count;
    }

    pub fn choose_selected_option(&mut self) {
        self.session.select_answer(self.selected_option);
    }

    /// Save & next.
    pub fn next_question(&mut self) {
        if self.session.next() {
            self.sync_cursor();
        }
    }

    pub fn previous_question(&mut self) {
        if self.session.previous() {
            self.sync_cursor();
        }
    }

    pub fn clear_response(&mut self) {
        self.session.clear_answer();
        self.selected_option = 0;
    }

    pub fn toggle_mark(&mut self) {
        self.session.toggle_mark();
    }

    pub fn switch_language(&mut self) {
        self.session.switch_language();
    }

    pub fn push_jump_digit(&mut self, digit: char) {
        if digit.is_ascii_digit() && self.jump_input.len() < MAX_JUMP_DIGITS {
            self.jump_input.push(digit);
        }
    }

    pub fn cancel_jump(&mut self) {
        self.jump_input.clear();
    }

    /// Jump to the palette entry whose number was typed; palette numbers
    /// are question indices plus one.
    pub fn jump(&mut self) {
        let typed = std::mem::take(&mut self.jump_input);
        let Some(index) = typed.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
            return;
        };
        if let Some(position) = self.session.position_of(index) {
            if self.session.go_to(position).is_some() {
                debug!(index, position, "palette jump");
                self.sync_cursor();
            }
        }
    }

    pub fn request_submit(&mut self) {
        self.confirm_submit = true;
    }

    pub fn answer_submit_prompt(&mut self, confirmed: bool) {
        self.confirm_submit = false;
        if confirmed {
            self.finish();
        }
    }

    pub fn finish(&mut self) -> Score {
        let score = self.session.finish();
        self.state = AppState::Result;
        self.result_scroll = 0;
        score
    }

    /// Apply one countdown tick; moves to the result screen on expiry.
    pub fn on_tick(&mut self) -> Tick {
        let tick = self.session.tick();
        if let Tick::Expired(_) = tick {
            self.confirm_submit = false;
            self.state = AppState::Result;
            self.result_scroll = 0;
        }
        tick
    }

    pub fn score(&self) -> Score {
        self.session.score()
    }

    pub fn scroll_results_down(&mut self) {
        let max_scroll = self.total_questions().saturating_sub(1);
        self.result_scroll = (self.result_scroll + 1).min(max_scroll);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }
}
