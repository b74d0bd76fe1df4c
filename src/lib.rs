//! # exam-sim
//!
//! A terminal-based multiple-choice exam simulator.
//!
//! Question sets are bilingual JSON papers. An attempt shuffles the
//! question order once, autosaves after every change and resumes from the
//! last save until it is submitted or the clock runs out.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use exam_sim::{Exam, ExamConfig, ExamError, FileStore, PaperRef};
//!
//! # async fn demo() -> Result<(), ExamError> {
//! let config = ExamConfig::new("questions", PaperRef::new("jee_main", "2018"));
//! let exam = Exam::open(&config, Box::new(FileStore::new(".exam-sim")))?;
//!
//! if let Some(score) = exam.run().await? {
//!     println!("{}", score);
//! }
//! # Ok(())
//! # }
//! ```

mod app;
mod data;
mod models;
mod session;
mod storage;
pub mod terminal;
pub mod timer;
mod ui;

use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub use app::{App, AppState, BoxedSession};
pub use data::{
    load_manifest, load_question_set, manifest_path, prepare_questions, preview, LoadError,
    Manifest, PaperRef, Year,
};
pub use models::{
    Language, Localized, PaletteStatus, Question, QuestionSet, QuestionSetMeta, Score,
    SessionRecord, MARKS_CORRECT, MARKS_WRONG,
};
pub use session::{ExamSession, SessionState, Tick, DEFAULT_DURATION_SECS};
pub use storage::{FileStore, MemoryStore, RecordStore, StoreError};

use terminal::TerminalGuard;
use timer::Countdown;

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Error type for exam operations.
#[derive(Debug, Error)]
pub enum ExamError {
    #[error("failed to load questions: {0}")]
    Load(#[from] LoadError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Where to find a paper and how long to allow for it.
#[derive(Debug, Clone)]
pub struct ExamConfig {
    pub questions_dir: PathBuf,
    pub paper: PaperRef,
    /// Overrides the document's duration when set.
    pub duration_seconds: Option<u64>,
}

impl ExamConfig {
    pub fn new(questions_dir: impl Into<PathBuf>, paper: PaperRef) -> Self {
        Self {
            questions_dir: questions_dir.into(),
            paper,
            duration_seconds: None,
        }
    }
}

/// An exam attempt that can be run in the terminal.
pub struct Exam {
    app: App,
}

impl Exam {
    pub fn new(session: BoxedSession, title: impl Into<String>) -> Self {
        Self {
            app: App::new(session, title),
        }
    }

    /// Load the configured paper and start or resume its attempt.
    pub fn open(config: &ExamConfig, store: Box<dyn RecordStore>) -> Result<Self, ExamError> {
        let paper = &config.paper;
        let set = load_question_set(paper.path_in(&config.questions_dir))?;

        let title = format!(
            "{} · {}",
            set.exam_name().map(str::to_uppercase).unwrap_or_else(|| paper.label()),
            paper.year
        );
        let duration = config.duration_seconds.or_else(|| set.duration_seconds());
        let session = ExamSession::new(set.questions, duration, store, paper.store_key())?;

        Ok(Self::new(session, title))
    }

    /// Run the exam in the terminal until the user quits.
    ///
    /// Returns the score if the attempt was submitted or timed out; quitting
    /// mid-exam leaves the autosave in place and returns `None`.
    pub async fn run(mut self) -> Result<Option<Score>, ExamError> {
        let mut term = TerminalGuard::enter()?;
        let mut input = spawn_input_reader();
        let mut countdown = Countdown::start();

        loop {
            term.draw(|frame| ui::render(frame, &self.app))?;

            tokio::select! {
                _ = countdown.tick(), if self.app.state == AppState::Exam => {
                    if let Tick::Expired(score) = self.app.on_tick() {
                        info!(score = score.score, "attempt timed out");
                    }
                }
                received = input.recv() => match received {
                    Some(Ok(InputEvent::Key(key))) => {
                        let was_welcome = self.app.state == AppState::Welcome;
                        if handle_input(&mut self.app, key) {
                            break;
                        }
                        if was_welcome && self.app.state == AppState::Exam {
                            countdown.restart();
                        }
                    }
                    Some(Ok(InputEvent::Redraw)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                },
            }

            if self.app.session().is_finished() && countdown.cancel() {
                debug!("countdown cancelled");
            }
        }

        drop(term);
        let session = self.app.session();
        Ok(session.is_finished().then(|| session.score()))
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

enum InputEvent {
    Key(KeyCode),
    Redraw,
}

/// Read terminal events on a plain thread so the async loop only sees
/// ready keys. The thread exits once the receiver is dropped.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<io::Result<InputEvent>> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            }

            let input = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => InputEvent::Key(key.code),
                Ok(Event::Resize(..)) => InputEvent::Redraw,
                Ok(_) => continue,
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            };
            if tx.send(Ok(input)).is_err() {
                break;
            }
        }
    });

    rx
}

/// Returns true if the app should exit.
fn handle_input(app: &mut App, key: KeyCode) -> bool {
    match app.state {
        AppState::Welcome => handle_welcome_input(app, key),
        AppState::Exam => handle_exam_input(app, key),
        AppState::Result => handle_result_input(app, key),
    }
}

fn handle_welcome_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Enter => {
            app.start_exam();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}

fn handle_exam_input(app: &mut App, key: KeyCode) -> bool {
    if app.is_confirming_submit() {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_submit_prompt(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.answer_submit_prompt(false)
            }
            _ => {}
        }
        return false;
    }

    match key {
        KeyCode::Char(digit) if digit.is_ascii_digit() => app.push_jump_digit(digit),
        KeyCode::Char('g') if !app.jump_input().is_empty() => app.jump(),
        KeyCode::Esc => app.cancel_jump(),
        KeyCode::Left | KeyCode::Char('h') => app.previous_question(),
        KeyCode::Right | KeyCode::Char('l') => app.next_question(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => app.choose_selected_option(),
        KeyCode::Char('c') => app.clear_response(),
        KeyCode::Char('m') => app.toggle_mark(),
        KeyCode::Char('t') => app.switch_language(),
        KeyCode::Char('s') => app.request_submit(),
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

fn handle_result_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_results_down();
            false
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_results_up();
            false
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}
