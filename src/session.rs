//! In-memory state of one attempt at one question set.
//!
//! The session owns every piece of mutable attempt state. Each mutating
//! operation autosaves a [`SessionRecord`] through its [`RecordStore`];
//! store failures are logged and dropped so a broken disk never blocks
//! answering.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::data::{prepare_questions, LoadError};
use crate::models::{Language, PaletteStatus, Question, Score, SessionRecord};
use crate::storage::RecordStore;

/// Used when neither the caller nor the document gives a duration.
pub const DEFAULT_DURATION_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Finished,
}

/// Outcome of one countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still running with this many seconds left.
    Running(u64),
    /// This tick ran the clock out and finished the session.
    Expired(Score),
    /// The session had already finished.
    Idle,
}

pub struct ExamSession<S: RecordStore> {
    questions: Vec<Question>,
    store: S,
    key: String,
    order: Vec<usize>,
    current: usize,
    answers: Vec<Option<usize>>,
    marked: Vec<bool>,
    visited: Vec<bool>,
    language: Language,
    remaining_seconds: u64,
    state: SessionState,
    final_score: Option<Score>,
}

impl<S: RecordStore> ExamSession<S> {
    /// Start or resume an attempt, shuffling with the thread RNG.
    pub fn new(
        questions: Vec<Question>,
        duration_seconds: Option<u64>,
        store: S,
        key: impl Into<String>,
    ) -> Result<Self, LoadError> {
        Self::with_rng(questions, duration_seconds, store, key, &mut rand::rng())
    }

    /// Start or resume an attempt.
    ///
    /// A non-final record saved under `key` that matches these questions
    /// replaces the fresh state. Any other record is ignored.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if `questions` is empty or inconsistent.
    pub fn with_rng<R: Rng + ?Sized>(
        mut questions: Vec<Question>,
        duration_seconds: Option<u64>,
        store: S,
        key: impl Into<String>,
        rng: &mut R,
    ) -> Result<Self, LoadError> {
        prepare_questions(&mut questions)?;
        let total = questions.len();

        let mut order: Vec<usize> = (0..total).collect();
        order.shuffle(rng);

        let mut session = Self {
            questions,
            store,
            key: key.into(),
            order,
            current: 0,
            answers: vec![None; total],
            marked: vec![false; total],
            visited: vec![false; total],
            language: Language::default(),
            remaining_seconds: duration_seconds.unwrap_or(DEFAULT_DURATION_SECS),
            state: SessionState::Active,
            final_score: None,
        };

        session.restore();
        let shown = session.order[session.current];
        session.visited[shown] = true;

        info!(
            key = %session.key,
            questions = total,
            remaining_seconds = session.remaining_seconds,
            "exam session started"
        );
        Ok(session)
    }

    fn restore(&mut self) {
        let record = match self.store.load(&self.key) {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(err) => {
                warn!(key = %self.key, error = %err, "ignoring unreadable saved attempt");
                return;
            }
        };

        if record.is_final {
            debug!(key = %self.key, "saved attempt was submitted; starting fresh");
            return;
        }

        let questions = &self.questions;
        if !record.fits(questions.len(), |index| questions[index].option_count()) {
            warn!(key = %self.key, "saved attempt does not match question set; starting fresh");
            return;
        }

        self.answers = record.answers;
        self.marked = record.marked;
        self.visited = record.visited;
        self.order = record.order;
        self.current = record.current;
        self.language = record.lang;
        if record.timer_sec > 0 {
            self.remaining_seconds = record.timer_sec;
        }
        debug!(
            key = %self.key,
            current = self.current,
            remaining_seconds = self.remaining_seconds,
            "resumed saved attempt"
        );
    }

    /// Snapshot of the attempt in its persisted shape.
    pub fn record(&self) -> SessionRecord {
        SessionRecord {
            answers: self.answers.clone(),
            marked: self.marked.clone(),
            visited: self.visited.clone(),
            order: self.order.clone(),
            current: self.current,
            lang: self.language,
            timer_sec: self.remaining_seconds,
            is_final: self.is_finished(),
        }
    }

    fn autosave(&mut self) {
        let record = self.record();
        if let Err(err) = self.store.save(&self.key, &record) {
            warn!(key = %self.key, error = %err, "autosave failed");
        }
    }

    fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    fn current_index(&self) -> usize {
        self.order[self.current]
    }

    /// Jump to a display position, returning the question and its answer.
    pub fn go_to(&mut self, position: usize) -> Option<(&Question, Option<usize>)> {
        if !self.is_active() || position >= self.order.len() {
            return None;
        }

        self.current = position;
        let index = self.current_index();
        self.visited[index] = true;
        self.autosave();

        Some((&self.questions[index], self.answers[index]))
    }

    /// Returns false when already at the last question.
    pub fn next(&mut self) -> bool {
        let target = self.current + 1;
        self.go_to(target).is_some()
    }

    /// Returns false when already at the first question.
    pub fn previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(target) => self.go_to(target).is_some(),
            None => false,
        }
    }

    pub fn select_answer(&mut self, option: usize) {
        if !self.is_active() {
            return;
        }
        let index = self.current_index();
        if option >= self.questions[index].option_count() {
            return;
        }

        self.answers[index] = Some(option);
        self.autosave();
    }

    pub fn clear_answer(&mut self) {
        if !self.is_active() {
            return;
        }
        let index = self.current_index();
        self.answers[index] = None;
        self.autosave();
    }

    pub fn toggle_mark(&mut self) {
        if !self.is_active() {
            return;
        }
        let index = self.current_index();
        self.marked[index] = !self.marked[index];
        self.autosave();
    }

    /// Flip the display language. Answers are option positions and stay
    /// put; loading guarantees both languages list the same option count.
    pub fn switch_language(&mut self) {
        if !self.is_active() {
            return;
        }
        self.language = self.language.toggle();
        self.autosave();
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if !self.is_active() {
            return Tick::Idle;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            info!(key = %self.key, "time is up");
            return Tick::Expired(self.finish());
        }

        self.autosave();
        Tick::Running(self.remaining_seconds)
    }

    /// Submit the attempt. Calling it again returns the same score without
    /// touching the store.
    pub fn finish(&mut self) -> Score {
        if let Some(score) = self.final_score {
            return score;
        }

        self.state = SessionState::Finished;
        let score = self.score();
        self.final_score = Some(score);
        self.autosave();

        info!(
            key = %self.key,
            score = score.score,
            correct = score.correct,
            wrong = score.wrong,
            unattempted = score.unattempted,
            "exam submitted"
        );
        score
    }

    /// Marks over all questions, independent of display order.
    pub fn score(&self) -> Score {
        Score::compute(&self.questions, &self.answers)
    }

    pub fn palette_status(&self, index: usize) -> Option<PaletteStatus> {
        Some(PaletteStatus::resolve(
            *self.visited.get(index)?,
            self.marked[index],
            self.answers[index].is_some(),
        ))
    }

    /// Status of every question in index order.
    pub fn palette(&self) -> impl Iterator<Item = (usize, PaletteStatus)> + '_ {
        (0..self.questions.len()).filter_map(|index| Some((index, self.palette_status(index)?)))
    }

    /// Display position of the question with this index.
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|&i| i == index)
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index()]
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answers[self.current_index()]
    }

    pub fn current_marked(&self) -> bool {
        self.marked[self.current_index()]
    }

    pub fn current_position(&self) -> usize {
        self.current
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn marked(&self) -> &[bool] {
        &self.marked
    }

    pub fn visited(&self) -> &[bool] {
        &self.visited
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{is_permutation, Localized};
    use crate::storage::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const KEY: &str = "jee_main_2018";

    fn question(correct_option: usize) -> Question {
        let en: Vec<String> = ["one", "two", "three", "four"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let hi: Vec<String> = ["एक", "दो", "तीन", "चार"].iter().map(|s| s.to_string()).collect();
        Question {
            index: 0,
            text: Localized {
                en: "Pick one".to_string(),
                hi: "एक चुनें".to_string(),
            },
            options: Localized { en, hi },
            correct_option,
        }
    }

    fn questions(n: usize) -> Vec<Question> {
        (0..n).map(|i| question(i % 4)).collect()
    }

    fn session_with(store: MemoryStore, n: usize, seed: u64) -> ExamSession<MemoryStore> {
        let mut rng = StdRng::seed_from_u64(seed);
        ExamSession::with_rng(questions(n), Some(600), store, KEY, &mut rng).unwrap()
    }

    fn session(n: usize) -> ExamSession<MemoryStore> {
        session_with(MemoryStore::new(), n, 7)
    }

    /// Answer the question with `index`, wherever it sits in the order.
    fn answer_index(session: &mut ExamSession<MemoryStore>, index: usize, option: usize) {
        let position = session.position_of(index).unwrap();
        session.go_to(position).unwrap();
        session.select_answer(option);
    }

    #[test]
    fn test_fresh_session_defaults() {
        let session = session(6);
        assert!(is_permutation(session.order(), 6));
        assert_eq!(session.current_position(), 0);
        assert_eq!(session.language(), Language::En);
        assert_eq!(session.remaining_seconds(), 600);
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.answers().iter().all(Option::is_none));
        assert!(session.marked().iter().all(|m| !m));

        let shown = session.order()[0];
        let visited: Vec<usize> = (0..6).filter(|&i| session.visited()[i]).collect();
        assert_eq!(visited, vec![shown]);
    }

    #[test]
    fn test_order_is_permutation_for_many_seeds() {
        for seed in 0..50 {
            let session = session_with(MemoryStore::new(), 13, seed);
            assert!(is_permutation(session.order(), 13), "seed {}", seed);
        }
    }

    #[test]
    fn test_indices_follow_document_order() {
        let session = session(4);
        for (i, question) in session.questions().iter().enumerate() {
            assert_eq!(question.index, i);
        }
    }

    #[test]
    fn test_default_duration() {
        let mut rng = StdRng::seed_from_u64(1);
        let session =
            ExamSession::with_rng(questions(2), None, MemoryStore::new(), KEY, &mut rng).unwrap();
        assert_eq!(session.remaining_seconds(), DEFAULT_DURATION_SECS);
    }

    #[test]
    fn test_empty_question_set_is_rejected() {
        let result = ExamSession::new(Vec::new(), None, MemoryStore::new(), KEY);
        assert!(matches!(result, Err(LoadError::Empty)));
    }

    #[test]
    fn test_go_to_out_of_range_is_noop() {
        let mut session = session(5);
        session.go_to(2).unwrap();

        assert!(session.go_to(5).is_none());
        assert!(session.go_to(usize::MAX).is_none());
        assert_eq!(session.current_position(), 2);
    }

    #[test]
    fn test_go_to_marks_visited_and_returns_answer() {
        let mut session = session(5);
        session.go_to(3).unwrap();
        session.select_answer(2);
        session.go_to(1).unwrap();

        let (question, answer) = session.go_to(3).unwrap();
        let index = question.index;
        assert_eq!(answer, Some(2));
        assert_eq!(index, session.order()[3]);
        assert!(session.visited()[session.order()[1]]);
    }

    #[test]
    fn test_next_and_previous_clamp() {
        let mut session = session(3);
        assert!(!session.previous());
        assert_eq!(session.current_position(), 0);

        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.current_position(), 2);

        assert!(session.previous());
        assert_eq!(session.current_position(), 1);
    }

    #[test]
    fn test_select_answer_out_of_range_is_noop() {
        let mut session = session(3);
        let saves = session.store().save_count();

        session.select_answer(4);
        assert_eq!(session.current_answer(), None);
        assert_eq!(session.store().save_count(), saves);

        session.select_answer(3);
        assert_eq!(session.current_answer(), Some(3));
        assert_eq!(session.store().save_count(), saves + 1);
    }

    #[test]
    fn test_clear_answer_keeps_mark_and_visit() {
        let mut session = session(3);
        session.select_answer(1);
        session.toggle_mark();
        session.clear_answer();

        let index = session.order()[0];
        assert_eq!(session.current_answer(), None);
        assert!(session.current_marked());
        assert!(session.visited()[index]);
    }

    #[test]
    fn test_toggle_mark_flips() {
        let mut session = session(2);
        session.toggle_mark();
        assert!(session.current_marked());
        session.toggle_mark();
        assert!(!session.current_marked());
    }

    #[test]
    fn test_switch_language_keeps_answers() {
        let mut session = session(2);
        session.select_answer(1);
        session.switch_language();

        assert_eq!(session.language(), Language::Hi);
        assert_eq!(session.current_answer(), Some(1));
        assert_eq!(session.current_question().text(session.language()), "एक चुनें");

        session.switch_language();
        assert_eq!(session.language(), Language::En);
    }

    #[test]
    fn test_every_mutation_autosaves() {
        let mut session = session(3);
        assert_eq!(session.store().save_count(), 0);

        session.select_answer(0);
        session.toggle_mark();
        session.next();
        session.clear_answer();
        session.switch_language();
        assert_eq!(session.store().save_count(), 5);

        let saved = session.store().get(KEY).unwrap();
        assert_eq!(saved, &session.record());
    }

    #[test]
    fn test_score_example() {
        // Correct options cycle 0, 1, 2, 3, 0.
        let mut session = session(5);
        answer_index(&mut session, 0, 0);
        answer_index(&mut session, 1, 1);
        answer_index(&mut session, 2, 3);

        let score = session.score();
        assert_eq!(score.correct, 2);
        assert_eq!(score.wrong, 1);
        assert_eq!(score.unattempted, 2);
        assert_eq!(score.answered, 3);
        assert_eq!(score.score, 7);
    }

    #[test]
    fn test_score_independent_of_order() {
        let answers = [(0, 0), (2, 1), (3, 3), (4, 2)];
        let mut scores = Vec::new();
        for seed in [1, 2, 3, 99] {
            let mut session = session_with(MemoryStore::new(), 6, seed);
            for &(index, option) in &answers {
                answer_index(&mut session, index, option);
            }
            scores.push(session.score());
        }
        assert!(scores.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_tick_counts_down_then_expires() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session =
            ExamSession::with_rng(questions(3), Some(2), MemoryStore::new(), KEY, &mut rng)
                .unwrap();
        session.select_answer(session.current_question().correct_option);

        assert_eq!(session.tick(), Tick::Running(1));
        match session.tick() {
            Tick::Expired(score) => assert_eq!(score.correct, 1),
            other => panic!("expected expiry, got {:?}", other),
        }
        assert!(session.is_finished());
        assert_eq!(session.tick(), Tick::Idle);
        assert_eq!(session.remaining_seconds(), 0);
    }

    #[test]
    fn test_finished_session_rejects_mutation() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session =
            ExamSession::with_rng(questions(3), Some(1), MemoryStore::new(), KEY, &mut rng)
                .unwrap();
        assert!(matches!(session.tick(), Tick::Expired(_)));

        let before = session.record();
        session.select_answer(0);
        session.clear_answer();
        session.toggle_mark();
        session.switch_language();
        assert!(session.go_to(1).is_none());
        assert!(!session.next());
        assert_eq!(session.record(), before);
        assert_eq!(session.score().unattempted, 3);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut session = session(4);
        session.select_answer(0);

        let first = session.finish();
        let saves = session.store().save_count();
        let record = session.store().get(KEY).cloned().unwrap();
        assert!(record.is_final);

        let second = session.finish();
        assert_eq!(first, second);
        assert_eq!(session.store().save_count(), saves);
        assert_eq!(session.store().get(KEY), Some(&record));
    }

    #[test]
    fn test_save_failures_are_swallowed() {
        let mut store = MemoryStore::new();
        store.fail_saves = true;
        let mut session = session_with(store, 3, 5);

        session.select_answer(1);
        session.toggle_mark();
        let score = session.finish();

        assert_eq!(score.answered, 1);
        assert!(session.store().get(KEY).is_none());
    }

    #[test]
    fn test_restore_roundtrip() {
        let mut first = session_with(MemoryStore::new(), 5, 11);
        first.go_to(2).unwrap();
        first.select_answer(3);
        first.toggle_mark();
        first.switch_language();
        first.go_to(4).unwrap();
        first.tick();
        let saved = first.record();
        let store = first.store().clone();

        let resumed = session_with(store, 5, 12);
        assert_eq!(resumed.answers(), saved.answers.as_slice());
        assert_eq!(resumed.marked(), saved.marked.as_slice());
        assert_eq!(resumed.visited(), saved.visited.as_slice());
        assert_eq!(resumed.order(), saved.order.as_slice());
        assert_eq!(resumed.current_position(), 4);
        assert_eq!(resumed.language(), Language::Hi);
        assert_eq!(resumed.remaining_seconds(), 599);
        assert_eq!(resumed.record(), saved);
    }

    #[test]
    fn test_restores_record_written_by_another_run() {
        let mut store = MemoryStore::new();
        store.insert(
            KEY,
            SessionRecord {
                answers: vec![None, Some(3), None],
                marked: vec![false, false, true],
                visited: vec![true, true, true],
                order: vec![1, 2, 0],
                current: 2,
                lang: Language::Hi,
                timer_sec: 42,
                is_final: false,
            },
        );

        let session = session_with(store, 3, 8);
        assert_eq!(session.order(), &[1, 2, 0]);
        assert_eq!(session.current_question().index, 0);
        assert_eq!(session.answers()[1], Some(3));
        assert_eq!(session.language(), Language::Hi);
        assert_eq!(session.remaining_seconds(), 42);
    }

    #[test]
    fn test_final_record_is_not_restored() {
        let mut first = session_with(MemoryStore::new(), 4, 11);
        first.select_answer(0);
        first.finish();
        let store = first.store().clone();

        let fresh = session_with(store, 4, 11);
        assert!(fresh.answers().iter().all(Option::is_none));
        assert!(!fresh.is_finished());
        assert_eq!(fresh.remaining_seconds(), 600);
    }

    #[test]
    fn test_mismatched_record_is_ignored() {
        let mut first = session_with(MemoryStore::new(), 4, 11);
        first.select_answer(2);
        let store = first.store().clone();

        let fresh = session_with(store, 6, 11);
        assert_eq!(fresh.total_questions(), 6);
        assert!(fresh.answers().iter().all(Option::is_none));
        assert!(is_permutation(fresh.order(), 6));
    }

    #[test]
    fn test_palette_statuses() {
        let mut session = session(4);
        let first = session.order()[0];
        session.select_answer(0);
        session.next();
        let second = session.order()[1];
        session.toggle_mark();
        session.next();
        let third = session.order()[2];
        let fourth = session.order()[3];

        assert_eq!(session.palette_status(first), Some(PaletteStatus::Answered));
        assert_eq!(session.palette_status(second), Some(PaletteStatus::Marked));
        assert_eq!(session.palette_status(third), Some(PaletteStatus::NotAnswered));
        assert_eq!(session.palette_status(fourth), Some(PaletteStatus::NotVisited));
        assert_eq!(session.palette_status(4), None);

        let indices: Vec<usize> = session.palette().map(|(index, _)| index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_position_of_inverts_order() {
        let session = session(7);
        for (position, &index) in session.order().iter().enumerate() {
            assert_eq!(session.position_of(index), Some(position));
        }
        assert_eq!(session.position_of(7), None);
    }
}
