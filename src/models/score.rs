use std::fmt;

use super::Question;

pub const MARKS_CORRECT: i64 = 4;
pub const MARKS_WRONG: i64 = -1;

/// Result of marking an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub wrong: usize,
    pub unattempted: usize,
    pub score: i64,
}

impl Score {
    /// Mark `answers` (indexed by question index) against `questions`.
    pub fn compute(questions: &[Question], answers: &[Option<usize>]) -> Self {
        let mut result = Score {
            total: questions.len(),
            ..Score::default()
        };

        for question in questions {
            match answers.get(question.index).copied().flatten() {
                None => result.unattempted += 1,
                Some(option) if question.is_correct(option) => result.correct += 1,
                Some(_) => result.wrong += 1,
            }
        }

        result.answered = result.total - result.unattempted;
        result.score = result.correct as i64 * MARKS_CORRECT + result.wrong as i64 * MARKS_WRONG;
        result
    }

    /// Share of the maximum achievable marks, clamped at zero.
    pub fn percentage(&self) -> f64 {
        let max = self.total as i64 * MARKS_CORRECT;
        if max > 0 {
            (self.score.max(0) as f64 / max as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score {} ({} correct, {} wrong, {} unattempted of {})",
            self.score, self.correct, self.wrong, self.unattempted, self.total
        )
    }
}

/// How a question appears on the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteStatus {
    NotVisited,
    Marked,
    NotAnswered,
    Answered,
}

impl PaletteStatus {
    pub fn resolve(visited: bool, marked: bool, answered: bool) -> Self {
        if !visited {
            PaletteStatus::NotVisited
        } else if marked {
            PaletteStatus::Marked
        } else if !answered {
            PaletteStatus::NotAnswered
        } else {
            PaletteStatus::Answered
        }
    }
}
