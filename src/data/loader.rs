use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::models::{Language, Question, QuestionSet};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("question set must contain at least one question")]
    Empty,

    #[error("question {number} is invalid: {reason}")]
    InvalidQuestion { number: usize, reason: String },

    #[error("{exam} has no paper for {year}")]
    UnknownPaper { exam: String, year: String },
}

/// Read and validate a question-set document.
pub fn load_question_set<P: AsRef<Path>>(path: P) -> Result<QuestionSet, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut set: QuestionSet =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    prepare_questions(&mut set.questions)?;
    debug!(path = %path.display(), questions = set.len(), "loaded question set");
    Ok(set)
}

/// Assign document indices and check that every question can be answered
/// the same way in both languages.
pub fn prepare_questions(questions: &mut [Question]) -> Result<(), LoadError> {
    if questions.is_empty() {
        return Err(LoadError::Empty);
    }

    for (index, question) in questions.iter_mut().enumerate() {
        question.index = index;
        let invalid = |reason: String| LoadError::InvalidQuestion {
            number: index + 1,
            reason,
        };

        let en = question.options(Language::En).len();
        let hi = question.options(Language::Hi).len();
        if en == 0 {
            return Err(invalid("no options".to_string()));
        }
        if en != hi {
            return Err(invalid(format!("{} English options but {} Hindi options", en, hi)));
        }
        if question.correct_option >= en {
            return Err(invalid(format!(
                "answer {} is not one of {} options",
                question.correct_option, en
            )));
        }
    }

    Ok(())
}

/// English text of the first `count` questions.
pub fn preview(set: &QuestionSet, count: usize) -> Vec<&str> {
    set.questions
        .iter()
        .take(count)
        .map(|question| question.text(Language::En))
        .collect()
}
