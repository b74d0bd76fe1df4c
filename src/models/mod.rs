mod question;
mod record;
mod score;

pub use question::{Language, Localized, Question, QuestionSet, QuestionSetMeta};
#[cfg(test)]
pub use record::is_permutation;
pub use record::SessionRecord;
pub use score::{PaletteStatus, Score, MARKS_CORRECT, MARKS_WRONG};
