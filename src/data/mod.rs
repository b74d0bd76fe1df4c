mod loader;
mod manifest;

pub use loader::{load_question_set, prepare_questions, preview, LoadError};
pub use manifest::{load_manifest, manifest_path, Manifest, PaperRef, Year};
