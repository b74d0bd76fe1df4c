use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::LoadError;

/// A year as listed in a manifest; generators emit numbers, hand-written
/// manifests often use strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(u32),
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(year) => write!(f, "{}", year),
            Year::Text(year) => f.write_str(year),
        }
    }
}

/// Index of the papers available for one exam, `<exam>_manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub exam: Option<String>,
    #[serde(default)]
    pub years: Vec<Year>,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl Manifest {
    /// File listed for `exam` in `year`, if any.
    pub fn file_for(&self, exam: &str, year: &str) -> Option<&str> {
        let key = PaperRef::default_file_name(exam, year);
        self.files.get(&key).map(String::as_str)
    }

    /// Years that have a listed file, in manifest order.
    pub fn available_years<'a>(&'a self, exam: &'a str) -> impl Iterator<Item = String> + 'a {
        self.years
            .iter()
            .map(Year::to_string)
            .filter(move |year| self.file_for(exam, year).is_some())
    }
}

pub fn manifest_path(questions_dir: &Path, exam: &str) -> PathBuf {
    questions_dir.join(format!("{}_manifest.json", exam))
}

pub fn load_manifest(questions_dir: &Path, exam: &str) -> Result<Manifest, LoadError> {
    let path = manifest_path(questions_dir, exam);
    let content = fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json { path, source })
}

/// Identity of one paper: an exam key, a year and optionally an explicit
/// file name overriding the conventional one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRef {
    pub exam: String,
    pub year: String,
    pub file: Option<String>,
}

impl PaperRef {
    pub fn new(exam: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            exam: exam.into(),
            year: year.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    fn default_file_name(exam: &str, year: &str) -> String {
        format!("{}_{}.json", exam, year)
    }

    pub fn file_name(&self) -> String {
        self.file
            .clone()
            .unwrap_or_else(|| Self::default_file_name(&self.exam, &self.year))
    }

    pub fn path_in(&self, questions_dir: &Path) -> PathBuf {
        questions_dir.join(self.file_name())
    }

    /// Key under which attempts at this paper are autosaved.
    pub fn store_key(&self) -> String {
        format!("{}_{}", self.exam, self.year)
    }

    /// Human label, `jee_main` becomes `JEE MAIN`.
    pub fn label(&self) -> String {
        self.exam.replace('_', " ").to_uppercase()
    }

    /// Fails unless the manifest lists this paper.
    pub fn check_listed(&self, manifest: &Manifest) -> Result<(), LoadError> {
        match manifest.file_for(&self.exam, &self.year) {
            Some(_) => Ok(()),
            None => Err(LoadError::UnknownPaper {
                exam: self.exam.clone(),
                year: self.year.clone(),
            }),
        }
    }
}
