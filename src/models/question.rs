use serde::{Deserialize, Serialize};

/// Display language of a question set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Hi,
            Language::Hi => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }
}

/// A value carried once per supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized<T> {
    pub en: T,
    pub hi: T,
}

impl<T> Localized<T> {
    pub fn get(&self, language: Language) -> &T {
        match language {
            Language::En => &self.en,
            Language::Hi => &self.hi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Position in the source document; stable across display orders.
    #[serde(skip)]
    pub index: usize,
    pub text: Localized<String>,
    pub options: Localized<Vec<String>>,
    #[serde(rename = "answer")]
    pub correct_option: usize,
}

impl Question {
    pub fn text(&self, language: Language) -> &str {
        self.text.get(language)
    }

    pub fn options(&self, language: Language) -> &[String] {
        self.options.get(language)
    }

    /// Option count, identical in every language once the set is validated.
    pub fn option_count(&self) -> usize {
        self.options.en.len()
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_option
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionSetMeta {
    /// Display name, e.g. "JEE Main".
    #[serde(default)]
    pub exam: Option<String>,
    #[serde(default)]
    pub duration_min: Option<f64>,
}

/// A question-set document as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    #[serde(default)]
    pub meta: Option<QuestionSetMeta>,
    pub questions: Vec<Question>,
}

impl QuestionSet {
    /// Duration declared by the document, in seconds.
    pub fn duration_seconds(&self) -> Option<u64> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.duration_min)
            .filter(|minutes| minutes.is_finite() && *minutes > 0.0)
            .map(|minutes| (minutes * 60.0).round() as u64)
    }

    pub fn exam_name(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|meta| meta.exam.as_deref())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
