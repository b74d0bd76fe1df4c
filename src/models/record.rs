use serde::{Deserialize, Serialize};

use super::Language;

/// Snapshot of an attempt as written to the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub answers: Vec<Option<usize>>,
    pub marked: Vec<bool>,
    pub visited: Vec<bool>,
    pub order: Vec<usize>,
    pub current: usize,
    pub lang: Language,
    #[serde(rename = "timerSec")]
    pub timer_sec: u64,
    #[serde(rename = "final")]
    pub is_final: bool,
}

impl SessionRecord {
    /// Whether this record can be restored over a set of `total` questions
    /// whose option counts are given by `option_count`.
    pub fn fits<F>(&self, total: usize, option_count: F) -> bool
    where
        F: Fn(usize) -> usize,
    {
        if self.answers.len() != total
            || self.marked.len() != total
            || self.visited.len() != total
            || !is_permutation(&self.order, total)
            || self.current >= total
        {
            return false;
        }

        self.answers
            .iter()
            .enumerate()
            .all(|(index, answer)| answer.is_none_or(|option| option < option_count(index)))
    }
}

/// True if `order` contains every index in `0..total` exactly once.
pub fn is_permutation(order: &[usize], total: usize) -> bool {
    if order.len() != total {
        return false;
    }
    let mut seen = vec![false; total];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
