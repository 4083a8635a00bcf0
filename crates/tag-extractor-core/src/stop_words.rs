//! User-supplied stop words.
//!
//! A stop-words source is line oriented: one word per line, surrounding
//! whitespace ignored, case folded to lowercase. Blank lines are not skipped;
//! they contribute the empty string, which never matches a cleaned token.

use std::collections::BTreeSet;
use std::io::{self, BufRead};

use crate::normalize;

/// A sorted, deduplicated set of lowercase stop words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWordSet {
    words: BTreeSet<String>,
}

impl StopWordSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self {
            words: BTreeSet::new(),
        }
    }

    /// Build a set from a line-oriented reader.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut set = Self::new();
        set.load_from(reader)?;
        Ok(set)
    }

    /// Replace the contents of this set with the words read from `reader`.
    ///
    /// The set is cleared before reading. If reading fails part way, the
    /// words accepted so far are discarded and the set is left empty.
    #[tracing::instrument(skip_all)]
    pub fn load_from<R: BufRead>(&mut self, reader: R) -> io::Result<()> {
        self.words.clear();
        for line in normalize::lines(reader) {
            match line {
                Ok(line) => {
                    self.words.insert(normalize_entry(&line));
                }
                Err(err) => {
                    self.words.clear();
                    return Err(err);
                }
            }
        }
        tracing::debug!(count = self.words.len(), "stop words loaded");
        Ok(())
    }

    /// Whether `word` is a stop word. Expects an already-normalized token.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of distinct stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set holds no words at all.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate the stop words in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for StopWordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter
                .into_iter()
                .map(|w| normalize_entry(w.as_ref()))
                .collect(),
        }
    }
}

fn normalize_entry(line: &str) -> String {
    line.trim().to_lowercase()
}
