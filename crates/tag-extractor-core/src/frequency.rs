//! Word-frequency accumulation.

use std::collections::HashMap;
use std::io::{self, BufRead};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{TagError, TagResult};
use crate::normalize;
use crate::stop_words::StopWordSet;

/// Mapping from tag to occurrence count.
///
/// Entries enumerate in order of first occurrence. Equality ignores that
/// order: two maps are equal when they hold the same words with the same
/// counts.
#[derive(Debug, Clone, Default)]
pub struct FrequencyMap {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `word`, inserting it with a count of 1 if absent.
    pub fn increment(&mut self, word: &str) {
        self.add(word, 1);
    }

    /// Add `n` occurrences of `word`.
    pub fn add(&mut self, word: &str, n: u64) {
        if let Some(&slot) = self.index.get(word) {
            self.entries[slot].1 += n;
        } else {
            self.index.insert(word.to_owned(), self.entries.len());
            self.entries.push((word.to_owned(), n));
        }
    }

    /// Count for `word`, if it occurred.
    pub fn get(&self, word: &str) -> Option<u64> {
        self.index.get(word).map(|&slot| self.entries[slot].1)
    }

    /// Whether `word` occurred at all.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no words were counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Iterate `(word, count)` pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(w, n)| (w.as_str(), *n))
    }

    /// Parse the persisted `word: count` form back into a map.
    ///
    /// Blank lines are ignored. Repeated words have their counts summed.
    pub fn parse_persisted<R: BufRead>(reader: R) -> TagResult<Self> {
        let mut map = Self::new();
        for (i, line) in normalize::lines(reader).enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || TagError::MalformedEntry {
                line: i + 1,
                content: line.clone(),
            };
            let (word, count) = line.split_once(": ").ok_or_else(malformed)?;
            let count: u64 = count.trim().parse().map_err(|_| malformed())?;
            if word.is_empty() || count == 0 {
                return Err(malformed());
            }
            map.add(word, count);
        }
        Ok(map)
    }
}

impl PartialEq for FrequencyMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(w, n)| other.get(w) == Some(n))
    }
}

impl Eq for FrequencyMap {}

impl<'a> FromIterator<(&'a str, u64)> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (word, n) in iter {
            map.add(word, n);
        }
        map
    }
}

impl Serialize for FrequencyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.len()))?;
        for (word, n) in self.iter() {
            out.serialize_entry(word, &n)?;
        }
        out.end()
    }
}

/// Count the tags in `lines`, skipping stop words.
///
/// The first read error aborts the pass; no partial map is returned.
#[tracing::instrument(skip_all, fields(stop_words = stop_words.len()))]
pub fn count_lines<I>(lines: I, stop_words: &StopWordSet) -> io::Result<FrequencyMap>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut map = FrequencyMap::new();
    let mut line_count = 0usize;
    for line in lines {
        let line = line?;
        line_count += 1;
        for token in normalize::tokens(&line) {
            if !stop_words.contains(&token) {
                map.increment(&token);
            }
        }
    }
    tracing::debug!(
        lines = line_count,
        distinct = map.len(),
        total = map.total(),
        "document counted"
    );
    Ok(map)
}

/// Count the tags in a line-oriented reader.
pub fn count_reader<R: BufRead>(reader: R, stop_words: &StopWordSet) -> io::Result<FrequencyMap> {
    count_lines(normalize::lines(reader), stop_words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lines(text: &[&str]) -> Vec<io::Result<String>> {
        text.iter().map(|l| Ok((*l).to_owned())).collect()
    }

    fn stop(words: &[&str]) -> StopWordSet {
        words.iter().collect()
    }

    #[test]
    fn counts_sentences_without_stop_words() {
        let map = count_lines(lines(&["The Cat sat.", "The dog ran!"]), &stop(&["the"])).unwrap();
        let expected: FrequencyMap = [("cat", 1), ("sat", 1), ("dog", 1), ("ran", 1)]
            .into_iter()
            .collect();
        assert_eq!(map, expected);
        assert!(!map.contains("the"));
    }

    #[test]
    fn stop_words_are_excluded_not_zero_counted() {
        let map = count_lines(lines(&["cat dog cat bird"]), &stop(&["cat", "dog"])).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("bird"), Some(1));
        assert_eq!(map.get("cat"), None);
    }

    #[test]
    fn counts_accumulate_across_lines() {
        let map = count_lines(lines(&["Rust rust", "RUST, again"]), &stop(&["x"])).unwrap();
        assert_eq!(map.get("rust"), Some(3));
        assert_eq!(map.get("again"), Some(1));
        assert_eq!(map.total(), 4);
    }

    #[test]
    fn enumerates_in_first_occurrence_order() {
        let map = count_lines(lines(&["pear apple pear", "fig apple"]), &stop(&[])).unwrap();
        let words: Vec<_> = map.iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["pear", "apple", "fig"]);
    }

    #[test]
    fn read_error_aborts_the_pass() {
        let input = vec![
            Ok("one two".to_owned()),
            Err(io::Error::other("broken pipe")),
            Ok("three".to_owned()),
        ];
        assert!(count_lines(input, &stop(&[])).is_err());
    }

    #[test]
    fn no_key_is_a_stop_word() {
        let stops = stop(&["a", "of", "the"]);
        let map = count_reader(
            Cursor::new("The art of a thing\nthe THING of art\n"),
            &stops,
        )
        .unwrap();
        for (word, _) in map.iter() {
            assert!(!stops.contains(word));
            assert!(word.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn recounting_is_idempotent() {
        let text = "Alpha beta, gamma.\nBeta gamma delta!\n";
        let stops = stop(&["delta"]);
        let first = count_reader(Cursor::new(text), &stops).unwrap();
        let second = count_reader(Cursor::new(text), &stops).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn equality_ignores_order() {
        let a: FrequencyMap = [("x", 1), ("y", 2)].into_iter().collect();
        let b: FrequencyMap = [("y", 2), ("x", 1)].into_iter().collect();
        let c: FrequencyMap = [("y", 3), ("x", 1)].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn parses_persisted_form() {
        let map = FrequencyMap::parse_persisted(Cursor::new("cat: 2\ndog: 1\n\n")).unwrap();
        assert_eq!(map.get("cat"), Some(2));
        assert_eq!(map.get("dog"), Some(1));
    }

    #[test]
    fn parses_persisted_form_with_any_line_ending() {
        let map = FrequencyMap::parse_persisted(Cursor::new("cat: 2\rdog: 1\r\nowl: 3")).unwrap();
        let expected: FrequencyMap = [("cat", 2), ("dog", 1), ("owl", 3)].into_iter().collect();
        assert_eq!(map, expected);
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        let err = FrequencyMap::parse_persisted(Cursor::new("cat: 2\ndog=1\n")).unwrap_err();
        assert!(matches!(err, TagError::MalformedEntry { line: 2, .. }));

        let err = FrequencyMap::parse_persisted(Cursor::new("cat: many\n")).unwrap_err();
        assert!(matches!(err, TagError::MalformedEntry { line: 1, .. }));
    }

    #[test]
    fn serializes_as_ordered_object() {
        let map: FrequencyMap = [("zeta", 2), ("alpha", 1)].into_iter().collect();
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"zeta":2,"alpha":1}"#);
    }
}
