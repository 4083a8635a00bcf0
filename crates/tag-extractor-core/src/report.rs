//! Rendering frequency maps for display and persistence.
//!
//! Both forms list one `word: count` pair per line in the map's enumeration
//! order. The display form is preceded by a title line and a blank line.

use std::io::{self, Write};

use serde::Serialize;

use crate::frequency::FrequencyMap;

/// Separator between a word and its count.
pub const SEPARATOR: &str = ": ";

/// Line terminator used for persisted output.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Line terminator used for persisted output.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Render `map` under `title` for on-screen display.
///
/// Every entry line, including the last, ends with a newline.
pub fn format_for_display(title: &str, map: &FrequencyMap) -> String {
    let mut out = String::with_capacity(title.len() + 2 + map.len() * 12);
    out.push_str(title);
    out.push_str("\n\n");
    for line in format_for_persistence(map) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Render `map` as persisted lines, without terminators.
pub fn format_for_persistence(map: &FrequencyMap) -> Vec<String> {
    map.iter()
        .map(|(word, count)| format!("{word}{SEPARATOR}{count}"))
        .collect()
}

/// Write the persisted form of `map`, terminating every line with
/// [`LINE_ENDING`].
pub fn write_persisted<W: Write>(mut writer: W, map: &FrequencyMap) -> io::Result<()> {
    for line in format_for_persistence(map) {
        write!(writer, "{line}{LINE_ENDING}")?;
    }
    writer.flush()
}

/// Machine-readable summary of one processed document.
#[derive(Debug, Clone, Serialize)]
pub struct TagReport<'a> {
    /// Display name of the document.
    pub title: &'a str,
    /// Number of distinct tags.
    pub distinct_words: usize,
    /// Total tag occurrences after stop-word filtering.
    pub total_words: u64,
    /// Tags and their counts, in enumeration order.
    pub tags: &'a FrequencyMap,
}

impl<'a> TagReport<'a> {
    /// Summarize `map` under `title`.
    pub fn new(title: &'a str, map: &'a FrequencyMap) -> Self {
        Self {
            title,
            distinct_words: map.len(),
            total_words: map.total(),
            tags: map,
        }
    }
}
