//! The extraction session: stop words, the current document, and its tags.
//!
//! A session owns the active [`StopWordSet`] and the [`FrequencyMap`] of the
//! last successfully processed document. Front ends drive it with direct,
//! synchronous calls:
//!
//! - [`ExtractionSession::load_stop_words`] replaces the stop words and, if a
//!   document was loaded earlier, re-processes it.
//! - [`ExtractionSession::load_document`] remembers the document and processes
//!   it when stop words are available.
//! - [`ExtractionSession::save`] writes the current tags.
//!
//! An empty stop-word set is treated the same as "never loaded": processing
//! is refused with [`Processing::StopWordsRequired`] in both cases.
//!
//! Failures never leave partial state behind. A failed document pass keeps
//! the previous tags; a failed stop-words load leaves the set empty.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{TagError, TagResult};
use crate::frequency::{self, FrequencyMap};
use crate::report::{self, TagReport};
use crate::stop_words::StopWordSet;

/// Default maximum size of any input file (5 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 5 * 1024 * 1024;

/// Where a session is in its load sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    /// No usable stop words yet (never loaded, empty, or failed to load).
    NoStopWords,
    /// Stop words loaded, no document processed yet.
    StopWordsLoaded,
    /// Stop words loaded and tags available.
    Ready,
}

impl SessionState {
    /// Returns the state as a kebab-case string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoStopWords => "no-stop-words",
            Self::StopWordsLoaded => "stop-words-loaded",
            Self::Ready => "ready",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts from a successful processing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    /// Number of distinct tags.
    pub distinct: usize,
    /// Total tag occurrences.
    pub total: u64,
}

/// Recoverable outcome of asking the session to process its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processing {
    /// The document was counted and its tags replaced the previous ones.
    Processed(ProcessStats),
    /// Processing was skipped because no stop words are loaded.
    StopWordsRequired,
    /// There is no document to process yet.
    NoDocument,
}

/// Tags for one processed document.
#[derive(Debug, Clone)]
struct Tagged {
    title: String,
    frequencies: FrequencyMap,
}

/// Owns stop words, the document reference, and the current tags.
#[derive(Debug, Clone)]
pub struct ExtractionSession {
    state: SessionState,
    stop_words: StopWordSet,
    document: Option<Utf8PathBuf>,
    tagged: Option<Tagged>,
    max_input_bytes: Option<u64>,
}

impl Default for ExtractionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionSession {
    /// Create a session with no stop words, no document, and the default
    /// input limit.
    pub const fn new() -> Self {
        Self {
            state: SessionState::NoStopWords,
            stop_words: StopWordSet::new(),
            document: None,
            tagged: None,
            max_input_bytes: Some(DEFAULT_MAX_INPUT_BYTES),
        }
    }

    /// Set the maximum accepted input size. `None` disables the check.
    pub const fn with_input_limit(mut self, max_bytes: Option<u64>) -> Self {
        self.max_input_bytes = max_bytes;
        self
    }

    /// Current state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Active stop words.
    pub const fn stop_words(&self) -> &StopWordSet {
        &self.stop_words
    }

    /// The remembered document, processed or not.
    pub fn document(&self) -> Option<&Utf8Path> {
        self.document.as_deref()
    }

    /// Display name of the document the current tags came from.
    pub fn title(&self) -> Option<&str> {
        self.tagged.as_ref().map(|t| t.title.as_str())
    }

    /// Tags of the last successfully processed document.
    pub fn frequencies(&self) -> Option<&FrequencyMap> {
        self.tagged.as_ref().map(|t| &t.frequencies)
    }

    /// The current tags rendered for display.
    pub fn display(&self) -> Option<String> {
        self.tagged
            .as_ref()
            .map(|t| report::format_for_display(&t.title, &t.frequencies))
    }

    /// The current tags as a serializable report.
    pub fn report(&self) -> Option<TagReport<'_>> {
        self.tagged
            .as_ref()
            .map(|t| TagReport::new(&t.title, &t.frequencies))
    }

    /// Replace the stop words with those read from `path`.
    ///
    /// The previous set is discarded before reading, so on failure the set is
    /// empty. On success, a previously loaded document is re-processed and
    /// that outcome is returned; otherwise [`Processing::NoDocument`].
    #[instrument(skip_all, fields(path = %path))]
    pub fn load_stop_words(&mut self, path: &Utf8Path) -> TagResult<Processing> {
        let loaded = self.read_stop_words(path);
        self.settle_state();
        loaded?;
        info!(count = self.stop_words.len(), "stop words replaced");
        self.reprocess()
    }

    /// Remember `path` as the current document and process it.
    ///
    /// The document is remembered even when processing is refused, so that a
    /// later stop-words load picks it up.
    #[instrument(skip_all, fields(path = %path))]
    pub fn load_document(&mut self, path: &Utf8Path) -> TagResult<Processing> {
        self.document = Some(path.to_path_buf());
        self.reprocess()
    }

    /// Process the remembered document again with the active stop words.
    ///
    /// On an I/O failure the previous tags are kept and the error returned.
    pub fn reprocess(&mut self) -> TagResult<Processing> {
        let Some(path) = self.document.clone() else {
            debug!("no document loaded");
            return Ok(Processing::NoDocument);
        };
        if self.stop_words.is_empty() {
            info!(document = %path, "stop words required before processing");
            return Ok(Processing::StopWordsRequired);
        }

        let reader = self.open_source(&path)?;
        let frequencies = frequency::count_reader(reader, &self.stop_words)
            .map_err(|e| TagError::io(&path, e))?;
        let stats = ProcessStats {
            distinct: frequencies.len(),
            total: frequencies.total(),
        };
        self.tagged = Some(Tagged {
            title: display_name(&path),
            frequencies,
        });
        self.settle_state();
        info!(
            document = %path,
            distinct = stats.distinct,
            total = stats.total,
            "document processed"
        );
        Ok(Processing::Processed(stats))
    }

    /// Write the current tags to `path`, one `word: count` line per tag.
    ///
    /// Returns the number of lines written, or [`TagError::NothingToSave`]
    /// when no document has been processed.
    #[instrument(skip_all, fields(path = %path))]
    pub fn save(&self, path: &Utf8Path) -> TagResult<usize> {
        let Some(tagged) = self.tagged.as_ref() else {
            warn!("save requested with no tags");
            return Err(TagError::NothingToSave);
        };
        let file = File::create(path).map_err(|e| TagError::io(path, e))?;
        report::write_persisted(BufWriter::new(file), &tagged.frequencies)
            .map_err(|e| TagError::io(path, e))?;
        info!(lines = tagged.frequencies.len(), "tags saved");
        Ok(tagged.frequencies.len())
    }

    fn read_stop_words(&mut self, path: &Utf8Path) -> TagResult<()> {
        self.stop_words = StopWordSet::new();
        let reader = self.open_source(path)?;
        self.stop_words
            .load_from(reader)
            .map_err(|e| TagError::io(path, e))
    }

    fn open_source(&self, path: &Utf8Path) -> TagResult<BufReader<File>> {
        let file = File::open(path).map_err(|e| TagError::io(path, e))?;
        if let Some(limit) = self.max_input_bytes {
            let size = file.metadata().map_err(|e| TagError::io(path, e))?.len();
            if size > limit {
                return Err(TagError::InputTooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit,
                });
            }
        }
        Ok(BufReader::new(file))
    }

    fn settle_state(&mut self) {
        self.state = if self.stop_words.is_empty() {
            SessionState::NoStopWords
        } else if self.tagged.is_some() {
            SessionState::Ready
        } else {
            SessionState::StopWordsLoaded
        };
        debug!(state = %self.state, "session state");
    }
}

fn display_name(path: &Utf8Path) -> String {
    path.file_name().unwrap_or(path.as_str()).to_string()
}
