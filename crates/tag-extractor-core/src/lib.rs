//! Core library for tag-extractor.
//!
//! Extracts word-frequency tags from a text document, leaving out a
//! user-supplied set of stop words.
//!
//! # Modules
//!
//! - [`normalize`] - Line cleaning and tokenization
//! - [`stop_words`] - The stop-word set and its loader
//! - [`frequency`] - Tag counting and the insertion-ordered frequency map
//! - [`report`] - Display and persisted renderings of a frequency map
//! - [`session`] - The stateful extraction session front ends drive
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use camino::Utf8Path;
//! use tag_extractor_core::{ExtractionSession, Processing};
//!
//! let mut session = ExtractionSession::new();
//! session.load_stop_words(Utf8Path::new("stop-words.txt"))?;
//! if let Processing::Processed(stats) = session.load_document(Utf8Path::new("essay.txt"))? {
//!     println!("{} distinct tags", stats.distinct);
//! }
//! session.save(Utf8Path::new("tags.txt"))?;
//! # Ok::<(), tag_extractor_core::TagError>(())
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod frequency;
pub mod normalize;
pub mod report;
pub mod session;
pub mod stop_words;

pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use error::{ConfigError, ConfigResult, TagError, TagResult};
pub use frequency::FrequencyMap;
pub use report::TagReport;
pub use session::{DEFAULT_MAX_INPUT_BYTES, ExtractionSession, ProcessStats, Processing, SessionState};
pub use stop_words::StopWordSet;
