//! Command implementations.

use camino::{Utf8Path, Utf8PathBuf};
use tag_extractor_core::ExtractionSession;

pub mod extract;
pub mod info;
pub mod session;

/// Settings every session-driving command shares.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    /// Stop-words file from configuration, used when no flag is given.
    pub stop_words: Option<Utf8PathBuf>,
    /// Effective input limit in bytes, `None` for unlimited.
    pub input_limit: Option<u64>,
}

impl SessionSettings {
    /// A fresh session honoring the configured input limit.
    pub fn new_session(&self) -> ExtractionSession {
        ExtractionSession::new().with_input_limit(self.input_limit)
    }

    /// The stop-words file to use: the flag value, else the configured one.
    pub fn stop_words<'a>(&'a self, flag: Option<&'a Utf8Path>) -> Option<&'a Utf8Path> {
        flag.or(self.stop_words.as_deref())
    }
}
