//! Pulseline core library
//!
//! Analyzes AI coding session transcripts (JSONL) and renders a one-line
//! statusline: context-window usage, activity state, and recent errors.
//! The engine reads only the transcript tail it needs and caches the
//! result keyed by file mtime, so a refresh stays cheap even on large
//! session files.

pub mod config;
pub mod error;
pub mod git;
pub mod input;
pub mod render;
pub mod transcript;

pub use config::Config;
pub use error::{CoreError, Result};

use transcript::{AnalysisSnapshot, TranscriptCache};

/// Long-lived analysis engine: configuration plus the transcript cache.
pub struct Engine {
    pub config: Config,
    cache: TranscriptCache,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Engine {
            config,
            cache: TranscriptCache::new(),
        }
    }

    /// Analyze the transcript at `path`, serving from the cache when the
    /// file has not changed since the last call.
    pub fn snapshot(&mut self, path: &str) -> AnalysisSnapshot {
        self.cache.get_snapshot(path, &self.config.engine)
    }

    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }
}
