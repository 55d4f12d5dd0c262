//! Mtime-keyed transcript cache
//!
//! The statusline host re-invokes its renderer at high frequency; when an
//! embedding host keeps one engine alive, this cache skips re-reading and
//! re-parsing a transcript whose mtime has not moved. Exactly one entry is
//! held (the most recently accessed transcript); it is overwritten on
//! every miss and never explicitly destroyed.

use super::analyze_lines;
use super::types::{AnalysisSnapshot, Degradation};
use crate::config::EngineConfig;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    mtime: SystemTime,
    snapshot: AnalysisSnapshot,
}

/// Single-entry cache plus counters. The counters let callers (and tests)
/// observe whether a call touched the disk.
#[derive(Debug, Default)]
pub struct TranscriptCache {
    entry: Option<CacheEntry>,
    hits: u64,
    reads: u64,
}

impl TranscriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls served from the cache without reading the file.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of full file reads performed.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Analyze the transcript at `path`, consulting the cache first.
    ///
    /// Every failure mode degrades to a renderable snapshot: a missing or
    /// empty path and a not-yet-created file yield the default Ready
    /// snapshot, a stat failure yields `Degradation::NoAccess`, and a
    /// failed body read yields `Degradation::ReadFailed`.
    pub fn get_snapshot(&mut self, path: &str, config: &EngineConfig) -> AnalysisSnapshot {
        let window = config.context_window;

        if path.trim().is_empty() {
            return AnalysisSnapshot::ready(window);
        }
        let path = Path::new(path);

        let meta = match std::fs::metadata(path) {
            Ok(m) => m,
            // A brand-new session has no transcript yet; not an error.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return AnalysisSnapshot::ready(window);
            }
            Err(e) => {
                tracing::debug!("stat failed for {}: {}", path.display(), e);
                return AnalysisSnapshot::degraded(window, Degradation::NoAccess);
            }
        };
        if !meta.is_file() {
            return AnalysisSnapshot::ready(window);
        }

        // A missed modified() call (exotic filesystems) disables caching
        // for this call rather than failing it.
        let mtime = meta.modified().ok();

        if config.cache_enabled {
            if let (Some(mtime), Some(entry)) = (mtime, self.entry.as_ref()) {
                if entry.path == path && entry.mtime == mtime {
                    self.hits += 1;
                    return entry.snapshot.clone();
                }
            }
        }

        self.reads += 1;
        let snapshot = match std::fs::read_to_string(path) {
            Ok(text) => {
                let lines: Vec<&str> = text.lines().collect();
                analyze_lines(&lines, config)
            }
            Err(e) => {
                tracing::debug!("read failed for {}: {}", path.display(), e);
                AnalysisSnapshot::degraded(window, Degradation::ReadFailed)
            }
        };

        if config.cache_enabled {
            if let Some(mtime) = mtime {
                self.entry = Some(CacheEntry {
                    path: path.to_path_buf(),
                    mtime,
                    snapshot: snapshot.clone(),
                });
            }
        }

        snapshot
    }
}
