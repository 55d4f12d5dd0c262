//! Transcript analysis engine
//!
//! Reads an append-only JSONL session transcript and derives the newest
//! token-usage snapshot, an error classification, and a small activity
//! state (Ready / Thinking / ToolUse / Error). Four pieces:
//!
//! - [`usage`]: backward, early-exiting scan for the newest complete
//!   token accounting record
//! - [`classify`]: layered error heuristic with permission-denial
//!   exclusions
//! - [`state`]: the decision table mapping scan results to one state
//! - [`cache`]: mtime-keyed staleness check so repeated calls on an
//!   unchanged file skip the disk

pub mod cache;
pub mod classify;
pub mod state;
pub mod types;
pub mod usage;

pub use cache::TranscriptCache;
pub use types::{ActivityState, AnalysisSnapshot, Degradation, TokenSnapshot, UsageInfo};

use crate::config::EngineConfig;
use types::TokenSnapshot as Tokens;

/// Analyze in-memory transcript lines. The cache calls this after a fresh
/// read; tests call it directly.
pub fn analyze_lines(lines: &[&str], config: &EngineConfig) -> AnalysisSnapshot {
    let scan = usage::extract(lines);

    let used = scan.usage.map(|u| u.total()).unwrap_or(0);
    let tokens = Tokens::new(used, config.context_window);

    let current_error = scan.current.as_ref().and_then(classify::classify_entry);
    let has_current_error = current_error.is_some();
    let (recent_error, recent_detail) =
        classify::classify_window(lines, config.recent_error_count);

    let last_tool_name = if scan.stop_reason.as_deref() == Some("tool_use") {
        state::last_tool_name(lines, config.recent_error_count)
    } else {
        None
    };

    let activity = state::resolve(state::ResolveInput {
        stop_reason: scan.stop_reason.as_deref(),
        current_error,
        last_tool_name,
        last_entry_kind: scan.last_entry_kind,
        last_output_tokens: scan.usage.map(|u| u.output_tokens),
        thinking_token_threshold: config.thinking_token_threshold,
    });

    // A recent-but-not-current error stays a secondary annotation; it
    // never replaces the primary state.
    let recent_error_detail = if recent_error && !has_current_error {
        recent_detail
    } else {
        None
    };

    AnalysisSnapshot {
        tokens,
        activity,
        recent_error,
        recent_error_detail,
        degraded: None,
    }
}
