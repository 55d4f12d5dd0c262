//! Transcript record types shared across the analysis engine
//!
//! Raw types mirror the JSONL wire format written by the session recorder
//! and use `#[serde(default)]` liberally: any field may be missing, and a
//! missing field is never a parse failure. Snapshot types are what the
//! engine hands to the rendering layer.

use serde::Deserialize;
use serde_json::Value;

// ============================================
// Raw JSONL record types (serde deserialization)
// ============================================

/// Represents a single line from a session transcript.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    /// Entry discriminator ("user", "assistant", or other)
    #[serde(rename = "type")]
    pub record_type: Option<String>,

    /// Message body for user/assistant entries
    pub message: Option<RawMessage>,

    /// Tool result side channel, attached to user entries that report a
    /// completed tool invocation. Shape varies by tool; kept loose.
    pub tool_use_result: Option<Value>,
}

impl RawRecord {
    /// Parse one physical transcript line. Blank lines and anything that
    /// is not a JSON object deserialize to `None`; a bad line is a problem
    /// for that line only, never for the file.
    pub fn parse_line(line: &str) -> Option<RawRecord> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }

    /// Entry kind derived from the `type` discriminator.
    pub fn kind(&self) -> EntryKind {
        match self.record_type.as_deref() {
            Some("user") => EntryKind::User,
            Some("assistant") => EntryKind::Assistant,
            _ => EntryKind::Other,
        }
    }

    /// The complete usage record for this entry, if it is an assistant
    /// entry carrying all four token fields.
    pub fn usage(&self) -> Option<UsageInfo> {
        self.message
            .as_ref()
            .and_then(|m| m.usage.as_ref())
            .and_then(UsageInfo::from_raw)
    }

    /// Content blocks of the message body, empty when absent or when the
    /// content is a plain string.
    pub fn content_blocks(&self) -> &[ContentBlock] {
        match self.message.as_ref().and_then(|m| m.content.as_ref()) {
            Some(RawContent::Blocks(blocks)) => blocks,
            _ => &[],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawMessage {
    pub stop_reason: Option<String>,
    pub content: Option<RawContent>,
    pub usage: Option<RawUsage>,
}

/// Message content is either a bare string or a list of typed blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        // Optional so one malformed content item cannot fail the whole
        // line and discard its usage record with it.
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        input: Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: bool,
    },
    // Catch-all for unknown block types
    #[serde(other)]
    Unknown,
}

/// Token usage as it appears on the wire: every field optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawUsage {
    pub input_tokens: Option<u64>,
    pub cache_creation_input_tokens: Option<u64>,
    pub cache_read_input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// A complete per-turn token accounting record. Only constructs when all
/// four fields are present; a partial usage object is treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageInfo {
    pub input_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub output_tokens: u64,
}

impl UsageInfo {
    pub fn from_raw(raw: &RawUsage) -> Option<UsageInfo> {
        Some(UsageInfo {
            input_tokens: raw.input_tokens?,
            cache_creation_input_tokens: raw.cache_creation_input_tokens?,
            cache_read_input_tokens: raw.cache_read_input_tokens?,
            output_tokens: raw.output_tokens?,
        })
    }

    /// Total context consumption, mirroring the CLI's own accounting.
    pub fn total(&self) -> u64 {
        self.input_tokens
            + self.cache_creation_input_tokens
            + self.cache_read_input_tokens
            + self.output_tokens
    }
}

// ============================================
// Engine output types
// ============================================

/// Coarse kind of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    Other,
}

/// Context-token usage of the session at its newest measurable point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenSnapshot {
    pub used_tokens: u64,
    pub context_window: u64,
    /// Not clamped; exceeds 100 when usage exceeds the nominal window.
    pub percentage: f64,
}

impl TokenSnapshot {
    pub fn new(used_tokens: u64, context_window: u64) -> Self {
        let percentage = if context_window == 0 {
            0.0
        } else {
            used_tokens as f64 / context_window as f64 * 100.0
        };
        TokenSnapshot {
            used_tokens,
            context_window,
            percentage,
        }
    }

    pub fn empty(context_window: u64) -> Self {
        Self::new(0, context_window)
    }
}

/// User-facing activity state of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityState {
    Ready,
    Thinking,
    ToolUse { tool_name: Option<String> },
    Error { detail: String },
}

/// Why a snapshot carries no real transcript data. Distinguishes "could
/// not look" from "looked and failed to read", which render differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// Stat failed for permission/IO reasons
    NoAccess,
    /// The file body could not be read or decoded
    ReadFailed,
}

/// Everything the engine reports for one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSnapshot {
    pub tokens: TokenSnapshot,
    pub activity: ActivityState,

    /// Soft signal: some line in the recent window classified as an error,
    /// independent of the current activity state. Secondary annotation
    /// only; never upgrades `activity`.
    pub recent_error: bool,
    pub recent_error_detail: Option<String>,

    pub degraded: Option<Degradation>,
}

impl AnalysisSnapshot {
    /// Zero-usage Ready snapshot, used when there is no transcript yet.
    pub fn ready(context_window: u64) -> Self {
        AnalysisSnapshot {
            tokens: TokenSnapshot::empty(context_window),
            activity: ActivityState::Ready,
            recent_error: false,
            recent_error_detail: None,
            degraded: None,
        }
    }

    pub fn degraded(context_window: u64, reason: Degradation) -> Self {
        AnalysisSnapshot {
            degraded: Some(reason),
            ..Self::ready(context_window)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_assistant() {
        let line = r#"{"type":"assistant","message":{"stop_reason":"end_turn","usage":{"input_tokens":10,"cache_creation_input_tokens":2,"cache_read_input_tokens":3,"output_tokens":5}}}"#;
        let record = RawRecord::parse_line(line).unwrap();
        assert_eq!(record.kind(), EntryKind::Assistant);
        let usage = record.usage().unwrap();
        assert_eq!(usage.total(), 20);
        assert_eq!(
            record.message.unwrap().stop_reason.as_deref(),
            Some("end_turn")
        );
    }

    #[test]
    fn test_parse_line_rejects_garbage() {
        assert!(RawRecord::parse_line("").is_none());
        assert!(RawRecord::parse_line("   ").is_none());
        assert!(RawRecord::parse_line("{truncated").is_none());
        // valid JSON but not an object
        assert!(RawRecord::parse_line("42").is_none());
    }

    #[test]
    fn test_partial_usage_is_absent() {
        let line = r#"{"type":"assistant","message":{"usage":{"input_tokens":10,"output_tokens":5}}}"#;
        let record = RawRecord::parse_line(line).unwrap();
        assert!(record.usage().is_none());
    }

    #[test]
    fn test_unknown_block_type_does_not_break_parsing() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"thinking","thinking":"hm"},{"type":"text","text":"hi"}]}}"#;
        let record = RawRecord::parse_line(line).unwrap();
        let blocks = record.content_blocks();
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0], ContentBlock::Unknown));
        assert!(matches!(blocks[1], ContentBlock::Text { .. }));
    }

    #[test]
    fn test_nameless_tool_use_block_keeps_the_line() {
        let line = r#"{"type":"assistant","message":{"stop_reason":"tool_use","content":[{"type":"tool_use","input":{}}],"usage":{"input_tokens":10,"cache_creation_input_tokens":2,"cache_read_input_tokens":3,"output_tokens":5}}}"#;
        let record = RawRecord::parse_line(line).unwrap();
        // the broken block must not take the usage record down with it
        assert_eq!(record.usage().unwrap().total(), 20);
        assert!(matches!(
            record.content_blocks()[0],
            ContentBlock::ToolUse { name: None, .. }
        ));
    }

    #[test]
    fn test_string_content_has_no_blocks() {
        let line = r#"{"type":"user","message":{"content":"plain prompt"}}"#;
        let record = RawRecord::parse_line(line).unwrap();
        assert!(record.content_blocks().is_empty());
    }

    #[test]
    fn test_token_snapshot_percentage_unclamped() {
        let snap = TokenSnapshot::new(250_000, 200_000);
        assert!((snap.percentage - 125.0).abs() < f64::EPSILON);
        let zero = TokenSnapshot::new(100, 0);
        assert_eq!(zero.percentage, 0.0);
    }
}
