//! Error classification for transcript entries
//!
//! Layered heuristic with deliberate false-positive exclusions: permission
//! denials look like tool failures on the wire but are ordinary interactive
//! flow, so they are filtered out before anything else. Applied in two
//! places: to the single entry the usage scan found ("current error") and
//! to a window of trailing lines ("recent error").

use super::types::{ContentBlock, RawRecord};
use serde_json::Value;

/// Phrases that mark a tool failure as a permission denial rather than a
/// genuine error.
const PERMISSION_PHRASES: [&str; 2] = ["was blocked", "For security"];

/// Cap on the length of extracted error details; these render in a
/// single statusline segment.
const DETAIL_MAX_LEN: usize = 80;

fn is_permission_denial(text: &str) -> bool {
    PERMISSION_PHRASES.iter().any(|p| text.contains(p))
}

fn truncate_detail(text: &str) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.len() > DETAIL_MAX_LEN {
        let mut cut = DETAIL_MAX_LEN;
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &line[..cut])
    } else {
        line.to_string()
    }
}

/// String form of a tool result's error message: the whole value when it
/// is a string, else its `.error` field.
fn side_channel_error_text(result: &Value) -> Option<String> {
    match result {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => match map.get("error") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(v) if !v.is_null() => Some(v.to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// JS-style truthiness, matching how the session recorder sets `.error`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Flatten a `tool_result` item's content to text for phrase matching.
fn tool_result_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Classify one entry. Returns `Some(detail)` when the entry represents a
/// genuine error, `None` otherwise. Rules apply in order; the first match
/// decides.
pub fn classify_entry(record: &RawRecord) -> Option<String> {
    // Rule 1/2: the toolUseResult side channel.
    if let Some(result) = record.tool_use_result.as_ref() {
        if let Some(text) = side_channel_error_text(result) {
            if is_permission_denial(&text) {
                return None;
            }
        }

        let flagged = result
            .get("error")
            .map(is_truthy)
            .unwrap_or(false)
            || result.get("type").and_then(|t| t.as_str()) == Some("error");

        if flagged {
            let detail = side_channel_error_text(result)
                .map(|t| truncate_detail(&t))
                .unwrap_or_else(|| "tool error".to_string());
            return Some(detail);
        }
    }

    // Rule 3: tool_result content items flagged is_error, with the same
    // permission-phrase exclusion applied per item.
    for block in record.content_blocks() {
        if let ContentBlock::ToolResult { content, is_error } = block {
            if !is_error {
                continue;
            }
            let text = tool_result_text(content);
            if is_permission_denial(&text) {
                continue;
            }
            if text.is_empty() {
                return Some("tool error".to_string());
            }
            return Some(truncate_detail(&text));
        }
    }

    // Rule 4: stop_sequence turns that smuggle an API error in as text.
    let stop_reason = record
        .message
        .as_ref()
        .and_then(|m| m.stop_reason.as_deref());
    if stop_reason == Some("stop_sequence") {
        for block in record.content_blocks() {
            if let ContentBlock::Text { text } = block {
                if !text.starts_with("API Error: 403") {
                    continue;
                }
                if text.contains("user quota is not enough") {
                    return Some("quota exceeded".to_string());
                }
                if text.contains("filter") {
                    return Some("filter error".to_string());
                }
            }
        }
    }

    None
}

/// Scan the last `window` lines for anything that classifies as an error.
/// Returns the soft recent-error flag and the first matching detail.
pub fn classify_window(lines: &[&str], window: usize) -> (bool, Option<String>) {
    let start = lines.len().saturating_sub(window);
    for line in &lines[start..] {
        if let Some(record) = RawRecord::parse_line(line) {
            if let Some(detail) = classify_entry(&record) {
                return (true, Some(detail));
            }
        }
    }
    (false, None)
}
