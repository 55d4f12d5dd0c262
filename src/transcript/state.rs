//! Activity state resolution
//!
//! Turns the usage scan and error classification into one user-facing
//! state. Total by construction: every input combination maps to a state,
//! and missing or unparseable inputs default toward Ready so incomplete
//! data never raises a false alarm.

use super::types::{ActivityState, ContentBlock, EntryKind, RawRecord};

/// Assistant turns with no stop reason and fewer output tokens than this
/// are treated as mid-stream. Heuristic carried over from the upstream
/// behavior; there is no documented rationale for the exact value.
pub const DEFAULT_THINKING_TOKEN_THRESHOLD: u64 = 50;

/// Inputs to the resolver, gathered by the engine facade.
#[derive(Debug, Default)]
pub struct ResolveInput<'a> {
    pub stop_reason: Option<&'a str>,
    /// Error detail when the current entry classified as an error
    pub current_error: Option<String>,
    pub last_tool_name: Option<String>,
    pub last_entry_kind: Option<EntryKind>,
    pub last_output_tokens: Option<u64>,
    pub thinking_token_threshold: u64,
}

/// Apply the decision table. First matching row wins.
pub fn resolve(input: ResolveInput<'_>) -> ActivityState {
    if let Some(detail) = input.current_error {
        return ActivityState::Error { detail };
    }

    match input.stop_reason {
        Some("tool_use") => ActivityState::ToolUse {
            tool_name: input.last_tool_name,
        },
        Some("end_turn") => ActivityState::Ready,
        None => match input.last_entry_kind {
            // An unanswered user turn implies the assistant is composing.
            Some(EntryKind::User) => ActivityState::Thinking,
            Some(EntryKind::Assistant) => match input.last_output_tokens {
                // Very short output is likely still streaming.
                Some(tokens) if tokens < input.thinking_token_threshold => {
                    ActivityState::Thinking
                }
                _ => ActivityState::Ready,
            },
            // No entries at all, or an unrecognized kind: a new session.
            _ => ActivityState::Ready,
        },
        // Any other stop reason means a turn ended abnormally mid-flow.
        Some(_) => ActivityState::Thinking,
    }
}

/// Name of the tool most recently invoked in the given window of lines.
/// Scans forward; the last `tool_use` item encountered wins. Absence is
/// valid and renders without a tool suffix.
pub fn last_tool_name(lines: &[&str], window: usize) -> Option<String> {
    let start = lines.len().saturating_sub(window);
    let mut name = None;
    for line in &lines[start..] {
        if let Some(record) = RawRecord::parse_line(line) {
            for block in record.content_blocks() {
                if let ContentBlock::ToolUse { name: Some(n), .. } = block {
                    name = Some(n.clone());
                }
            }
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ResolveInput<'static> {
        ResolveInput {
            thinking_token_threshold: DEFAULT_THINKING_TOKEN_THRESHOLD,
            ..Default::default()
        }
    }

    #[test]
    fn test_error_wins_over_everything() {
        let state = resolve(ResolveInput {
            stop_reason: Some("tool_use"),
            current_error: Some("quota exceeded".to_string()),
            ..base()
        });
        assert_eq!(
            state,
            ActivityState::Error {
                detail: "quota exceeded".to_string()
            }
        );
    }

    #[test]
    fn test_tool_use_with_name() {
        let state = resolve(ResolveInput {
            stop_reason: Some("tool_use"),
            last_tool_name: Some("Read".to_string()),
            ..base()
        });
        assert_eq!(
            state,
            ActivityState::ToolUse {
                tool_name: Some("Read".to_string())
            }
        );
    }

    #[test]
    fn test_end_turn_is_ready() {
        let state = resolve(ResolveInput {
            stop_reason: Some("end_turn"),
            ..base()
        });
        assert_eq!(state, ActivityState::Ready);
    }

    #[test]
    fn test_unanswered_user_turn_is_thinking() {
        let state = resolve(ResolveInput {
            last_entry_kind: Some(EntryKind::User),
            ..base()
        });
        assert_eq!(state, ActivityState::Thinking);
    }

    #[test]
    fn test_short_assistant_output_is_thinking() {
        let state = resolve(ResolveInput {
            last_entry_kind: Some(EntryKind::Assistant),
            last_output_tokens: Some(12),
            ..base()
        });
        assert_eq!(state, ActivityState::Thinking);
    }

    #[test]
    fn test_long_or_unknown_assistant_output_is_ready() {
        let state = resolve(ResolveInput {
            last_entry_kind: Some(EntryKind::Assistant),
            last_output_tokens: Some(500),
            ..base()
        });
        assert_eq!(state, ActivityState::Ready);

        let state = resolve(ResolveInput {
            last_entry_kind: Some(EntryKind::Assistant),
            last_output_tokens: None,
            ..base()
        });
        assert_eq!(state, ActivityState::Ready);
    }

    #[test]
    fn test_empty_session_is_ready() {
        assert_eq!(resolve(base()), ActivityState::Ready);
        let state = resolve(ResolveInput {
            last_entry_kind: Some(EntryKind::Other),
            ..base()
        });
        assert_eq!(state, ActivityState::Ready);
    }

    #[test]
    fn test_other_stop_reason_falls_back_to_thinking() {
        let state = resolve(ResolveInput {
            stop_reason: Some("max_tokens"),
            ..base()
        });
        assert_eq!(state, ActivityState::Thinking);
    }

    #[test]
    fn test_last_tool_name_last_write_wins() {
        let lines = [
            r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Bash","input":{}}]}}"#,
            r#"{"type":"user","message":{"content":[{"type":"tool_result","content":"ok"}]}}"#,
            r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Read","input":{}}]}}"#,
        ];
        assert_eq!(last_tool_name(&lines, 10).as_deref(), Some("Read"));
    }

    #[test]
    fn test_last_tool_name_skips_nameless_blocks() {
        let lines = [
            r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Bash","input":{}}]}}"#,
            r#"{"type":"assistant","message":{"content":[{"type":"tool_use","input":{}}]}}"#,
        ];
        assert_eq!(last_tool_name(&lines, 10).as_deref(), Some("Bash"));
    }

    #[test]
    fn test_last_tool_name_respects_window() {
        let lines = [
            r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Bash","input":{}}]}}"#,
            r#"{"type":"user","message":{"content":"no tools here"}}"#,
        ];
        assert_eq!(last_tool_name(&lines, 1), None);
    }
}
