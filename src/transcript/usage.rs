//! Usage extraction: the backward scan for the newest complete token
//! accounting record.
//!
//! Transcripts are append-only and the signal of interest is always near
//! the tail, so the scan walks from the last line toward the first and
//! stops at the first assistant entry whose usage object carries all four
//! token fields. On long transcripts this is O(tail), not O(file).

use super::types::{EntryKind, RawRecord, UsageInfo};

/// Outcome of one backward scan over the transcript lines.
#[derive(Debug, Default)]
pub struct UsageScan {
    /// Usage of the newest qualifying assistant entry, if any
    pub usage: Option<UsageInfo>,

    /// That entry's stop reason (absent field is kept as None)
    pub stop_reason: Option<String>,

    /// Line index of the qualifying entry
    pub last_assistant_index: Option<usize>,

    /// Kind of the last parseable entry in the file, qualifying or not.
    /// The state resolver uses this to tell "unanswered user turn" from
    /// "assistant still streaming".
    pub last_entry_kind: Option<EntryKind>,

    /// The qualifying entry itself, kept for the current-error check
    pub current: Option<RawRecord>,
}

/// Scan `lines` backward for the newest assistant entry with a complete
/// usage object. Blank and malformed lines are skipped, never fatal.
pub fn extract(lines: &[&str]) -> UsageScan {
    let mut scan = UsageScan::default();

    for (index, line) in lines.iter().enumerate().rev() {
        let record = match RawRecord::parse_line(line) {
            Some(r) => r,
            None => continue,
        };

        // The last parseable entry's kind is captured once and kept even
        // as the scan moves to earlier lines.
        if scan.last_entry_kind.is_none() {
            scan.last_entry_kind = Some(record.kind());
        }

        if record.kind() != EntryKind::Assistant {
            continue;
        }

        if let Some(usage) = record.usage() {
            scan.usage = Some(usage);
            scan.stop_reason = record
                .message
                .as_ref()
                .and_then(|m| m.stop_reason.clone());
            scan.last_assistant_index = Some(index);
            scan.current = Some(record);
            break;
        }
    }

    scan
}
