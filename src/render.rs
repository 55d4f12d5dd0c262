//! Statusline rendering
//!
//! Turns an analysis snapshot plus session metadata into the single line
//! printed to stdout. Truncation is ANSI-aware so color codes never count
//! against the terminal width.

use crate::config::DisplayConfig;
use crate::transcript::{ActivityState, AnalysisSnapshot, Degradation};
use colored::Colorize;

/// Session metadata shown alongside the snapshot.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub project: Option<String>,
    pub model: Option<String>,
    pub branch: Option<String>,
}

/// Usage fraction above which the gauge turns yellow.
const WARN_PERCENTAGE: f64 = 60.0;
/// Usage fraction above which the gauge turns red.
const CRITICAL_PERCENTAGE: f64 = 85.0;

/// Builds the full statusline, truncated to `max_width` visible columns.
pub fn render_line(
    snapshot: &AnalysisSnapshot,
    session: &SessionContext,
    config: &DisplayConfig,
    max_width: usize,
) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(6);

    if let Some(project) = &session.project {
        segments.push(project.bold().to_string());
    }
    if let Some(model) = &session.model {
        segments.push(model.cyan().to_string());
    }
    if let Some(branch) = &session.branch {
        segments.push(format!("\u{2387} {}", branch.magenta()));
    }

    segments.push(context_gauge(snapshot, config));
    segments.push(activity_segment(snapshot));

    if let Some(annotation) = error_annotation(snapshot) {
        segments.push(annotation);
    }

    truncate_to_width(&segments.join(&config.separator), max_width)
}

/// Context usage segment: `32.5k/200k [███-------] 16%`.
fn context_gauge(snapshot: &AnalysisSnapshot, config: &DisplayConfig) -> String {
    let tokens = &snapshot.tokens;
    let pct = tokens.percentage;

    let text = format!(
        "{}/{} {} {:.0}%",
        format_tokens(tokens.used_tokens),
        format_tokens(tokens.context_window),
        usage_bar(pct, config.bar_width),
        pct
    );

    if pct >= CRITICAL_PERCENTAGE {
        text.red().to_string()
    } else if pct >= WARN_PERCENTAGE {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}

/// Fixed-width fill bar. Percentages over 100 render as a full bar.
fn usage_bar(percentage: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let filled = ((percentage / 100.0 * width as f64).round() as usize).min(width);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for i in 0..width {
        bar.push(if i < filled { '\u{2588}' } else { '-' });
    }
    bar.push(']');
    bar
}

fn activity_segment(snapshot: &AnalysisSnapshot) -> String {
    match snapshot.degraded {
        Some(Degradation::NoAccess) => return "no access".dimmed().to_string(),
        Some(Degradation::ReadFailed) => return "parse error".dimmed().to_string(),
        None => {}
    }

    match &snapshot.activity {
        ActivityState::Ready => "\u{25cf} ready".green().to_string(),
        ActivityState::Thinking => "\u{25cc} thinking".yellow().to_string(),
        ActivityState::ToolUse { tool_name } => {
            let label = tool_name.as_deref().unwrap_or("tool");
            format!("\u{2699} {}", label).blue().to_string()
        }
        ActivityState::Error { detail } => format!("\u{2717} {}", detail).red().to_string(),
    }
}

/// Trailing soft-error annotation. Only shown when the current state is
/// not already an error, so the same detail never appears twice.
fn error_annotation(snapshot: &AnalysisSnapshot) -> Option<String> {
    if !snapshot.recent_error || matches!(snapshot.activity, ActivityState::Error { .. }) {
        return None;
    }
    let detail = snapshot.recent_error_detail.as_deref().unwrap_or("recent error");
    Some(format!("\u{26a0} {}", detail).dimmed().to_string())
}

/// Compact token count: 950, 1.5k, 1.2M.
pub fn format_tokens(count: u64) -> String {
    if count >= 1_000_000 {
        let m = count as f64 / 1_000_000.0;
        if m >= 10.0 {
            format!("{:.0}M", m)
        } else {
            format!("{:.1}M", m)
        }
    } else if count >= 1_000 {
        let k = count as f64 / 1_000.0;
        if k >= 100.0 {
            format!("{:.0}k", k)
        } else {
            format!("{:.1}k", k)
        }
    } else {
        count.to_string()
    }
}

/// Visible width of a string, skipping ANSI escape sequences.
pub fn visible_len(s: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if c == '\u{1b}' {
            in_escape = true;
        } else {
            len += 1;
        }
    }
    len
}

/// Truncates to `max_width` visible columns, keeping escape sequences
/// intact and resetting attributes if anything was cut mid-style.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if visible_len(s) <= max_width {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut visible = 0;
    let mut in_escape = false;
    // Reserve one column for the ellipsis.
    let budget = max_width.saturating_sub(1);

    for c in s.chars() {
        if in_escape {
            out.push(c);
            if c.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if c == '\u{1b}' {
            out.push(c);
            in_escape = true;
        } else {
            if visible >= budget {
                break;
            }
            out.push(c);
            visible += 1;
        }
    }

    out.push('\u{2026}');
    if s.contains('\u{1b}') {
        out.push_str("\u{1b}[0m");
    }
    out
}
