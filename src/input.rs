//! Statusline payload piped on stdin
//!
//! On each refresh the host writes a small JSON blob describing the
//! session. Every field is optional in practice: the blob may be absent,
//! empty, or truncated, and none of that stops a line from rendering.

use serde::Deserialize;
use std::io::Read;

/// Session metadata piped by the host on each statusline tick.
#[derive(Debug, Deserialize, Default)]
pub struct StatusInput {
    pub session_id: Option<String>,
    pub transcript_path: Option<String>,
    pub cwd: Option<String>,
    pub model: Option<ModelInfo>,
    pub workspace: Option<WorkspaceInfo>,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ModelInfo {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WorkspaceInfo {
    pub current_dir: Option<String>,
    pub project_dir: Option<String>,
}

/// Reads at most 64KB so a misbehaving host cannot stall the refresh.
const MAX_PAYLOAD_BYTES: u64 = 65_536;

impl StatusInput {
    /// Parse the payload from a reader. Empty or malformed input degrades
    /// to defaults rather than failing the refresh.
    pub fn read_from<R: Read>(reader: R) -> StatusInput {
        let mut buf = Vec::with_capacity(4096);
        let _ = reader.take(MAX_PAYLOAD_BYTES).read_to_end(&mut buf);

        if buf.is_empty() {
            return StatusInput::default();
        }
        serde_json::from_slice(&buf).unwrap_or_default()
    }

    pub fn from_stdin() -> StatusInput {
        Self::read_from(std::io::stdin().lock())
    }

    /// Directory the session runs in, preferring the workspace report.
    pub fn working_dir(&self) -> Option<&str> {
        self.workspace
            .as_ref()
            .and_then(|w| w.current_dir.as_deref())
            .or(self.cwd.as_deref())
    }

    /// Short project label: the project directory's base name.
    pub fn project_name(&self) -> Option<&str> {
        let dir = self
            .workspace
            .as_ref()
            .and_then(|w| w.project_dir.as_deref())
            .or_else(|| self.working_dir())?;
        let name = dir.trim_end_matches('/').rsplit('/').next().unwrap_or(dir);
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}
