mod parser;
mod schema;

pub use parser::parse_session_file;

use crate::Result;
use crate::outcome::ParseOutcome;
use crate::traits::SessionSource;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use wrapped_types::{AgentKind, TimeWindow};

/// Claude Code transcripts: a directory tree of per-session JSONL files
/// under `~/.claude/projects`.
pub struct ClaudeSource;

impl SessionSource for ClaudeSource {
    fn agent(&self) -> AgentKind {
        AgentKind::Claude
    }

    fn default_root(&self) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".claude").join("projects"))
    }

    fn collect(&self, root: &Path, window: &TimeWindow) -> Result<Vec<ParseOutcome>> {
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut outcomes = Vec::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|e| e != "jsonl") {
                continue;
            }
            outcomes.push(parse_session_file(path, window));
        }
        Ok(outcomes)
    }
}
