mod parser;
mod schema;

pub use parser::parse_session_file;

use crate::Result;
use crate::outcome::ParseOutcome;
use crate::traits::SessionSource;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use wrapped_types::{AgentKind, TimeWindow};

/// Codex transcripts under `~/.codex/sessions`: a mix of the legacy
/// single-object `.json` layout and the current `.jsonl` layout.
pub struct CodexSource;

impl SessionSource for CodexSource {
    fn agent(&self) -> AgentKind {
        AgentKind::Codex
    }

    fn default_root(&self) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".codex").join("sessions"))
    }

    fn collect(&self, root: &Path, window: &TimeWindow) -> Result<Vec<ParseOutcome>> {
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut outcomes = Vec::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file()
                || path
                    .extension()
                    .is_none_or(|e| e != "json" && e != "jsonl")
            {
                continue;
            }
            outcomes.push(parse_session_file(path, window));
        }
        Ok(outcomes)
    }
}
