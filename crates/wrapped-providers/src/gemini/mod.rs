mod parser;
mod schema;

pub use parser::collect_sessions;

use crate::Result;
use crate::outcome::ParseOutcome;
use crate::traits::SessionSource;
use std::path::{Path, PathBuf};
use wrapped_types::{AgentKind, TimeWindow};

/// Gemini CLI logs under `~/.gemini/tmp`: batched `logs.json` files
/// whose messages interleave many sessions, distinguishable only by a
/// per-message session id.
pub struct GeminiSource;

impl SessionSource for GeminiSource {
    fn agent(&self) -> AgentKind {
        AgentKind::Gemini
    }

    fn default_root(&self) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".gemini").join("tmp"))
    }

    fn collect(&self, root: &Path, window: &TimeWindow) -> Result<Vec<ParseOutcome>> {
        if !root.exists() {
            return Ok(Vec::new());
        }
        Ok(collect_sessions(root, window))
    }
}
