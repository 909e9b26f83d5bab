mod parser;

pub use parser::parse_database;

use crate::Result;
use crate::outcome::ParseOutcome;
use crate::traits::SessionSource;
use std::path::{Path, PathBuf};
use wrapped_types::{AgentKind, TimeWindow};

/// Cursor IDE composer sessions, reconstructed from the `cursorDiskKV`
/// table of the global-storage SQLite database. No transcript files
/// exist for this agent.
pub struct CursorSource;

impl SessionSource for CursorSource {
    fn agent(&self) -> AgentKind {
        AgentKind::Cursor
    }

    fn default_root(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|config| {
            config
                .join("Cursor")
                .join("User")
                .join("globalStorage")
                .join("state.vscdb")
        })
    }

    fn collect(&self, root: &Path, window: &TimeWindow) -> Result<Vec<ParseOutcome>> {
        if !root.exists() {
            return Ok(Vec::new());
        }
        parse_database(root, window)
    }
}
