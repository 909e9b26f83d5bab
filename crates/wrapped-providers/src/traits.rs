use crate::Result;
use crate::outcome::ParseOutcome;
use std::path::{Path, PathBuf};
use wrapped_types::{AgentKind, TimeWindow};

/// One agent's on-disk session source.
///
/// Responsibilities:
/// - Know the default log location for the agent
/// - Turn the raw format into normalized `Session` values
///
/// Each implementation owns its own location and shares no state with
/// the others; the four formats genuinely differ in shape (two-phase
/// database joins for Cursor, cross-file grouping for Gemini), so the
/// trait deliberately covers only the output contract.
pub trait SessionSource {
    /// Which agent this source belongs to.
    fn agent(&self) -> AgentKind;

    /// Default source location (directory tree or database file).
    /// None when the platform has no conventional location.
    fn default_root(&self) -> Option<PathBuf>;

    /// Parse everything under `root` into per-file/per-group outcomes.
    ///
    /// A missing root yields `Ok(empty)`, not an error. Individual
    /// malformed records become `ParseOutcome::Skipped`; only a fully
    /// inaccessible source may return `Err`, and callers treat that as
    /// "no sessions from this source".
    fn collect(&self, root: &Path, window: &TimeWindow) -> Result<Vec<ParseOutcome>>;
}

/// All four sources in a fixed order (claude, codex, cursor, gemini).
pub fn all_sources() -> Vec<Box<dyn SessionSource>> {
    vec![
        Box::new(crate::claude::ClaudeSource),
        Box::new(crate::codex::CodexSource),
        Box::new(crate::cursor::CursorSource),
        Box::new(crate::gemini::GeminiSource),
    ]
}
