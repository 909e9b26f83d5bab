use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Supported AI coding agents (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Claude,
    Codex,
    Cursor,
    Gemini,
}

impl AgentKind {
    /// All agents in a fixed order. Aggregation emits a stats record
    /// for each of these even when an agent has zero sessions.
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Claude,
        AgentKind::Codex,
        AgentKind::Cursor,
        AgentKind::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Claude => "claude",
            AgentKind::Codex => "codex",
            AgentKind::Cursor => "cursor",
            AgentKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified session model across all agents.
///
/// The canonical record every format parser produces. A session cannot
/// exist without a start timestamp; everything else is optional or
/// defaults to empty. Immutable once built; the aggregation engine and
/// downstream enrichment only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique per source file/record; filename stem when the format
    /// carries no embedded identifier.
    pub id: String,
    pub agent: AgentKind,

    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// Sanitized project identifier, never a full filesystem path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    pub turn_count: u64,
    pub user_message_count: u64,
    pub assistant_message_count: u64,
    /// None when the source format reports no usage at all, as opposed
    /// to zero tokens used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u64>,

    /// Tool name -> invocation count.
    #[serde(default)]
    pub tools_used: BTreeMap<String, u64>,
    /// Sanitized prompts in chronological order.
    #[serde(default)]
    pub user_prompts: Vec<String>,
    /// Truncated error snippets, capped at 10 per session.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Session {
    /// Minimal valid session. The required `started_at` argument is the
    /// construction-time guarantee that no session exists without one.
    pub fn new(id: impl Into<String>, agent: AgentKind, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            agent,
            started_at,
            ended_at: None,
            repo: None,
            branch: None,
            turn_count: 0,
            user_message_count: 0,
            assistant_message_count: 0,
            token_count: None,
            tools_used: BTreeMap::new(),
            user_prompts: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Session length in minutes; zero when the end time is unknown or
    /// precedes the start (clock skew in the source logs).
    pub fn duration_minutes(&self) -> f64 {
        match self.ended_at {
            Some(ended) => {
                let seconds = (ended - self.started_at).num_seconds();
                if seconds <= 0 { 0.0 } else { seconds as f64 / 60.0 }
            }
            None => 0.0,
        }
    }

    /// Hour (0-23) when the session started.
    pub fn hour_of_day(&self) -> u32 {
        self.started_at.hour()
    }

    /// Day of week, Monday = 0.
    pub fn day_of_week(&self) -> u32 {
        self.started_at.weekday().num_days_from_monday()
    }

    /// Calendar date key, `YYYY-MM-DD`.
    pub fn date_key(&self) -> String {
        self.started_at.format("%Y-%m-%d").to_string()
    }
}
