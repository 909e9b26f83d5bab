use crate::streaks::compute_streaks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wrapped_types::{AgentKind, Session};

/// Per-agent rollup. One of these exists for every agent in the
/// enumeration, zero sessions or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStats {
    pub agent: AgentKind,
    pub session_count: u64,
    pub turn_count: u64,
    pub token_count: u64,
    pub user_message_count: u64,
    pub assistant_message_count: u64,
    pub total_duration_minutes: f64,

    // Distributions
    pub repos: BTreeMap<String, u64>,
    pub tools_used: BTreeMap<String, u64>,
    pub hours_distribution: BTreeMap<u32, u64>,
    pub daily_sessions: BTreeMap<String, u64>,

    // Record holders (first session to reach a maximum keeps it)
    pub longest_session_minutes: f64,
    pub longest_session_id: Option<String>,
    pub most_turns_session: u64,
    pub most_turns_session_id: Option<String>,
}

impl AgentStats {
    fn new(agent: AgentKind) -> Self {
        Self {
            agent,
            session_count: 0,
            turn_count: 0,
            token_count: 0,
            user_message_count: 0,
            assistant_message_count: 0,
            total_duration_minutes: 0.0,
            repos: BTreeMap::new(),
            tools_used: BTreeMap::new(),
            hours_distribution: BTreeMap::new(),
            daily_sessions: BTreeMap::new(),
            longest_session_minutes: 0.0,
            longest_session_id: None,
            most_turns_session: 0,
            most_turns_session_id: None,
        }
    }

    pub fn avg_turns_per_session(&self) -> f64 {
        if self.session_count == 0 {
            0.0
        } else {
            self.turn_count as f64 / self.session_count as f64
        }
    }

    pub fn avg_duration_minutes(&self) -> f64 {
        if self.session_count == 0 {
            0.0
        } else {
            self.total_duration_minutes / self.session_count as f64
        }
    }
}

/// Global rollup for one analysis year.
///
/// Immutable after `aggregate` returns; the serde derive exists for the
/// JSON round-trip path external reporting uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedStats {
    pub year: i32,
    pub generated_at: DateTime<Utc>,

    pub agent_stats: BTreeMap<AgentKind, AgentStats>,

    pub total_sessions: u64,
    pub total_turns: u64,
    pub total_tokens: u64,
    pub total_duration_minutes: f64,

    pub all_repos: BTreeMap<String, u64>,
    pub all_tools: BTreeMap<String, u64>,
    pub hours_distribution: BTreeMap<u32, u64>,
    pub daily_sessions: BTreeMap<String, u64>,

    pub longest_streak_days: u64,
    pub current_streak_days: u64,
    pub active_days: u64,

    pub most_active_day: Option<String>,
    pub most_active_day_sessions: u64,
    /// None when no sessions exist; hour 0 is a real hour, not a
    /// sentinel.
    pub peak_hour: Option<u32>,

    /// Input sessions, retained for downstream enrichment.
    pub sessions: Vec<Session>,
    /// (session id, error text) pairs across all sessions.
    pub all_errors: Vec<(String, String)>,
}

/// Fold a materialized session list into yearly statistics.
///
/// Single pass over the sessions, then streaks and record lookups over
/// the accumulated maps. Deterministic apart from `generated_at`.
pub fn aggregate(sessions: Vec<Session>, year: i32) -> WrappedStats {
    let mut agent_stats: BTreeMap<AgentKind, AgentStats> = AgentKind::ALL
        .iter()
        .map(|agent| (*agent, AgentStats::new(*agent)))
        .collect();

    let mut all_repos = BTreeMap::new();
    let mut all_tools = BTreeMap::new();
    let mut hours_distribution = BTreeMap::new();
    let mut daily_sessions = BTreeMap::new();
    let mut all_errors = Vec::new();

    for session in &sessions {
        let stats = agent_stats
            .get_mut(&session.agent)
            .expect("every agent kind is pre-seeded");

        stats.session_count += 1;
        stats.turn_count += session.turn_count;
        stats.user_message_count += session.user_message_count;
        stats.assistant_message_count += session.assistant_message_count;
        stats.total_duration_minutes += session.duration_minutes();
        if let Some(tokens) = session.token_count {
            stats.token_count += tokens;
        }

        if let Some(repo) = &session.repo {
            *stats.repos.entry(repo.clone()).or_insert(0) += 1;
            *all_repos.entry(repo.clone()).or_insert(0) += 1;
        }

        for (tool, count) in &session.tools_used {
            *stats.tools_used.entry(tool.clone()).or_insert(0) += count;
            *all_tools.entry(tool.clone()).or_insert(0) += count;
        }

        let hour = session.hour_of_day();
        *stats.hours_distribution.entry(hour).or_insert(0) += 1;
        *hours_distribution.entry(hour).or_insert(0) += 1;

        let date = session.date_key();
        *stats.daily_sessions.entry(date.clone()).or_insert(0) += 1;
        *daily_sessions.entry(date).or_insert(0) += 1;

        // Strict comparison: the first session reaching a maximum wins ties
        if session.duration_minutes() > stats.longest_session_minutes {
            stats.longest_session_minutes = session.duration_minutes();
            stats.longest_session_id = Some(session.id.clone());
        }
        if session.turn_count > stats.most_turns_session {
            stats.most_turns_session = session.turn_count;
            stats.most_turns_session_id = Some(session.id.clone());
        }

        for error in &session.errors {
            all_errors.push((session.id.clone(), error.clone()));
        }
    }

    let mut total_sessions = 0;
    let mut total_turns = 0;
    let mut total_tokens = 0;
    let mut total_duration_minutes = 0.0;
    for stats in agent_stats.values() {
        total_sessions += stats.session_count;
        total_turns += stats.turn_count;
        total_tokens += stats.token_count;
        total_duration_minutes += stats.total_duration_minutes;
    }

    let streaks = compute_streaks(&daily_sessions);

    // First key (ascending) reaching the maximum wins ties; BTreeMap
    // iteration order makes this deterministic.
    let most_active = max_by_count(&daily_sessions);
    let peak_hour = max_by_count(&hours_distribution).map(|(hour, _)| hour);

    WrappedStats {
        year,
        generated_at: Utc::now(),
        agent_stats,
        total_sessions,
        total_turns,
        total_tokens,
        total_duration_minutes,
        all_repos,
        all_tools,
        hours_distribution,
        daily_sessions,
        longest_streak_days: streaks.longest,
        current_streak_days: streaks.current,
        active_days: streaks.active_days,
        most_active_day: most_active.as_ref().map(|(day, _)| day.clone()),
        most_active_day_sessions: most_active.map(|(_, count)| count).unwrap_or(0),
        peak_hour,
        sessions,
        all_errors,
    }
}

fn max_by_count<K: Clone + Ord>(distribution: &BTreeMap<K, u64>) -> Option<(K, u64)> {
    let mut best: Option<(K, u64)> = None;
    for (key, count) in distribution {
        match &best {
            Some((_, max)) if *count <= *max => {}
            _ => best = Some((key.clone(), *count)),
        }
    }
    best
}
