use crate::stats::WrappedStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat JSON snapshot of one aggregation run, the shape external
/// reporting consumes. All map-valued fields are ordered so two
/// snapshots of the same input compare byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub year: i32,
    pub generated_at: String,
    pub summary: Summary,
    pub agents: BTreeMap<String, AgentBlock>,
    pub distributions: Distributions,
    pub records: Records,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_sessions: u64,
    pub total_turns: u64,
    pub total_tokens: u64,
    pub total_duration_hours: f64,
    pub active_days: u64,
    pub longest_streak_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBlock {
    pub sessions: u64,
    pub turns: u64,
    pub tokens: u64,
    pub avg_turns_per_session: f64,
    pub avg_duration_minutes: f64,
    pub top_repos: Vec<(String, u64)>,
    pub top_tools: Vec<(String, u64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distributions {
    pub by_hour: BTreeMap<u32, u64>,
    pub by_day: BTreeMap<String, u64>,
    pub by_repo: Vec<(String, u64)>,
    pub by_tool: Vec<(String, u64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Records {
    pub most_active_day: Option<String>,
    pub most_active_day_sessions: u64,
    pub peak_hour: Option<u32>,
}

const TOP_REPOS_PER_AGENT: usize = 5;
const TOP_TOOLS_PER_AGENT: usize = 10;
const TOP_REPOS_GLOBAL: usize = 10;
const TOP_TOOLS_GLOBAL: usize = 15;

impl Snapshot {
    pub fn from_stats(stats: &WrappedStats) -> Self {
        let agents = stats
            .agent_stats
            .iter()
            .map(|(agent, agent_stats)| {
                (
                    agent.to_string(),
                    AgentBlock {
                        sessions: agent_stats.session_count,
                        turns: agent_stats.turn_count,
                        tokens: agent_stats.token_count,
                        avg_turns_per_session: round1(agent_stats.avg_turns_per_session()),
                        avg_duration_minutes: round1(agent_stats.avg_duration_minutes()),
                        top_repos: top_n(&agent_stats.repos, TOP_REPOS_PER_AGENT),
                        top_tools: top_n(&agent_stats.tools_used, TOP_TOOLS_PER_AGENT),
                    },
                )
            })
            .collect();

        Snapshot {
            year: stats.year,
            generated_at: stats.generated_at.to_rfc3339(),
            summary: Summary {
                total_sessions: stats.total_sessions,
                total_turns: stats.total_turns,
                total_tokens: stats.total_tokens,
                total_duration_hours: round1(stats.total_duration_minutes / 60.0),
                active_days: stats.active_days,
                longest_streak_days: stats.longest_streak_days,
            },
            agents,
            distributions: Distributions {
                by_hour: stats.hours_distribution.clone(),
                by_day: stats.daily_sessions.clone(),
                by_repo: top_n(&stats.all_repos, TOP_REPOS_GLOBAL),
                by_tool: top_n(&stats.all_tools, TOP_TOOLS_GLOBAL),
            },
            records: Records {
                most_active_day: stats.most_active_day.clone(),
                most_active_day_sessions: stats.most_active_day_sessions,
                peak_hour: stats.peak_hour,
            },
        }
    }
}

/// Highest-count entries, count descending then name ascending so the
/// selection is stable.
fn top_n(distribution: &BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = distribution
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use chrono::{TimeZone, Utc};
    use wrapped_types::{AgentKind, Session};

    #[test]
    fn test_snapshot_shape() {
        let mut session = Session::new(
            "s-1",
            AgentKind::Claude,
            Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap(),
        );
        session.turn_count = 10;
        session.repo = Some("my-project".to_string());
        session.tools_used.insert("Bash".to_string(), 3);
        session.token_count = Some(500);

        let stats = aggregate(vec![session], 2025);
        let snapshot = Snapshot::from_stats(&stats);

        assert_eq!(snapshot.year, 2025);
        assert_eq!(snapshot.summary.total_sessions, 1);
        assert_eq!(snapshot.summary.total_tokens, 500);
        assert_eq!(snapshot.agents["claude"].sessions, 1);
        assert_eq!(
            snapshot.agents["claude"].top_tools,
            vec![("Bash".to_string(), 3)]
        );
        assert_eq!(snapshot.records.peak_hour, Some(14));
        assert_eq!(
            snapshot.distributions.by_repo,
            vec![("my-project".to_string(), 1)]
        );

        // Survives a JSON round trip
        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.total_sessions, 1);
    }

    #[test]
    fn test_top_n_orders_by_count_then_name() {
        let mut dist = BTreeMap::new();
        dist.insert("b".to_string(), 5);
        dist.insert("a".to_string(), 5);
        dist.insert("c".to_string(), 9);

        let top = top_n(&dist, 2);
        assert_eq!(
            top,
            vec![("c".to_string(), 9), ("a".to_string(), 5)]
        );
    }
}
