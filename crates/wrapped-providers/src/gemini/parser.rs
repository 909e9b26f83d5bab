use super::schema::GeminiMessage;
use crate::outcome::{ParseOutcome, SkipReason};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;
use wrapped_types::{AgentKind, Session, TimeWindow, parse_iso_timestamp, sanitize_prompt};

#[derive(Default)]
struct SessionGroup {
    message_count: u64,
    user_count: u64,
    model_count: u64,
    user_prompts: Vec<String>,
    first_timestamp: Option<DateTime<Utc>>,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Group messages from every `logs.json` under `root` by session id and
/// emit one Session per group.
///
/// There is no session boundary in the file structure; a session's
/// start/end is the min/max timestamp across its grouped messages,
/// which may span multiple log files. The window filter applies at
/// message granularity before grouping. A BTreeMap keeps the output
/// order stable across runs.
pub fn collect_sessions(root: &Path, window: &TimeWindow) -> Vec<ParseOutcome> {
    let mut groups: BTreeMap<String, SessionGroup> = BTreeMap::new();
    let mut outcomes = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.file_name().is_none_or(|n| n != "logs.json") {
            continue;
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => {
                outcomes.push(ParseOutcome::skipped(
                    path.display().to_string(),
                    SkipReason::Unreadable,
                ));
                continue;
            }
        };

        let messages: Vec<GeminiMessage> = match serde_json::from_str(&text) {
            Ok(messages) => messages,
            Err(_) => {
                outcomes.push(ParseOutcome::skipped(
                    path.display().to_string(),
                    SkipReason::MalformedJson,
                ));
                continue;
            }
        };

        for message in messages {
            fold_message(&mut groups, message, window);
        }
    }

    for (session_id, group) in groups {
        outcomes.push(group_to_outcome(session_id, group));
    }
    outcomes
}

fn fold_message(
    groups: &mut BTreeMap<String, SessionGroup>,
    message: GeminiMessage,
    window: &TimeWindow,
) {
    let Some(session_id) = message.session_id.as_deref() else {
        return;
    };
    let Some(timestamp) = parse_iso_timestamp(message.timestamp.as_deref()) else {
        return;
    };
    if !window.contains(&timestamp) {
        return;
    }

    let group = groups.entry(session_id.to_string()).or_default();
    group.message_count += 1;

    if group.first_timestamp.is_none_or(|first| timestamp < first) {
        group.first_timestamp = Some(timestamp);
    }
    if group.last_timestamp.is_none_or(|last| timestamp > last) {
        group.last_timestamp = Some(timestamp);
    }

    if message.is_user() {
        group.user_count += 1;
        if let Some(content) = message.content.as_deref()
            && !content.is_empty()
        {
            group.user_prompts.push(sanitize_prompt(content));
        }
    } else if message.is_model() {
        group.model_count += 1;
    }
}

fn group_to_outcome(session_id: String, group: SessionGroup) -> ParseOutcome {
    let Some(started_at) = group.first_timestamp else {
        return ParseOutcome::skipped(session_id, SkipReason::NoStartTimestamp);
    };

    let mut session = Session::new(session_id, AgentKind::Gemini, started_at);
    session.ended_at = group.last_timestamp;
    session.turn_count = group.message_count;
    session.user_message_count = group.user_count;
    session.assistant_message_count = group.model_count;
    session.user_prompts = group.user_prompts;

    ParseOutcome::Session(Box::new(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::partition_outcomes;

    fn window() -> TimeWindow {
        TimeWindow::year(2025)
    }

    fn write_logs(dir: &Path, sub: &str, body: &str) {
        let session_dir = dir.join(sub);
        std::fs::create_dir_all(&session_dir).unwrap();
        std::fs::write(session_dir.join("logs.json"), body).unwrap();
    }

    #[test]
    fn test_interleaved_sessions_are_grouped_by_id() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(
            dir.path(),
            "hash-a",
            r#"[
                {"sessionId": "g-1", "timestamp": "2025-05-01T08:00:00Z", "type": "user", "content": "first"},
                {"sessionId": "g-2", "timestamp": "2025-05-01T09:00:00Z", "type": "user", "content": "other session"},
                {"sessionId": "g-1", "timestamp": "2025-05-01T08:05:00Z", "type": "model", "content": "reply"}
            ]"#,
        );

        let (mut sessions, _) = partition_outcomes(collect_sessions(dir.path(), &window()));
        sessions.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(sessions.len(), 2);
        let g1 = &sessions[0];
        assert_eq!(g1.id, "g-1");
        assert_eq!(g1.agent, AgentKind::Gemini);
        assert_eq!(g1.turn_count, 2);
        assert_eq!(g1.user_message_count, 1);
        assert_eq!(g1.assistant_message_count, 1);
        assert_eq!(g1.user_prompts, vec!["first".to_string()]);
        assert_eq!(g1.duration_minutes(), 5.0);
    }

    #[test]
    fn test_grouping_spans_multiple_files() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(
            dir.path(),
            "hash-a",
            r#"[{"sessionId": "g-1", "timestamp": "2025-05-01T08:00:00Z", "type": "user", "content": "start"}]"#,
        );
        write_logs(
            dir.path(),
            "hash-b",
            r#"[{"sessionId": "g-1", "timestamp": "2025-05-01T10:00:00Z", "type": "model", "content": "end"}]"#,
        );

        let (sessions, _) = partition_outcomes(collect_sessions(dir.path(), &window()));
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].turn_count, 2);
        assert_eq!(sessions[0].duration_minutes(), 120.0);
    }

    #[test]
    fn test_window_filter_applies_per_message() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(
            dir.path(),
            "hash-a",
            r#"[
                {"sessionId": "g-1", "timestamp": "2024-12-31T23:00:00Z", "type": "user", "content": "old"},
                {"sessionId": "g-1", "timestamp": "2025-01-01T08:00:00Z", "type": "user", "content": "new"}
            ]"#,
        );

        let (sessions, _) = partition_outcomes(collect_sessions(dir.path(), &window()));
        assert_eq!(sessions.len(), 1);
        // The 2024 message never enters the group
        assert_eq!(sessions[0].turn_count, 1);
        assert_eq!(sessions[0].user_prompts, vec!["new".to_string()]);
    }

    #[test]
    fn test_malformed_file_skips_without_aborting_siblings() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(dir.path(), "hash-bad", "not json at all");
        write_logs(
            dir.path(),
            "hash-good",
            r#"[{"sessionId": "g-1", "timestamp": "2025-05-01T08:00:00Z", "type": "user", "content": "ok"}]"#,
        );

        let (sessions, skips) = partition_outcomes(collect_sessions(dir.path(), &window()));
        assert_eq!(sessions.len(), 1);
        assert_eq!(skips.len(), 1);
        assert_eq!(skips[0].1, SkipReason::MalformedJson);
    }

    #[test]
    fn test_messages_without_id_or_timestamp_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(
            dir.path(),
            "hash-a",
            r#"[
                {"timestamp": "2025-05-01T08:00:00Z", "type": "user", "content": "no id"},
                {"sessionId": "g-1", "type": "user", "content": "no timestamp"},
                {"sessionId": "g-1", "timestamp": "2025-05-01T08:00:00Z", "type": "user", "content": "kept"}
            ]"#,
        );

        let (sessions, _) = partition_outcomes(collect_sessions(dir.path(), &window()));
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].turn_count, 1);
    }
}
