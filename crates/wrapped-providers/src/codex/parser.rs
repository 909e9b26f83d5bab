use super::schema::*;
use crate::outcome::{ParseOutcome, SkipReason};
use std::collections::BTreeMap;
use std::path::Path;
use wrapped_types::{
    AgentKind, Session, TimeWindow, extract_repo_from_path, parse_iso_timestamp, sanitize_prompt,
};

/// Parse a single Codex session file, detecting which of the two
/// physical layouts it uses and producing an equivalent Session either
/// way.
pub fn parse_session_file(path: &Path, window: &TimeWindow) -> ParseOutcome {
    let source = path.display().to_string();

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return ParseOutcome::skipped(source, SkipReason::Unreadable),
    };

    if path.extension().is_some_and(|e| e == "json") {
        // Legacy layout is a single JSON document with an embedded
        // session object.
        if let Ok(legacy) = serde_json::from_str::<LegacyCodexFile>(&text) {
            return parse_legacy(path, legacy, window);
        }

        // Some old files hold a bare array (or single object) of
        // records in the current shape.
        let records = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| serde_json::from_value::<CodexRecord>(v).ok())
                .collect(),
            Ok(value) => serde_json::from_value::<CodexRecord>(value)
                .map(|r| vec![r])
                .unwrap_or_default(),
            Err(_) => return ParseOutcome::skipped(source, SkipReason::MalformedJson),
        };
        return parse_records(path, records, window);
    }

    // Current line-delimited layout
    let records: Vec<CodexRecord> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    parse_records(path, records, window)
}

fn parse_legacy(path: &Path, legacy: LegacyCodexFile, window: &TimeWindow) -> ParseOutcome {
    let source = path.display().to_string();

    let started_at = match parse_iso_timestamp(legacy.session.timestamp.as_deref()) {
        Some(ts) => ts,
        None => return ParseOutcome::skipped(source, SkipReason::NoStartTimestamp),
    };
    if !window.contains(&started_at) {
        return ParseOutcome::skipped(source, SkipReason::OutsideWindow);
    }

    let id = legacy.session.id.unwrap_or_else(|| file_stem(path));
    let mut session = Session::new(id, AgentKind::Codex, started_at);
    session.repo = extract_repo_from_path(legacy.session.cwd.as_deref());
    session.turn_count = legacy.items.len() as u64;
    session.user_message_count = count_roles(&legacy.items, "user");
    session.assistant_message_count = count_roles(&legacy.items, "assistant");

    for item in &legacy.items {
        if item.item_type.as_deref() == Some("function_call") {
            let name = item.name.clone().unwrap_or_else(|| "unknown".to_string());
            *session.tools_used.entry(name).or_insert(0) += 1;
        }
        if item.role.as_deref() == Some("user")
            && let Some(content) = &item.content
        {
            for text in input_text_parts(content) {
                session.user_prompts.push(sanitize_prompt(text));
            }
        }
    }

    ParseOutcome::Session(Box::new(session))
}

fn count_roles(items: &[LegacyItem], role: &str) -> u64 {
    items
        .iter()
        .filter(|i| i.role.as_deref() == Some(role))
        .count() as u64
}

fn parse_records(path: &Path, records: Vec<CodexRecord>, window: &TimeWindow) -> ParseOutcome {
    let source = path.display().to_string();

    if records.is_empty() {
        return ParseOutcome::skipped(source, SkipReason::NoRecords);
    }

    // The distinguished first record carries the session metadata in
    // the current layout; plain record files fall back to the first
    // record's own timestamp.
    let first = &records[0];
    let mut session_id = None;
    let mut cwd = None;
    let mut timestamp = first.timestamp.clone();

    if first.is_session_meta()
        && let Some(payload) = &first.payload
    {
        session_id = payload.id.clone();
        cwd = payload.cwd.clone();
        timestamp = payload.timestamp.clone().or(timestamp);
    }

    let started_at = match parse_iso_timestamp(timestamp.as_deref()) {
        Some(ts) => ts,
        None => return ParseOutcome::skipped(source, SkipReason::NoStartTimestamp),
    };
    if !window.contains(&started_at) {
        return ParseOutcome::skipped(source, SkipReason::OutsideWindow);
    }

    let ended_at = records
        .iter()
        .rev()
        .find_map(|r| parse_iso_timestamp(r.timestamp.as_deref()));

    let id = session_id.unwrap_or_else(|| file_stem(path));
    let mut session = Session::new(id, AgentKind::Codex, started_at);
    session.ended_at = ended_at;
    session.repo = extract_repo_from_path(cwd.as_deref());
    session.turn_count = records.len() as u64;
    session.user_message_count = records
        .iter()
        .filter(|r| r.is_response_item() && r.payload_role() == Some("user"))
        .count() as u64;
    session.assistant_message_count = records
        .iter()
        .filter(|r| r.is_response_item() && r.payload_role() == Some("assistant"))
        .count() as u64;
    session.tools_used = extract_tool_uses(&records);
    session.user_prompts = extract_user_prompts(&records);

    ParseOutcome::Session(Box::new(session))
}

fn extract_tool_uses(records: &[CodexRecord]) -> BTreeMap<String, u64> {
    let mut tools = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_response_item()) {
        if let Some(payload) = &record.payload
            && payload.payload_type.as_deref() == Some("function_call")
        {
            let name = payload.name.clone().unwrap_or_else(|| "unknown".to_string());
            *tools.entry(name).or_insert(0) += 1;
        }
    }
    tools
}

fn extract_user_prompts(records: &[CodexRecord]) -> Vec<String> {
    let mut prompts = Vec::new();
    for record in records.iter().filter(|r| r.is_response_item()) {
        if let Some(payload) = &record.payload
            && payload.role.as_deref() == Some("user")
            && let Some(content) = &payload.content
        {
            for text in input_text_parts(content) {
                prompts.push(sanitize_prompt(text));
            }
        }
    }
    prompts
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn window() -> TimeWindow {
        TimeWindow::year(2025)
    }

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_legacy_json_layout() {
        let file = write_file(
            ".json",
            r#"{
                "session": {"id": "legacy-1", "timestamp": "2025-04-01T10:00:00Z", "cwd": "/home/d/projects/app"},
                "items": [
                    {"role": "user", "content": [{"type": "input_text", "text": "write a parser"}]},
                    {"role": "assistant", "content": [{"type": "output_text", "text": "sure"}]},
                    {"type": "function_call", "name": "shell"},
                    {"type": "function_call", "name": "shell"}
                ]
            }"#,
        );

        let outcome = parse_session_file(file.path(), &window());
        match outcome {
            ParseOutcome::Session(session) => {
                assert_eq!(session.id, "legacy-1");
                assert_eq!(session.agent, AgentKind::Codex);
                assert_eq!(session.turn_count, 4);
                assert_eq!(session.user_message_count, 1);
                assert_eq!(session.assistant_message_count, 1);
                assert_eq!(session.repo.as_deref(), Some("app"));
                assert_eq!(session.tools_used.get("shell"), Some(&2));
                assert_eq!(session.user_prompts, vec!["write a parser".to_string()]);
                assert_eq!(session.ended_at, None);
            }
            other => panic!("expected session, got {:?}", other),
        }
    }

    #[test]
    fn test_current_jsonl_layout() {
        let file = write_file(
            ".jsonl",
            concat!(
                r#"{"type":"session_meta","timestamp":"2025-04-01T10:00:00Z","payload":{"id":"cur-1","cwd":"/Users/d/git/tool","timestamp":"2025-04-01T10:00:00Z"}}"#,
                "\n",
                r#"{"type":"response_item","timestamp":"2025-04-01T10:01:00Z","payload":{"role":"user","content":[{"type":"input_text","text":"hello"}]}}"#,
                "\n",
                r#"{"type":"response_item","timestamp":"2025-04-01T10:02:00Z","payload":{"type":"function_call","name":"apply_patch"}}"#,
                "\n",
                r#"{"type":"response_item","timestamp":"2025-04-01T10:03:00Z","payload":{"role":"assistant","content":[{"type":"output_text","text":"done"}]}}"#,
                "\n",
            ),
        );

        let outcome = parse_session_file(file.path(), &window());
        match outcome {
            ParseOutcome::Session(session) => {
                assert_eq!(session.id, "cur-1");
                assert_eq!(session.turn_count, 4);
                assert_eq!(session.user_message_count, 1);
                assert_eq!(session.assistant_message_count, 1);
                assert_eq!(session.repo.as_deref(), Some("tool"));
                assert_eq!(session.tools_used.get("apply_patch"), Some(&1));
                assert_eq!(session.user_prompts, vec!["hello".to_string()]);
                assert_eq!(session.duration_minutes(), 3.0);
            }
            other => panic!("expected session, got {:?}", other),
        }
    }

    #[test]
    fn test_both_layouts_agree() {
        // The same logical session in both layouts normalizes to
        // matching counts.
        let legacy = write_file(
            ".json",
            r#"{"session": {"id": "same", "timestamp": "2025-04-01T10:00:00Z"},
                "items": [{"role": "user", "content": [{"type": "input_text", "text": "q"}]}]}"#,
        );
        let current = write_file(
            ".jsonl",
            concat!(
                r#"{"type":"session_meta","timestamp":"2025-04-01T10:00:00Z","payload":{"id":"same"}}"#,
                "\n",
                r#"{"type":"response_item","payload":{"role":"user","content":[{"type":"input_text","text":"q"}]}}"#,
                "\n",
            ),
        );

        let a = match parse_session_file(legacy.path(), &window()) {
            ParseOutcome::Session(s) => s,
            other => panic!("expected session, got {:?}", other),
        };
        let b = match parse_session_file(current.path(), &window()) {
            ParseOutcome::Session(s) => s,
            other => panic!("expected session, got {:?}", other),
        };

        assert_eq!(a.id, b.id);
        assert_eq!(a.started_at, b.started_at);
        assert_eq!(a.user_message_count, b.user_message_count);
        assert_eq!(a.user_prompts, b.user_prompts);
    }

    #[test]
    fn test_meta_without_timestamp_is_a_skip() {
        let file = write_file(
            ".jsonl",
            concat!(r#"{"type":"session_meta","payload":{"id":"no-ts"}}"#, "\n"),
        );
        match parse_session_file(file.path(), &window()) {
            ParseOutcome::Skipped { reason, .. } => {
                assert_eq!(reason, SkipReason::NoStartTimestamp)
            }
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_file_is_a_skip() {
        let file = write_file(".json", "{not valid json");
        match parse_session_file(file.path(), &window()) {
            ParseOutcome::Skipped { reason, .. } => assert_eq!(reason, SkipReason::MalformedJson),
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_turn_count_includes_legacy_items_without_role() {
        // turn = item, whether or not we understand it
        let file = write_file(
            ".json",
            r#"{"session": {"id": "x", "timestamp": "2025-04-01T10:00:00Z"},
                "items": [{"type": "reasoning"}, {"role": "user"}]}"#,
        );
        match parse_session_file(file.path(), &window()) {
            ParseOutcome::Session(session) => assert_eq!(session.turn_count, 2),
            other => panic!("expected session, got {:?}", other),
        }
    }
}
