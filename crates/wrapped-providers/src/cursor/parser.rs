use crate::Result;
use crate::outcome::{ParseOutcome, SkipReason};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use wrapped_types::{AgentKind, Session, TimeWindow};

/// Composer metadata blob stored under `composerData:<id>`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComposerData {
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    unified_mode: Option<String>,
}

/// Reconstruct Cursor sessions from two key-namespace scans joined on
/// the composer id embedded in both key patterns.
///
/// Scan 1 counts per-composer message fragments (`bubbleId:<composer>:
/// <bubble>`), a true fragment count rather than an estimate. Scan 2
/// reads per-composer metadata blobs (`composerData:<composer>`) for
/// the creation time and UI mode. A database that cannot be opened or
/// queried aborts only this source's contribution.
pub fn parse_database(db_path: &Path, window: &TimeWindow) -> Result<Vec<ParseOutcome>> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let fragment_counts = scan_fragment_counts(&conn)?;

    let mut stmt = conn.prepare("SELECT key, value FROM cursorDiskKV WHERE key LIKE 'composerData:%'")?;
    let rows = stmt.query_map([], |row| {
        let key: String = row.get(0)?;
        // The store keeps JSON as either TEXT or BLOB depending on the
        // Cursor version that wrote it.
        let value: rusqlite::types::Value = row.get(1)?;
        let bytes = match value {
            rusqlite::types::Value::Text(text) => Some(text.into_bytes()),
            rusqlite::types::Value::Blob(blob) => Some(blob),
            _ => None,
        };
        Ok((key, bytes))
    })?;

    let mut outcomes = Vec::new();
    for row in rows {
        let (key, value) = match row {
            Ok(pair) => pair,
            Err(_) => continue,
        };
        outcomes.push(parse_composer_row(&key, value, &fragment_counts, window));
    }

    Ok(outcomes)
}

fn scan_fragment_counts(conn: &Connection) -> Result<HashMap<String, u64>> {
    let mut stmt = conn.prepare("SELECT key FROM cursorDiskKV WHERE key LIKE 'bubbleId:%'")?;
    let keys = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut counts: HashMap<String, u64> = HashMap::new();
    for key in keys.filter_map(|k| k.ok()) {
        let mut parts = key.split(':');
        let _prefix = parts.next();
        if let Some(composer_id) = parts.next() {
            *counts.entry(composer_id.to_string()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

fn parse_composer_row(
    key: &str,
    value: Option<Vec<u8>>,
    fragment_counts: &HashMap<String, u64>,
    window: &TimeWindow,
) -> ParseOutcome {
    let Some(composer_id) = key.split(':').nth(1) else {
        return ParseOutcome::skipped(key, SkipReason::MalformedJson);
    };

    let Some(blob) = value.filter(|v| !v.is_empty()) else {
        return ParseOutcome::skipped(key, SkipReason::NoRecords);
    };

    let data: ComposerData = match serde_json::from_slice(&blob) {
        Ok(data) => data,
        Err(_) => return ParseOutcome::skipped(key, SkipReason::MalformedJson),
    };

    let started_at = match data.created_at.and_then(millis_to_utc) {
        Some(ts) => ts,
        None => return ParseOutcome::skipped(key, SkipReason::NoStartTimestamp),
    };
    if !window.contains(&started_at) {
        return ParseOutcome::skipped(key, SkipReason::OutsideWindow);
    }

    let turn_count = fragment_counts.get(composer_id).copied().unwrap_or(1);

    let mut session = Session::new(composer_id, AgentKind::Cursor, started_at);
    session.turn_count = turn_count;
    // The store records fragments, not roles; assume an even split.
    session.user_message_count = turn_count / 2;
    session.assistant_message_count = turn_count / 2;
    // Cursor tracks no working directory, so no repo attribution.
    if let Some(mode) = data.unified_mode.filter(|m| m != "unknown") {
        session.tools_used.insert(format!("cursor_mode:{mode}"), 1);
    }

    ParseOutcome::Session(Box::new(session))
}

fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::partition_outcomes;
    use chrono::TimeZone;

    fn window() -> TimeWindow {
        TimeWindow::year(2025)
    }

    fn millis(y: i32, mo: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn fixture_db(dir: &Path) -> std::path::PathBuf {
        let db_path = dir.join("state.vscdb");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch("CREATE TABLE cursorDiskKV (key TEXT PRIMARY KEY, value BLOB)")
            .unwrap();

        let composer = format!(
            r#"{{"createdAt": {}, "unifiedMode": "agent"}}"#,
            millis(2025, 6, 15)
        );
        conn.execute(
            "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
            rusqlite::params!["composerData:comp-1", composer.as_bytes()],
        )
        .unwrap();
        for n in 0..6 {
            conn.execute(
                "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
                rusqlite::params![format!("bubbleId:comp-1:bubble-{n}"), b"{}".as_slice()],
            )
            .unwrap();
        }

        // Composer outside the window
        let old = format!(r#"{{"createdAt": {}}}"#, millis(2023, 1, 1));
        conn.execute(
            "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
            rusqlite::params!["composerData:comp-old", old.as_bytes()],
        )
        .unwrap();

        // Malformed blob
        conn.execute(
            "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
            rusqlite::params!["composerData:comp-bad", b"not json".as_slice()],
        )
        .unwrap();

        db_path
    }

    #[test]
    fn test_fragment_join_produces_true_counts() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = fixture_db(dir.path());

        let outcomes = parse_database(&db_path, &window()).unwrap();
        let (sessions, skips) = partition_outcomes(outcomes);

        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert_eq!(session.id, "comp-1");
        assert_eq!(session.agent, AgentKind::Cursor);
        assert_eq!(session.turn_count, 6);
        assert_eq!(session.user_message_count, 3);
        assert_eq!(session.assistant_message_count, 3);
        assert_eq!(session.repo, None);
        assert_eq!(session.tools_used.get("cursor_mode:agent"), Some(&1));

        let reasons: Vec<SkipReason> = skips.iter().map(|(_, r)| *r).collect();
        assert!(reasons.contains(&SkipReason::OutsideWindow));
        assert!(reasons.contains(&SkipReason::MalformedJson));
    }

    #[test]
    fn test_composer_without_fragments_defaults_to_one_turn() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.vscdb");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch("CREATE TABLE cursorDiskKV (key TEXT PRIMARY KEY, value BLOB)")
            .unwrap();
        let composer = format!(r#"{{"createdAt": {}}}"#, millis(2025, 3, 3));
        conn.execute(
            "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
            rusqlite::params!["composerData:lonely", composer.as_bytes()],
        )
        .unwrap();
        drop(conn);

        let outcomes = parse_database(&db_path, &window()).unwrap();
        let (sessions, _) = partition_outcomes(outcomes);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].turn_count, 1);
        assert!(sessions[0].tools_used.is_empty());
    }

    #[test]
    fn test_missing_created_at_is_a_skip() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.vscdb");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch("CREATE TABLE cursorDiskKV (key TEXT PRIMARY KEY, value BLOB)")
            .unwrap();
        conn.execute(
            "INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)",
            rusqlite::params!["composerData:no-ts", br#"{"unifiedMode": "chat"}"#.as_slice()],
        )
        .unwrap();
        drop(conn);

        let outcomes = parse_database(&db_path, &window()).unwrap();
        let (sessions, skips) = partition_outcomes(outcomes);
        assert!(sessions.is_empty());
        assert_eq!(skips.len(), 1);
        assert_eq!(skips[0].1, SkipReason::NoStartTimestamp);
    }
}
