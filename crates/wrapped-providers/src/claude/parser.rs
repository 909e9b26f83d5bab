use super::schema::*;
use crate::outcome::{ParseOutcome, SkipReason};
use std::collections::BTreeMap;
use std::path::Path;
use wrapped_types::{
    AgentKind, Session, TimeWindow, extract_repo_from_path, parse_iso_timestamp, sanitize_prompt,
};

/// Records scanned before giving up on a metadata field. Metadata may be
/// absent from the very first record but present a few records later.
const METADATA_LOOKAHEAD: usize = 10;

/// Errors kept per session, and the per-entry truncation limits.
const MAX_ERRORS: usize = 10;
const ERROR_SOURCE_LIMIT: usize = 500;
const ERROR_SNIPPET_LIMIT: usize = 200;

/// Parse a single Claude Code transcript file into a Session.
///
/// Malformed lines are dropped without aborting the file; a file with
/// no parseable records or no discoverable start timestamp is a skip,
/// never an error.
pub fn parse_session_file(path: &Path, window: &TimeWindow) -> ParseOutcome {
    let source = path.display().to_string();

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return ParseOutcome::skipped(source, SkipReason::Unreadable),
    };

    let records: Vec<ClaudeRecord> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    if records.is_empty() {
        return ParseOutcome::skipped(source, SkipReason::NoRecords);
    }

    let lookahead = &records[..records.len().min(METADATA_LOOKAHEAD)];
    let session_id = find_first(lookahead, |r| r.session_id.clone());
    let cwd = find_first(lookahead, |r| r.cwd.clone());
    let branch = find_first(lookahead, |r| r.git_branch.clone());
    let timestamp = find_first(lookahead, |r| r.timestamp.clone());

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

    let mut session = Session::new(id, AgentKind::Claude, started_at);
    session.ended_at = ended_at;
    session.repo = extract_repo_from_path(cwd.as_deref());
    session.branch = branch;
    // Turn = valid-JSON record. Raw line count would inflate the figure
    // with malformed lines.
    session.turn_count = records.len() as u64;
    session.user_message_count = records.iter().filter(|r| r.is_user()).count() as u64;
    session.assistant_message_count = records.iter().filter(|r| r.is_assistant()).count() as u64;
    session.token_count = extract_token_count(&records);
    session.tools_used = extract_tool_uses(&records);
    session.user_prompts = extract_user_prompts(&records);
    session.errors = extract_errors(&records);

    ParseOutcome::Session(Box::new(session))
}

fn find_first<T>(records: &[ClaudeRecord], get: impl Fn(&ClaudeRecord) -> Option<T>) -> Option<T> {
    records.iter().find_map(get)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn content_blocks(record: &ClaudeRecord) -> &[ContentItem] {
    match record.message.as_ref().and_then(|m| m.content.as_ref()) {
        Some(MessageContent::Blocks(items)) => items,
        _ => &[],
    }
}

/// Tool invocation counts from assistant content blocks.
fn extract_tool_uses(records: &[ClaudeRecord]) -> BTreeMap<String, u64> {
    let mut tools = BTreeMap::new();
    for record in records {
        for item in content_blocks(record) {
            if let ContentItem::Block(ContentBlock::ToolUse { name }) = item {
                let name = name.clone().unwrap_or_else(|| "unknown".to_string());
                *tools.entry(name).or_insert(0) += 1;
            }
        }
    }
    tools
}

/// Sanitized user prompt text, excluding tool-result echoes.
fn extract_user_prompts(records: &[ClaudeRecord]) -> Vec<String> {
    let mut prompts = Vec::new();
    for record in records.iter().filter(|r| r.is_user()) {
        match record.message.as_ref().and_then(|m| m.content.as_ref()) {
            Some(MessageContent::Text(text)) => prompts.push(sanitize_prompt(text)),
            Some(MessageContent::Blocks(items)) => {
                for item in items {
                    // Typed blocks here are tool results, not authored text
                    if let ContentItem::Text(text) = item {
                        prompts.push(sanitize_prompt(text));
                    }
                }
            }
            _ => {}
        }
    }
    prompts
}

/// Error snippets from failed tool results and captured stderr.
fn extract_errors(records: &[ClaudeRecord]) -> Vec<String> {
    let mut errors = Vec::new();
    for record in records {
        if record.is_user() {
            for item in content_blocks(record) {
                if let ContentItem::Block(ContentBlock::ToolResult { content, is_error }) = item
                    && *is_error
                    && let Some(text) = content.as_ref().and_then(|c| c.as_str())
                    && !text.is_empty()
                    && text.chars().count() < ERROR_SOURCE_LIMIT
                {
                    errors.push(truncate_chars(text, ERROR_SNIPPET_LIMIT));
                }
            }
        }

        if let Some(stderr) = record
            .tool_use_result
            .as_ref()
            .and_then(|r| r.get("stderr"))
            .and_then(|v| v.as_str())
            && !stderr.is_empty()
            && stderr.chars().count() < ERROR_SOURCE_LIMIT
        {
            errors.push(truncate_chars(stderr, ERROR_SNIPPET_LIMIT));
        }
    }
    errors.truncate(MAX_ERRORS);
    errors
}

/// Sum of input (direct + cache write + cache read) and output tokens
/// across assistant records. None when no record carries usage at all,
/// which is distinct from zero tokens used.
fn extract_token_count(records: &[ClaudeRecord]) -> Option<u64> {
    let mut total = 0u64;
    let mut saw_usage = false;

    for record in records.iter().filter(|r| r.is_assistant()) {
        if let Some(usage) = record.message.as_ref().and_then(|m| m.usage.as_ref()) {
            saw_usage = true;
            total += usage.input_tokens
                + usage.cache_creation_input_tokens
                + usage.cache_read_input_tokens
                + usage.output_tokens;
        }
    }

    saw_usage.then_some(total)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
