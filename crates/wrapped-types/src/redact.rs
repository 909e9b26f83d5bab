use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path};

/// Directory names that conventionally contain checkouts. The repo
/// identifier is everything after the first of these in the path.
const CONTAINER_DIRS: &[&str] = &["git", "projects", "repos", "src", "code"];

/// Maximum characters kept from a user prompt.
pub const MAX_PROMPT_LENGTH: usize = 200;

const REDACTED: &str = "[REDACTED]";

static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Vendor API key prefixes (sk-ant- must come before the generic sk-)
        r"(?i)sk-ant-[a-zA-Z0-9-]{20,}",
        r"(?i)sk-[a-zA-Z0-9]{20,}",
        // Platform access tokens
        r"(?i)ghp_[a-zA-Z0-9]{36}",
        // Generic credential assignments
        r"(?i)password[=:]\s*\S+",
        r"(?i)api[_-]?key[=:]\s*\S+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("redaction patterns are static and valid"))
    .collect()
});

static HOME_PATH_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"/Users/[^/\s]+/[^\s]+/([^/\s]+)",
        r"/home/[^/\s]+/[^\s]+/([^/\s]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("path patterns are static and valid"))
    .collect()
});

/// Extract a sanitized repo identifier from a working-directory path.
///
/// Privacy boundary: the full absolute path never leaves this function.
/// The home directory maps to `~`; otherwise everything after the first
/// recognized container directory (e.g. `/Users/d/git/work/app` ->
/// `work/app`), falling back to the final path segment.
pub fn extract_repo_from_path(cwd: Option<&str>) -> Option<String> {
    let cwd = cwd?.trim();
    if cwd.is_empty() {
        return None;
    }

    let path = Path::new(cwd);
    if let Some(home) = dirs::home_dir()
        && path == home
    {
        return Some("~".to_string());
    }

    let segments: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();

    for (idx, segment) in segments.iter().enumerate() {
        if CONTAINER_DIRS.contains(segment) && idx + 1 < segments.len() {
            return Some(segments[idx + 1..].join("/"));
        }
    }

    segments.last().map(|s| s.to_string())
}

/// Sanitize a user prompt for storage and analysis.
///
/// Redaction runs before truncation so a secret straddling the cut
/// point cannot leak a partial key. Home-rooted paths collapse to the
/// trailing filename component.
pub fn sanitize_prompt(prompt: &str) -> String {
    sanitize_prompt_with_limit(prompt, MAX_PROMPT_LENGTH)
}

pub fn sanitize_prompt_with_limit(prompt: &str, max_length: usize) -> String {
    if prompt.is_empty() {
        return String::new();
    }

    let mut text = prompt.to_string();
    for pattern in SECRET_PATTERNS.iter() {
        text = pattern.replace_all(&text, REDACTED).into_owned();
    }
    for pattern in HOME_PATH_PATTERNS.iter() {
        text = pattern.replace_all(&text, "$1").into_owned();
    }

    if text.chars().count() > max_length {
        text = text.chars().take(max_length).collect::<String>() + "...";
    }

    text
}
