use serde::Deserialize;
use serde_json::Value;

/// One record of the current line-delimited Codex layout. The first
/// record of a file is usually `session_meta`; the rest are
/// `response_item` entries with a role inside the payload.
#[derive(Debug, Deserialize)]
pub(crate) struct CodexRecord {
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub payload: Option<CodexPayload>,
}

impl CodexRecord {
    pub fn is_session_meta(&self) -> bool {
        self.record_type.as_deref() == Some("session_meta")
    }

    pub fn is_response_item(&self) -> bool {
        self.record_type.as_deref() == Some("response_item")
    }

    pub fn payload_role(&self) -> Option<&str> {
        self.payload.as_ref().and_then(|p| p.role.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CodexPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "type")]
    pub payload_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Content shape varies by item type; interpreted on demand.
    #[serde(default)]
    pub content: Option<Value>,
}

/// Legacy single-object layout: `{"session": {...}, "items": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct LegacyCodexFile {
    pub session: LegacySession,
    #[serde(default)]
    pub items: Vec<LegacyItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LegacySession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LegacyItem {
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// Pull the text of every `input_text` part out of a content value.
pub(crate) fn input_text_parts(content: &Value) -> Vec<&str> {
    let Some(items) = content.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.get("type").and_then(|t| t.as_str()) == Some("input_text"))
        .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
        .filter(|text| !text.is_empty())
        .collect()
}
