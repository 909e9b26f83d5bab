use serde::Deserialize;

/// One message of a Gemini `logs.json` batch. Files hold a JSON array
/// of these, interleaved across sessions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiMessage {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl GeminiMessage {
    pub fn is_user(&self) -> bool {
        self.message_type.as_deref() == Some("user")
    }

    pub fn is_model(&self) -> bool {
        self.message_type.as_deref() == Some("model")
    }
}
