use serde::Deserialize;
use serde_json::Value;

/// One line of a Claude Code transcript.
///
/// Every field is optional: metadata (sessionId, cwd, gitBranch) may be
/// absent from any given record and is discovered by look-ahead, and
/// record types we don't model still count as valid records.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClaudeRecord {
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub message: Option<ClaudeMessage>,
    /// Free-form tool execution result; `stderr` inside it feeds the
    /// session error list. Sometimes a bare string, so kept as Value.
    #[serde(default)]
    pub tool_use_result: Option<Value>,
}

impl ClaudeRecord {
    pub fn is_user(&self) -> bool {
        self.record_type.as_deref() == Some("user")
    }

    pub fn is_assistant(&self) -> bool {
        self.record_type.as_deref() == Some("assistant")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaudeMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Message content is either a plain string (older records) or a list
/// of typed blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Blocks(Vec<ContentItem>),
    Other(Value),
}

/// One entry of a block-style content list. User messages may contain
/// bare strings alongside typed blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentItem {
    Text(String),
    Block(ContentBlock),
    Other(Value),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        content: Option<Value>,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}
