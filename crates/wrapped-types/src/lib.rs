pub mod redact;
pub mod session;
pub mod time;

pub use redact::{extract_repo_from_path, sanitize_prompt};
pub use session::{AgentKind, Session};
pub use time::{TimeWindow, parse_iso_timestamp};
