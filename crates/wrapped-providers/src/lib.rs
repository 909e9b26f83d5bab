// Error types
pub mod error;

// Per-record parse outcomes
pub mod outcome;

// Source contract shared by the four providers
pub mod traits;

// Provider implementations
pub mod claude;
pub mod codex;
pub mod cursor;
pub mod gemini;

pub use error::{Error, Result};
pub use outcome::{ParseOutcome, SkipReason, partition_outcomes};
pub use traits::{SessionSource, all_sources};
