use std::fmt;
use wrapped_types::Session;

/// Why a source file or record group produced no session.
///
/// These are expected, silent conditions, not errors. Making them
/// explicit keeps skip rates observable instead of only inferable from
/// absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// File or group contained no parseable records
    NoRecords,
    /// No record carried a usable start timestamp
    NoStartTimestamp,
    /// File could not be read
    Unreadable,
    /// Record or blob was not valid JSON
    MalformedJson,
    /// Session starts outside the requested time window
    OutsideWindow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NoRecords => "no parseable records",
            SkipReason::NoStartTimestamp => "no start timestamp",
            SkipReason::Unreadable => "unreadable file",
            SkipReason::MalformedJson => "malformed JSON",
            SkipReason::OutsideWindow => "outside time window",
        };
        f.write_str(s)
    }
}

/// Per-file (or per-group) parse result.
#[derive(Debug)]
pub enum ParseOutcome {
    Session(Box<Session>),
    Skipped {
        /// File path, database key, or session id the skip refers to.
        source: String,
        reason: SkipReason,
    },
}

impl ParseOutcome {
    pub fn skipped(source: impl Into<String>, reason: SkipReason) -> Self {
        ParseOutcome::Skipped {
            source: source.into(),
            reason,
        }
    }
}

/// Split a batch of outcomes into sessions and skip records.
pub fn partition_outcomes(outcomes: Vec<ParseOutcome>) -> (Vec<Session>, Vec<(String, SkipReason)>) {
    let mut sessions = Vec::new();
    let mut skips = Vec::new();
    for outcome in outcomes {
        match outcome {
            ParseOutcome::Session(session) => sessions.push(*session),
            ParseOutcome::Skipped { source, reason } => skips.push((source, reason)),
        }
    }
    (sessions, skips)
}
