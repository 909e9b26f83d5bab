use crate::args::SourceRoots;
use wrapped_providers::{all_sources, partition_outcomes};
use wrapped_types::{Session, TimeWindow};

/// Per-source tally, for verbose reporting.
#[derive(Debug)]
pub struct SourceReport {
    pub agent: wrapped_types::AgentKind,
    pub sessions: usize,
    pub skipped: usize,
}

/// Collect normalized sessions from every agent source.
///
/// Sources are independent: a source whose location is missing
/// contributes nothing, and a source-level failure (an unreadable
/// database, say) degrades to zero sessions from that source rather
/// than failing the run.
pub fn collect_all_sessions(
    roots: &SourceRoots,
    window: &TimeWindow,
) -> (Vec<Session>, Vec<SourceReport>) {
    let mut sessions = Vec::new();
    let mut reports = Vec::new();

    for source in all_sources() {
        let agent = source.agent();
        let root = roots
            .override_for(agent)
            .cloned()
            .or_else(|| source.default_root());

        let Some(root) = root else {
            reports.push(SourceReport {
                agent,
                sessions: 0,
                skipped: 0,
            });
            continue;
        };

        let outcomes = source.collect(&root, window).unwrap_or_default();
        let (mut found, skips) = partition_outcomes(outcomes);

        reports.push(SourceReport {
            agent,
            sessions: found.len(),
            skipped: skips.len(),
        });
        sessions.append(&mut found);
    }

    (sessions, reports)
}
