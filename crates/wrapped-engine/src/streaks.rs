use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Consecutive-active-day figures derived from daily session counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streaks {
    /// Longest run of calendar-consecutive active days.
    pub longest: u64,
    /// Run of consecutive active days ending at the most recent active day.
    pub current: u64,
    /// Number of days with at least one session, adjacency-independent.
    pub active_days: u64,
}

/// Compute streaks from a `YYYY-MM-DD -> count` distribution.
///
/// Days with a zero count are inactive: they neither extend a streak
/// nor count as active. A gap of more than one calendar day between
/// active dates breaks the running streak. Unparseable date keys are
/// ignored.
pub fn compute_streaks(daily_sessions: &BTreeMap<String, u64>) -> Streaks {
    let mut active_dates: Vec<NaiveDate> = daily_sessions
        .iter()
        .filter(|(_, count)| **count > 0)
        .filter_map(|(date, _)| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .collect();

    if active_dates.is_empty() {
        return Streaks::default();
    }

    active_dates.sort();
    active_dates.dedup();

    let mut longest = 1u64;
    let mut run = 1u64;
    for pair in active_dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }

    // Walk backward from the most recent active day while each step
    // back is exactly one calendar day.
    let mut current = 1u64;
    for pair in active_dates.windows(2).rev() {
        if (pair[1] - pair[0]).num_days() == 1 {
            current += 1;
        } else {
            break;
        }
    }

    Streaks {
        longest,
        current,
        active_days: active_dates.len() as u64,
    }
}
