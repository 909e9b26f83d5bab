pub mod snapshot;
pub mod stats;
pub mod streaks;

pub use snapshot::Snapshot;
pub use stats::{AgentStats, WrappedStats, aggregate};
pub use streaks::{Streaks, compute_streaks};
