use crate::args::{Cli, Commands, SourceRoots};
use crate::collect::collect_all_sessions;
use crate::summary::print_summary;
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use std::path::PathBuf;
use wrapped_engine::{Snapshot, aggregate};
use wrapped_types::TimeWindow;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run {
            year,
            output,
            verbose,
            roots,
        }) => run_wrapped(year, output, verbose, roots),
        // Bare `wrapped` runs the current year with defaults
        None => run_wrapped(None, None, false, SourceRoots::default()),
    }
}

fn run_wrapped(
    year: Option<i32>,
    output: Option<PathBuf>,
    verbose: bool,
    roots: SourceRoots,
) -> Result<()> {
    let year = year.unwrap_or_else(|| Utc::now().year());
    let window = TimeWindow::year(year);

    let (sessions, reports) = collect_all_sessions(&roots, &window);

    if verbose {
        for report in &reports {
            eprintln!(
                "{}: {} sessions, {} skipped",
                report.agent, report.sessions, report.skipped
            );
        }
    }

    let stats = aggregate(sessions, year);
    print_summary(&stats);

    if let Some(path) = output {
        let snapshot = Snapshot::from_stats(&stats);
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        println!("Snapshot written to {}", path.display());
    }

    Ok(())
}
