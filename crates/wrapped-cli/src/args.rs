use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wrapped")]
#[command(about = "Your year of AI pair programming, wrapped", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse all agent transcripts and print the yearly summary
    Run {
        /// Year to analyze (defaults to the current UTC year)
        #[arg(long)]
        year: Option<i32>,

        /// Write the JSON snapshot to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print per-source session and skip counts
        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        roots: SourceRoots,
    },
}

/// Per-agent source location overrides; defaults are each agent's
/// conventional install location.
#[derive(Debug, Default, clap::Args)]
pub struct SourceRoots {
    /// Claude Code projects directory (default: ~/.claude/projects)
    #[arg(long, value_name = "DIR")]
    pub claude_dir: Option<PathBuf>,

    /// Codex sessions directory (default: ~/.codex/sessions)
    #[arg(long, value_name = "DIR")]
    pub codex_dir: Option<PathBuf>,

    /// Cursor global-storage database file
    #[arg(long, value_name = "FILE")]
    pub cursor_db: Option<PathBuf>,

    /// Gemini CLI tmp directory (default: ~/.gemini/tmp)
    #[arg(long, value_name = "DIR")]
    pub gemini_dir: Option<PathBuf>,
}

impl SourceRoots {
    pub fn override_for(&self, agent: wrapped_types::AgentKind) -> Option<&PathBuf> {
        use wrapped_types::AgentKind;
        match agent {
            AgentKind::Claude => self.claude_dir.as_ref(),
            AgentKind::Codex => self.codex_dir.as_ref(),
            AgentKind::Cursor => self.cursor_db.as_ref(),
            AgentKind::Gemini => self.gemini_dir.as_ref(),
        }
    }
}
