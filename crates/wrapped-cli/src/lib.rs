mod args;
mod collect;
mod commands;
mod summary;

pub use args::{Cli, Commands, SourceRoots};
pub use commands::run;
