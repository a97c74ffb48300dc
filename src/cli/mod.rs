// CLI module
// Public interface for command-line interface

mod commands;
mod render;

pub use commands::{handle_command, Cli, Command, FileCommand, NodeCommand};
pub use render::{format_bytes, render_activity, render_files, render_snapshot};
