/// CLI layer: argument parsing, settings flags and output formatting.
pub mod args;
pub mod output;

pub use args::{Cli, Command, SettingsArgs};
pub use output::{OutputCtx, write_error};
