pub mod commands;
pub mod output;

pub use commands::{CliArgs, Commands, LaunchArgs, RakeArgs, StatusArgs};
pub use output::{OutputFormat, OutputFormatter};
