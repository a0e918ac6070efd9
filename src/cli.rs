use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gitver",
    about = "Query git for describe-based version metadata and derive version strings for build tooling",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/gitver/logs/gitver.log\n\nWarnings about unparseable or missing describe output go to stderr; an empty\nresult means the directory is not a git checkout (or has no tags) and is not\nan error."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Run as if gitver was started in this directory
    #[arg(short, long, help = "Run as if gitver was started in this directory")]
    pub directory: Option<PathBuf>,

    /// Git executable to invoke (overrides config)
    #[arg(long, help = "Git executable to invoke (overrides config)")]
    pub git: Option<String>,

    /// Describe pattern with named groups tag, ahead, ref, dirty (overrides config)
    #[arg(long, help = "Describe pattern with named groups tag, ahead, ref, dirty (overrides config)")]
    pub pattern: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the abbreviated name of the current branch
    Branch,

    /// Resolve a ref to its canonical commit id
    Resolve {
        #[arg(value_name = "REF")]
        name: String,
    },

    /// Print the log entry for a ref
    Message {
        #[arg(value_name = "REF", default_value = "HEAD")]
        name: String,
    },

    /// Print the commit timestamp (seconds since epoch) for a ref
    Timestamp {
        #[arg(value_name = "REF", default_value = "HEAD")]
        name: String,
    },

    /// Describe the working tree and print the parsed status as YAML
    Describe,

    /// Describe plus last-commit message and timestamp when the tree is clean
    Status,

    /// Print a version string derived from the current status
    Version,
}
