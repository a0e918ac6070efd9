use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};

use std::fs;
use std::path::PathBuf;

use gitver::cli::{Cli, Commands};
use gitver::config::{Config, DescribePattern};
use gitver::repo::Repo;
use gitver::version;

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gitver")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("gitver.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(git) = &cli.git {
        config.git = git.clone();
    }
    if let Some(pattern) = &cli.pattern {
        config.describe_pattern = DescribePattern::Source(pattern.clone());
    }
}

fn notice_empty() {
    warn!("No describe status available");
    eprintln!(
        "{} No version metadata available (not a git checkout, or no tags)",
        "⚠".yellow()
    );
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let mut repo = Repo::new(config)?;
    if let Some(dir) = &cli.directory {
        repo = repo.in_dir(dir);
    }

    match &cli.command {
        Commands::Branch => println!("{}", repo.current_branch()?),
        Commands::Resolve { name } => println!("{}", repo.resolve_ref(name)?),
        Commands::Message { name } => println!("{}", repo.ref_message(name)?),
        Commands::Timestamp { name } => println!("{}", repo.ref_timestamp(name)?),
        Commands::Describe => match repo.describe()? {
            Some(status) => print!("{}", serde_yaml::to_string(&status)?),
            None => notice_empty(),
        },
        Commands::Status => match repo.status()? {
            Some(status) => print!("{}", serde_yaml::to_string(&status)?),
            None => notice_empty(),
        },
        Commands::Version => match repo.status()? {
            Some(status) => println!("{}", version::derive_version(&status, None)),
            None => notice_empty(),
        },
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);

    info!("Starting gitver");

    run(&cli, &config).context("Failed to query repository")?;

    Ok(())
}
