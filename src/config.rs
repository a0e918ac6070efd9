use eyre::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Matches `git describe --tags --dirty --long` output of the shape
/// `<tag>-<ahead>-g<hex>[-dirty]`.
pub const DEFAULT_DESCRIBE_PATTERN: &str =
    r"^(?P<tag>.+)-(?P<ahead>\d+)-g(?P<ref>[0-9a-f]+)(?P<dirty>-dirty)?$";

const REQUIRED_GROUPS: [&str; 4] = ["tag", "ahead", "ref", "dirty"];

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub git: String,
    pub describe_pattern: DescribePattern,
}

/// A describe pattern supplied either as source text (the config-file case)
/// or pre-compiled by an API caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum DescribePattern {
    Source(String),
    Compiled(Regex),
}

impl From<String> for DescribePattern {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

impl From<DescribePattern> for String {
    fn from(pattern: DescribePattern) -> Self {
        pattern.source().to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            describe_pattern: DescribePattern::Source(DEFAULT_DESCRIBE_PATTERN.to_string()),
        }
    }
}

impl DescribePattern {
    pub fn source(&self) -> &str {
        match self {
            Self::Source(source) => source,
            Self::Compiled(regex) => regex.as_str(),
        }
    }

    /// Compile the pattern if needed and check that the four named capture
    /// groups `tag`, `ahead`, `ref`, and `dirty` are all present.
    pub fn compile(&self) -> Result<Regex> {
        let regex = match self {
            Self::Compiled(regex) => regex.clone(),
            Self::Source(source) => {
                Regex::new(source).context(format!("Invalid describe pattern: {}", source))?
            }
        };

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        for group in REQUIRED_GROUPS {
            if !names.contains(&group) {
                return Err(eyre::eyre!(
                    "Describe pattern {:?} is missing the named group '{}'",
                    regex.as_str(),
                    group
                ));
            }
        }

        Ok(regex)
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/gitver/gitver.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join("gitver").join("gitver.yml");
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./gitver.yml
        let fallback_config = PathBuf::from("gitver.yml");
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
