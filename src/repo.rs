use eyre::{Context, Result};
use log::{debug, info};
use regex::Regex;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Command;

use crate::config::Config;

/// Captured result of one git invocation: trimmed stdout plus exit code.
#[derive(Debug)]
pub struct Exec {
    pub stdout: String,
    pub code: i32,
}

/// Version metadata for a checkout, built fresh on every query.
///
/// `message` and `timestamp` are filled in by [`Repo::status`] only when the
/// working tree is clean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub tag: String,
    pub ahead: u64,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub ref_short: String,
    pub dirty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl RepoStatus {
    /// True when the checkout has moved past the matched tag.
    pub fn is_ahead(&self) -> bool {
        self.ahead != 0
    }
}

/// Reads version metadata out of a git checkout by shelling out to the
/// configured executable.
///
/// Recoverable conditions (describe failing, output not matching the
/// pattern) come back as `Ok(None)` with a single warning line written to
/// the diagnostic sink; only configuration and spawn problems are hard
/// errors.
pub struct Repo {
    git: String,
    pattern: Regex,
    dir: Option<PathBuf>,
    diag: Box<dyn Write + Send>,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("git", &self.git)
            .field("pattern", &self.pattern)
            .field("dir", &self.dir)
            .field("diag", &"<dyn Write>")
            .finish()
    }
}

impl Repo {
    /// Build a reader that writes diagnostics to stderr.
    ///
    /// Compiles and validates the configured describe pattern; an invalid
    /// pattern fails here, before any process is spawned.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_diagnostics(config, Box::new(io::stderr()))
    }

    /// Build a reader with a caller-supplied diagnostic sink.
    pub fn with_diagnostics(config: &Config, diag: Box<dyn Write + Send>) -> Result<Self> {
        let pattern = config.describe_pattern.compile()?;
        Ok(Self {
            git: config.git.clone(),
            pattern,
            dir: None,
            diag,
        })
    }

    /// Run git as if started in `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn run(&self, args: &[&str]) -> Result<Exec> {
        debug!("Running: {} {}", self.git, args.join(" "));

        let mut cmd = Command::new(&self.git);
        cmd.args(args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .context(format!("Failed to run {}", self.git))?;

        Ok(Exec {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            code: output.status.code().unwrap_or(-1),
        })
    }

    fn query(&self, args: &[&str]) -> Result<String> {
        let exec = self.run(args)?;
        if exec.code != 0 {
            return Err(eyre::eyre!(
                "{} {} exited with code {}",
                self.git,
                args.join(" "),
                exec.code
            ));
        }
        Ok(exec.stdout)
    }

    /// Abbreviated name of the current branch.
    pub fn current_branch(&self) -> Result<String> {
        self.query(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Resolve a tag, branch, or ref name to its canonical commit id.
    pub fn resolve_ref(&self, name: &str) -> Result<String> {
        self.query(&["rev-parse", "--verify", name])
    }

    /// Log entry for a ref or commit.
    pub fn ref_message(&self, name: &str) -> Result<String> {
        self.query(&["log", "-1", name])
    }

    /// Commit timestamp for a ref or commit, as seconds since the epoch.
    pub fn ref_timestamp(&self, name: &str) -> Result<String> {
        self.query(&["log", "-1", "--pretty=%ct", name])
    }

    /// Match describe output against the configured pattern. The match must
    /// cover the whole input; a mismatch writes one warning to the sink and
    /// yields `None`.
    pub fn parse_describe(&mut self, input: &str) -> Result<Option<RepoStatus>> {
        let caps = self
            .pattern
            .captures(input)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0 && m.end() == input.len()));

        let Some(caps) = caps else {
            writeln!(
                self.diag,
                "Warning: describe output {:?} did not match pattern {:?}",
                input,
                self.pattern.as_str()
            )
            .context("Failed to write diagnostic")?;
            return Ok(None);
        };

        let ahead: u64 = caps["ahead"]
            .parse()
            .context(format!("Failed to parse ahead count from {:?}", input))?;
        let dirty = caps.name("dirty").is_some_and(|m| !m.as_str().is_empty());
        let ref_name = self.resolve_ref("HEAD")?;

        Ok(Some(RepoStatus {
            tag: caps["tag"].to_string(),
            ahead,
            ref_name,
            ref_short: caps["ref"].to_string(),
            dirty,
            message: None,
            timestamp: None,
        }))
    }

    /// Describe the working tree and parse the result.
    ///
    /// A nonzero exit (not a repository, no tags) is reported once on the
    /// sink and surfaces as `None`, never as an error.
    pub fn describe(&mut self) -> Result<Option<RepoStatus>> {
        let exec = self.run(&["describe", "--tags", "--dirty", "--long"])?;
        if exec.code != 0 {
            writeln!(
                self.diag,
                "Warning: {} describe exited with code {}: {:?}",
                self.git, exec.code, exec.stdout
            )
            .context("Failed to write diagnostic")?;
            return Ok(None);
        }

        info!("Describe output: {}", exec.stdout);
        self.parse_describe(&exec.stdout)
    }

    /// Describe, then augment a clean status with the last commit's log
    /// message and timestamp. A dirty status is returned as-is.
    pub fn status(&mut self) -> Result<Option<RepoStatus>> {
        let Some(mut status) = self.describe()? else {
            return Ok(None);
        };

        if !status.dirty {
            status.message = Some(self.ref_message("HEAD")?);
            status.timestamp = Some(self.ref_timestamp("HEAD")?);
        }

        Ok(Some(status))
    }
}
