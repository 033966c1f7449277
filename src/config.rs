use anyhow::{Context, Result};
use std::path::PathBuf;

/// Run settings. The tool takes no flags, so the only knob is the directory it walks.
#[derive(Debug, Clone)]
pub struct FixerConfig {
    pub root: PathBuf,
}

impl FixerConfig {
    /// Resolve the root from the process working directory at invocation time.
    pub fn from_working_dir() -> Result<Self> {
        let root =
            std::env::current_dir().context("failed to resolve the current working directory")?;
        Ok(Self { root })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}
