use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

pub const DEFAULT_INPUT_PATTERN: &str = "files/input/*.csv.zip";
pub const DEFAULT_OUTPUT_DIR: &str = "files/output";

/// Where to read batches from and where to put the three tables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Glob pattern matching the zipped CSV batches.
    pub input_pattern: String,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_pattern: DEFAULT_INPUT_PATTERN.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("parsing YAML config")
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("in {:?}", path))
    }

    /// Command-line values win over whatever the file or defaults said.
    pub fn with_overrides(mut self, input: Option<String>, output: Option<PathBuf>) -> Self {
        if let Some(input) = input {
            self.input_pattern = input;
        }
        if let Some(output) = output {
            self.output_dir = output;
        }
        self
    }
}
