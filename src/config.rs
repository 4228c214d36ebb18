// src/config.rs
//! `reeltree.toml` settings. Every field has a default, so a missing file
//! or section is never an error; a malformed one is.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReelError, Result};
use crate::graph::GroupKey;
use crate::layout::{LayoutAlgorithm, LayoutOptions, DEFAULT_ITERATIONS};

pub const CONFIG_FILE: &str = "reeltree.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    #[serde(default = "default_end_year")]
    pub end_year: i32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            start_year: default_start_year(),
            end_year: default_end_year(),
        }
    }
}

fn default_dir() -> PathBuf { PathBuf::from(".") }
fn default_start_year() -> i32 { 2007 }
fn default_end_year() -> i32 { 2011 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// `genre` or `studio`; validated when used.
    #[serde(default = "default_group")]
    pub group: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            group: default_group(),
        }
    }
}

fn default_group() -> String { "genre".to_string() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            seed: None,
            iterations: default_iterations(),
            scale: default_scale(),
        }
    }
}

fn default_algorithm() -> String { LayoutAlgorithm::Spring.as_str().to_string() }
fn default_iterations() -> usize { DEFAULT_ITERATIONS }
fn default_scale() -> f64 { 1.0 }

impl Config {
    /// Loads `reeltree.toml` from the working directory.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads settings from `path`, falling back to defaults when it does
    /// not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| ReelError::io(e, path))?;
        Self::parse(&content)
    }

    /// # Errors
    /// Returns a TOML error for malformed input.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// # Errors
    /// Returns `InvalidGroupKey` for anything but `genre` or `studio`.
    pub fn group_key(&self) -> Result<GroupKey> {
        self.tree.group.parse()
    }

    /// # Errors
    /// Returns `UnsupportedLayout` for an unknown algorithm name.
    pub fn layout_options(&self) -> Result<LayoutOptions> {
        Ok(LayoutOptions {
            algorithm: self.layout.algorithm.parse()?,
            seed: self.layout.seed,
            iterations: self.layout.iterations,
            scale: self.layout.scale,
            ..LayoutOptions::default()
        })
    }
}
