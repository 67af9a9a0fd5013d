//! Build configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! reserved_names:
//!   - Config
//!   - Logger
//! strict: false
//! jobs: 4
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discover::DiscoverError;

/// Default file name looked up next to the declaration files.
pub const DEFAULT_CONFIG_FILE: &str = ".cmdspec.yml";

/// Settings for one model build.
///
/// # Examples
///
/// ```
/// use cmdspec_parser::config::BuildConfig;
///
/// let config: BuildConfig = serde_yaml::from_str("strict: true").unwrap();
/// assert!(config.strict);
/// assert!(config.reserved_names.is_empty());
/// assert_eq!(config.jobs, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Extra identifiers no generated struct name may take, on top of the
    /// built-in reserved set.
    #[serde(default)]
    pub reserved_names: Vec<String>,
    /// Treat every warning as a build failure.
    #[serde(default)]
    pub strict: bool,
    /// Worker threads for per-unit parsing; `None` uses the rayon default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl BuildConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoverError::Io`] if the file cannot be read, or
    /// [`DiscoverError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiscoverError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DiscoverError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
