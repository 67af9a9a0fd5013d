//! Declaration files and bundle workflows.
//!
//! A declaration file holds the output of a source walker: one
//! [`SourceUnit`] or a list of them, as JSON (`.json`) or YAML
//! (`.yaml`/`.yml`).

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use cmdspec_core::{DataModel, ModelBundle, SourceUnit};

use crate::config::DEFAULT_CONFIG_FILE;
use crate::report::BuildReport;

/// Typed error for declaration file operations.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid or missing input (e.g. non-existent path, wrong extension).
    #[error("{0}")]
    InvalidInput(String),
}

const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

#[derive(Deserialize)]
#[serde(untagged)]
enum UnitFile {
    Many(Vec<SourceUnit>),
    One(SourceUnit),
}

fn has_declaration_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

/// Collects declaration file paths from input files and/or directories.
///
/// Directories are read one level deep; the configuration file is skipped.
pub fn collect_declaration_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoverError> {
    if inputs.is_empty() {
        return Err(DiscoverError::InvalidInput(
            "No declaration paths were provided".to_string(),
        ));
    }

    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                let is_config = path.file_name() == Some(OsStr::new(DEFAULT_CONFIG_FILE));
                if path.is_file() && has_declaration_extension(&path) && !is_config {
                    paths.insert(path);
                }
            }
            continue;
        }

        if input.is_file() {
            if !has_declaration_extension(input) {
                return Err(DiscoverError::InvalidInput(format!(
                    "Declaration file '{}' must end in .json, .yaml or .yml",
                    input.display()
                )));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(DiscoverError::InvalidInput(format!(
            "Declaration path '{}' does not exist",
            input.display(),
        )));
    }

    if paths.is_empty() {
        return Err(DiscoverError::InvalidInput(
            "No declaration files found in provided paths".to_string(),
        ));
    }

    Ok(paths.into_iter().collect())
}

/// Reads one declaration file.
pub fn load_unit_file(path: &Path) -> Result<Vec<SourceUnit>, DiscoverError> {
    let raw = fs::read_to_string(path)?;
    let file: UnitFile = if path.extension() == Some(OsStr::new("json")) {
        serde_json::from_str(&raw)?
    } else {
        serde_yaml::from_str(&raw)?
    };
    let units = match file {
        UnitFile::Many(units) => units,
        UnitFile::One(unit) => vec![unit],
    };
    debug!(path = %path.display(), units = units.len(), "Loaded declaration file");
    Ok(units)
}

/// Reads every file in order and concatenates the units.
pub fn load_units(paths: &[PathBuf]) -> Result<Vec<SourceUnit>, DiscoverError> {
    let mut units = Vec::new();
    for path in paths {
        units.extend(load_unit_file(path)?);
    }
    Ok(units)
}

/// Wraps a model for distribution, stamped with the current time.
pub fn build_bundle(version: &str, model: DataModel, report: &BuildReport) -> ModelBundle {
    ModelBundle::new(version, Utc::now().to_rfc3339(), model).with_warnings(report.warning_lines())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempDir {
        path: PathBuf,
    }

    impl TempDir {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!("cmdspec_discover_{name}_{}", std::process::id()));
            let _ = fs::remove_dir_all(&path);
            fs::create_dir_all(&path).unwrap();
            Self { path }
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    const UNIT_YAML: &str = r#"
package: example.com/app
file: main.go
functions:
  - name: Run
    doc: "Run is a subcommand `app run` that runs"
"#;

    #[test]
    fn test_collect_filters_extensions_and_config() {
        let dir = TempDir::new("collect");
        fs::write(dir.path.join("b.yaml"), UNIT_YAML).unwrap();
        fs::write(dir.path.join("a.json"), "[]").unwrap();
        fs::write(dir.path.join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path.join(DEFAULT_CONFIG_FILE), "strict: true").unwrap();

        let paths = collect_declaration_paths(&[dir.path.clone()]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.yaml"]);
    }

    #[test]
    fn test_collect_rejects_missing_and_wrong_extension() {
        let dir = TempDir::new("reject");
        let txt = dir.path.join("decl.txt");
        fs::write(&txt, "x").unwrap();
        assert!(matches!(
            collect_declaration_paths(&[txt]),
            Err(DiscoverError::InvalidInput(_))
        ));
        assert!(collect_declaration_paths(&[dir.path.join("missing.json")]).is_err());
        assert!(collect_declaration_paths(&[]).is_err());
    }

    #[test]
    fn test_load_single_unit_and_list() {
        let dir = TempDir::new("load");
        let single = dir.path.join("single.yml");
        fs::write(&single, UNIT_YAML).unwrap();
        let list = dir.path.join("list.json");
        fs::write(
            &list,
            r#"[{"package":"example.com/app","file":"a.go","functions":[]},{"package":"example.com/app","file":"b.go"}]"#,
        )
        .unwrap();

        let units = load_units(&[single, list]).unwrap();
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].functions[0].name, "Run");
        assert_eq!(units[2].file, "b.go");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let dir = TempDir::new("invalid");
        let path = dir.path.join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_unit_file(&path), Err(DiscoverError::Json(_))));
    }

    #[test]
    fn test_bundle_carries_warnings() {
        let report = BuildReport::new(&DataModel::new(), 0, Vec::new());
        let bundle = build_bundle("0.1.0", DataModel::new(), &report);
        assert_eq!(bundle.version, "0.1.0");
        assert!(bundle.warnings.is_empty());
        assert!(!bundle.generated_at.is_empty());
    }
}
