use serde::{Deserialize, Serialize};

use crate::DataModel;

/// Serializable envelope around a built [`DataModel`].
///
/// Carries the tool version, a creation timestamp and the warnings raised
/// while building, so a generator run can be reproduced and audited from
/// the bundle file alone.
///
/// # Examples
///
/// ```
/// use cmdspec_core::*;
///
/// let mut model = DataModel::new();
/// model.commands.push(Command::new("app"));
///
/// let bundle = ModelBundle::new("0.1.0", "2024-01-15T10:30:00Z", model);
/// assert_eq!(bundle.command_count(), 1);
/// assert_eq!(bundle.schema_version.as_deref(), Some(MODEL_CONTRACT_VERSION));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Model contract version (populated from
    /// [`MODEL_CONTRACT_VERSION`](crate::MODEL_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Version of the tool that produced the bundle.
    pub version: String,
    /// ISO-8601 timestamp for bundle creation.
    pub generated_at: String,
    /// Warnings raised while building, already rendered.
    #[serde(default)]
    pub warnings: Vec<String>,
    pub model: DataModel,
}

impl ModelBundle {
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>, model: DataModel) -> Self {
        Self {
            schema_version: Some(crate::MODEL_CONTRACT_VERSION.to_string()),
            version: version.into(),
            generated_at: generated_at.into(),
            warnings: Vec::new(),
            model,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Returns the number of commands in the bundled model.
    pub fn command_count(&self) -> usize {
        self.model.commands.len()
    }
}
