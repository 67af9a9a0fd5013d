//! Style warnings raised while reading doc comments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a non-fatal finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A subcommand declaration has no short description.
    MissingShortDescription,
    /// Some parameters of a function are described and others are not.
    MissingParameterDescription,
    /// A `Flags:` block entry is indented with spaces instead of a tab.
    SpaceIndentedFlags,
    /// The line after `Flags:` is not blank.
    MissingBlankAfterFlags,
    /// A documented parameter does not exist in the function signature.
    UnknownParameter,
    /// The declaration marker is present but names no command.
    MissingCommandName,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingShortDescription => write!(f, "missing_short_description"),
            Self::MissingParameterDescription => write!(f, "missing_parameter_description"),
            Self::SpaceIndentedFlags => write!(f, "space_indented_flags"),
            Self::MissingBlankAfterFlags => write!(f, "missing_blank_after_flags"),
            Self::UnknownParameter => write!(f, "unknown_parameter"),
            Self::MissingCommandName => write!(f, "missing_command_name"),
        }
    }
}

/// One non-fatal finding, tied to the function or command path it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Function name or command path.
    pub location: String,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, location: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.location, self.message, self.kind)
    }
}

/// Sorts warnings into a stable, input-order independent sequence.
pub fn sort_warnings(warnings: &mut [Warning]) {
    warnings.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.message.cmp(&b.message))
    });
}
