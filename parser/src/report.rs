//! Structured summary of one model build.

use serde::{Deserialize, Serialize};

use cmdspec_core::{Command, DataModel};

use crate::parser::Warning;

/// Per-command counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSummary {
    pub name: String,
    pub struct_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Subcommand nodes, synthetic ones included.
    pub nodes: usize,
    pub synthetic_nodes: usize,
    /// Parameters declared on the command and all of its nodes.
    pub parameters: usize,
}

impl CommandSummary {
    pub fn from_command(command: &Command) -> Self {
        Self {
            name: command.name.clone(),
            struct_name: command.struct_name.clone(),
            package: command.package.clone(),
            nodes: command.nodes.len(),
            synthetic_nodes: command.nodes.iter().filter(|n| n.is_synthetic()).count(),
            parameters: command.parameters.len()
                + command.nodes.iter().map(|n| n.parameters.len()).sum::<usize>(),
        }
    }
}

/// Report for a full build run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Function declarations that made it into the tree.
    pub declarations: usize,
    pub commands: Vec<CommandSummary>,
    /// Sorted by location, kind and message.
    pub warnings: Vec<Warning>,
}

impl BuildReport {
    /// Summarizes `model`; `warnings` are expected to be sorted already.
    pub fn new(model: &DataModel, declarations: usize, warnings: Vec<Warning>) -> Self {
        Self {
            schema_version: model.schema_version.clone(),
            declarations,
            commands: model.commands.iter().map(CommandSummary::from_command).collect(),
            warnings,
        }
    }

    pub fn node_count(&self) -> usize {
        self.commands.iter().map(|c| c.nodes).sum()
    }

    pub fn parameter_count(&self) -> usize {
        self.commands.iter().map(|c| c.parameters).sum()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// One display line per warning.
    pub fn warning_lines(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}
