//! The flattened command model handed to code generation.
//!
//! A [`DataModel`] owns [`Command`]s sorted by name. Each command stores its
//! subcommands in an arena (`nodes`) in depth-first, alphabetical order;
//! nodes refer to their parent and children by [`NodeId`], which is also the
//! node's index in the arena.

use serde::{Deserialize, Serialize};

use crate::types::{DocSpan, FunctionRef, ParsedParam, ReturnSignature, TypeTag};

/// Index of a [`SubCommand`] within its owning [`Command::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// One parameter of a bound function's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParam {
    pub name: String,
    pub type_tag: TypeTag,
    #[serde(default)]
    pub variadic: bool,
}

/// The function implementing a command or subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionBinding {
    pub name: String,
    /// Import path of the defining package.
    pub package: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_span: Option<DocSpan>,
    pub parameters: Vec<SignatureParam>,
    pub returns: ReturnSignature,
}

/// A finished flag or argument of a command node.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{FunctionParameter, ParsedParam, Primitive, TypeTag};
///
/// let parsed = ParsedParam {
///     flags: vec!["name".into(), "n".into()],
///     description: Some("User name".into()),
///     ..Default::default()
/// };
/// let param = FunctionParameter::from_parsed("name", TypeTag::Scalar(Primitive::String), parsed);
/// assert_eq!(param.flag_display(), "--name, -n");
/// assert!(!param.positional);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameter {
    pub name: String,
    pub type_tag: TypeTag,
    /// Flag names without dashes, longest first. Empty for pure positional
    /// parameters and for single-word identifiers that keep their bare name.
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub from_parent: bool,
    #[serde(default)]
    pub positional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default)]
    pub vararg: bool,
    #[serde(default)]
    pub var_min: u32,
    #[serde(default)]
    pub var_max: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<FunctionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<FunctionRef>,
    /// Label of the node that declares this parameter (set during
    /// flattening; differs from the owner for `from: parent` parameters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_by: Option<String>,
}

impl FunctionParameter {
    /// Builds a parameter from merged comment metadata.
    ///
    /// `aka:` aliases are folded into the flag list here, so the result is
    /// deduplicated and ordered longest-first.
    pub fn from_parsed(name: &str, type_tag: TypeTag, parsed: ParsedParam) -> Self {
        let mut flags = parsed.flags;
        flags.extend(parsed.aliases);
        let vararg = parsed.vararg;
        Self {
            name: name.to_string(),
            type_tag,
            flags: crate::naming::normalize_flag_names(flags),
            default: parsed.default,
            env_var: parsed.env_var,
            description: parsed.description,
            required: parsed.required,
            inherited: parsed.inherited,
            from_parent: parsed.from_parent,
            positional: parsed.positional || vararg,
            position: parsed.position,
            vararg,
            var_min: parsed.var_min,
            var_max: parsed.var_max,
            parser: parsed.parser,
            generator: parsed.generator,
            declared_by: None,
        }
    }

    /// Names this parameter answers to on the command line.
    ///
    /// Falls back to the identifier when no flag names were declared.
    pub fn flag_names(&self) -> Vec<&str> {
        if self.flags.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.flags.iter().map(String::as_str).collect()
        }
    }

    /// Renders flag names with dashes: one for single-character names, two
    /// otherwise.
    pub fn flag_display(&self) -> String {
        self.flag_names()
            .into_iter()
            .map(|flag| {
                if flag.chars().count() == 1 {
                    format!("-{flag}")
                } else {
                    format!("--{flag}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `true` when this parameter is a named flag rather than an argument.
    pub fn is_flag(&self) -> bool {
        !self.positional
    }
}

/// Inheritable parameters of one ancestor, as seen from a descendant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritedGroup {
    /// Space-joined command path of the declaring ancestor.
    pub declared_by: String,
    pub parameters: Vec<FunctionParameter>,
}

/// One node of a command's subtree.
///
/// A node without a [`FunctionBinding`] is synthetic: it exists only
/// because a deeper path was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCommand {
    pub id: NodeId,
    /// Path segment naming this node.
    pub name: String,
    /// Segments from the root command (exclusive) down to this node.
    pub path: Vec<String>,
    /// Main name of the owning command.
    pub command: String,
    /// Generated identifier for this node.
    pub struct_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_help: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<FunctionParameter>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// `None` for nodes directly under the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    /// Inheritable parameters from ancestors, nearest ancestor first.
    #[serde(default)]
    pub inherited: Vec<InheritedGroup>,
}

impl SubCommand {
    pub fn is_synthetic(&self) -> bool {
        self.function.is_none()
    }

    /// Space-joined full path including the command name
    /// (e.g. `app remote add`).
    pub fn label(&self) -> String {
        path_label(&self.command, &self.path)
    }

    pub fn find_parameter(&self, name: &str) -> Option<&FunctionParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Matches a command-line token against this node's name and aliases.
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }
}

/// One root CLI program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Main program name, unique within a [`DataModel`].
    pub name: String,
    /// Import path of the package the command is generated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub struct_name: String,
    /// The root function, when the program itself is runnable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_help: Option<String>,
    #[serde(default)]
    pub parameters: Vec<FunctionParameter>,
    /// Top-level subcommands, alphabetical.
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Every subcommand, depth-first in alphabetical order.
    #[serde(default)]
    pub nodes: Vec<SubCommand>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SubCommand> {
        self.nodes.get(id.0)
    }

    /// Direct children of the command, in order.
    pub fn children(&self) -> impl Iterator<Item = &SubCommand> {
        self.children.iter().filter_map(|id| self.node(*id))
    }

    /// Direct children of a node, in order.
    pub fn children_of(&self, node: &SubCommand) -> impl Iterator<Item = &SubCommand> {
        node.children.iter().filter_map(|id| self.node(*id))
    }

    pub fn parent_of(&self, node: &SubCommand) -> Option<&SubCommand> {
        node.parent.and_then(|id| self.node(id))
    }

    /// Ancestors of a node, nearest first. The command itself is not
    /// included.
    pub fn ancestors(&self, node: &SubCommand) -> Vec<&SubCommand> {
        let mut out = Vec::new();
        let mut current = self.parent_of(node);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent_of(parent);
        }
        out
    }

    /// Resolves a path of names or aliases to a node.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdspec_core::Command;
    ///
    /// let command = Command::new("app");
    /// assert!(command.find(&["missing"]).is_none());
    /// ```
    pub fn find(&self, path: &[&str]) -> Option<&SubCommand> {
        let (first, rest) = path.split_first()?;
        let mut current = self.children().find(|c| c.answers_to(first))?;
        for segment in rest {
            current = self.children_of(current).find(|c| c.answers_to(segment))?;
        }
        Some(current)
    }

    pub fn find_parameter(&self, name: &str) -> Option<&FunctionParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Top-level container for all commands discovered in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Commands sorted by name.
    pub commands: Vec<Command>,
}

impl DataModel {
    pub fn new() -> Self {
        Self {
            schema_version: Some(crate::MODEL_CONTRACT_VERSION.to_string()),
            commands: Vec::new(),
        }
    }

    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    /// Total number of subcommand nodes across all commands.
    pub fn node_count(&self) -> usize {
        self.commands.iter().map(|c| c.nodes.len()).sum()
    }
}

/// Joins a command name and subcommand path into a display label.
pub fn path_label(command: &str, path: &[String]) -> String {
    let mut label = command.to_string();
    for segment in path {
        label.push(' ');
        label.push_str(segment);
    }
    label
}
