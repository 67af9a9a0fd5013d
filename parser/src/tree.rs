//! Path-keyed command tree and the flattening pass.
//!
//! Declarations are inserted in any order. Missing intermediate segments
//! become synthetic nodes; a later declaration at such a path promotes the
//! node in place and keeps its children. [`CommandTree::flatten`] then walks
//! every level alphabetically, so the resulting [`DataModel`] does not depend
//! on insertion order.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use cmdspec_core::{
    Command, DataModel, FunctionBinding, FunctionParameter, InheritedGroup, NameAllocator, NodeId,
    SubCommand, path_label,
};

use crate::error::BuildError;
use crate::extractor::Declaration;

#[derive(Debug, Default)]
struct TreeNode {
    payload: Option<Declaration>,
    children: BTreeMap<String, TreeNode>,
}

#[derive(Debug, Default)]
struct CommandEntry {
    root: Option<Declaration>,
    packages: BTreeSet<String>,
    children: BTreeMap<String, TreeNode>,
}

/// Commands and their subcommand trees before flattening.
#[derive(Debug, Default)]
pub struct CommandTree {
    commands: BTreeMap<String, CommandEntry>,
    declarations: usize,
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declarations inserted so far.
    pub fn len(&self) -> usize {
        self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations == 0
    }

    /// Inserts a declaration at its path.
    ///
    /// Fails with [`BuildError::DuplicateDefinition`] when a function-backed
    /// declaration already occupies the same path.
    pub fn insert(&mut self, declaration: Declaration) -> Result<(), BuildError> {
        let entry = self.commands.entry(declaration.command.clone()).or_default();
        entry.packages.insert(declaration.binding.package.clone());

        let Some((first, rest)) = declaration.path.split_first() else {
            if let Some(existing) = &entry.root {
                return Err(duplicate(existing, &declaration));
            }
            debug!(command = %declaration.command, function = %declaration.binding.name, "Inserted root declaration");
            entry.root = Some(declaration);
            self.declarations += 1;
            return Ok(());
        };

        let mut node = entry.children.entry(first.clone()).or_default();
        for segment in rest {
            node = node.children.entry(segment.clone()).or_default();
        }

        if let Some(existing) = &node.payload {
            return Err(duplicate(existing, &declaration));
        }
        if !node.children.is_empty() {
            debug!(path = %declaration.label(), "Promoting synthetic node");
        }
        node.payload = Some(declaration);
        self.declarations += 1;
        Ok(())
    }

    /// Flattens the tree into an ordered [`DataModel`].
    ///
    /// Every node is visited depth-first in alphabetical order; each command
    /// gets its own [`NameAllocator`] seeded with `reserved`. `from: parent`
    /// parameters are resolved and inherited groups are computed afterwards.
    pub fn flatten(self, reserved: &[String]) -> Result<DataModel, BuildError> {
        let mut model = DataModel::new();
        for (name, entry) in self.commands {
            model.commands.push(flatten_command(name, entry, reserved)?);
        }
        Ok(model)
    }
}

fn duplicate(existing: &Declaration, incoming: &Declaration) -> BuildError {
    BuildError::DuplicateDefinition {
        path: incoming.label(),
        existing: qualified_name(&existing.binding),
        incoming: qualified_name(&incoming.binding),
    }
}

fn qualified_name(binding: &FunctionBinding) -> String {
    format!("{}.{} ({})", binding.package, binding.name, binding.file)
}

struct Flattener<'a> {
    command: &'a str,
    names: NameAllocator,
    nodes: Vec<SubCommand>,
}

fn flatten_command(name: String, entry: CommandEntry, reserved: &[String]) -> Result<Command, BuildError> {
    let mut names = NameAllocator::with_reserved(reserved);
    let mut command = Command::new(&name);

    let seed = entry
        .root
        .as_ref()
        .map_or(name.as_str(), |root| root.binding.name.as_str())
        .to_string();
    command.struct_name = names.allocate(&seed);

    command.package = match &entry.root {
        Some(root) => Some(root.binding.package.clone()),
        None => entry.packages.iter().next().cloned(),
    };

    if let Some(root) = entry.root {
        command.function = Some(root.binding);
        command.description = root.description;
        command.extended_help = root.extended_help;
        command.parameters = declared_by(root.parameters, &name);
    }

    let mut flattener = Flattener {
        command: &name,
        names,
        nodes: Vec::new(),
    };
    command.children = entry
        .children
        .into_iter()
        .map(|(segment, node)| flattener.visit(segment, Vec::new(), node, None))
        .collect();
    command.nodes = flattener.nodes;

    resolve_parent_parameters(&mut command)?;
    compute_inherited(&mut command);

    debug!(
        command = %command.name,
        struct_name = %command.struct_name,
        nodes = command.nodes.len(),
        "Flattened command"
    );
    Ok(command)
}

impl Flattener<'_> {
    fn visit(&mut self, segment: String, mut path: Vec<String>, node: TreeNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        path.push(segment.clone());
        let label = path_label(self.command, &path);

        let seed = node
            .payload
            .as_ref()
            .map_or(segment.as_str(), |decl| decl.binding.name.as_str())
            .to_string();
        let struct_name = self.names.allocate(&seed);

        let mut sub = SubCommand {
            id,
            name: segment,
            path: path.clone(),
            command: self.command.to_string(),
            struct_name,
            function: None,
            description: None,
            extended_help: None,
            aliases: Vec::new(),
            parameters: Vec::new(),
            children: Vec::new(),
            parent,
            inherited: Vec::new(),
        };
        if let Some(decl) = node.payload {
            sub.function = Some(decl.binding);
            sub.description = decl.description;
            sub.extended_help = decl.extended_help;
            sub.aliases = decl.aliases;
            sub.parameters = declared_by(decl.parameters, &label);
        }
        self.nodes.push(sub);

        let children: Vec<NodeId> = node
            .children
            .into_iter()
            .map(|(child, grandchildren)| self.visit(child, path.clone(), grandchildren, Some(id)))
            .collect();
        self.nodes[id.0].children = children;
        id
    }
}

fn declared_by(mut parameters: Vec<FunctionParameter>, label: &str) -> Vec<FunctionParameter> {
    for param in &mut parameters {
        param.declared_by = Some(label.to_string());
    }
    parameters
}

/// Replaces every `from: parent` parameter with a copy of the nearest
/// ancestor's parameter of the same name.
fn resolve_parent_parameters(command: &mut Command) -> Result<(), BuildError> {
    if let Some(param) = command.parameters.iter().find(|p| p.from_parent) {
        return Err(BuildError::UnresolvedParentParameter {
            path: command.name.clone(),
            parameter: param.name.clone(),
        });
    }

    // Arena order is pre-order, so ancestors are resolved before descendants.
    for index in 0..command.nodes.len() {
        let node = &command.nodes[index];
        if !node.parameters.iter().any(|p| p.from_parent) {
            continue;
        }

        let ancestors = command.ancestors(node);
        let mut resolved = Vec::with_capacity(node.parameters.len());
        for param in &node.parameters {
            if !param.from_parent {
                resolved.push(param.clone());
                continue;
            }
            let source = ancestors
                .iter()
                .find_map(|a| a.find_parameter(&param.name))
                .or_else(|| command.find_parameter(&param.name))
                .ok_or_else(|| BuildError::UnresolvedParentParameter {
                    path: node.label(),
                    parameter: param.name.clone(),
                })?;
            resolved.push(FunctionParameter {
                name: param.name.clone(),
                type_tag: param.type_tag,
                from_parent: true,
                inherited: false,
                ..source.clone()
            });
        }
        command.nodes[index].parameters = resolved;
    }
    Ok(())
}

/// Fills every node's inherited groups, nearest ancestor first.
///
/// A name declared closer to the node shadows the same name further up.
fn compute_inherited(command: &mut Command) {
    let mut all_groups = Vec::with_capacity(command.nodes.len());
    for node in &command.nodes {
        let mut shadowed: HashSet<&str> = node.parameters.iter().map(|p| p.name.as_str()).collect();
        let mut groups = Vec::new();

        let scopes = command
            .ancestors(node)
            .into_iter()
            .map(|a| (a.label(), a.parameters.as_slice()))
            .chain(std::iter::once((command.name.clone(), command.parameters.as_slice())));

        for (label, parameters) in scopes {
            let visible: Vec<FunctionParameter> = parameters
                .iter()
                .filter(|p| p.inherited && !shadowed.contains(p.name.as_str()))
                .cloned()
                .collect();
            shadowed.extend(parameters.iter().map(|p| p.name.as_str()));
            if !visible.is_empty() {
                groups.push(InheritedGroup {
                    declared_by: label,
                    parameters: visible,
                });
            }
        }
        all_groups.push(groups);
    }

    for (node, groups) in command.nodes.iter_mut().zip(all_groups) {
        node.inherited = groups;
    }
}
