//! Model validation.
//!
//! Checks structural invariants of a flattened [`DataModel`] before it is
//! handed to code generation: unique command names, vararg parameters being
//! positional, unique positional indices, unique flag names within the scope
//! visible at each node, and sibling names/aliases that do not collide.
//!
//! # Examples
//!
//! ```
//! use cmdspec_core::*;
//!
//! let mut model = DataModel::new();
//! model.commands.push(Command::new("app"));
//! assert!(validate_model(&model).is_empty());
//!
//! model.commands.push(Command::new("app"));
//! let errors = validate_model(&model);
//! assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateCommand(_))));
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{Command, DataModel, FunctionParameter, SubCommand};

/// Model validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// Two commands share a main name.
    #[error("duplicate command in model: {0}")]
    DuplicateCommand(String),
    /// A vararg parameter is not positional.
    #[error("vararg parameter '{parameter}' of '{path}' must be positional")]
    VarargNotPositional { path: String, parameter: String },
    /// Two positional parameters of one node claim the same index.
    #[error("duplicate positional index {position} in '{path}'")]
    DuplicatePosition { path: String, position: u32 },
    /// Positional indices start at 1.
    #[error("positional parameter '{parameter}' of '{path}' has index 0")]
    ZeroPosition { path: String, parameter: String },
    /// A flag name is visible twice at one node.
    #[error("duplicate flag '{flag}' visible in '{path}'")]
    DuplicateFlag { path: String, flag: String },
    /// A subcommand name or alias is used by two siblings.
    #[error("'{alias}' names more than one subcommand under '{path}'")]
    AliasCollision { path: String, alias: String },
    /// A parent/child reference points outside the node arena.
    #[error("dangling node reference in '{0}'")]
    DanglingNode(String),
}

/// Validates every command of a model.
pub fn validate_model(model: &DataModel) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for command in &model.commands {
        if !seen.insert(command.name.as_str()) {
            errors.push(ValidationError::DuplicateCommand(command.name.clone()));
            continue;
        }
        errors.extend(validate_command(command));
    }

    errors
}

/// Validates one command and its subtree.
pub fn validate_command(command: &Command) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if command.name.trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName);
        return errors;
    }

    let dangling = command
        .children
        .iter()
        .chain(command.nodes.iter().flat_map(|n| n.children.iter()))
        .chain(command.nodes.iter().filter_map(|n| n.parent.as_ref()))
        .any(|id| command.node(*id).is_none());
    if dangling {
        errors.push(ValidationError::DanglingNode(command.name.clone()));
        return errors;
    }

    let root_params: Vec<&FunctionParameter> = command.parameters.iter().collect();
    check_parameters(&command.name, &root_params, &mut errors);
    check_siblings(&command.name, command.children(), &mut errors);

    for node in &command.nodes {
        let label = node.label();
        let own: Vec<&FunctionParameter> = node.parameters.iter().collect();
        check_parameters(&label, &own, &mut errors);
        check_visible_flags(&label, node, &mut errors);
        check_siblings(&label, command.children_of(node), &mut errors);
    }

    errors
}

fn check_parameters(path: &str, params: &[&FunctionParameter], errors: &mut Vec<ValidationError>) {
    let mut positions: HashSet<u32> = HashSet::new();
    for param in params {
        if param.vararg && !param.positional {
            errors.push(ValidationError::VarargNotPositional {
                path: path.to_string(),
                parameter: param.name.clone(),
            });
        }
        if let Some(position) = param.position.filter(|_| param.positional) {
            if position == 0 {
                errors.push(ValidationError::ZeroPosition {
                    path: path.to_string(),
                    parameter: param.name.clone(),
                });
            } else if !positions.insert(position) {
                errors.push(ValidationError::DuplicatePosition {
                    path: path.to_string(),
                    position,
                });
            }
        }
    }

    let flags = params.iter().copied().filter(|p| p.is_flag() && !p.from_parent);
    check_flag_names(path, flags, errors);
}

fn check_visible_flags(path: &str, node: &SubCommand, errors: &mut Vec<ValidationError>) {
    let own = node
        .parameters
        .iter()
        .filter(|p| p.is_flag() && !p.from_parent);
    let inherited = node
        .inherited
        .iter()
        .flat_map(|group| group.parameters.iter())
        .filter(|p| p.is_flag());
    // Own-scope duplicates are reported by check_parameters; only count
    // clashes that involve an inherited name here.
    let mut counts: HashMap<&str, (usize, bool)> = HashMap::new();
    for param in own {
        for flag in param.flag_names() {
            counts.entry(flag).or_default().0 += 1;
        }
    }
    for param in inherited {
        for flag in param.flag_names() {
            let entry = counts.entry(flag).or_default();
            entry.0 += 1;
            entry.1 = true;
        }
    }
    let mut clashes: Vec<&str> = counts
        .into_iter()
        .filter(|(_, (count, inherited))| *count > 1 && *inherited)
        .map(|(flag, _)| flag)
        .collect();
    clashes.sort_unstable();
    for flag in clashes {
        errors.push(ValidationError::DuplicateFlag {
            path: path.to_string(),
            flag: flag.to_string(),
        });
    }
}

fn check_flag_names<'a>(
    path: &str,
    params: impl Iterator<Item = &'a FunctionParameter>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();
    for param in params {
        for flag in param.flag_names() {
            if !seen.insert(flag) {
                errors.push(ValidationError::DuplicateFlag {
                    path: path.to_string(),
                    flag: flag.to_string(),
                });
            }
        }
    }
}

fn check_siblings<'a>(
    path: &str,
    siblings: impl Iterator<Item = &'a SubCommand>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();
    for sibling in siblings {
        for name in std::iter::once(&sibling.name).chain(sibling.aliases.iter()) {
            if !seen.insert(name.as_str()) {
                errors.push(ValidationError::AliasCollision {
                    path: path.to_string(),
                    alias: name.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InheritedGroup, NodeId, ParsedParam, Primitive, TypeTag};

    fn flag(name: &str, flags: &[&str]) -> FunctionParameter {
        FunctionParameter::from_parsed(
            name,
            TypeTag::Scalar(Primitive::String),
            ParsedParam {
                flags: flags.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    fn leaf(id: usize, name: &str) -> SubCommand {
        SubCommand {
            id: NodeId(id),
            name: name.to_string(),
            path: vec![name.to_string()],
            command: "app".to_string(),
            struct_name: String::new(),
            function: None,
            description: None,
            extended_help: None,
            aliases: Vec::new(),
            parameters: Vec::new(),
            children: Vec::new(),
            parent: None,
            inherited: Vec::new(),
        }
    }

    #[test]
    fn test_duplicate_flags_in_root_scope() {
        let mut command = Command::new("app");
        command.parameters.push(flag("verbose", &["verbose", "v"]));
        command.parameters.push(flag("version", &["version", "v"]));
        let errors = validate_command(&command);
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateFlag {
                path: "app".into(),
                flag: "v".into()
            }]
        );
    }

    #[test]
    fn test_inherited_flag_clash_is_reported() {
        let mut command = Command::new("app");
        let mut sub = leaf(0, "run");
        sub.parameters.push(flag("verify", &["v"]));
        sub.inherited.push(InheritedGroup {
            declared_by: "app".into(),
            parameters: vec![flag("verbose", &["verbose", "v"])],
        });
        command.nodes.push(sub);
        command.children.push(NodeId(0));

        let errors = validate_command(&command);
        assert!(errors.contains(&ValidationError::DuplicateFlag {
            path: "app run".into(),
            flag: "v".into()
        }));
    }

    #[test]
    fn test_sibling_alias_collision() {
        let mut command = Command::new("app");
        let mut list = leaf(0, "list");
        list.aliases.push("ls".into());
        let mut ls = leaf(1, "ls");
        ls.aliases.push("l".into());
        command.nodes.push(list);
        command.nodes.push(ls);
        command.children = vec![NodeId(0), NodeId(1)];

        let errors = validate_command(&command);
        assert_eq!(
            errors,
            vec![ValidationError::AliasCollision {
                path: "app".into(),
                alias: "ls".into()
            }]
        );
    }

    #[test]
    fn test_dangling_child_reference() {
        let mut command = Command::new("app");
        command.children.push(NodeId(7));
        assert_eq!(
            validate_command(&command),
            vec![ValidationError::DanglingNode("app".into())]
        );
    }

    #[test]
    fn test_vararg_must_be_positional() {
        let mut command = Command::new("app");
        let mut param = flag("files", &[]);
        param.vararg = true;
        param.positional = false;
        command.parameters.push(param);
        let errors = validate_command(&command);
        assert!(matches!(
            errors.first(),
            Some(ValidationError::VarargNotPositional { .. })
        ));
    }

    fn positional(name: &str, position: u32) -> FunctionParameter {
        let mut param = flag(name, &[]);
        param.positional = true;
        param.position = Some(position);
        param
    }

    #[test]
    fn test_duplicate_positional_index() {
        let mut command = Command::new("app");
        let mut get = leaf(0, "get");
        get.parameters.push(positional("key", 1));
        get.parameters.push(positional("field", 1));
        command.nodes.push(get);
        command.children.push(NodeId(0));

        assert_eq!(
            validate_command(&command),
            vec![ValidationError::DuplicatePosition {
                path: "app get".into(),
                position: 1
            }]
        );
    }

    #[test]
    fn test_zero_position_is_rejected() {
        let mut command = Command::new("app");
        command.parameters.push(positional("target", 0));
        assert_eq!(
            validate_command(&command),
            vec![ValidationError::ZeroPosition {
                path: "app".into(),
                parameter: "target".into()
            }]
        );
    }

    #[test]
    fn test_empty_command_name() {
        let mut model = DataModel::new();
        model.commands.push(Command::new("  "));
        assert_eq!(validate_model(&model), vec![ValidationError::EmptyCommandName]);
    }
}
