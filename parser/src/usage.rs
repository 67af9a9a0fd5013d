//! Plain-text help view of a command or subcommand.

use std::fmt;

use cmdspec_core::{Command, FunctionParameter, SubCommand};

/// Everything the help screen of one node shows.
#[derive(Debug, Clone)]
pub struct UsageView<'a> {
    pub label: String,
    pub description: Option<&'a str>,
    pub extended_help: Option<&'a str>,
    pub parameters: &'a [FunctionParameter],
    /// `(declaring label, parameters)`, nearest ancestor first.
    pub inherited: Vec<(&'a str, &'a [FunctionParameter])>,
    pub subcommands: Vec<&'a SubCommand>,
}

impl<'a> UsageView<'a> {
    /// View of the command itself.
    pub fn for_command(command: &'a Command) -> Self {
        Self {
            label: command.name.clone(),
            description: command.description.as_deref(),
            extended_help: command.extended_help.as_deref(),
            parameters: &command.parameters,
            inherited: Vec::new(),
            subcommands: command.children().collect(),
        }
    }

    /// View of one subcommand node.
    pub fn for_node(command: &'a Command, node: &'a SubCommand) -> Self {
        Self {
            label: node.label(),
            description: node.description.as_deref(),
            extended_help: node.extended_help.as_deref(),
            parameters: &node.parameters,
            inherited: node
                .inherited
                .iter()
                .map(|group| (group.declared_by.as_str(), group.parameters.as_slice()))
                .collect(),
            subcommands: command.children_of(node).collect(),
        }
    }

    fn has_flags(&self) -> bool {
        self.parameters.iter().any(FunctionParameter::is_flag)
            || self
                .inherited
                .iter()
                .any(|(_, params)| params.iter().any(FunctionParameter::is_flag))
    }

    fn arguments(&self) -> Vec<&'a FunctionParameter> {
        let mut args: Vec<&FunctionParameter> =
            self.parameters.iter().filter(|p| p.positional).collect();
        args.sort_by_key(|p| p.position.unwrap_or(u32::MAX));
        args
    }
}

/// Renders the help view for `node`, or for the command itself when `node`
/// is `None`.
///
/// # Examples
///
/// ```
/// use cmdspec_core::Command;
/// use cmdspec_parser::usage::render_usage;
///
/// let mut command = Command::new("app");
/// command.description = Some("Does app things".into());
/// let text = render_usage(&command, None);
/// assert!(text.starts_with("Usage: app\n"));
/// assert!(text.contains("Does app things"));
/// ```
pub fn render_usage(command: &Command, node: Option<&SubCommand>) -> String {
    match node {
        Some(node) => UsageView::for_node(command, node).to_string(),
        None => UsageView::for_command(command).to_string(),
    }
}

impl fmt::Display for UsageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arguments = self.arguments();

        write!(f, "Usage: {}", self.label)?;
        if self.has_flags() {
            write!(f, " [flags]")?;
        }
        for arg in &arguments {
            write!(f, " {}", argument_token(arg))?;
        }
        if !self.subcommands.is_empty() {
            write!(f, " <command>")?;
        }
        writeln!(f)?;

        if let Some(description) = self.description {
            write!(f, "\n{description}\n")?;
        }
        if let Some(help) = self.extended_help {
            write!(f, "\n{help}\n")?;
        }

        let own: Vec<(String, String)> = self
            .parameters
            .iter()
            .filter(|p| p.is_flag())
            .map(flag_row)
            .collect();
        write_section(f, "Flags:", &own)?;

        for (label, params) in &self.inherited {
            let rows: Vec<(String, String)> =
                params.iter().filter(|p| p.is_flag()).map(flag_row).collect();
            write_section(f, &format!("Flags for {label}:"), &rows)?;
        }

        let args: Vec<(String, String)> = arguments
            .iter()
            .map(|p| (argument_token(p), p.description.clone().unwrap_or_default()))
            .collect();
        write_section(f, "Arguments:", &args)?;

        let subs: Vec<(String, String)> = self
            .subcommands
            .iter()
            .map(|sub| {
                let mut left = sub.name.clone();
                if !sub.aliases.is_empty() {
                    left.push_str(&format!(" ({})", sub.aliases.join(", ")));
                }
                (left, sub.description.clone().unwrap_or_default())
            })
            .collect();
        write_section(f, "Subcommands:", &subs)
    }
}

fn argument_token(param: &FunctionParameter) -> String {
    let mut token = if param.required || (param.vararg && param.var_min > 0) {
        format!("<{}>", param.name)
    } else {
        format!("[{}]", param.name)
    };
    if param.vararg {
        token.push_str("...");
    }
    token
}

fn flag_row(param: &FunctionParameter) -> (String, String) {
    let mut left = param.flag_display();
    if !param.type_tag.is_bool() {
        left.push_str(&format!(" <{}>", param.type_tag));
    }

    let mut right = param.description.clone().unwrap_or_default();
    let mut notes = Vec::new();
    if let Some(default) = &param.default {
        notes.push(format!("default: {default}"));
    }
    if let Some(env) = &param.env_var {
        notes.push(format!("env: {env}"));
    }
    if param.required {
        notes.push("required".to_string());
    }
    if !notes.is_empty() {
        if !right.is_empty() {
            right.push(' ');
        }
        right.push_str(&format!("({})", notes.join(", ")));
    }
    (left, right)
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, rows: &[(String, String)]) -> fmt::Result {
    if rows.is_empty() {
        return Ok(());
    }
    write!(f, "\n{title}\n")?;
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, right) in rows {
        if right.is_empty() {
            writeln!(f, "  {left}")?;
        } else {
            writeln!(f, "  {left:<width$}  {right}")?;
        }
    }
    Ok(())
}
