//! Output formatting for models and build reports.

use cmdspec_core::{Command, DataModel, FunctionParameter};

use crate::report::BuildReport;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Formats a model in the requested output format.
pub fn format_model(model: &DataModel, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(model)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(model).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(model_to_markdown(model)),
        OutputFormat::Table => Ok(model_to_table(model)),
    }
}

/// Formats a build report in the requested output format.
pub fn format_report(report: &BuildReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        OutputFormat::Table => Ok(report_to_table(report)),
    }
}

fn model_to_markdown(model: &DataModel) -> String {
    let mut out = String::new();
    for command in &model.commands {
        command_to_markdown(command, &mut out);
    }
    out
}

fn command_to_markdown(command: &Command, out: &mut String) {
    out.push_str(&format!("# {}\n\n", command.name));
    if let Some(ref desc) = command.description {
        out.push_str(&format!("{desc}\n\n"));
    }
    if let Some(ref package) = command.package {
        out.push_str(&format!("**Package:** `{package}`\n\n"));
    }
    parameters_to_markdown(&command.parameters, out);

    for node in &command.nodes {
        out.push_str(&format!("## {}\n\n", node.label()));
        if node.is_synthetic() {
            out.push_str("_Group only, no implementing function._\n\n");
        }
        if let Some(ref desc) = node.description {
            out.push_str(&format!("{desc}\n\n"));
        }
        if !node.aliases.is_empty() {
            let aliases: Vec<String> = node.aliases.iter().map(|a| format!("`{a}`")).collect();
            out.push_str(&format!("**Aliases:** {}\n\n", aliases.join(", ")));
        }
        parameters_to_markdown(&node.parameters, out);
        for group in &node.inherited {
            let flags: Vec<String> = group
                .parameters
                .iter()
                .filter(|p| p.is_flag())
                .map(|p| format!("`{}`", p.flag_display()))
                .collect();
            if !flags.is_empty() {
                out.push_str(&format!(
                    "**Inherited from {}:** {}\n\n",
                    group.declared_by,
                    flags.join(", ")
                ));
            }
        }
    }
}

fn parameters_to_markdown(parameters: &[FunctionParameter], out: &mut String) {
    let flags: Vec<&FunctionParameter> = parameters.iter().filter(|p| p.is_flag()).collect();
    if !flags.is_empty() {
        out.push_str("| Flag | Type | Default | Description |\n");
        out.push_str("|------|------|---------|-------------|\n");
        for param in flags {
            let default = param.default.as_deref().unwrap_or("");
            let desc = param.description.as_deref().unwrap_or("");
            out.push_str(&format!(
                "| `{}` | {} | {default} | {desc} |\n",
                param.flag_display(),
                param.type_tag
            ));
        }
        out.push('\n');
    }

    let args: Vec<&FunctionParameter> = parameters.iter().filter(|p| p.positional).collect();
    if !args.is_empty() {
        out.push_str("| Argument | Position | Required | Description |\n");
        out.push_str("|----------|----------|----------|-------------|\n");
        for arg in args {
            let position = arg.position.map(|p| p.to_string()).unwrap_or_default();
            let required = if arg.required { "yes" } else { "no" };
            let desc = arg.description.as_deref().unwrap_or("");
            let name = if arg.vararg {
                format!("{}...", arg.name)
            } else {
                arg.name.clone()
            };
            out.push_str(&format!("| `{name}` | {position} | {required} | {desc} |\n"));
        }
        out.push('\n');
    }
}

fn model_to_table(model: &DataModel) -> String {
    let mut out = String::new();
    for command in &model.commands {
        let rows: Vec<(String, &str, usize, &str)> = std::iter::once((
            command.name.clone(),
            command.struct_name.as_str(),
            command.parameters.len(),
            command.description.as_deref().unwrap_or(""),
        ))
        .chain(command.nodes.iter().map(|node| {
            (
                node.label(),
                node.struct_name.as_str(),
                node.parameters.len(),
                node.description.as_deref().unwrap_or(""),
            )
        }))
        .collect();

        let max_path = rows.iter().map(|r| r.0.len()).max().unwrap_or(4);
        let max_struct = rows.iter().map(|r| r.1.len()).max().unwrap_or(4);
        for (path, struct_name, params, desc) in rows {
            out.push_str(&format!(
                "{:<path_w$}  {:<struct_w$}  params={params}  {desc}\n",
                path,
                struct_name,
                path_w = max_path,
                struct_w = max_struct
            ));
        }
    }
    out
}

fn report_to_markdown(report: &BuildReport) -> String {
    let mut out = String::new();

    out.push_str("# Build Report\n\n");
    out.push_str(&format!("- **Declarations:** {}\n", report.declarations));
    out.push_str(&format!("- **Commands:** {}\n", report.commands.len()));
    out.push_str(&format!("- **Subcommands:** {}\n", report.node_count()));
    out.push_str(&format!("- **Parameters:** {}\n", report.parameter_count()));

    if !report.warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for w in &report.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

fn report_to_table(report: &BuildReport) -> String {
    let mut out = String::new();
    for command in &report.commands {
        out.push_str(&format!(
            "{:<20} nodes={:<4} synthetic={:<4} params={}\n",
            command.name, command.nodes, command.synthetic_nodes, command.parameters
        ));
    }
    out.push_str(&format!("warnings={}\n", report.warnings.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Warning, WarningKind};
    use cmdspec_core::{NodeId, ParsedParam, Primitive, SubCommand, TypeTag};

    fn sample_model() -> DataModel {
        let mut command = Command::new("app");
        command.struct_name = "App".to_string();
        command.description = Some("Sample app".to_string());
        command.parameters = vec![FunctionParameter::from_parsed(
            "verbose",
            TypeTag::Scalar(Primitive::Bool),
            ParsedParam {
                flags: vec!["verbose".into(), "v".into()],
                inherited: true,
                ..Default::default()
            },
        )];
        command.nodes = vec![SubCommand {
            id: NodeId(0),
            name: "run".to_string(),
            path: vec!["run".to_string()],
            command: "app".to_string(),
            struct_name: "Run".to_string(),
            function: None,
            description: Some("Runs things".to_string()),
            extended_help: None,
            aliases: vec!["r".to_string()],
            parameters: vec![FunctionParameter::from_parsed(
                "files",
                TypeTag::Slice(Primitive::String),
                ParsedParam {
                    vararg: true,
                    position: Some(1),
                    ..Default::default()
                },
            )],
            children: Vec::new(),
            parent: None,
            inherited: Vec::new(),
        }];
        command.children = vec![NodeId(0)];
        let mut model = DataModel::new();
        model.commands.push(command);
        model
    }

    #[test]
    fn test_format_model_json() {
        let json = format_model(&sample_model(), OutputFormat::Json).unwrap();
        assert!(json.contains("\"name\": \"app\""));
        assert!(json.contains("\"struct_name\": \"Run\""));
    }

    #[test]
    fn test_format_model_yaml() {
        let yaml = format_model(&sample_model(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("name: app"));
    }

    #[test]
    fn test_format_model_markdown() {
        let md = format_model(&sample_model(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("# app"));
        assert!(md.contains("## app run"));
        assert!(md.contains("`--verbose, -v`"));
        assert!(md.contains("**Aliases:** `r`"));
        assert!(md.contains("| `files...` | 1 | no |"));
        assert!(md.contains("_Group only"));
    }

    #[test]
    fn test_format_model_table() {
        let table = format_model(&sample_model(), OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("app    "));
        assert!(lines[1].starts_with("app run  Run"));
    }

    #[test]
    fn test_format_report_markdown_with_warnings() {
        let report = BuildReport::new(
            &sample_model(),
            1,
            vec![Warning::new(WarningKind::MissingShortDescription, "app run", "no description")],
        );
        let md = format_report(&report, OutputFormat::Markdown).unwrap();
        assert!(md.contains("- **Subcommands:** 1"));
        assert!(md.contains("## Warnings"));
        assert!(md.contains("[missing_short_description]"));
    }

    #[test]
    fn test_format_report_table() {
        let report = BuildReport::new(&sample_model(), 1, Vec::new());
        let table = format_report(&report, OutputFormat::Table).unwrap();
        assert!(table.contains("synthetic=1"));
        assert!(table.ends_with("warnings=0\n"));
    }
}
