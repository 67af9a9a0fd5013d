use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use cmdspec_parser::config::DEFAULT_CONFIG_FILE;
use cmdspec_parser::discover::{build_bundle, collect_declaration_paths, load_units};
use cmdspec_parser::output::{OutputFormat, format_model, format_report};
use cmdspec_parser::usage::render_usage;
use cmdspec_parser::{BuildConfig, BuildOutcome, build_model, parse_comment};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "cmdspec")]
#[command(about = "Build command models from doc-comment subcommand declarations")]
struct Cli {
    /// Log parsing and build progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the command model and write it as a bundle or rendered document.
    Build(BuildArgs),
    /// Build the command model and report warnings without writing output.
    Check(CheckArgs),
    /// Print the usage view of one command or subcommand.
    Usage(UsageArgs),
    /// Scan one doc comment and print the parsed directive as JSON.
    ParseComment(ParseCommentArgs),
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Declaration files and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output path (stdout when omitted).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format; json writes the full bundle.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Configuration file (default: .cmdspec.yml next to the inputs).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fail when any warning is emitted.
    #[arg(long)]
    strict: bool,
    /// Number of parallel parsing jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration files and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Print the full build report in this format instead of the summary.
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Configuration file (default: .cmdspec.yml next to the inputs).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Declaration files and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Root command name.
    #[arg(long)]
    command: String,
    /// Subcommand path segments or aliases (e.g. --path remote add).
    #[arg(long, num_args = 1..)]
    path: Vec<String>,
    /// Configuration file (default: .cmdspec.yml next to the inputs).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ParseCommentArgs {
    /// File holding the doc comment (stdin when omitted).
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Build(args) => run_build(args),
        Command::Check(args) => run_check(args),
        Command::Usage(args) => run_usage(args),
        Command::ParseComment(args) => run_parse_comment(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn run_build(args: BuildArgs) -> Result<(), String> {
    let mut config = resolve_config(args.config.as_deref(), &args.inputs)?;
    if args.strict {
        config = config.with_strict(true);
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }

    let outcome = build_from_inputs(&args.inputs, &config)?;
    let raw = match args.format {
        OutputFormat::Json => {
            let bundle = build_bundle(PACKAGE_VERSION, outcome.model.clone(), &outcome.report);
            serde_json::to_string_pretty(&bundle)
                .map_err(|err| format!("Failed to serialize model bundle: {err}"))?
        }
        format => format_model(&outcome.model, format)?,
    };

    match args.output {
        Some(path) => {
            write_output(&path, &raw)?;
            println!(
                "Built {} command(s) with {} subcommand(s) into '{}'.",
                outcome.model.commands.len(),
                outcome.model.node_count(),
                path.display()
            );
        }
        None => println!("{raw}"),
    }

    if outcome.report.has_warnings() {
        eprintln!(
            "{} warning(s) emitted during build.",
            outcome.report.warnings.len()
        );
    }
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let config = resolve_config(args.config.as_deref(), &args.inputs)?;
    let outcome = build_from_inputs(&args.inputs, &config)?;

    if let Some(format) = args.format {
        println!("{}", format_report(&outcome.report, format)?);
        return Ok(());
    }

    for line in outcome.report.warning_lines() {
        println!("warning: {line}");
    }
    println!(
        "Checked {} declaration(s): {} command(s), {} subcommand(s), {} warning(s).",
        outcome.report.declarations,
        outcome.model.commands.len(),
        outcome.model.node_count(),
        outcome.report.warnings.len()
    );
    Ok(())
}

fn run_usage(args: UsageArgs) -> Result<(), String> {
    let config = resolve_config(args.config.as_deref(), &args.inputs)?;
    let outcome = build_from_inputs(&args.inputs, &config)?;

    let command = outcome
        .model
        .find_command(&args.command)
        .ok_or_else(|| format!("Command '{}' is not declared", args.command))?;

    let node = if args.path.is_empty() {
        None
    } else {
        let segments: Vec<&str> = args.path.iter().map(String::as_str).collect();
        let found = command.find(&segments).ok_or_else(|| {
            format!(
                "Subcommand '{} {}' is not declared",
                args.command,
                args.path.join(" ")
            )
        })?;
        Some(found)
    };

    print!("{}", render_usage(command, node));
    Ok(())
}

fn run_parse_comment(args: ParseCommentArgs) -> Result<(), String> {
    let doc = match args.input {
        Some(path) => fs::read_to_string(&path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?,
        None => {
            let mut doc = String::new();
            std::io::stdin()
                .read_to_string(&mut doc)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            doc
        }
    };

    let (directive, warnings) = parse_comment(&doc);
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    let raw = serde_json::to_string_pretty(&directive)
        .map_err(|err| format!("Failed to serialize directive: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn build_from_inputs(inputs: &[PathBuf], config: &BuildConfig) -> Result<BuildOutcome, String> {
    let paths = collect_declaration_paths(inputs).map_err(|e| e.to_string())?;
    let units = load_units(&paths).map_err(|e| e.to_string())?;
    debug!(files = paths.len(), units = units.len(), "Loaded declarations");
    build_model(&units, config).map_err(|e| e.to_string())
}

/// Uses the explicit config file, otherwise the first `.cmdspec.yml` found
/// in an input directory or next to an input file.
fn resolve_config(explicit: Option<&Path>, inputs: &[PathBuf]) -> Result<BuildConfig, String> {
    if let Some(path) = explicit {
        return BuildConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()));
    }

    let candidate = inputs
        .iter()
        .filter_map(|input| {
            if input.is_dir() {
                Some(input.join(DEFAULT_CONFIG_FILE))
            } else {
                input.parent().map(|parent| parent.join(DEFAULT_CONFIG_FILE))
            }
        })
        .find(|path| path.is_file());

    match candidate {
        Some(path) => {
            debug!(path = %path.display(), "Using configuration file");
            BuildConfig::load(&path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))
        }
        None => Ok(BuildConfig::default()),
    }
}

fn write_output(path: &Path, raw: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, raw).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}
