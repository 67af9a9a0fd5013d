use std::path::PathBuf;

use cmdspec_core::{Command, DeclaredParam, FunctionDecl, ReturnSignature, SourceUnit, ValidationError};
use cmdspec_parser::discover::load_units;
use cmdspec_parser::parser::{extract_attribute_block, parse_comment};
use cmdspec_parser::usage::render_usage;
use cmdspec_parser::{BuildConfig, BuildError, BuildOutcome, build_model};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_units() -> Vec<SourceUnit> {
    load_units(&[fixture("app.yaml"), fixture("config.json")]).expect("fixtures must load")
}

fn build(units: &[SourceUnit]) -> BuildOutcome {
    build_model(units, &BuildConfig::default()).expect("model should build")
}

fn app(outcome: &BuildOutcome) -> &Command {
    outcome.model.find_command("app").expect("app command")
}

fn unit(file: &str, functions: Vec<FunctionDecl>) -> SourceUnit {
    functions
        .into_iter()
        .fold(SourceUnit::new("example.com/app", file), SourceUnit::with_function)
}

#[test]
fn test_fixture_model_is_depth_first_alphabetical() {
    let outcome = build(&fixture_units());
    let app = app(&outcome);

    let labels: Vec<String> = app.nodes.iter().map(|n| n.label()).collect();
    assert_eq!(
        labels,
        vec![
            "app config",
            "app config get",
            "app remote",
            "app remote add",
            "app remote origin",
            "app remote origin prune",
            "app remote remove",
        ]
    );

    let struct_names: Vec<&str> = app.nodes.iter().map(|n| n.struct_name.as_str()).collect();
    assert_eq!(
        struct_names,
        vec!["Config", "ConfigGet", "Remote", "RemoteAdd", "Origin", "RemotePrune", "RemoteRemove"]
    );
    assert_eq!(app.struct_name, "App");
    assert_eq!(app.package.as_deref(), Some("example.com/app"));
    assert!(outcome.report.warnings.is_empty(), "{:?}", outcome.report.warnings);
    assert_eq!(outcome.report.declarations, 5);
}

#[test]
fn test_model_is_identical_under_permutation() {
    let units = fixture_units();
    let baseline = build(&units);
    let baseline_json = serde_json::to_string(&baseline.model).unwrap();

    let mut reversed = units.clone();
    reversed.reverse();
    let mut rotated = units.clone();
    rotated.rotate_left(1);
    let mut per_function: Vec<SourceUnit> = units
        .iter()
        .flat_map(|u| {
            u.functions.iter().rev().map(|f| SourceUnit {
                package: u.package.clone(),
                file: u.file.clone(),
                functions: vec![f.clone()],
            })
        })
        .collect();
    per_function.reverse();

    for permuted in [reversed, rotated, per_function] {
        for _ in 0..3 {
            let outcome = build(&permuted);
            assert_eq!(outcome.model, baseline.model);
            assert_eq!(serde_json::to_string(&outcome.model).unwrap(), baseline_json);
            assert_eq!(outcome.report.warnings, baseline.report.warnings);
        }
    }
}

#[test]
fn test_parameter_sources_merge_by_priority() {
    let outcome = build(&fixture_units());
    let get = app(&outcome).find(&["config", "get"]).unwrap();

    let format = get.find_parameter("format").unwrap();
    assert_eq!(format.description.as_deref(), Some("output format"));
    assert_eq!(format.flags, vec!["output", "o"]);
    assert_eq!(format.default.as_deref(), Some("text"));

    let key = get.find_parameter("key").unwrap();
    assert!(key.positional);
    assert_eq!(key.position, Some(1));
}

#[test]
fn test_from_parent_copies_root_declaration() {
    let outcome = build(&fixture_units());
    let app = app(&outcome);
    let config = app.find(&["config", "get"]).unwrap().find_parameter("config").unwrap();

    assert!(config.from_parent);
    assert!(!config.inherited);
    assert_eq!(config.flags, vec!["config", "c"]);
    assert_eq!(config.env_var.as_deref(), Some("APP_CONFIG"));
    assert_eq!(config.default.as_deref(), Some("~/.app.yml"));
    assert_eq!(config.declared_by.as_deref(), Some("app"));
}

#[test]
fn test_root_flags_reach_three_levels_down() {
    let outcome = build(&fixture_units());
    let app = app(&outcome);
    let prune = app.find(&["remote", "origin", "prune"]).unwrap();

    assert_eq!(prune.inherited.len(), 1);
    assert_eq!(prune.inherited[0].declared_by, "app");
    let names: Vec<&str> = prune.inherited[0].parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["verbose", "config"]);

    let usage = render_usage(app, Some(prune));
    assert!(usage.starts_with("Usage: app remote origin prune [flags]\n"));
    assert!(usage.contains("\nFlags:\n  --dry-run\n"));
    assert!(usage.contains("\nFlags for app:\n"));
    assert!(usage.contains("--verbose, -v"));
    assert!(usage.contains("--config, -c <string>"));
    assert!(usage.contains("Deletes remote-tracking branches"));
}

#[test]
fn test_variadic_and_aliases_in_fixture() {
    let outcome = build(&fixture_units());
    let app = app(&outcome);
    let remove = app.find(&["remote", "rm"]).expect("alias resolves");

    assert_eq!(remove.name, "remove");
    assert_eq!(remove.aliases, vec!["delete", "rm"]);
    assert_eq!(remove.description.as_deref(), Some("removes remotes"));
    let names = remove.find_parameter("names").unwrap();
    assert!(names.vararg && names.positional);
    assert_eq!(names.position, Some(1));

    let remote = app.find(&["remote"]).unwrap();
    let usage = render_usage(app, Some(remote));
    assert!(usage.contains("  remove (delete, rm)  removes remotes\n"));
}

#[test]
fn test_colliding_path_segments_get_distinct_names() {
    let units = [unit(
        "a.go",
        vec![
            FunctionDecl::new("X", "X is a subcommand `app foo_bar x` that does x"),
            FunctionDecl::new("Y", "Y is a subcommand `app foo-bar y` that does y"),
        ],
    )];
    let outcome = build(&units);
    let app = app(&outcome);
    assert_eq!(app.find(&["foo-bar"]).unwrap().struct_name, "FooBar");
    assert_eq!(app.find(&["foo_bar"]).unwrap().struct_name, "FooBar2");
}

#[test]
fn test_synthetic_parent_is_promoted_across_units() {
    let child = unit(
        "child.go",
        vec![FunctionDecl::new("Child", "Child is a subcommand `app parent child` that is nested")],
    );
    let parent = unit(
        "parent.go",
        vec![FunctionDecl::new("Parent", "Parent is a subcommand `app parent` that groups")],
    );

    let outcome = build(&[child, parent]);
    let app = app(&outcome);
    assert_eq!(app.nodes.len(), 2);
    let node = app.find(&["parent"]).unwrap();
    assert!(!node.is_synthetic());
    assert_eq!(node.description.as_deref(), Some("groups"));
    assert_eq!(app.children_of(node).next().unwrap().name, "child");
}

#[test]
fn test_implicit_parameter_gate() {
    let (directive, _) = parse_comment(
        "Show is a subcommand `app show` that shows\noutput: writes the result file\nid: @1 the identifier\n",
    );
    assert!(!directive.params.contains_key("output"));
    assert_eq!(directive.extended_help.as_deref(), Some("output: writes the result file"));
    let id = &directive.params["id"];
    assert!(id.positional);
    assert_eq!(id.position, Some(1));
}

#[test]
fn test_attribute_block_boundaries() {
    let block = extract_attribute_block("Description (required)").unwrap();
    assert_eq!(block.content, "required");
    assert_eq!(block.remainder, "Description");
    assert!(extract_attribute_block("Description (required) text").is_none());
}

#[test]
fn test_structural_errors_abort_the_build() {
    let multi = unit(
        "a.go",
        vec![
            FunctionDecl::new("Pair", "Pair is a subcommand `app pair` that returns two").with_returns(
                ReturnSignature {
                    count: 2,
                    last_is_error: false,
                },
            ),
        ],
    );
    let err = build_model(&[multi], &BuildConfig::default()).unwrap_err();
    assert!(matches!(err, BuildError::MultipleReturnValues { ref function, count: 2 } if function == "Pair"));

    let broken = load_units(&[fixture("invalid.yaml")]).unwrap();
    let err = build_model(&broken, &BuildConfig::default()).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedParameterType { ref parameter, .. } if parameter == "labels"));

    let dup = unit(
        "b.go",
        vec![
            FunctionDecl::new("One", "One is a subcommand `app one` that is first"),
            FunctionDecl::new("Uno", "Uno is a subcommand `app one` that is also first"),
        ],
    );
    let err = build_model(&[dup], &BuildConfig::default()).unwrap_err();
    assert!(err.to_string().contains("'app one'"));
}

#[test]
fn test_configured_reserved_names_apply_per_command() {
    let units = [unit(
        "a.go",
        vec![
            FunctionDecl::new("Config", "Config is a subcommand `app config` that configures")
                .with_param(DeclaredParam::new("path", "string")),
            FunctionDecl::new("Config", "Config is a subcommand `tool config` that configures"),
        ],
    )];
    let config = BuildConfig {
        reserved_names: vec!["Config".to_string()],
        ..Default::default()
    };
    let outcome = build_model(&units, &config).unwrap();
    assert_eq!(outcome.model.command_names(), vec!["app", "tool"]);
    for command in &outcome.model.commands {
        assert_eq!(command.nodes[0].struct_name, "Config2");
    }
}

#[test]
fn test_duplicate_positional_index_fails_validation() {
    let units = [unit(
        "get.go",
        vec![
            FunctionDecl::new(
                "Get",
                "Get is a subcommand `app get` that reads a field\n\nFlags:\n\n\tkey: @1 the key\n\tfield: @1 the field\n",
            )
            .with_param(DeclaredParam::new("key", "string"))
            .with_param(DeclaredParam::new("field", "string")),
        ],
    )];
    let err = build_model(&units, &BuildConfig::default()).unwrap_err();
    match err {
        BuildError::Validation(errors) => assert_eq!(
            errors,
            vec![ValidationError::DuplicatePosition {
                path: "app get".to_string(),
                position: 1
            }]
        ),
        other => panic!("expected validation failure, got {other}"),
    }
}

#[test]
fn test_root_parameter_cannot_defer_to_parent() {
    let units = [unit(
        "main.go",
        vec![
            FunctionDecl::new(
                "App",
                "App is a subcommand `app` that runs\n\nFlags:\n\n\tconfig: config file (from: parent)\n",
            )
            .with_param(DeclaredParam::new("config", "string")),
        ],
    )];
    let err = build_model(&units, &BuildConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        BuildError::UnresolvedParentParameter { ref path, ref parameter } if path == "app" && parameter == "config"
    ));
}
