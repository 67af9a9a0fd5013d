//! Turns one function declaration into a command-tree payload.
//!
//! The doc comment is scanned, the signature is checked against the
//! supported type vocabulary, and every signature parameter gets its final
//! record from up to three comment candidates (see
//! [`cmdspec_core::merge_candidates`]).

use std::collections::BTreeSet;

use tracing::debug;

use cmdspec_core::{
    CandidateSource, DeclaredParam, FunctionBinding, FunctionDecl, FunctionParameter, ParsedParam,
    SignatureParam, SourceUnit, TypeTag, merge_candidates, path_label, resolve_parameter,
};

use crate::error::BuildError;
use crate::parser::{DocParser, Warning, WarningKind, normalize_comment, parse_param_details};

/// A command or subcommand declared by one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Root command name.
    pub command: String,
    /// Subcommand path; empty for the command's own function.
    pub path: Vec<String>,
    pub binding: FunctionBinding,
    pub description: Option<String>,
    pub extended_help: Option<String>,
    /// Trimmed, deduplicated and sorted.
    pub aliases: Vec<String>,
    /// In signature order.
    pub parameters: Vec<FunctionParameter>,
}

impl Declaration {
    /// Space-joined command path, e.g. `app remote add`.
    pub fn label(&self) -> String {
        path_label(&self.command, &self.path)
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// Result of extracting one function or one source unit.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub declarations: Vec<Declaration>,
    pub warnings: Vec<Warning>,
}

/// Extracts every declared command from a source unit, in function order.
pub fn extract_unit(unit: &SourceUnit) -> Result<Extraction, BuildError> {
    let mut out = Extraction::default();
    for function in &unit.functions {
        let single = extract_function(unit, function)?;
        out.declarations.extend(single.declarations);
        out.warnings.extend(single.warnings);
    }
    debug!(
        package = %unit.package,
        file = %unit.file,
        declarations = out.declarations.len(),
        "Extracted source unit"
    );
    Ok(out)
}

/// Extracts the declaration carried by one function, if any.
///
/// Functions whose doc comment lacks the subcommand marker yield nothing.
pub fn extract_function(unit: &SourceUnit, function: &FunctionDecl) -> Result<Extraction, BuildError> {
    let mut scanner = DocParser::new(&function.name, &function.doc);
    let mut directive = scanner.parse();
    let mut warnings = scanner.into_warnings();

    if !directive.is_command {
        debug!(function = %function.name, "No subcommand marker, skipping");
        return Ok(Extraction::default());
    }
    if directive.command.is_empty() {
        warnings.push(Warning::new(
            WarningKind::MissingCommandName,
            &function.name,
            "subcommand marker without a `command path` in backticks, skipping",
        ));
        return Ok(Extraction {
            declarations: Vec::new(),
            warnings,
        });
    }

    let non_error = function.returns.non_error_count();
    if non_error > 1 {
        return Err(BuildError::MultipleReturnValues {
            function: function.name.clone(),
            count: non_error,
        });
    }

    let signature = function
        .parameters
        .iter()
        .map(|param| signature_param(&function.name, param))
        .collect::<Result<Vec<_>, _>>()?;

    let mut parameters = Vec::with_capacity(signature.len());
    for (declared, sig) in function.parameters.iter().zip(&signature) {
        let mut candidates: Vec<(CandidateSource, ParsedParam)> = Vec::new();
        if let Some(entry) = directive.params.remove(&sig.name) {
            candidates.push((CandidateSource::FlagsBlock, entry));
        }
        if let Some(text) = declared.inline_comment.as_deref().and_then(comment_text) {
            candidates.push((CandidateSource::InlineComment, parse_param_details(&text)));
        }
        if let Some(text) = declared.preceding_comment.as_deref().and_then(comment_text) {
            candidates.push((CandidateSource::PrecedingComment, parse_param_details(&text)));
        }
        parameters.push(resolve_parameter(sig, merge_candidates(candidates)));
    }
    assign_positions(&function.name, &mut parameters)?;

    let label = path_label(&directive.command, &directive.sequence);

    for name in directive.params.keys() {
        warnings.push(Warning::new(
            WarningKind::UnknownParameter,
            &label,
            format!("documented parameter '{name}' is not in the signature of {}", function.name),
        ));
    }

    if !directive.sequence.is_empty() && directive.description.is_none() {
        warnings.push(Warning::new(
            WarningKind::MissingShortDescription,
            &label,
            "subcommand has no short description",
        ));
    }

    // `from: parent` parameters take their description from the ancestor.
    let own: Vec<&FunctionParameter> = parameters.iter().filter(|p| !p.from_parent).collect();
    let described = own.iter().filter(|p| p.description.is_some()).count();
    if described > 0 && described < own.len() {
        for param in own.iter().filter(|p| p.description.is_none()) {
            warnings.push(Warning::new(
                WarningKind::MissingParameterDescription,
                &label,
                format!("parameter '{}' has no description", param.name),
            ));
        }
    }

    let aliases: BTreeSet<String> = directive
        .aliases
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect();

    let declaration = Declaration {
        command: directive.command,
        path: directive.sequence,
        binding: FunctionBinding {
            name: function.name.clone(),
            package: unit.package.clone(),
            file: unit.file.clone(),
            doc_span: function.doc_span,
            parameters: signature,
            returns: function.returns,
        },
        description: directive.description,
        extended_help: directive.extended_help,
        aliases: aliases.into_iter().collect(),
        parameters,
    };

    Ok(Extraction {
        declarations: vec![declaration],
        warnings,
    })
}

fn signature_param(function: &str, param: &DeclaredParam) -> Result<SignatureParam, BuildError> {
    let parsed = if param.variadic {
        TypeTag::parse_variadic(&param.type_tag)
    } else {
        TypeTag::parse(&param.type_tag)
    };
    let type_tag = parsed.map_err(|_| BuildError::UnsupportedParameterType {
        function: function.to_string(),
        parameter: param.name.clone(),
        type_tag: param.type_tag.clone(),
    })?;
    Ok(SignatureParam {
        name: param.name.clone(),
        type_tag,
        variadic: param.variadic,
    })
}

/// Comment text as a single line, markers stripped.
fn comment_text(raw: &str) -> Option<String> {
    let normalized = normalize_comment(raw);
    let joined = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// Gives positional parameters without an explicit `@N` the next free
/// index after the explicit ones, in signature order.
fn assign_positions(function: &str, parameters: &mut [FunctionParameter]) -> Result<(), BuildError> {
    let mut last = parameters.iter().filter_map(|p| p.position).max().unwrap_or(0);
    for param in parameters.iter_mut().filter(|p| p.positional && p.position.is_none()) {
        last = last
            .checked_add(1)
            .ok_or_else(|| BuildError::PositionOutOfRange {
                function: function.to_string(),
                parameter: param.name.clone(),
            })?;
        param.position = Some(last);
    }
    Ok(())
}
