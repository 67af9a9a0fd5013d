//! Model assembly: extraction, tree insertion, flattening, validation.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use cmdspec_core::{DataModel, SourceUnit, validate_model};

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::extractor::{Extraction, extract_unit};
use crate::parser::{Warning, sort_warnings};
use crate::report::BuildReport;
use crate::tree::CommandTree;

/// A finished model and its report.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub model: DataModel,
    pub report: BuildReport,
}

/// Collects declarations from source units and assembles the model.
///
/// Units can be added in any order; the resulting model is the same.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{FunctionDecl, SourceUnit};
/// use cmdspec_parser::{BuildConfig, ModelBuilder};
///
/// let unit = SourceUnit::new("example.com/app", "main.go")
///     .with_function(FunctionDecl::new("Hello", "Hello is a subcommand `app hello` that greets"));
///
/// let mut builder = ModelBuilder::new(BuildConfig::default());
/// builder.add_unit(&unit).unwrap();
/// let outcome = builder.finish().unwrap();
/// assert_eq!(outcome.model.commands[0].nodes[0].struct_name, "Hello");
/// ```
#[derive(Debug)]
pub struct ModelBuilder {
    config: BuildConfig,
    tree: CommandTree,
    warnings: Vec<Warning>,
}

impl ModelBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            tree: CommandTree::new(),
            warnings: Vec::new(),
        }
    }

    /// Extracts and inserts one unit.
    pub fn add_unit(&mut self, unit: &SourceUnit) -> Result<(), BuildError> {
        let extraction = extract_unit(unit)?;
        self.absorb(extraction)
    }

    /// Extracts units in parallel, then inserts them in input order.
    pub fn add_units(&mut self, units: &[SourceUnit]) -> Result<(), BuildError> {
        let results: Vec<Result<Extraction, BuildError>> = match self.config.jobs.filter(|j| *j > 0) {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .build()
                    .map_err(|e| BuildError::ThreadPool(e.to_string()))?;
                pool.install(|| units.par_iter().map(extract_unit).collect())
            }
            None => units.par_iter().map(extract_unit).collect(),
        };

        for result in results {
            self.absorb(result?)?;
        }
        debug!(units = units.len(), declarations = self.tree.len(), "Added source units");
        Ok(())
    }

    fn absorb(&mut self, extraction: Extraction) -> Result<(), BuildError> {
        for warning in extraction.warnings {
            warn!(location = %warning.location, kind = %warning.kind, "{}", warning.message);
            self.warnings.push(warning);
        }
        for declaration in extraction.declarations {
            self.tree.insert(declaration)?;
        }
        Ok(())
    }

    /// Warnings recorded so far, in insertion order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Flattens and validates the model.
    ///
    /// # Errors
    ///
    /// Fails on unresolved `from: parent` parameters, on validation errors,
    /// and, in strict mode, when any warning was recorded.
    pub fn finish(self) -> Result<BuildOutcome, BuildError> {
        let Self {
            config,
            tree,
            mut warnings,
        } = self;

        let declarations = tree.len();
        let model = tree.flatten(&config.reserved_names)?;

        let errors = validate_model(&model);
        if !errors.is_empty() {
            return Err(BuildError::Validation(errors));
        }

        sort_warnings(&mut warnings);
        if config.strict && !warnings.is_empty() {
            return Err(BuildError::StrictWarnings {
                count: warnings.len(),
            });
        }

        let report = BuildReport::new(&model, declarations, warnings);
        info!(
            commands = model.commands.len(),
            nodes = model.node_count(),
            warnings = report.warnings.len(),
            "Built command model"
        );
        Ok(BuildOutcome { model, report })
    }
}

/// Builds a model from `units` in one call.
pub fn build_model(units: &[SourceUnit], config: &BuildConfig) -> Result<BuildOutcome, BuildError> {
    let mut builder = ModelBuilder::new(config.clone());
    builder.add_units(units)?;
    builder.finish()
}
