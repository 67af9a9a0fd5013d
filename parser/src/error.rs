//! Fatal build errors.

use cmdspec_core::ValidationError;

/// Structural problems that abort a model build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A parameter type outside the supported vocabulary.
    #[error("function {function}: parameter '{parameter}' has unsupported type '{type_tag}'")]
    UnsupportedParameterType {
        function: String,
        parameter: String,
        type_tag: String,
    },

    /// More than one non-error return value.
    #[error("function {function}: {count} non-error return values, at most one is supported")]
    MultipleReturnValues { function: String, count: usize },

    /// Two function-backed declarations for one command path.
    #[error("'{path}' is declared by both {existing} and {incoming}")]
    DuplicateDefinition {
        path: String,
        existing: String,
        incoming: String,
    },

    /// No positional index is left after the highest explicit `@N`.
    #[error("function {function}: no positional index left for parameter '{parameter}'")]
    PositionOutOfRange { function: String, parameter: String },

    /// A `from: parent` parameter no ancestor declares.
    #[error("'{path}': parameter '{parameter}' defers to a parent that does not declare it")]
    UnresolvedParentParameter { path: String, parameter: String },

    /// The flattened model failed validation.
    #[error("model validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Strict mode turned warnings into a failure.
    #[error("{count} warning(s) reported in strict mode")]
    StrictWarnings { count: usize },

    /// The rayon pool could not be created.
    #[error("thread pool: {0}")]
    ThreadPool(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = BuildError::MultipleReturnValues {
            function: "Run".into(),
            count: 2,
        };
        assert!(err.to_string().contains("Run"));

        let err = BuildError::Validation(vec![
            ValidationError::EmptyCommandName,
            ValidationError::DuplicateCommand("app".into()),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("model validation failed: "));
        assert!(text.contains("; "));
    }
}
