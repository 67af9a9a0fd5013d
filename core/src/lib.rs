//! Core command model for doc-comment driven CLI generation.
//!
//! This crate defines the types shared between the comment parser and code
//! generation:
//!
//! - [`SourceUnit`] / [`FunctionDecl`] / [`DeclaredParam`] — what the
//!   declaration walker hands over for each function.
//! - [`TypeTag`] — the closed parameter type vocabulary (primitives, slices
//!   of primitives, single-level pointers to primitives).
//! - [`ParsedParam`] — source-agnostic parameter metadata read from
//!   comments, merged by priority with [`merge_candidates`].
//! - [`DataModel`] / [`Command`] / [`SubCommand`] / [`FunctionParameter`] —
//!   the flattened, deterministic command tree.
//! - [`NameAllocator`] — collision-free generated identifiers.
//!
//! Validation ([`validate_model`]) catches structural errors such as
//! duplicate flags in a node's visible scope or colliding sibling aliases.
//!
//! # Example
//!
//! ```
//! use cmdspec_core::*;
//!
//! let mut names = NameAllocator::new();
//! let mut command = Command::new("app");
//! command.struct_name = names.allocate(&command.name);
//! command.parameters.push(resolve_parameter(
//!     &SignatureParam {
//!         name: "dryRun".into(),
//!         type_tag: TypeTag::Scalar(Primitive::Bool),
//!         variadic: false,
//!     },
//!     ParsedParam::default(),
//! ));
//!
//! let mut model = DataModel::new();
//! model.commands.push(command);
//!
//! assert_eq!(model.commands[0].struct_name, "App");
//! assert_eq!(model.commands[0].parameters[0].flags, vec!["dry-run"]);
//! assert!(validate_model(&model).is_empty());
//! ```

mod bundle;
mod merge;
mod model;
mod naming;
mod types;
mod validate;

pub use bundle::ModelBundle;
pub use merge::{CandidateSource, merge_candidates, overlay, resolve_parameter};
pub use model::*;
pub use naming::{
    FALLBACK_WORD, NameAllocator, RESERVED_NAMES, normalize_flag_names, sanitize_identifier,
    to_kebab_case,
};
pub use types::*;
pub use validate::{ValidationError, validate_command, validate_model};
