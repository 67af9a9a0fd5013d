//! Command specification language parser and command model builder.
//!
//! Functions carry their CLI definition in their doc comments:
//!
//! ```text
//! Add is a subcommand `app remote add` that adds a remote
//!
//! Flags:
//!
//! 	name: @1 the remote name
//! 	fetch: -f --fetch fetch after adding (default: true)
//! ```
//!
//! This crate reads those comments from the [`SourceUnit`]s a declaration
//! walker hands over and assembles one deterministic [`DataModel`]: commands
//! sorted by name, subcommands depth-first in alphabetical order, generated
//! identifiers that never collide, and inherited flags grouped by the
//! ancestor that declares them.
//!
//! # Main entry points
//!
//! - [`build_model`] / [`ModelBuilder`] — extract, insert, flatten and
//!   validate in one pass.
//! - [`parse_comment`] — scan a single doc comment.
//! - [`usage::render_usage`] — the help view of one command or node.
//! - [`discover`] — declaration file loading and bundling.
//!
//! # Example
//!
//! ```
//! use cmdspec_core::{DeclaredParam, FunctionDecl, SourceUnit};
//! use cmdspec_parser::{BuildConfig, build_model};
//!
//! let unit = SourceUnit::new("example.com/app", "remote.go").with_function(
//!     FunctionDecl::new(
//!         "RemoteAdd",
//!         "RemoteAdd is a subcommand `app remote add` that adds a remote\n\nFlags:\n\n\tname: @1 the remote name\n",
//!     )
//!     .with_param(DeclaredParam::new("name", "string")),
//! );
//!
//! let outcome = build_model(&[unit], &BuildConfig::default()).unwrap();
//! let app = outcome.model.find_command("app").unwrap();
//! let add = app.find(&["remote", "add"]).unwrap();
//! assert_eq!(add.struct_name, "RemoteAdd");
//! assert!(app.find(&["remote"]).unwrap().is_synthetic());
//! assert_eq!(add.parameters[0].position, Some(1));
//! ```
//!
//! [`SourceUnit`]: cmdspec_core::SourceUnit
//! [`DataModel`]: cmdspec_core::DataModel

pub mod builder;
pub mod config;
pub mod discover;
pub mod error;
pub mod extractor;
pub mod output;
pub mod parser;
pub mod report;
pub mod tree;
pub mod usage;

pub use builder::{BuildOutcome, ModelBuilder, build_model};
pub use config::BuildConfig;
pub use error::BuildError;
pub use parser::{CommentDirective, DocParser, Warning, WarningKind, parse_comment};
pub use report::BuildReport;
