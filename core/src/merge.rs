//! Per-parameter merging of comment candidates.
//!
//! A function parameter can be described in up to three places: an entry in
//! the doc comment (the `Flags:` block, legacy `flag`/`param` lines or an
//! implicit parameter line), a comment trailing the parameter in the
//! signature, and a comment on the line above it. Each source yields a
//! [`ParsedParam`]; [`merge_candidates`] folds them from lowest to highest
//! [`CandidateSource`] priority, letting a field through only when the
//! higher-priority candidate actually sets it.
//!
//! # Example
//!
//! ```
//! use cmdspec_core::*;
//!
//! let flags_block = ParsedParam {
//!     default: Some("guest".into()),
//!     ..Default::default()
//! };
//! let inline = ParsedParam {
//!     description: Some("User name".into()),
//!     ..Default::default()
//! };
//!
//! let merged = merge_candidates([
//!     (CandidateSource::FlagsBlock, flags_block),
//!     (CandidateSource::InlineComment, inline),
//! ]);
//! assert_eq!(merged.default.as_deref(), Some("guest"));
//! assert_eq!(merged.description.as_deref(), Some("User name"));
//! ```

use crate::model::{FunctionParameter, SignatureParam};
use crate::naming::to_kebab_case;
use crate::types::ParsedParam;

/// Where a parameter candidate came from, in ascending priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CandidateSource {
    /// Comment on the line immediately before the parameter.
    PrecedingComment,
    /// Comment after the parameter on the same line.
    InlineComment,
    /// Entry in the function's doc comment.
    FlagsBlock,
}

/// A field that may or may not carry a value.
trait Settable {
    fn is_set(&self) -> bool;
}

impl<T> Settable for Option<T> {
    fn is_set(&self) -> bool {
        self.is_some()
    }
}

impl<T> Settable for Vec<T> {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl Settable for bool {
    fn is_set(&self) -> bool {
        *self
    }
}

impl Settable for u32 {
    fn is_set(&self) -> bool {
        *self != 0
    }
}

fn apply_if_set<T: Settable>(slot: &mut T, value: T) {
    if value.is_set() {
        *slot = value;
    }
}

/// Lays `top` over `base`; every field `top` sets wins, the rest keep the
/// base value.
pub fn overlay(mut base: ParsedParam, top: ParsedParam) -> ParsedParam {
    apply_if_set(&mut base.flags, top.flags);
    apply_if_set(&mut base.aliases, top.aliases);
    apply_if_set(&mut base.default, top.default);
    apply_if_set(&mut base.env_var, top.env_var);
    apply_if_set(&mut base.description, top.description);
    apply_if_set(&mut base.required, top.required);
    apply_if_set(&mut base.inherited, top.inherited);
    apply_if_set(&mut base.from_parent, top.from_parent);
    apply_if_set(&mut base.positional, top.positional);
    apply_if_set(&mut base.position, top.position);
    apply_if_set(&mut base.vararg, top.vararg);
    apply_if_set(&mut base.var_min, top.var_min);
    apply_if_set(&mut base.var_max, top.var_max);
    apply_if_set(&mut base.parser, top.parser);
    apply_if_set(&mut base.generator, top.generator);
    base
}

/// Merges candidates by priority regardless of the order given.
///
/// Candidates from the same source are applied in the order supplied.
pub fn merge_candidates<I>(candidates: I) -> ParsedParam
where
    I: IntoIterator<Item = (CandidateSource, ParsedParam)>,
{
    let mut ordered: Vec<(CandidateSource, ParsedParam)> = candidates.into_iter().collect();
    ordered.sort_by_key(|(source, _)| *source);
    ordered
        .into_iter()
        .fold(ParsedParam::default(), |acc, (_, candidate)| overlay(acc, candidate))
}

/// Produces the final parameter record for one signature parameter.
///
/// Applies the post-merge rules: a signature-variadic parameter is always
/// a positional vararg, and a named flag without any declared names gets a
/// kebab-case name derived from its identifier when that differs from the
/// identifier itself.
///
/// # Examples
///
/// ```
/// use cmdspec_core::*;
///
/// let sig = SignatureParam {
///     name: "userName".into(),
///     type_tag: TypeTag::Scalar(Primitive::String),
///     variadic: false,
/// };
/// let param = resolve_parameter(&sig, ParsedParam::default());
/// assert_eq!(param.flags, vec!["user-name"]);
/// ```
pub fn resolve_parameter(signature: &SignatureParam, merged: ParsedParam) -> FunctionParameter {
    let mut param = FunctionParameter::from_parsed(&signature.name, signature.type_tag, merged);

    if signature.variadic {
        param.vararg = true;
        param.positional = true;
    }

    if param.flags.is_empty() && !param.positional {
        let kebab = to_kebab_case(&param.name);
        if !kebab.is_empty() && kebab != param.name {
            param.flags.push(kebab);
        }
    }

    param
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionRef, Primitive, TypeTag};

    fn sig(name: &str, variadic: bool) -> SignatureParam {
        SignatureParam {
            name: name.to_string(),
            type_tag: if variadic {
                TypeTag::Slice(Primitive::String)
            } else {
                TypeTag::Scalar(Primitive::String)
            },
            variadic,
        }
    }

    #[test]
    fn test_higher_priority_wins_for_set_fields() {
        let preceding = ParsedParam {
            description: Some("from above".into()),
            default: Some("a".into()),
            ..Default::default()
        };
        let inline = ParsedParam {
            description: Some("inline".into()),
            ..Default::default()
        };
        let block = ParsedParam {
            default: Some("b".into()),
            ..Default::default()
        };

        let merged = merge_candidates([
            (CandidateSource::FlagsBlock, block),
            (CandidateSource::PrecedingComment, preceding),
            (CandidateSource::InlineComment, inline),
        ]);
        assert_eq!(merged.description.as_deref(), Some("inline"));
        assert_eq!(merged.default.as_deref(), Some("b"));
    }

    #[test]
    fn test_empty_fields_never_erase() {
        let preceding = ParsedParam {
            required: true,
            flags: vec!["n".into()],
            parser: Some(FunctionRef::local("ParseName")),
            var_max: 3,
            ..Default::default()
        };
        let merged = merge_candidates([
            (CandidateSource::PrecedingComment, preceding),
            (CandidateSource::InlineComment, ParsedParam::default()),
            (CandidateSource::FlagsBlock, ParsedParam::default()),
        ]);
        assert!(merged.required);
        assert_eq!(merged.flags, vec!["n"]);
        assert_eq!(merged.parser, Some(FunctionRef::local("ParseName")));
        assert_eq!(merged.var_max, 3);
    }

    #[test]
    fn test_single_word_identifier_keeps_bare_name() {
        let param = resolve_parameter(&sig("verbose", false), ParsedParam::default());
        assert!(param.flags.is_empty());
        assert_eq!(param.flag_names(), vec!["verbose"]);
    }

    #[test]
    fn test_declared_flags_suppress_derivation() {
        let merged = ParsedParam {
            flags: vec!["u".into()],
            ..Default::default()
        };
        let param = resolve_parameter(&sig("userName", false), merged);
        assert_eq!(param.flags, vec!["u"]);
    }

    #[test]
    fn test_signature_variadic_forces_positional() {
        let param = resolve_parameter(&sig("files", true), ParsedParam::default());
        assert!(param.positional);
        assert!(param.vararg);
        assert!(param.flags.is_empty());
    }
}
