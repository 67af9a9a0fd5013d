//! Input-side type definitions and the closed parameter type vocabulary.
//!
//! These types describe what the (external) declaration walker hands over
//! for each function: its name, doc comment, signature and defining unit.
//! They derive [`serde`] so declaration files can be written in JSON or YAML.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Version of the model contract (semver).
///
/// Embedded in every [`DataModel`](crate::DataModel) and
/// [`ModelBundle`](crate::ModelBundle) to track compatibility.
pub const MODEL_CONTRACT_VERSION: &str = "1.0.0";

/// Errors raised while decoding a declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The type is outside the supported vocabulary (maps, channels,
    /// structs, multi-level pointers, ...).
    #[error("unsupported parameter type: {0}")]
    Unsupported(String),
}

/// Primitive element types a parameter may carry.
///
/// # Examples
///
/// ```
/// use cmdspec_core::Primitive;
///
/// assert_eq!(Primitive::parse("int64"), Some(Primitive::Int64));
/// assert_eq!(Primitive::parse("time.Duration"), Some(Primitive::Duration));
/// assert_eq!(Primitive::parse("map[string]int"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    /// `time.Duration`
    Duration,
}

impl Primitive {
    /// Parses a bare primitive type name.
    pub fn parse(raw: &str) -> Option<Self> {
        let primitive = match raw.trim() {
            "bool" => Self::Bool,
            "string" => Self::String,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "time.Duration" | "duration" => Self::Duration,
            _ => return None,
        };
        Some(primitive)
    }

    /// Returns the canonical spelling used in generated code and help text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Duration => "time.Duration",
        }
    }
}

/// Declared type of a function parameter.
///
/// Only primitives, slices of primitives, and single-level pointers to
/// primitives are representable.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{Primitive, TypeTag};
///
/// assert_eq!(TypeTag::parse("[]string").unwrap(), TypeTag::Slice(Primitive::String));
/// assert_eq!(TypeTag::parse("*int").unwrap(), TypeTag::Pointer(Primitive::Int));
/// assert!(TypeTag::parse("map[string]string").is_err());
/// assert!(TypeTag::parse("**int").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "elem", rename_all = "snake_case")]
pub enum TypeTag {
    Scalar(Primitive),
    Slice(Primitive),
    Pointer(Primitive),
}

impl TypeTag {
    /// Parses `T`, `[]T`, `*T` or `...T`.
    ///
    /// `...T` maps to `Slice(T)`, the shape a variadic parameter has inside
    /// the function body.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let trimmed = raw.trim();
        let unsupported = || TypeError::Unsupported(trimmed.to_string());

        if let Some(elem) = trimmed.strip_prefix("...") {
            return Primitive::parse(elem).map(Self::Slice).ok_or_else(unsupported);
        }
        if let Some(elem) = trimmed.strip_prefix("[]") {
            return Primitive::parse(elem).map(Self::Slice).ok_or_else(unsupported);
        }
        if let Some(elem) = trimmed.strip_prefix('*') {
            return Primitive::parse(elem).map(Self::Pointer).ok_or_else(unsupported);
        }
        Primitive::parse(trimmed).map(Self::Scalar).ok_or_else(unsupported)
    }

    /// Parses the type of a variadic parameter.
    ///
    /// Walkers report the element type (`string`), the spread form
    /// (`...string`) or the slice form (`[]string`); all three map to
    /// `Slice(string)`.
    pub fn parse_variadic(raw: &str) -> Result<Self, TypeError> {
        match Self::parse(raw)? {
            Self::Scalar(elem) | Self::Slice(elem) => Ok(Self::Slice(elem)),
            Self::Pointer(_) => Err(TypeError::Unsupported(format!("...{}", raw.trim()))),
        }
    }

    /// `true` for a plain `bool`, the only type rendered as a switch flag.
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Scalar(Primitive::Bool))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(p) => write!(f, "{}", p.as_str()),
            Self::Slice(p) => write!(f, "[]{}", p.as_str()),
            Self::Pointer(p) => write!(f, "*{}", p.as_str()),
        }
    }
}

/// Reference to a function used as a value parser or value generator.
///
/// Written in comments as `Func`, `pkg.Func`, or `"import/path".Func`.
///
/// # Examples
///
/// ```
/// use cmdspec_core::FunctionRef;
///
/// let local = FunctionRef::local("ParseLevel");
/// assert!(local.is_local());
/// assert_eq!(local.to_string(), "ParseLevel");
///
/// let imported = FunctionRef::qualified("strconv", "Atoi");
/// assert_eq!(imported.to_string(), "strconv.Atoi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionRef {
    /// Quoted import path, when the reference was written as `"path".Func`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_path: Option<String>,
    /// Package qualifier, when written as `pkg.Func`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Function name, possibly including a call suffix such as `Parse(10)`.
    pub name: String,
}

impl FunctionRef {
    /// A function in the same package as the command.
    pub fn local(name: &str) -> Self {
        Self {
            import_path: None,
            package: None,
            name: name.to_string(),
        }
    }

    /// A function qualified by a package name.
    pub fn qualified(package: &str, name: &str) -> Self {
        Self {
            import_path: None,
            package: Some(package.to_string()),
            name: name.to_string(),
        }
    }

    /// A function qualified by a full import path.
    pub fn imported(import_path: &str, name: &str) -> Self {
        Self {
            import_path: Some(import_path.to_string()),
            package: None,
            name: name.to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.import_path.is_none() && self.package.is_none()
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.import_path, &self.package) {
            (Some(path), _) => write!(f, "\"{path}\".{}", self.name),
            (None, Some(pkg)) => write!(f, "{pkg}.{}", self.name),
            (None, None) => write!(f, "{}", self.name),
        }
    }
}

/// Source-agnostic parameter metadata produced by the comment parsers.
///
/// One `ParsedParam` exists per candidate source (flags block, inline
/// comment, preceding comment). Candidates are combined with
/// [`merge_candidates`](crate::merge_candidates).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedParam {
    /// Flag names without leading dashes, longest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    /// Explicit `aka:` names, in the order written.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Environment variable supplying the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub inherited: bool,
    /// Defer to an ancestor's declaration of the same parameter.
    #[serde(default)]
    pub from_parent: bool,
    #[serde(default)]
    pub positional: bool,
    /// 1-based positional index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default)]
    pub vararg: bool,
    /// Inclusive lower bound on vararg count, 0 = unspecified.
    #[serde(default)]
    pub var_min: u32,
    /// Inclusive upper bound on vararg count, 0 = unspecified.
    #[serde(default)]
    pub var_max: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<FunctionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<FunctionRef>,
}

/// Line range of a doc comment in its defining file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSpan {
    pub line_start: usize,
    pub line_end: usize,
}

/// Return arity of a declared function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnSignature {
    #[serde(default)]
    pub count: usize,
    /// Whether the last return value is an error indicator.
    #[serde(default)]
    pub last_is_error: bool,
}

impl ReturnSignature {
    pub fn none() -> Self {
        Self::default()
    }

    /// A single error return.
    pub fn error() -> Self {
        Self {
            count: 1,
            last_is_error: true,
        }
    }

    /// Number of returned values that are not the trailing error.
    pub fn non_error_count(&self) -> usize {
        if self.last_is_error && self.count > 0 {
            self.count - 1
        } else {
            self.count
        }
    }
}

/// One parameter of a declared function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredParam {
    pub name: String,
    /// Type as spelled in the source (`string`, `[]int`, `*bool`, ...).
    pub type_tag: String,
    #[serde(default)]
    pub variadic: bool,
    /// Comment trailing the parameter on the same line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_comment: Option<String>,
    /// Comment on the line immediately before the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preceding_comment: Option<String>,
}

impl DeclaredParam {
    pub fn new(name: &str, type_tag: &str) -> Self {
        Self {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            variadic: false,
            inline_comment: None,
            preceding_comment: None,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn with_inline_comment(mut self, comment: &str) -> Self {
        self.inline_comment = Some(comment.to_string());
        self
    }

    pub fn with_preceding_comment(mut self, comment: &str) -> Self {
        self.preceding_comment = Some(comment.to_string());
        self
    }
}

/// One function declaration with its doc comment and signature.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{DeclaredParam, FunctionDecl, ReturnSignature};
///
/// let decl = FunctionDecl::new("Hello", "Hello is a subcommand `app hello` that greets")
///     .with_param(DeclaredParam::new("name", "string"))
///     .with_returns(ReturnSignature::error());
/// assert_eq!(decl.parameters.len(), 1);
/// assert_eq!(decl.returns.non_error_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    /// Raw doc comment text, `//` markers optional.
    #[serde(default)]
    pub doc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_span: Option<DocSpan>,
    #[serde(default)]
    pub parameters: Vec<DeclaredParam>,
    #[serde(default)]
    pub returns: ReturnSignature,
}

impl FunctionDecl {
    pub fn new(name: &str, doc: &str) -> Self {
        Self {
            name: name.to_string(),
            doc: doc.to_string(),
            doc_span: None,
            parameters: Vec::new(),
            returns: ReturnSignature::none(),
        }
    }

    pub fn with_param(mut self, param: DeclaredParam) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_returns(mut self, returns: ReturnSignature) -> Self {
        self.returns = returns;
        self
    }

    pub fn with_doc_span(mut self, line_start: usize, line_end: usize) -> Self {
        self.doc_span = Some(DocSpan {
            line_start,
            line_end,
        });
        self
    }
}

/// All function declarations found in one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Import path of the defining package.
    pub package: String,
    /// Defining file, relative to the package root.
    pub file: String,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
}

impl SourceUnit {
    pub fn new(package: &str, file: &str) -> Self {
        Self {
            package: package.to_string(),
            file: file.to_string(),
            functions: Vec::new(),
        }
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }
}
