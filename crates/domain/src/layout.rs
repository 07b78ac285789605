//! Output file layout.
//!
//! A [`Layout`] describes one generated Go function and the file around it:
//! package clause, imports, definitions, signature and the code injected
//! right after the opening brace and right before the closing one.

use serde::{Deserialize, Serialize};

/// Imports every generated file starts with.
pub const BASELINE_IMPORTS: &[&str] = &[
    r#""bytes""#,
    r#""fmt""#,
    r#""html""#,
    r#""strconv""#,
    r#"pool "github.com/valyala/bytebufferpool""#,
    r#""github.com/Joker/hpp""#,
];

/// Definition block emitted when constants are not inlined.
pub const EMPTY_DEFS: &str = "const ()";

/// Name of the buffer parameter every generated function receives.
pub const BUFFER_PARAM: &str = "buffer";

/// Prefix of synthesized function names.
pub const FUNC_PREFIX: &str = "tpl_";

/// Output buffer type of the generated function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    /// `*bytes.Buffer` from the standard library.
    Std,
    /// `*pool.ByteBuffer` from bytebufferpool.
    #[default]
    Pooled,
}

impl BufferKind {
    /// Chooses the buffer kind from the `stdbuf` flag.
    #[must_use]
    pub const fn from_stdbuf(stdbuf: bool) -> Self {
        if stdbuf { Self::Std } else { Self::Pooled }
    }

    /// Go type of the buffer parameter.
    #[must_use]
    pub const fn go_type(&self) -> &'static str {
        match self {
            Self::Std => "*bytes.Buffer",
            Self::Pooled => "*pool.ByteBuffer",
        }
    }
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.go_type())
    }
}

/// Structured description of one generated output function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Go package name.
    pub package: String,
    /// Import lines, in insertion order, already quoted.
    pub import: Vec<String>,
    /// Top-level definition blocks.
    pub def: Vec<String>,
    /// Buffer type used for the `buffer` parameter.
    pub bbuf: String,
    /// Function signature, from `func` to the closing parenthesis.
    pub func: String,
    /// Code placed right after the opening brace.
    pub before: String,
    /// Code placed right before the closing brace.
    pub after: String,
}

impl Layout {
    /// Creates a layout for `package` with the baseline imports.
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            import: BASELINE_IMPORTS.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }
}
