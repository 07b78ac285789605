//! Go identifier helpers.

/// Reserved words of the Go language.
pub const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Returns true if `word` is a Go keyword.
#[must_use]
pub fn is_go_keyword(word: &str) -> bool {
    GO_KEYWORDS.contains(&word)
}

/// Returns true if `name` is a valid, non-keyword Go identifier.
#[must_use]
pub fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_') && !is_go_keyword(name)
}

/// Returns true if `name` may be used after an identifier prefix such as
/// `tpl_`: letters, digits and underscores only.
#[must_use]
pub fn is_identifier_tail(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
