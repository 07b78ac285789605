//! Packages resolvable by name.

use std::collections::BTreeMap;

/// Standard library packages, keyed by the name they are referenced by.
pub const STD_PACKAGES: &[(&str, &str)] = &[
    ("bufio", "bufio"),
    ("bytes", "bytes"),
    ("context", "context"),
    ("errors", "errors"),
    ("filepath", "path/filepath"),
    ("fmt", "fmt"),
    ("html", "html"),
    ("http", "net/http"),
    ("io", "io"),
    ("json", "encoding/json"),
    ("log", "log"),
    ("math", "math"),
    ("os", "os"),
    ("path", "path"),
    ("reflect", "reflect"),
    ("regexp", "regexp"),
    ("sort", "sort"),
    ("strconv", "strconv"),
    ("strings", "strings"),
    ("sync", "sync"),
    ("template", "html/template"),
    ("time", "time"),
    ("unicode", "unicode"),
    ("url", "net/url"),
    ("utf8", "unicode/utf8"),
];

/// Runtime helpers referenced by generated code.
pub const RUNTIME_PACKAGES: &[(&str, &str)] = &[
    ("hpp", "github.com/Joker/hpp"),
    ("jade", "github.com/Joker/jade"),
    ("pool", "github.com/valyala/bytebufferpool"),
];

/// The default name to path table.
#[must_use]
pub fn known_packages() -> BTreeMap<String, String> {
    STD_PACKAGES
        .iter()
        .chain(RUNTIME_PACKAGES)
        .map(|(name, path)| ((*name).to_string(), (*path).to_string()))
        .collect()
}
