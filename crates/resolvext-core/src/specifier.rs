//! Specifier classification.
//!
//! Pure string analysis, no filesystem access. Every input falls into
//! exactly one [`SpecifierKind`].

use crate::builtins::{builtin_modules, BuiltinModules};

/// Classification of a specifier string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecifierKind<'a> {
    /// `<scheme>://...`, never rewritten.
    Url,
    /// Platform built-in module, never rewritten.
    Builtin,
    /// `.`, `..`, `./x`, `../x`, `/x`.
    FilePath,
    /// Installed package reference.
    BarePackage {
        /// `name` or `@scope/name`.
        package_name: &'a str,
        /// Remainder after the name, including its leading `/`. May be empty.
        sub_path: &'a str,
    },
    /// Empty text. Left untouched.
    Unrecognized,
}

impl SpecifierKind<'_> {
    /// Short label used in traces and reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Builtin => "builtin",
            Self::FilePath => "file",
            Self::BarePackage { sub_path, .. } if sub_path.is_empty() => "package",
            Self::BarePackage { .. } => "submodule",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Classify a specifier against the process-wide built-in set.
#[must_use]
pub fn classify(text: &str) -> SpecifierKind<'_> {
    classify_with(text, builtin_modules())
}

/// Classify a specifier against an explicit built-in set.
#[must_use]
pub fn classify_with<'a>(text: &'a str, builtins: &BuiltinModules) -> SpecifierKind<'a> {
    if text.is_empty() {
        return SpecifierKind::Unrecognized;
    }

    if builtins.is_builtin(text) {
        return SpecifierKind::Builtin;
    }

    if is_url(text) {
        return SpecifierKind::Url;
    }

    if is_file_path(text) {
        return SpecifierKind::FilePath;
    }

    match parse_package_path(text) {
        Some((package_name, sub_path)) => SpecifierKind::BarePackage {
            package_name,
            sub_path,
        },
        None => SpecifierKind::Unrecognized,
    }
}

/// `<scheme>://` with a non-empty scheme that contains no `/`.
fn is_url(text: &str) -> bool {
    text.find("://")
        .is_some_and(|pos| pos > 0 && !text[..pos].contains('/'))
}

fn is_file_path(text: &str) -> bool {
    text == "."
        || text == ".."
        || text.starts_with("./")
        || text.starts_with("../")
        || text.starts_with('/')
}

/// Split a bare specifier into package name and subpath.
///
/// e.g., `"lodash/fp"` -> `("lodash", "/fp")`, `"@scope/pkg/sub"` -> `("@scope/pkg", "/sub")`
fn parse_package_path(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }

    let name_end = if text.starts_with('@') {
        // Scoped: the name spans up to the second slash.
        match text.find('/') {
            Some(first) => text[first + 1..]
                .find('/')
                .map_or(text.len(), |second| first + 1 + second),
            None => text.len(),
        }
    } else {
        text.find('/').unwrap_or(text.len())
    };

    if name_end == 0 {
        return None;
    }

    Some((&text[..name_end], &text[name_end..]))
}
