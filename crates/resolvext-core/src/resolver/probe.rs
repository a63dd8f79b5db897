//! Filesystem extension probing.
//!
//! Read-only: only `metadata` calls. Directories are never accepted as a
//! final match.

use super::extensions::ExtensionRules;
use super::trace::{steps, ResolveTrace, ResolveTraceStep};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// How the base path should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// The base may already be a complete path (relative/absolute imports).
    Expand,
    /// The base is known to lack an extension (package subpaths, entries).
    Probe,
}

/// Outcome of probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Nothing matched under the active rules.
    NotFound,
    /// The base already names the right file; no rewrite needed.
    AlreadyCorrect,
    /// Append this suffix to the specifier.
    Append(String),
    /// Replace a trailing `source` extension with `destination`.
    Replace { source: String, destination: String },
}

impl Probe {
    #[must_use]
    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    /// Apply this outcome to specifier text. `None` when nothing matched.
    #[must_use]
    pub fn apply(&self, text: &str) -> Option<String> {
        match self {
            Self::NotFound => None,
            Self::AlreadyCorrect => Some(text.to_string()),
            Self::Append(suffix) => Some(format!("{text}{suffix}")),
            Self::Replace {
                source,
                destination,
            } => {
                let stem = text.strip_suffix(source.as_str()).unwrap_or(text);
                Some(format!("{stem}{destination}"))
            }
        }
    }
}

/// Kind of filesystem entry at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    File,
    Dir,
}

/// Stat a path, mapping any failure to "nothing there".
fn stat(path: &Path) -> Option<Entry> {
    let meta = std::fs::metadata(path).ok()?;
    if meta.is_dir() {
        Some(Entry::Dir)
    } else {
        Some(Entry::File)
    }
}

fn concat(base: &Path, prefix: &str, ext: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(prefix);
    s.push(ext);
    PathBuf::from(s)
}

fn ends_with_separator(base: &Path) -> bool {
    let s = base.as_os_str().to_string_lossy();
    s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR)
}

/// Resolve which suffix (if any) makes `base` name an existing file.
#[must_use]
pub fn resolve_extension(
    base: &Path,
    rules: &ExtensionRules,
    mode: ProbeMode,
    trace: &mut ResolveTrace,
) -> Probe {
    let entry = stat(base);

    if mode == ProbeMode::Expand && entry == Some(Entry::File) {
        let s = base.as_os_str().to_string_lossy();
        let matched = rules.candidates().find(|(source, _)| s.ends_with(source));
        let probe = match matched {
            Some((source, emitted)) if source != emitted => Probe::Replace {
                source: source.to_string(),
                destination: emitted.to_string(),
            },
            _ => Probe::AlreadyCorrect,
        };
        trace.add(
            ResolveTraceStep::new(steps::FILE_EXISTS, true, "Base names an existing file")
                .with_path(base)
                .with_note(format!("{probe:?}")),
        );
        return probe;
    }

    let prefix = if ends_with_separator(base) {
        "index"
    } else if entry == Some(Entry::Dir) {
        trace.add(
            ResolveTraceStep::new(steps::RESOLVE_DIRECTORY, true, "Base is a directory")
                .with_path(base),
        );
        "/index"
    } else {
        ""
    };

    for (source, emitted) in rules.candidates() {
        let candidate = concat(base, prefix, source);
        if stat(&candidate) == Some(Entry::File) {
            trace.add(
                ResolveTraceStep::new(steps::PROBE_EXTENSION, true, format!("Matched {source}"))
                    .with_path(&candidate),
            );
            return Probe::Append(format!("{prefix}{emitted}"));
        }
        trace.add(
            ResolveTraceStep::new(steps::PROBE_EXTENSION, false, format!("No {source}"))
                .with_path(&candidate),
        );
    }

    if entry == Some(Entry::File) {
        trace.success(steps::FILE_EXISTS, "No extension matched; base exists as-is");
        return Probe::AlreadyCorrect;
    }

    trace.failure(steps::PROBE_EXTENSION, "No candidate exists");
    Probe::NotFound
}
