//! Resolution tracing for the explain command.
//!
//! Records each decision the rewriter makes for one specifier. A disabled
//! trace drops every step, so the same code path serves both plain and
//! explained resolution.

use serde::Serialize;
use std::path::PathBuf;

/// Schema version for the explain output format.
/// Bump when the trace structure changes incompatibly.
pub const EXPLAIN_SCHEMA_VERSION: u32 = 1;

/// A single step in the resolution trace.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveTraceStep {
    /// Step name (e.g., "classify_specifier", "probe_extension")
    pub step: &'static str,
    /// Whether this step succeeded
    pub ok: bool,
    /// Human-readable description of what happened
    pub detail: String,
    /// File path involved in this step, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Manifest key consulted, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ResolveTraceStep {
    /// Create a new trace step.
    pub fn new(step: &'static str, ok: bool, detail: impl Into<String>) -> Self {
        Self {
            step,
            ok,
            detail: detail.into(),
            path: None,
            key: None,
            notes: Vec::new(),
        }
    }

    /// Set the path for this step.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the manifest key for this step.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add a note to this step.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Ordered resolution steps.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveTrace {
    #[serde(skip)]
    enabled: bool,
    pub steps: Vec<ResolveTraceStep>,
}

impl ResolveTrace {
    /// A trace that records steps.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            steps: Vec::new(),
        }
    }

    /// A trace that drops every step.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Add a step to the trace.
    pub fn add(&mut self, step: ResolveTraceStep) {
        if self.enabled {
            self.steps.push(step);
        }
    }

    /// Add a simple success step.
    pub fn success(&mut self, step: &'static str, detail: impl Into<String>) {
        self.add(ResolveTraceStep::new(step, true, detail));
    }

    /// Add a simple failure step.
    pub fn failure(&mut self, step: &'static str, detail: impl Into<String>) {
        self.add(ResolveTraceStep::new(step, false, detail));
    }
}

/// Step names used in resolution tracing.
pub mod steps {
    pub const CLASSIFY_SPECIFIER: &str = "classify_specifier";
    pub const RESOLVE_RELATIVE: &str = "resolve_relative";
    pub const FILE_EXISTS: &str = "file_exists";
    pub const RESOLVE_DIRECTORY: &str = "resolve_directory";
    pub const PROBE_EXTENSION: &str = "probe_extension";
    pub const SEARCH_NODE_MODULES: &str = "search_node_modules";
    pub const SEARCH_GLOBAL_DIRS: &str = "search_global_dirs";
    pub const FIND_PACKAGE_DIR: &str = "find_package_dir";
    pub const READ_MANIFEST: &str = "read_manifest";
    pub const CHECK_EXPORTS: &str = "check_exports";
    pub const RESOLVE_ENTRY: &str = "resolve_entry";
    pub const FINAL_SPECIFIER: &str = "final_specifier";
}
