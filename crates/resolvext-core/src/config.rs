use crate::error::Error;
use crate::resolver::{EntryDescriptor, ExtensionRules, RawEntryDescriptor, RawExtensionRule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration for the resolvext CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Rewrite options as written in a `resolvext.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOptions {
    /// Rules for relative/absolute file specifiers.
    pub extensions: Vec<RawExtensionRule>,
    /// Rules for bare package subpaths (legacy spelling of `submodule.extensions`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_submodule: Option<Vec<RawExtensionRule>>,
    pub submodule: RawSubmoduleOptions,
    pub module: RawModuleOptions,
    pub ignore_unresolved: bool,
    /// Default for both `submodule.ignoreExports` and `module.ignoreExports`.
    pub ignore_exports: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSubmoduleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<RawExtensionRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_exports: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawModuleOptions {
    pub entry: Vec<RawEntryDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_exports: Option<bool>,
}

impl RawOptions {
    /// Load options from a JSON file.
    ///
    /// # Errors
    /// `ConfigRead` if the file cannot be read, `ConfigParse` if it is not
    /// valid options JSON.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Normalized rewrite options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Rules for relative/absolute file specifiers.
    pub extensions: ExtensionRules,
    /// Rules for bare package subpaths.
    pub submodule_extensions: ExtensionRules,
    /// Entry descriptors for bare package root imports, in priority order.
    pub entry: Vec<EntryDescriptor>,
    /// Leave unresolvable specifiers untouched instead of failing.
    pub ignore_unresolved: bool,
    /// Leave subpath imports of packages with an exports map untouched.
    pub submodule_ignore_exports: bool,
    /// Leave root imports of packages with an exports map untouched.
    pub module_ignore_exports: bool,
}

impl ResolveOptions {
    /// Normalize raw options.
    ///
    /// Submodule rules fall back to `extensionsSubmodule`, then to
    /// `extensions`. Per-flow `ignoreExports` falls back to the top-level flag.
    ///
    /// # Errors
    /// `Configuration` for malformed extension rules or entry descriptors.
    pub fn from_raw(raw: &RawOptions) -> Result<Self, Error> {
        let extensions = ExtensionRules::normalize(&raw.extensions)?;

        let submodule_raw = raw
            .submodule
            .extensions
            .as_ref()
            .or(raw.extensions_submodule.as_ref());
        let submodule_extensions = match submodule_raw {
            Some(rules) => ExtensionRules::normalize(rules)?,
            None => extensions.clone(),
        };

        let entry = raw
            .module
            .entry
            .iter()
            .map(EntryDescriptor::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            extensions,
            submodule_extensions,
            entry,
            ignore_unresolved: raw.ignore_unresolved,
            submodule_ignore_exports: raw.submodule.ignore_exports.unwrap_or(raw.ignore_exports),
            module_ignore_exports: raw.module.ignore_exports.unwrap_or(raw.ignore_exports),
        })
    }

    /// Load and normalize options from a JSON file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::from_raw(&RawOptions::load(path)?)
    }

    /// Set file specifier rules.
    #[must_use]
    pub fn with_extensions(mut self, extensions: ExtensionRules) -> Self {
        self.extensions = extensions;
        self
    }

    /// Set package subpath rules.
    #[must_use]
    pub fn with_submodule_extensions(mut self, extensions: ExtensionRules) -> Self {
        self.submodule_extensions = extensions;
        self
    }

    /// Set entry descriptors.
    #[must_use]
    pub fn with_entry(mut self, entry: Vec<EntryDescriptor>) -> Self {
        self.entry = entry;
        self
    }

    /// Set the unresolved policy.
    #[must_use]
    pub fn with_ignore_unresolved(mut self, ignore: bool) -> Self {
        self.ignore_unresolved = ignore;
        self
    }

    /// Set the exports map policy for both flows.
    #[must_use]
    pub fn with_ignore_exports(mut self, ignore: bool) -> Self {
        self.submodule_ignore_exports = ignore;
        self.module_ignore_exports = ignore;
        self
    }
}
