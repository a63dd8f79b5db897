//! Package manifest reads and entry-point resolution.
//!
//! Manifests are read fresh on every call; nothing is cached.

use super::extensions::{ExtensionRules, RawExtensionRule};
use super::probe::{resolve_extension, Probe, ProbeMode};
use super::trace::{steps, ResolveTrace, ResolveTraceStep};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Manifest file name inside a package directory.
pub const MANIFEST_FILE: &str = "package.json";

/// Key whose presence marks an exports map.
pub const EXPORTS_KEY: &str = "exports";

/// A parsed `package.json`.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    value: Value,
}

impl PackageManifest {
    /// Read the manifest of `package_dir`.
    ///
    /// # Errors
    /// `ManifestRead` if the file cannot be read, `ManifestParse` if it is
    /// not valid JSON.
    pub fn load(package_dir: &Path) -> Result<Self, Error> {
        let path = package_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| Error::ManifestRead {
            path: path.clone(),
            source,
        })?;
        let value = serde_json::from_str(&content).map_err(|source| Error::ManifestParse {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, value })
    }

    /// Read the manifest if one exists; a missing file is `Ok(None)`.
    pub fn load_optional(package_dir: &Path) -> Result<Option<Self>, Error> {
        if !package_dir.join(MANIFEST_FILE).is_file() {
            return Ok(None);
        }
        Self::load(package_dir).map(Some)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the manifest declares an exports map (presence only).
    #[must_use]
    pub fn has_exports(&self) -> bool {
        self.value.get(EXPORTS_KEY).is_some()
    }

    /// A top-level string field, `None` if absent, non-string, or empty.
    #[must_use]
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.value
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Entry descriptor as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntryDescriptor {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub extensions: Vec<RawExtensionRule>,
}

/// Where to look for a package's entry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryDescriptor {
    /// Path taken from a manifest field (e.g. `main`, `module`).
    ManifestField {
        field: String,
        extensions: ExtensionRules,
    },
    /// Fixed path relative to the package directory.
    LiteralPath {
        path: String,
        extensions: ExtensionRules,
    },
}

impl EntryDescriptor {
    #[must_use]
    pub fn extensions(&self) -> &ExtensionRules {
        match self {
            Self::ManifestField { extensions, .. } | Self::LiteralPath { extensions, .. } => {
                extensions
            }
        }
    }
}

impl TryFrom<&RawEntryDescriptor> for EntryDescriptor {
    type Error = Error;

    fn try_from(raw: &RawEntryDescriptor) -> Result<Self, Error> {
        let extensions = ExtensionRules::normalize(&raw.extensions)?;
        match raw.kind.as_str() {
            "manifestField" => {
                let field = raw.field.clone().ok_or_else(|| {
                    Error::configuration("manifestField entry requires a `field`")
                })?;
                Ok(Self::ManifestField { field, extensions })
            }
            "literalPath" => {
                let path = raw.path.clone().ok_or_else(|| {
                    Error::configuration("literalPath entry requires a `path`")
                })?;
                Ok(Self::LiteralPath { path, extensions })
            }
            other => Err(Error::configuration(format!("unknown entry kind: {other}"))),
        }
    }
}

/// Rewrite a bare package root import to its entry file.
///
/// Returns `Ok(None)` when the specifier should stay unchanged: the exports
/// map short-circuit applies, or no descriptor resolved.
///
/// # Errors
/// Manifest read/parse failures when a manifest is needed.
pub fn resolve_entry(
    specifier: &str,
    package_dir: &Path,
    descriptors: &[EntryDescriptor],
    ignore_exports: bool,
    trace: &mut ResolveTrace,
) -> Result<Option<String>, Error> {
    let mut manifest = None;

    if ignore_exports {
        manifest = PackageManifest::load_optional(package_dir)?;
        if manifest.as_ref().is_some_and(PackageManifest::has_exports) {
            trace.add(
                ResolveTraceStep::new(
                    steps::CHECK_EXPORTS,
                    true,
                    "Manifest declares exports; leaving specifier to the runtime",
                )
                .with_key(EXPORTS_KEY),
            );
            return Ok(None);
        }
    }

    for descriptor in descriptors {
        let entry_path = match descriptor {
            EntryDescriptor::ManifestField { field, .. } => {
                if manifest.is_none() {
                    let loaded = PackageManifest::load(package_dir)?;
                    trace.add(
                        ResolveTraceStep::new(steps::READ_MANIFEST, true, "Read manifest")
                            .with_path(loaded.path()),
                    );
                    manifest = Some(loaded);
                }
                let value = manifest.as_ref().and_then(|m| m.field_str(field));
                let Some(value) = value else {
                    trace.add(
                        ResolveTraceStep::new(steps::RESOLVE_ENTRY, false, "Field not set")
                            .with_key(field.as_str()),
                    );
                    continue;
                };
                value.to_string()
            }
            EntryDescriptor::LiteralPath { path, .. } => path.clone(),
        };

        let relative = entry_path.trim_start_matches("./");
        if relative.is_empty() {
            continue;
        }

        let base = package_dir.join(relative);
        let probe = resolve_extension(&base, descriptor.extensions(), ProbeMode::Probe, trace);
        let suffix = match probe {
            Probe::NotFound => {
                trace.add(
                    ResolveTraceStep::new(steps::RESOLVE_ENTRY, false, "Entry candidate not found")
                        .with_path(&base),
                );
                continue;
            }
            Probe::AlreadyCorrect | Probe::Replace { .. } => String::new(),
            Probe::Append(suffix) => suffix,
        };

        let rewritten = format!("{specifier}/{relative}{suffix}");
        trace.add(
            ResolveTraceStep::new(steps::RESOLVE_ENTRY, true, format!("Entry: {rewritten}"))
                .with_path(&base),
        );
        return Ok(Some(rewritten));
    }

    Ok(None)
}
