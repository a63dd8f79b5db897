//! Per-specifier rewriting.
//!
//! Routes a specifier through classification, probing, package lookup and
//! entry resolution, then applies the unresolved policy. Only this module
//! turns "nothing found" into an error.

use crate::config::ResolveOptions;
use crate::error::Error;
use crate::resolver::trace::{steps, ResolveTrace, ResolveTraceStep};
use crate::resolver::{
    default_global_dirs, locate_package_dir, resolve_entry, resolve_extension, PackageManifest,
    Probe, ProbeMode, EXPORTS_KEY,
};
use crate::specifier::{classify, SpecifierKind};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Per-file resolution inputs.
#[derive(Debug, Clone)]
pub struct ResolutionContext<'a> {
    file: PathBuf,
    options: &'a ResolveOptions,
    global_dirs: Vec<PathBuf>,
}

impl<'a> ResolutionContext<'a> {
    /// Context for the file at `file` (absolute), using the default global
    /// module directories.
    pub fn new(file: impl Into<PathBuf>, options: &'a ResolveOptions) -> Self {
        Self {
            file: file.into(),
            options,
            global_dirs: default_global_dirs(),
        }
    }

    /// Replace the global module directories consulted after `node_modules`.
    #[must_use]
    pub fn with_global_dirs(mut self, global_dirs: Vec<PathBuf>) -> Self {
        self.global_dirs = global_dirs;
        self
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[must_use]
    pub fn options(&self) -> &ResolveOptions {
        self.options
    }

    #[must_use]
    pub fn global_dirs(&self) -> &[PathBuf] {
        &self.global_dirs
    }

    fn file_dir(&self) -> &Path {
        self.file.parent().unwrap_or(Path::new("/"))
    }
}

/// Why a specifier was left as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnchangedReason {
    Url,
    Builtin,
    Unrecognized,
    /// Already names the right file.
    AlreadyCorrect,
    /// Nothing matched and `ignoreUnresolved` is set.
    Unresolved,
    /// The package declares an exports map and `ignoreExports` is set.
    ExportsMap,
    /// No entry descriptor produced a rewrite.
    EntryKept,
}

/// What happened to a specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Unchanged { reason: UnchangedReason },
    Rewritten { specifier: String },
}

impl Outcome {
    fn unchanged(reason: UnchangedReason) -> Self {
        Self::Unchanged { reason }
    }
}

/// Result of rewriting one specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    pub original: String,
    /// Classification label (see [`SpecifierKind::label`]).
    pub kind: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Rewrite {
    /// The specifier to emit: the rewritten text, or the original.
    #[must_use]
    pub fn specifier(&self) -> &str {
        match &self.outcome {
            Outcome::Rewritten { specifier } => specifier,
            Outcome::Unchanged { .. } => &self.original,
        }
    }

    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(&self.outcome, Outcome::Rewritten { specifier } if *specifier != self.original)
    }
}

/// Compute the replacement for one specifier.
///
/// # Errors
/// `UnresolvedPath` / `UnresolvedModule` when nothing matched and
/// `ignore_unresolved` is off; `PackageNotFound` regardless of policy;
/// manifest errors when a manifest is needed but unreadable.
pub fn rewrite_specifier(text: &str, ctx: &ResolutionContext<'_>) -> Result<Rewrite, Error> {
    run(text, ctx, &mut ResolveTrace::disabled())
}

/// Same as [`rewrite_specifier`], also returning every step taken.
pub fn explain_specifier(
    text: &str,
    ctx: &ResolutionContext<'_>,
) -> (Result<Rewrite, Error>, ResolveTrace) {
    let mut trace = ResolveTrace::new();
    let result = run(text, ctx, &mut trace);
    (result, trace)
}

fn run(text: &str, ctx: &ResolutionContext<'_>, trace: &mut ResolveTrace) -> Result<Rewrite, Error> {
    let kind = classify(text);
    let label = kind.label();
    trace.success(steps::CLASSIFY_SPECIFIER, format!("Specifier type: {label}"));

    let outcome = match kind {
        SpecifierKind::Url => Outcome::unchanged(UnchangedReason::Url),
        SpecifierKind::Builtin => Outcome::unchanged(UnchangedReason::Builtin),
        SpecifierKind::Unrecognized => Outcome::unchanged(UnchangedReason::Unrecognized),
        SpecifierKind::FilePath => rewrite_file(text, ctx, trace)?,
        SpecifierKind::BarePackage {
            package_name,
            sub_path,
        } if sub_path.is_empty() => rewrite_package_root(text, package_name, ctx, trace)?,
        SpecifierKind::BarePackage {
            package_name,
            sub_path,
        } => rewrite_submodule(text, package_name, sub_path, ctx, trace)?,
    };

    if let Outcome::Rewritten { specifier } = &outcome {
        trace.success(steps::FINAL_SPECIFIER, specifier.clone());
    }

    Ok(Rewrite {
        original: text.to_string(),
        kind: label,
        outcome,
    })
}

fn rewrite_file(
    text: &str,
    ctx: &ResolutionContext<'_>,
    trace: &mut ResolveTrace,
) -> Result<Outcome, Error> {
    let base = ctx.file_dir().join(text);
    trace.add(
        ResolveTraceStep::new(steps::RESOLVE_RELATIVE, true, "Joined onto importing directory")
            .with_path(&base),
    );

    let probe = resolve_extension(&base, &ctx.options.extensions, ProbeMode::Expand, trace);
    apply_policy(text, &probe, ctx.options.ignore_unresolved, || {
        Error::UnresolvedPath {
            specifier: text.to_string(),
            base: base.clone(),
        }
    })
}

fn rewrite_submodule(
    text: &str,
    package_name: &str,
    sub_path: &str,
    ctx: &ResolutionContext<'_>,
    trace: &mut ResolveTrace,
) -> Result<Outcome, Error> {
    let package_dir = locate_package_dir(package_name, &ctx.file, &ctx.global_dirs, trace)?;

    if ctx.options.submodule_ignore_exports {
        if let Some(manifest) = PackageManifest::load_optional(&package_dir)? {
            if manifest.has_exports() {
                trace.add(
                    ResolveTraceStep::new(
                        steps::CHECK_EXPORTS,
                        true,
                        "Manifest declares exports; leaving specifier to the runtime",
                    )
                    .with_path(manifest.path())
                    .with_key(EXPORTS_KEY),
                );
                return Ok(Outcome::unchanged(UnchangedReason::ExportsMap));
            }
        }
    }

    let mut base = OsString::from(package_dir.as_os_str());
    base.push(sub_path);
    let base = PathBuf::from(base);

    let probe = resolve_extension(
        &base,
        &ctx.options.submodule_extensions,
        ProbeMode::Probe,
        trace,
    );
    apply_policy(text, &probe, ctx.options.ignore_unresolved, || {
        Error::UnresolvedModule {
            specifier: text.to_string(),
            file: ctx.file.clone(),
        }
    })
}

fn rewrite_package_root(
    text: &str,
    package_name: &str,
    ctx: &ResolutionContext<'_>,
    trace: &mut ResolveTrace,
) -> Result<Outcome, Error> {
    let package_dir = locate_package_dir(package_name, &ctx.file, &ctx.global_dirs, trace)?;

    if ctx.options.entry.is_empty() {
        trace.success(steps::RESOLVE_ENTRY, "No entry descriptors configured");
        return Ok(Outcome::unchanged(UnchangedReason::EntryKept));
    }

    let entry = resolve_entry(
        text,
        &package_dir,
        &ctx.options.entry,
        ctx.options.module_ignore_exports,
        trace,
    )?;

    Ok(match entry {
        Some(specifier) => Outcome::Rewritten { specifier },
        None => Outcome::unchanged(UnchangedReason::EntryKept),
    })
}

fn apply_policy(
    text: &str,
    probe: &Probe,
    ignore_unresolved: bool,
    unresolved: impl FnOnce() -> Error,
) -> Result<Outcome, Error> {
    match probe {
        Probe::NotFound if ignore_unresolved => Ok(Outcome::unchanged(UnchangedReason::Unresolved)),
        Probe::NotFound => Err(unresolved()),
        Probe::AlreadyCorrect => Ok(Outcome::unchanged(UnchangedReason::AlreadyCorrect)),
        found => Ok(Outcome::Rewritten {
            specifier: found.apply(text).unwrap_or_else(|| text.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{EntryDescriptor, ExtensionRule, ExtensionRules};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn keep(exts: &[&str]) -> ExtensionRules {
        ExtensionRules::new(exts.iter().map(|e| ExtensionRule::keep(*e)).collect())
    }

    fn rewrite(dir: &TempDir, text: &str, options: &ResolveOptions) -> Result<Rewrite, Error> {
        let ctx = ResolutionContext::new(dir.path().join("import.mjs"), options)
            .with_global_dirs(Vec::new());
        rewrite_specifier(text, &ctx)
    }

    fn install(dir: &TempDir, name: &str, manifest: &str) -> PathBuf {
        let pkg = dir.path().join("node_modules").join(name);
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("package.json"), manifest).unwrap();
        pkg
    }

    #[test]
    fn test_relative_appends_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bar.mjs"), "").unwrap();

        let options = ResolveOptions::default().with_extensions(keep(&[".mjs"]));
        let result = rewrite(&dir, "./bar", &options).unwrap();
        assert_eq!(result.specifier(), "./bar.mjs");
        assert!(result.is_changed());
        assert_eq!(result.kind, "file");
    }

    #[test]
    fn test_relative_renames_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bar.mjs"), "").unwrap();

        let options = ResolveOptions::default()
            .with_extensions(ExtensionRules::new(vec![ExtensionRule::rename([".mjs"], ".js")]));
        let result = rewrite(&dir, "./bar", &options).unwrap();
        assert_eq!(result.specifier(), "./bar.js");
    }

    #[test]
    fn test_existing_extension_is_replaced() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bar.ts"), "").unwrap();

        let options = ResolveOptions::default()
            .with_extensions(ExtensionRules::new(vec![ExtensionRule::rename([".ts"], ".js")]));
        let result = rewrite(&dir, "./bar.ts", &options).unwrap();
        assert_eq!(result.specifier(), "./bar.js");
    }

    #[test]
    fn test_fully_qualified_is_idempotent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bar.mjs"), "").unwrap();

        let options = ResolveOptions::default().with_extensions(keep(&[".mjs"]));
        let result = rewrite(&dir, "./bar.mjs", &options).unwrap();
        assert_eq!(
            result.outcome,
            Outcome::Unchanged {
                reason: UnchangedReason::AlreadyCorrect
            }
        );
        assert_eq!(result.specifier(), "./bar.mjs");
        assert!(!result.is_changed());
    }

    #[test]
    fn test_missing_file_fails_or_is_ignored() {
        let dir = tempdir().unwrap();
        let options = ResolveOptions::default().with_extensions(keep(&[".js"]));

        let err = rewrite(&dir, "./missing", &options).unwrap_err();
        match err {
            Error::UnresolvedPath { specifier, base } => {
                assert_eq!(specifier, "./missing");
                assert!(base.ends_with("missing"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let options = options.with_ignore_unresolved(true);
        let result = rewrite(&dir, "./missing", &options).unwrap();
        assert_eq!(result.specifier(), "./missing");
        assert_eq!(
            result.outcome,
            Outcome::Unchanged {
                reason: UnchangedReason::Unresolved
            }
        );
    }

    #[test]
    fn test_parent_directory_index() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("index.js"), "").unwrap();

        let options = ResolveOptions::default().with_extensions(keep(&[".js"]));
        let ctx =
            ResolutionContext::new(sub.join("a.js"), &options).with_global_dirs(Vec::new());
        let result = rewrite_specifier("..", &ctx).unwrap();
        assert_eq!(result.specifier(), "../index.js");
    }

    #[test]
    fn test_url_and_builtin_untouched() {
        let dir = tempdir().unwrap();
        let options = ResolveOptions::default().with_extensions(keep(&[".js"]));

        let result = rewrite(&dir, "https://example.com/x.js", &options).unwrap();
        assert_eq!(
            result.outcome,
            Outcome::Unchanged {
                reason: UnchangedReason::Url
            }
        );

        let result = rewrite(&dir, "path", &options).unwrap();
        assert_eq!(
            result.outcome,
            Outcome::Unchanged {
                reason: UnchangedReason::Builtin
            }
        );

        let result = rewrite(&dir, "node:fs/promises", &options).unwrap();
        assert_eq!(result.specifier(), "node:fs/promises");
    }

    #[test]
    fn test_submodule_probe() {
        let dir = tempdir().unwrap();
        let pkg = install(&dir, "@scope/pkg", "{}");
        fs::create_dir(pkg.join("lib")).unwrap();
        fs::write(pkg.join("lib").join("bar.js"), "").unwrap();

        let options = ResolveOptions::default().with_submodule_extensions(keep(&[".js"]));
        let result = rewrite(&dir, "@scope/pkg/lib/bar", &options).unwrap();
        assert_eq!(result.specifier(), "@scope/pkg/lib/bar.js");
        assert_eq!(result.kind, "submodule");
    }

    #[test]
    fn test_submodule_unresolved() {
        let dir = tempdir().unwrap();
        install(&dir, "dep", "{}");

        let options = ResolveOptions::default().with_submodule_extensions(keep(&[".js"]));
        let err = rewrite(&dir, "dep/missing", &options).unwrap_err();
        assert!(matches!(err, Error::UnresolvedModule { .. }));

        let options = options.with_ignore_unresolved(true);
        let result = rewrite(&dir, "dep/missing", &options).unwrap();
        assert_eq!(result.specifier(), "dep/missing");
    }

    #[test]
    fn test_submodule_ignore_exports() {
        let dir = tempdir().unwrap();
        let pkg = install(&dir, "dep", r#"{"exports": {"./lib/*": "./lib/*.js"}}"#);
        fs::create_dir(pkg.join("lib")).unwrap();
        fs::write(pkg.join("lib").join("bar.js"), "").unwrap();

        let options = ResolveOptions::default()
            .with_submodule_extensions(keep(&[".js"]))
            .with_ignore_exports(true);
        let result = rewrite(&dir, "dep/lib/bar", &options).unwrap();
        assert_eq!(
            result.outcome,
            Outcome::Unchanged {
                reason: UnchangedReason::ExportsMap
            }
        );
    }

    #[test]
    fn test_package_not_found_ignores_policy() {
        let dir = tempdir().unwrap();
        let options = ResolveOptions::default()
            .with_submodule_extensions(keep(&[".js"]))
            .with_ignore_unresolved(true);
        let err = rewrite(&dir, "resolvext-absent-pkg/sub", &options).unwrap_err();
        assert!(matches!(err, Error::PackageNotFound { .. }));
    }

    #[test]
    fn test_package_root_entry() {
        let dir = tempdir().unwrap();
        let pkg = install(&dir, "my-pkg", r#"{"main": "lib/index"}"#);
        fs::create_dir(pkg.join("lib")).unwrap();
        fs::write(pkg.join("lib").join("index.js"), "").unwrap();

        let options = ResolveOptions::default().with_entry(vec![EntryDescriptor::ManifestField {
            field: "main".to_string(),
            extensions: keep(&[".js"]),
        }]);
        let result = rewrite(&dir, "my-pkg", &options).unwrap();
        assert_eq!(result.specifier(), "my-pkg/lib/index.js");
        assert_eq!(result.kind, "package");
    }

    #[test]
    fn test_package_root_without_entry_config_is_untouched() {
        let dir = tempdir().unwrap();
        install(&dir, "my-pkg", r#"{"main": "lib/index"}"#);
        let result = rewrite(&dir, "my-pkg", &ResolveOptions::default()).unwrap();
        assert_eq!(
            result.outcome,
            Outcome::Unchanged {
                reason: UnchangedReason::EntryKept
            }
        );
    }

    #[test]
    fn test_missing_root_package_fails_without_entry_config() {
        let dir = tempdir().unwrap();
        let options = ResolveOptions::default().with_ignore_unresolved(true);
        let err = rewrite(&dir, "resolvext-absent-pkg", &options).unwrap_err();
        assert!(matches!(err, Error::PackageNotFound { .. }));
        assert_eq!(err.code(), "PACKAGE_NOT_FOUND");
    }

    #[test]
    fn test_explain_records_steps() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bar.js"), "").unwrap();

        let options = ResolveOptions::default().with_extensions(keep(&[".mjs", ".js"]));
        let ctx = ResolutionContext::new(dir.path().join("import.mjs"), &options);
        let (result, trace) = explain_specifier("./bar", &ctx);
        assert_eq!(result.unwrap().specifier(), "./bar.js");

        let names: Vec<_> = trace.steps.iter().map(|s| s.step).collect();
        assert_eq!(names.first(), Some(&steps::CLASSIFY_SPECIFIER));
        assert_eq!(names.last(), Some(&steps::FINAL_SPECIFIER));
        assert!(trace
            .steps
            .iter()
            .any(|s| s.step == steps::PROBE_EXTENSION && !s.ok));
    }

    #[test]
    fn test_rewrite_serializes_flat() {
        let value = Rewrite {
            original: "./a".to_string(),
            kind: "file",
            outcome: Outcome::Rewritten {
                specifier: "./a.js".to_string(),
            },
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["status"], "rewritten");
        assert_eq!(json["specifier"], "./a.js");
        assert_eq!(json["original"], "./a");
    }
}
