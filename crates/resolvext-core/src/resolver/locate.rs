//! Package directory lookup.
//!
//! Walks `node_modules` directories from the importing file upward, so the
//! nearest installation of a package shadows any further up the tree.

use super::trace::{steps, ResolveTrace, ResolveTraceStep};
use crate::error::Error;
use std::path::{Path, PathBuf};

/// Name of the conventional dependency directory.
pub const NODE_MODULES: &str = "node_modules";

/// Environment variable listing extra global module directories.
pub const NODE_PATH_ENV: &str = "NODE_PATH";

/// Global module directories consulted after the ancestor chain.
///
/// Order: each `NODE_PATH` entry, then `~/.node_modules`, then `~/.node_libraries`.
#[must_use]
pub fn default_global_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::env::var_os(NODE_PATH_ENV)
        .map(|v| {
            std::env::split_paths(&v)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();

    if let Some(home) = dirs_next::home_dir() {
        dirs.push(home.join(".node_modules"));
        dirs.push(home.join(".node_libraries"));
    }

    dirs
}

/// Find the directory of package `name` as seen from `from_file`.
///
/// # Errors
/// Returns `PackageNotFound` if no ancestor `node_modules` or global
/// directory contains it.
pub fn locate_package_dir(
    name: &str,
    from_file: &Path,
    global_dirs: &[PathBuf],
    trace: &mut ResolveTrace,
) -> Result<PathBuf, Error> {
    let start = from_file.parent().unwrap_or(Path::new("/"));
    let mut current = Some(start);

    while let Some(dir) = current {
        let candidate = dir.join(NODE_MODULES).join(name);
        if candidate.is_dir() {
            trace.add(
                ResolveTraceStep::new(
                    steps::FIND_PACKAGE_DIR,
                    true,
                    format!("Found package directory for {name}"),
                )
                .with_path(&candidate),
            );
            return Ok(candidate);
        }
        trace.add(
            ResolveTraceStep::new(steps::SEARCH_NODE_MODULES, false, "Not here")
                .with_path(&candidate),
        );

        current = dir.parent();
    }

    for global in global_dirs {
        let candidate = global.join(name);
        if candidate.is_dir() {
            trace.add(
                ResolveTraceStep::new(
                    steps::FIND_PACKAGE_DIR,
                    true,
                    format!("Found package directory for {name} in global directory"),
                )
                .with_path(&candidate),
            );
            return Ok(candidate);
        }
        trace.add(
            ResolveTraceStep::new(steps::SEARCH_GLOBAL_DIRS, false, "Not here")
                .with_path(&candidate),
        );
    }

    trace.failure(steps::FIND_PACKAGE_DIR, format!("Package {name} not found"));
    Err(Error::PackageNotFound {
        name: name.to_string(),
        from: from_file.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn locate(name: &str, from: &Path, globals: &[PathBuf]) -> Result<PathBuf, Error> {
        locate_package_dir(name, from, globals, &mut ResolveTrace::disabled())
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let dir = tempdir().unwrap();
        let outer = dir.path().join("node_modules").join("dep");
        let inner_root = dir.path().join("packages").join("app");
        let inner = inner_root.join("node_modules").join("dep");
        fs::create_dir_all(&outer).unwrap();
        fs::create_dir_all(&inner).unwrap();
        fs::create_dir_all(inner_root.join("src")).unwrap();

        let from = inner_root.join("src").join("main.js");
        assert_eq!(locate("dep", &from, &[]).unwrap(), inner);

        let from_outside = dir.path().join("main.js");
        assert_eq!(locate("dep", &from_outside, &[]).unwrap(), outer);
    }

    #[test]
    fn test_scoped_package() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("node_modules").join("@scope").join("pkg");
        fs::create_dir_all(&pkg).unwrap();

        let from = dir.path().join("index.js");
        assert_eq!(locate("@scope/pkg", &from, &[]).unwrap(), pkg);
    }

    #[test]
    fn test_file_named_like_package_is_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules").join("dep-file-only"), "").unwrap();

        let from = dir.path().join("index.js");
        let err = locate("dep-file-only", &from, &[]).unwrap_err();
        assert!(matches!(err, Error::PackageNotFound { .. }));
    }

    #[test]
    fn test_global_dirs_after_ancestors() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let global = dir.path().join("global");
        fs::create_dir_all(global.join("tool")).unwrap();

        let from = project.join("index.js");
        assert_eq!(
            locate("tool", &from, std::slice::from_ref(&global)).unwrap(),
            global.join("tool")
        );

        let local = project.join("node_modules").join("tool");
        fs::create_dir_all(&local).unwrap();
        assert_eq!(
            locate("tool", &from, std::slice::from_ref(&global)).unwrap(),
            local
        );
    }

    #[test]
    fn test_not_found_reports_name() {
        let dir = tempdir().unwrap();
        let err = locate("react-no-such-package", &dir.path().join("a.js"), &[]).unwrap_err();
        match err {
            Error::PackageNotFound { name, .. } => assert_eq!(name, "react-no-such-package"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trace_records_search() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("node_modules").join("dep");
        fs::create_dir_all(&pkg).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();

        let mut trace = ResolveTrace::new();
        let found =
            locate_package_dir("dep", &dir.path().join("src").join("a.js"), &[], &mut trace)
                .unwrap();
        assert_eq!(found, pkg);
        assert_eq!(trace.steps.first().unwrap().step, steps::SEARCH_NODE_MODULES);
        assert_eq!(trace.steps.last().unwrap().step, steps::FIND_PACKAGE_DIR);
    }
}
