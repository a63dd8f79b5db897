use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File extensions treated as JavaScript/TypeScript sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// Directory names never descended into.
const SKIP_DIRS: &[&str] = &["node_modules"];

/// Check whether `path` has a source file extension.
#[must_use]
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref())
}

/// Collect source files under the given roots.
///
/// A root that is a file is included as-is, whatever its extension.
/// Directories are walked recursively, skipping `node_modules` and hidden
/// directories. The result is sorted and deduplicated.
///
/// # Errors
/// Returns an error if a root does not exist or a directory cannot be read.
pub fn collect_source_files<P: AsRef<Path>>(roots: &[P]) -> io::Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for root in roots {
        let root = root.as_ref();
        let meta = std::fs::metadata(root)?;

        if meta.is_file() {
            files.insert(root.to_path_buf());
            continue;
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e))
        {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() && is_source_file(entry.path()) {
                files.insert(entry.into_path());
            }
        }
    }

    Ok(files.into_iter().collect())
}
