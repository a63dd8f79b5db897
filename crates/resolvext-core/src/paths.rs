use std::path::{Path, PathBuf};

/// Name of the options file looked up by [`find_config_file`].
pub const CONFIG_FILE: &str = "resolvext.json";

/// Find the nearest options file by walking up from `cwd`.
///
/// Returns the path of the first `resolvext.json` found, or `None` if no
/// ancestor has one.
#[must_use]
pub fn find_config_file(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_config_in_cwd() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();

        let found = find_config_file(dir.path()).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
    }

    #[test]
    fn test_find_config_in_ancestor() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
        let nested = dir.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
    }

    #[test]
    fn test_nearest_config_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
        let nested = dir.path().join("pkg");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join(CONFIG_FILE), "{}").unwrap();

        assert_eq!(find_config_file(&nested).unwrap(), nested.join(CONFIG_FILE));
    }

    #[test]
    fn test_directory_named_like_config_is_ignored() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a");
        fs::create_dir_all(nested.join(CONFIG_FILE)).unwrap();

        // Only a file counts; a same-named directory is skipped.
        let found = find_config_file(&nested);
        assert_ne!(found, Some(nested.join(CONFIG_FILE)));
    }
}
