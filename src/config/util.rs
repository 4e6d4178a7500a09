//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from a starting directory
///
/// Walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/icons/sheets/     ← start
/// /home/user/icons/iconsplit.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    // An absolute path is taken as-is
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    // Walk up from start looking for config file
    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        // Move to parent directory
        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

/// Expand `~` and anchor relative paths at `root`.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    if path.is_relative() {
        root.join(path)
    } else {
        path
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("iconsplit.toml"), "").unwrap();

        let found = find_config_file(Path::new("iconsplit.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("iconsplit.toml"));
        assert!(find_config_file(Path::new("missing.toml"), &nested).is_none());
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(
            resolve_path(Path::new("icons.json"), root),
            PathBuf::from("/project/icons.json")
        );
        assert_eq!(
            resolve_path(Path::new("/var/icons.json"), root),
            PathBuf::from("/var/icons.json")
        );
    }
}
