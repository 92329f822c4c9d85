//! Path resolution for configured files.
//!
//! Resolves relative and tilde-prefixed paths to absolute paths.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a configured path.
///
/// Handles three cases:
/// - Tilde paths (`~/runs`) - expanded to home directory
/// - Relative paths (`./queries.txt`, `../shared`) - resolved relative to `config_dir`
/// - Absolute paths - returned as-is
///
/// The path is not required to exist: output files are created by the run.
pub fn resolve_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(config_dir.join(expanded))
    }
}

/// Expands a tilde prefix to the home directory.
///
/// - `~` alone becomes the home directory
/// - `~/foo` becomes home directory joined with `foo`
/// - Paths not starting with `~` are returned unchanged
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }

    if let Some(rest) = path.strip_prefix("~/") {
        let home = home_dir()?;
        return Ok(home.join(rest));
    }

    Ok(PathBuf::from(path))
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_joins_config_dir() {
        let resolved = resolve_path("queries.txt", Path::new("/runs/a")).unwrap();
        assert_eq!(resolved, PathBuf::from("/runs/a/queries.txt"));

        let resolved = resolve_path("../shared/corpus.json", Path::new("/runs/a")).unwrap();
        assert_eq!(resolved, PathBuf::from("/runs/a/../shared/corpus.json"));
    }

    #[test]
    fn absolute_path_unchanged() {
        let resolved = resolve_path("/data/corpus.json", Path::new("/runs/a")).unwrap();
        assert_eq!(resolved, PathBuf::from("/data/corpus.json"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(dirs) = BaseDirs::new() else {
            return;
        };
        let resolved = resolve_path("~/corpus.json", Path::new("/runs")).unwrap();
        assert_eq!(resolved, dirs.home_dir().join("corpus.json"));
        assert_eq!(resolve_path("~", Path::new("/runs")).unwrap(), dirs.home_dir());
    }

    #[test]
    fn tilde_in_middle_is_literal() {
        let resolved = resolve_path("a~b", Path::new("/runs")).unwrap();
        assert_eq!(resolved, PathBuf::from("/runs/a~b"));
    }
}
