//! Discovery and management of the `.docbind/` directory.
//!
//! The `.docbind/` directory holds `config.toml` and, when settings are kept
//! locally, `settings.json`.

use crate::config::ConfigError;
use std::path::{Path, PathBuf};

/// The name of the project metadata directory.
pub const DOCBIND_DIR_NAME: &str = ".docbind";

/// Environment variable that overrides directory discovery.
pub const DOCBIND_DIR_ENV: &str = "DOCBIND_DIR";

/// Walk up the directory tree from `start` looking for a `.docbind/` directory.
///
/// The `DOCBIND_DIR` environment variable is checked first. Returns `None`
/// if the filesystem root is reached without finding one.
///
/// # Examples
///
/// ```no_run
/// use docbind_config::project_dir::find_docbind_dir;
/// use std::path::Path;
///
/// if let Some(dir) = find_docbind_dir(Path::new(".")) {
///     println!("Found project dir at {}", dir.display());
/// }
/// ```
pub fn find_docbind_dir(start: &Path) -> Option<PathBuf> {
    if let Ok(env_dir) = std::env::var(DOCBIND_DIR_ENV) {
        let env_path = PathBuf::from(&env_dir);
        if env_path.is_dir() {
            return Some(env_path);
        }
    }

    let start = start.canonicalize().ok()?;
    let mut current = start.as_path();
    loop {
        let candidate = current.join(DOCBIND_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent;
            }
            _ => break,
        }
    }

    None
}

/// Ensure a `.docbind/` directory exists at (or under) `path`.
///
/// Returns the path to the `.docbind/` directory.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if directory creation fails.
pub fn ensure_docbind_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let dir = if path.ends_with(DOCBIND_DIR_NAME) {
        path.to_path_buf()
    } else {
        path.join(DOCBIND_DIR_NAME)
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
