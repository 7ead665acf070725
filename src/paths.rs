//! User-directory and project-root resolution.
//!
//! When `QRSTUDIO_HOME` is set, it replaces the platform-native config
//! directory. Project-local `.qrstudio/` directories are unaffected.
//!
//! Priority for the user-level base directory:
//!   1. `QRSTUDIO_HOME` env var (if set and non-empty)
//!   2. `dirs::config_dir().map(|d| d.join("qrstudio"))` (platform default)

use std::path::{Path, PathBuf};

/// Name of the store directory used when nothing else is configured.
pub const DEFAULT_STORE_DIR: &str = "saved_qr_codes";

/// Name of the per-project configuration directory.
pub const PROJECT_DIR: &str = ".qrstudio";

fn resolve_user_path(dirs_fallback: Option<PathBuf>) -> Option<PathBuf> {
    if let Ok(home) = std::env::var("QRSTUDIO_HOME")
        && !home.is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs_fallback
}

/// Returns the qrstudio user-level base directory (home of the global `config.toml`).
pub fn user_dir() -> Option<PathBuf> {
    resolve_user_path(dirs::config_dir().map(|d| d.join("qrstudio")))
}

/// Path of the global config file, if a user directory can be determined.
pub fn user_config_file() -> Option<PathBuf> {
    user_dir().map(|d| d.join("config.toml"))
}

/// Walk up from `dir` to find the nearest ancestor containing `.git` or `.qrstudio/`.
/// Falls back to `dir` itself if neither is found.
pub fn project_root_for(dir: &Path) -> PathBuf {
    let mut current = dir.to_path_buf();
    loop {
        if current.join(".git").exists() || current.join(PROJECT_DIR).is_dir() {
            return current;
        }
        if !current.pop() {
            break;
        }
    }
    dir.to_path_buf()
}

/// Path of the project config file for `project_root`.
pub fn project_config_file(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join("config.toml")
}
