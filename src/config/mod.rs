//! Layered configuration.
//!
//! Priority, highest first:
//! 1. command-line flags (applied by the binary)
//! 2. `QRSTUDIO_STORE_DIR` / `QRSTUDIO_BACKEND`
//! 3. `{project_root}/.qrstudio/config.toml`
//! 4. `{user_dir}/config.toml` (e.g. `~/.config/qrstudio/config.toml`)
//! 5. built-in defaults
//!
//! Files merge field by field, so a project file may override only
//! `style.border` and inherit everything else.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::codec::{HexColor, StyleOptions};
use crate::history::Backend;
use crate::paths;

/// `[store]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StoreSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
}

/// `[style]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<u32>,
}

/// Parsed representation of one `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub store: StoreSection,
    pub style: StyleSection,
}

impl ConfigFile {
    /// Fill every field unset in `self` from `lower`.
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            store: StoreSection {
                dir: self.store.dir.or(lower.store.dir),
                backend: self.store.backend.or(lower.store.backend),
            },
            style: StyleSection {
                color: self.style.color.or(lower.style.color),
                background: self.style.background.or(lower.style.background),
                module_size: self.style.module_size.or(lower.style.module_size),
                border: self.style.border.or(lower.style.border),
            },
        }
    }
}

/// Try to load a config file from `path`. Returns `Ok(Some(config))` on success,
/// `Ok(None)` if the file does not exist, or `Err` for other I/O / parse errors.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or contains invalid TOML.
pub fn try_load_config(path: &Path) -> anyhow::Result<Option<ConfigFile>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("failed to read config file: {}", path.display())));
        }
    };
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(Some(config))
}

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    pub store_dir: PathBuf,
    pub backend: Backend,
    pub style: StyleOptions,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(paths::DEFAULT_STORE_DIR),
            backend: Backend::default(),
            style: StyleOptions::default(),
        }
    }
}

impl StudioConfig {
    /// Load configuration for a process running in `cwd`, using auto-detected
    /// paths and environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is unreadable or invalid, or an
    /// environment override has an unknown value.
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let project = paths::project_config_file(&paths::project_root_for(cwd));
        let global = paths::user_config_file();
        let mut config = Self::load_from(Some(&project), global.as_deref())?;
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from explicit paths. Useful for testing.
    /// Priority: project config → global config → defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if either file exists but cannot be parsed, or the
    /// merged style is out of range.
    pub fn load_from(project: Option<&Path>, global: Option<&Path>) -> anyhow::Result<Self> {
        let from_project = match project {
            Some(path) => try_load_config(path)?,
            None => None,
        };
        let from_global = match global {
            Some(path) => try_load_config(path)?,
            None => None,
        };
        let merged = from_project
            .unwrap_or_default()
            .or(from_global.unwrap_or_default());
        Self::from_file(merged)
    }

    /// Apply a merged config file over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting style is out of range.
    pub fn from_file(file: ConfigFile) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let style = StyleOptions {
            module_color: file.style.color.unwrap_or(defaults.style.module_color),
            background_color: file
                .style
                .background
                .unwrap_or(defaults.style.background_color),
            module_size: file.style.module_size.unwrap_or(defaults.style.module_size),
            border: file.style.border.unwrap_or(defaults.style.border),
        };
        style.validate().context("invalid [style] configuration")?;
        Ok(Self {
            store_dir: file.store.dir.unwrap_or(defaults.store_dir),
            backend: file.store.backend.unwrap_or(defaults.backend),
            style,
        })
    }

    /// Apply `QRSTUDIO_STORE_DIR` and `QRSTUDIO_BACKEND` when set and non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if `QRSTUDIO_BACKEND` names an unknown backend.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(dir) = std::env::var("QRSTUDIO_STORE_DIR")
            && !dir.is_empty()
        {
            self.store_dir = PathBuf::from(dir);
        }
        if let Ok(name) = std::env::var("QRSTUDIO_BACKEND")
            && !name.is_empty()
        {
            self.backend = Backend::parse(&name)
                .with_context(|| format!("QRSTUDIO_BACKEND: unknown backend {name:?}"))?;
        }
        Ok(())
    }

    /// Render the effective configuration in config-file syntax.
    ///
    /// # Errors
    ///
    /// Returns an error if TOML serialization fails.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        let file = ConfigFile {
            store: StoreSection {
                dir: Some(self.store_dir.clone()),
                backend: Some(self.backend),
            },
            style: StyleSection {
                color: Some(self.style.module_color),
                background: Some(self.style.background_color),
                module_size: Some(self.style.module_size),
                border: Some(self.style.border),
            },
        };
        toml::to_string(&file).context("serialize configuration")
    }
}

#[cfg(test)]
mod tests;
