use std::path::{Path, PathBuf};

use crate::adapters::cipher::age_backend::AgeBackend;
use crate::adapters::cipher::pgp_backend::PgpBackend;
use crate::config::app_config::{AppConfig, ConfigLayout};
use crate::core::errors::{Result, SendtoError};
use crate::core::models::identity::Identity;
use crate::core::traits::cipher::SealBackend;

/// Everything a command needs, loaded once from the command line and
/// `config.toml` and then only read.
pub struct Context {
    pub layout: ConfigLayout,
    pub config: AppConfig,
    pub backend: Box<dyn SealBackend>,
}

impl Context {
    /// Resolve the config root, load the config and pick the backend.
    ///
    /// `cipher` overrides the backend named in the config file.
    pub fn load(config_dir: Option<&Path>, cipher: Option<&str>) -> Result<Self> {
        let root = config_root(config_dir)?;
        let config = AppConfig::load(&root)?;
        let backend = select_backend(cipher.unwrap_or(&config.cipher))?;

        Ok(Self {
            layout: ConfigLayout::new(root),
            config,
            backend,
        })
    }

    /// The configured sender as a validated identity.
    pub fn sender(&self) -> Result<Identity> {
        Identity::new(&self.config.sender).map_err(|e| SendtoError::InvalidConfig {
            detail: format!("sender in config.toml is not usable: {e}"),
        })
    }
}

/// `--config-dir` / `SENDTO_HOME` when given, else `~/.sendto`.
pub fn config_root(config_dir: Option<&Path>) -> Result<PathBuf> {
    match config_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => ConfigLayout::default_root(),
    }
}

/// Map a backend name to its implementation.
pub fn select_backend(name: &str) -> Result<Box<dyn SealBackend>> {
    match name {
        "pgp" | "gpg" => Ok(Box::new(PgpBackend::new())),
        "age" => Ok(Box::new(AgeBackend::new())),
        other => Err(SendtoError::InvalidConfig {
            detail: format!("Unknown cipher backend: '{other}'. Use 'pgp' or 'age'."),
        }),
    }
}

/// Check every input path exists before any key is fetched.
pub fn validate_paths(paths: &[PathBuf]) -> Result<()> {
    if paths.is_empty() {
        return Err(SendtoError::InvalidInput {
            detail: "at least one file or folder is required\n\n  \
                     Usage: sendto <recipient> <files...>"
                .into(),
        });
    }
    for path in paths {
        if std::fs::symlink_metadata(path).is_err() {
            return Err(SendtoError::InvalidInput {
                detail: format!("{} does not exist", path.display()),
            });
        }
    }
    Ok(())
}
