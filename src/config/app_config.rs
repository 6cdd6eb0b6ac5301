use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, SendtoError};
use crate::core::models::identity::Identity;

/// Placeholder replaced by the recipient identity in the keyserver template.
pub const IDENTITY_PLACEHOLDER: &str = "{identity}";

/// Older printf-style placeholder, still accepted in templates.
const LEGACY_PLACEHOLDER: &str = "%s";

const DEFAULT_KEYSERVER: &str = "https://keybase.io/{identity}/key.asc";
const DEFAULT_SERVER: &str = "http://localhost:3000";
const DEFAULT_CIPHER: &str = "pgp";

/// Cipher backends this build understands.
pub const SUPPORTED_CIPHERS: &[&str] = &["pgp", "age"];

/// Top-level configuration read from `<config-root>/config.toml`.
///
/// Loaded once per process and passed by reference; nothing in the core
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default sender identity attached to submissions.
    #[serde(default = "default_sender")]
    pub sender: String,
    /// URL template used to fetch a recipient's public key.
    #[serde(default = "default_keyserver")]
    pub keyserver: String,
    /// Base URL of the delivery server.
    #[serde(default = "default_server")]
    pub server: String,
    /// Default cipher backend ("pgp" or "age").
    #[serde(default = "default_cipher")]
    pub cipher: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            keyserver: default_keyserver(),
            server: default_server(),
            cipher: default_cipher(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from `<config_root>/config.toml`.
    ///
    /// A missing file yields the defaults; nothing is written.
    pub fn load(config_root: &Path) -> Result<Self> {
        let config_path = ConfigLayout::new(config_root).config_file();
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&config_path).map_err(SendtoError::io_at(&config_path))?;
        let config: Self = toml::from_str(&content).map_err(|e| SendtoError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", config_path.display()),
        })?;
        config.validate()?;

        tracing::debug!(path = %config_path.display(), sender = %config.sender, "loaded config");
        Ok(config)
    }

    /// Write the configuration to `<config_root>/config.toml`.
    pub fn save(&self, config_root: &Path) -> Result<()> {
        self.validate()?;

        std::fs::create_dir_all(config_root).map_err(SendtoError::io_at(config_root))?;
        let config_path = ConfigLayout::new(config_root).config_file();
        let content = toml::to_string_pretty(self).map_err(|e| SendtoError::InvalidConfig {
            detail: format!("Failed to serialize config: {e}"),
        })?;
        std::fs::write(&config_path, content).map_err(SendtoError::io_at(&config_path))?;
        Ok(())
    }

    /// Check the values a hand-edited file could get wrong.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_CIPHERS.contains(&self.cipher.as_str()) {
            return Err(SendtoError::InvalidConfig {
                detail: format!(
                    "Unknown cipher backend: '{}'. Use 'pgp' or 'age'.",
                    self.cipher
                ),
            });
        }
        KeyLocator::new(&self.keyserver)?;
        if self.server.trim().is_empty() {
            return Err(SendtoError::InvalidConfig {
                detail: "server must not be empty".into(),
            });
        }
        Ok(())
    }

    /// The keyserver template as a locator.
    pub fn key_locator(&self) -> Result<KeyLocator> {
        KeyLocator::new(&self.keyserver)
    }

    /// Endpoint that accepts file submissions.
    pub fn submit_url(&self) -> String {
        format!("{}/files/create", self.server.trim_end_matches('/'))
    }
}

fn default_sender() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| Identity::new(u).is_ok())
        .unwrap_or_else(|| "anonymous".to_string())
}

fn default_keyserver() -> String {
    DEFAULT_KEYSERVER.to_string()
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_cipher() -> String {
    DEFAULT_CIPHER.to_string()
}

/// Where to fetch a key that is not cached: a URL template with the
/// identity substituted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLocator {
    template: String,
}

impl KeyLocator {
    pub fn new(template: &str) -> Result<Self> {
        if !template.contains(IDENTITY_PLACEHOLDER) && !template.contains(LEGACY_PLACEHOLDER) {
            return Err(SendtoError::InvalidConfig {
                detail: format!(
                    "keyserver template '{template}' has no {IDENTITY_PLACEHOLDER} placeholder"
                ),
            });
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    /// The concrete URL for `identity`.
    pub fn url_for(&self, identity: &Identity) -> String {
        self.template
            .replace(IDENTITY_PLACEHOLDER, identity.as_str())
            .replace(LEGACY_PLACEHOLDER, identity.as_str())
    }
}

/// Paths under the configuration root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    root: PathBuf,
}

impl ConfigLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/.sendto`, or an error if the home directory is unknown.
    pub fn default_root() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| SendtoError::InvalidConfig {
            detail: "Could not determine home directory. Use --config-dir.".into(),
        })?;
        Ok(home.join(".sendto"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Directory holding one subdirectory of cached keys per identity.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Directory holding one subdirectory of sealed artifacts per identity.
    pub fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }
}
