use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::schema::{PeerlinkConfig, WarningSeverity};

/// Loads and reloads the peerlink configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<PeerlinkConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > PEERLINK_CONFIG env > ~/.peerlink/peerlink.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("PEERLINK_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".peerlink")
            .join("peerlink.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> peerlink_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read_file(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            PeerlinkConfig::default()
        };

        let config = Self::apply_env_overrides(config);
        Self::check(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Build a loader around an in-memory config (no file backing).
    pub fn from_config(config: PeerlinkConfig) -> peerlink_core::Result<Self> {
        Self::check(&config)?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: PathBuf::new(),
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> PeerlinkConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<PeerlinkConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (PEERLINK_ENDPOINT_NAME, PEERLINK_LOG_LEVEL).
    fn apply_env_overrides(mut config: PeerlinkConfig) -> PeerlinkConfig {
        if let Ok(v) = std::env::var("PEERLINK_ENDPOINT_NAME") {
            config.endpoint.name = v;
        }
        if let Ok(v) = std::env::var("PEERLINK_LOG_LEVEL") {
            config.logging.level = v;
        }
        config
    }

    /// Validate — log warnings, fail on errors.
    fn check(config: &PeerlinkConfig) -> peerlink_core::Result<()> {
        let warnings = config.validate().map_err(peerlink_core::PeerError::Config)?;
        for w in &warnings {
            if w.severity == WarningSeverity::Info {
                debug!("{}", w);
            } else {
                warn!("{}", w);
            }
        }
        Ok(())
    }

    fn read_file(path: &Path) -> peerlink_core::Result<PeerlinkConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<PeerlinkConfig>(&raw).map_err(|e| {
            peerlink_core::PeerError::Config(format!(
                "failed to parse {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Reload the config from disk. The current config is kept if the new one is invalid.
    pub fn reload(&self) -> peerlink_core::Result<()> {
        if !self.config_path.exists() {
            return Err(peerlink_core::PeerError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::apply_env_overrides(Self::read_file(&self.config_path)?);
        Self::check(&new_config)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}
