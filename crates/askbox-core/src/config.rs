use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::provider::ProviderKind;

pub const ENDPOINT_ENV: &str = "ASKBOX_ENDPOINT";
pub const PROVIDER_ENV: &str = "ASKBOX_PROVIDER";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub provider: Option<String>,
    pub endpoint: Option<String>,
    pub latency_ms: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(ProviderKind::Stub.as_str().to_string()),
            endpoint: None,
            latency_ms: None,
        }
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Overlay values from the environment; `lookup` is `std::env::var` in
    /// practice.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        if let Some(provider) = lookup(PROVIDER_ENV).filter(|v| !v.trim().is_empty()) {
            self.provider = Some(provider);
        }
    }

    pub fn provider_kind(&self) -> Result<ProviderKind> {
        match self.provider.as_deref() {
            None => Ok(ProviderKind::Stub),
            Some(name) => ProviderKind::from_str(name)
                .ok_or_else(|| anyhow!("Unknown provider '{}' (expected stub or http)", name)),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency_ms
            .map(Duration::from_millis)
            .unwrap_or(crate::ai::stub::DEFAULT_LATENCY)
    }

    /// Default location: `<config_dir>/askbox/config.json`
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("askbox").join("config.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
