use std::fs;
use std::io;
use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Cfg {
    /// File whose first line is the target spreadsheet id
    pub ssid_path: String,
    /// OAuth client secret for the installed-app flow
    pub credentials_path: String,
    /// Persisted user credential
    pub token_path: String,
    pub catalog_url: String,
    pub problem_url_base: String,
}

#[derive(Error, Debug)]
pub enum SsidError {
    #[error("ssid file not found: {0}")]
    Missing(String),
    #[error("Failed to read ssid file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("ssid file {0} is empty")]
    Empty(String),
}

impl Cfg {
    pub fn load(config_path: &str) -> Result<Self> {
        info!("Loading configuration from: {}", config_path);

        let defaults = Cfg::default();
        let cfg: Cfg = Config::builder()
            .set_default("ssid_path", defaults.ssid_path)?
            .set_default("credentials_path", defaults.credentials_path)?
            .set_default("token_path", defaults.token_path)?
            .set_default("catalog_url", defaults.catalog_url)?
            .set_default("problem_url_base", defaults.problem_url_base)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("LEET_SHEET"))
            .build()?
            .try_deserialize()?;

        debug!("Final configuration: {:?}", cfg);
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("ssid_path", &self.ssid_path),
            ("credentials_path", &self.credentials_path),
            ("token_path", &self.token_path),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", key);
            }
        }
        for (key, value) in [
            ("catalog_url", &self.catalog_url),
            ("problem_url_base", &self.problem_url_base),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                anyhow::bail!("{} must be an http(s) URL, got {:?}", key, value);
            }
        }
        Ok(())
    }
}

impl Default for Cfg {
    fn default() -> Self {
        Self {
            ssid_path: "ssid".to_string(),
            credentials_path: "credentials.json".to_string(),
            token_path: "token.json".to_string(),
            catalog_url: "https://leetcode.com/api/problems/all".to_string(),
            problem_url_base: "https://leetcode.com/problems".to_string(),
        }
    }
}

/// First line of the ssid file, stripped of spaces and newlines.
pub fn read_ssid(path: &Path) -> Result<String, SsidError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(SsidError::Missing(display));
    }

    let content = fs::read_to_string(path).map_err(|source| SsidError::Read {
        path: display.clone(),
        source,
    })?;
    let id = content
        .lines()
        .next()
        .unwrap_or_default()
        .trim_matches(|c| c == ' ' || c == '\r')
        .to_string();
    if id.is_empty() {
        return Err(SsidError::Empty(display));
    }

    debug!("Target spreadsheet: {}", id);
    Ok(id)
}
