use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Expiry is treated as reached this long before the recorded instant.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Credential {
    #[serde(rename = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("Failed to read credential file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Failed to write credential file {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("Failed to serialize credential: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Credential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now,
            None => false,
        }
    }

    pub fn covers(&self, scopes: &[&str]) -> bool {
        scopes
            .iter()
            .all(|scope| self.scopes.iter().any(|granted| granted == scope))
    }

    pub fn is_valid(&self, now: DateTime<Utc>, scopes: &[&str]) -> bool {
        !self.access_token.is_empty() && !self.is_expired(now) && self.covers(scopes)
    }

    pub fn can_refresh(&self, scopes: &[&str]) -> bool {
        self.refresh_token.is_some() && self.covers(scopes)
    }
}

/// Loads a persisted credential. A missing or unparseable file yields `None`.
pub fn load_credential(token_path: &Path) -> Result<Option<Credential>, TokenStoreError> {
    if !token_path.exists() {
        info!("Credential file not found: {}", token_path.display());
        return Ok(None);
    }

    debug!("Loading credential from: {}", token_path.display());
    let content = fs::read_to_string(token_path).map_err(|source| TokenStoreError::Read {
        path: token_path.display().to_string(),
        source,
    })?;

    match serde_json::from_str::<Credential>(&content) {
        Ok(credential) => {
            debug!(
                "Loaded credential: expiry={:?}, refreshable={}",
                credential.expiry,
                credential.refresh_token.is_some()
            );
            Ok(Some(credential))
        }
        Err(e) => {
            warn!("Ignoring unreadable credential file {}: {}", token_path.display(), e);
            Ok(None)
        }
    }
}

pub fn save_credential(token_path: &Path, credential: &Credential) -> Result<(), TokenStoreError> {
    debug!("Saving credential to: {}", token_path.display());

    let write_err = |source| TokenStoreError::Write {
        path: token_path.display().to_string(),
        source,
    };
    if let Some(parent) = token_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let json = serde_json::to_string_pretty(credential)?;
    fs::write(token_path, json).map_err(write_err)?;

    info!("Saved credential to {}", token_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

    fn credential(expiry: Option<DateTime<Utc>>) -> Credential {
        Credential {
            access_token: "ya29.token".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expiry,
            scopes: vec![SCOPE.to_string()],
        }
    }

    #[test]
    fn test_validity() {
        let now = Utc::now();
        assert!(credential(Some(now + Duration::hours(1))).is_valid(now, &[SCOPE]));
        assert!(credential(None).is_valid(now, &[SCOPE]));
        assert!(!credential(Some(now - Duration::hours(1))).is_valid(now, &[SCOPE]));
        assert!(!credential(Some(now + Duration::seconds(30))).is_valid(now, &[SCOPE]));
        assert!(!credential(None).is_valid(now, &["https://www.googleapis.com/auth/drive"]));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");
        let original = credential(Some(Utc::now()));

        save_credential(&path, &original).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"token\""));

        assert_eq!(load_credential(&path).unwrap(), Some(original));
    }

    #[test]
    fn test_missing_and_corrupt_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        assert_eq!(load_credential(&path).unwrap(), None);

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_credential(&path).unwrap(), None);
    }
}
