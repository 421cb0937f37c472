use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info};
use yup_oauth2::storage::{TokenInfo, TokenStorage};
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::sheets::SheetsClient;
use crate::token::{load_credential, save_credential, Credential, TokenStoreError};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to read OAuth client secret {path}: {source}")]
    ClientSecret { path: String, source: io::Error },
    #[error("Authorization flow failed: {0}")]
    Flow(yup_oauth2::Error),
    #[error("Failed to refresh credential: {0}")]
    Refresh(yup_oauth2::Error),
    #[error("Authorization finished without an access token")]
    NoAccessToken,
    #[error(transparent)]
    Store(#[from] TokenStoreError),
    #[error("Failed to build Sheets client: {0}")]
    Connector(io::Error),
}

/// Source of fresh credentials when the stored one cannot be used as-is.
pub trait AuthorizationFlow {
    /// Runs the interactive consent flow.
    async fn authorize(&self, scopes: &[&str]) -> Result<Credential, AuthError>;

    /// Exchanges the refresh token of an expired credential.
    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError>;
}

/// Load, validate, refresh or re-authorize, then persist the credential.
pub async fn establish_session<F: AuthorizationFlow>(
    token_path: &Path,
    flow: &F,
    scopes: &[&str],
) -> Result<Credential, AuthError> {
    let now = Utc::now();
    let credential = match load_credential(token_path)? {
        Some(stored) if stored.is_valid(now, scopes) => {
            debug!("Stored credential is valid");
            return Ok(stored);
        }
        Some(stored) if stored.is_expired(now) && stored.can_refresh(scopes) => {
            info!("Stored credential expired, refreshing");
            flow.refresh(&stored).await?
        }
        _ => {
            info!("No usable credential, starting authorization flow");
            flow.authorize(scopes).await?
        }
    };

    save_credential(token_path, &credential)?;
    Ok(credential)
}

/// Produces an authorized Sheets v4 client bound to one spreadsheet.
pub async fn open_session<F: AuthorizationFlow>(
    token_path: &Path,
    flow: &F,
    spreadsheet_id: &str,
) -> Result<SheetsClient, AuthError> {
    info!("Initializing Google Sheets authentication");
    let credential = establish_session(token_path, flow, &[SHEETS_SCOPE]).await?;
    SheetsClient::connect(spreadsheet_id, &credential).map_err(|e| {
        error!("Failed to build Sheets client: {}", e);
        AuthError::Connector(e)
    })
}

/// Installed-application OAuth flow backed by `yup-oauth2`.
pub struct InstalledFlow {
    secret_path: PathBuf,
}

impl InstalledFlow {
    pub fn new(secret_path: impl Into<PathBuf>) -> Self {
        Self {
            secret_path: secret_path.into(),
        }
    }

    async fn issue(
        &self,
        scopes: &[&str],
        seed: Option<TokenInfo>,
    ) -> Result<Option<TokenInfo>, yup_oauth2::Error> {
        let secret = yup_oauth2::read_application_secret(&self.secret_path).await?;
        let storage = CapturedToken::seeded(seed);
        let authenticator =
            InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                .with_storage(Box::new(storage.clone()))
                .build()
                .await?;
        authenticator.token(scopes).await?;
        Ok(storage.take())
    }

    fn check_secret(&self) -> Result<(), AuthError> {
        if self.secret_path.exists() {
            return Ok(());
        }
        Err(AuthError::ClientSecret {
            path: self.secret_path.display().to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "client secret file not found"),
        })
    }
}

impl AuthorizationFlow for InstalledFlow {
    async fn authorize(&self, scopes: &[&str]) -> Result<Credential, AuthError> {
        self.check_secret()?;
        let info = self.issue(scopes, None).await.map_err(AuthError::Flow)?;
        into_credential(info, None, scopes)
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError> {
        self.check_secret()?;
        let scopes: Vec<&str> = credential.scopes.iter().map(String::as_str).collect();
        // No access token forces the authenticator down its refresh path.
        let seed = TokenInfo {
            access_token: None,
            refresh_token: credential.refresh_token.clone(),
            expires_at: None,
            id_token: None,
        };
        let info = self
            .issue(&scopes, Some(seed))
            .await
            .map_err(AuthError::Refresh)?;
        into_credential(info, credential.refresh_token.clone(), &scopes)
    }
}

fn into_credential(
    info: Option<TokenInfo>,
    previous_refresh_token: Option<String>,
    scopes: &[&str],
) -> Result<Credential, AuthError> {
    let info = info.ok_or(AuthError::NoAccessToken)?;
    let access_token = info.access_token.ok_or(AuthError::NoAccessToken)?;
    let expiry = info
        .expires_at
        .and_then(|at| DateTime::<Utc>::from_timestamp(at.unix_timestamp(), 0));
    Ok(Credential {
        access_token,
        refresh_token: info.refresh_token.or(previous_refresh_token),
        expiry,
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
    })
}

/// In-memory token storage that keeps whatever the authenticator issues.
#[derive(Clone)]
struct CapturedToken(Arc<Mutex<Option<TokenInfo>>>);

impl CapturedToken {
    fn seeded(seed: Option<TokenInfo>) -> Self {
        Self(Arc::new(Mutex::new(seed)))
    }

    fn take(&self) -> Option<TokenInfo> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

#[async_trait]
impl TokenStorage for CapturedToken {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        let mut slot = self
            .0
            .lock()
            .map_err(|_| anyhow::anyhow!("token storage lock poisoned"))?;
        *slot = Some(token);
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        self.0.lock().ok().and_then(|slot| slot.clone())
    }
}
