use std::{fs, io, path::Path};

use chrono::{DateTime, Duration, Utc};
use gym_catalog_domain::{AuthToken, Role, StorageError, TokenIssuer};
use uuid::Uuid;

/// Issues random opaque tokens valid for a fixed lifetime.
#[derive(Debug)]
pub struct LocalIssuer {
    ttl: Duration,
}

impl LocalIssuer {
    #[must_use]
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl: i64::try_from(ttl_seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }
}

impl TokenIssuer for LocalIssuer {
    fn issue_token(&self, role: Role, now: DateTime<Utc>) -> Result<AuthToken, StorageError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| StorageError::Other("token lifetime out of range".into()))?;
        Ok(AuthToken {
            token: Uuid::new_v4().simple().to_string(),
            role,
            expires_at,
        })
    }
}

/// Reads the token issued by an earlier run. A missing file yields `None`.
pub fn load(path: &Path) -> Result<Option<AuthToken>, Error> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn save(path: &Path, token: &AuthToken) -> Result<(), Error> {
    fs::write(path, serde_json::to_string_pretty(token)?)?;
    Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
