use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::{CatalogError, MessageKey, MessageResolver, StorageError};

/// Issues a fresh access token. Signing happens behind this boundary.
pub trait TokenIssuer {
    fn issue_token(&self, role: Role, now: DateTime<Utc>) -> Result<AuthToken, StorageError>;
}

#[derive(
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Developer,
}

/// What a caller wants to do with the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any authenticated caller may read.
    Read,
    /// Only developers may create, change or delete.
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    #[must_use]
    pub fn permits(&self, access: Access) -> bool {
        match access {
            Access::Read => true,
            Access::Write => self.role == Role::Developer,
        }
    }
}

/// The token handed out to clients. One writer refreshes it on a schedule,
/// any number of readers fetch it concurrently.
#[derive(Debug, Default)]
pub struct TokenCache {
    current: RwLock<Option<AuthToken>>,
}

impl TokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(
        &self,
        issuer: &impl TokenIssuer,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<AuthToken, StorageError> {
        let token = issuer.issue_token(role, now).inspect_err(|err| {
            error!("failed to issue token: {err}");
        })?;
        self.restore(token.clone());
        debug!("refreshed {role} token, expires at {}", token.expires_at);
        Ok(token)
    }

    /// Replaces the cached token with one issued earlier.
    pub fn restore(&self, token: AuthToken) {
        match self.current.write() {
            Ok(mut current) => *current = Some(token),
            Err(poisoned) => *poisoned.into_inner() = Some(token),
        }
    }

    /// Returns the cached token unless it is missing or expired.
    #[must_use]
    pub fn current(&self, now: DateTime<Utc>) -> Option<AuthToken> {
        let current = match self.current.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        current.filter(|token| !token.is_expired(now))
    }

    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.current(now).is_none()
    }

    /// Checks the token presented by a caller against the cached one.
    ///
    /// A missing, unknown or expired token is `Unauthorized`. A valid token
    /// whose role does not permit `access` is `Forbidden`.
    pub fn authorize(
        &self,
        presented: Option<&str>,
        access: Access,
        now: DateTime<Utc>,
        messages: &impl MessageResolver,
    ) -> Result<AuthToken, CatalogError> {
        let Some(token) = self
            .current(now)
            .filter(|token| presented.is_some_and(|presented| presented == token.token))
        else {
            debug!("rejected {access:?} access without a valid token");
            return Err(CatalogError::Unauthorized(
                messages.message(MessageKey::InsufficientAuthentication, &[]),
            ));
        };
        if !token.permits(access) {
            debug!("rejected {access:?} access for role {}", token.role);
            return Err(CatalogError::Forbidden(
                messages.message(MessageKey::InsufficientPermissions, &[]),
            ));
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::DefaultMessages;

    struct Issuer {
        issued: Cell<u32>,
        ttl: Duration,
    }

    impl TokenIssuer for Issuer {
        fn issue_token(&self, role: Role, now: DateTime<Utc>) -> Result<AuthToken, StorageError> {
            self.issued.set(self.issued.get() + 1);
            Ok(AuthToken {
                token: format!("token-{}", self.issued.get()),
                role,
                expires_at: now + self.ttl,
            })
        }
    }

    struct FailingIssuer;

    impl TokenIssuer for FailingIssuer {
        fn issue_token(&self, _: Role, _: DateTime<Utc>) -> Result<AuthToken, StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_token_cache_empty() {
        let cache = TokenCache::new();
        assert_eq!(cache.current(now()), None);
        assert!(cache.needs_refresh(now()));
    }

    #[test]
    fn test_token_cache_refresh() {
        let cache = TokenCache::new();
        let issuer = Issuer {
            issued: Cell::new(0),
            ttl: Duration::minutes(10),
        };

        let token = cache.refresh(&issuer, Role::User, now()).unwrap();

        assert_eq!(token.token, "token-1");
        assert_eq!(cache.current(now()), Some(token.clone()));
        assert!(!cache.needs_refresh(now() + Duration::minutes(9)));
        assert_eq!(cache.current(now() + Duration::minutes(10)), None);
        assert!(cache.needs_refresh(now() + Duration::minutes(10)));

        let token = cache
            .refresh(&issuer, Role::User, now() + Duration::minutes(10))
            .unwrap();

        assert_eq!(token.token, "token-2");
        assert_eq!(
            cache.current(now() + Duration::minutes(11)),
            Some(token)
        );
    }

    #[test]
    fn test_token_cache_refresh_failure_keeps_token() {
        let cache = TokenCache::new();
        let issuer = Issuer {
            issued: Cell::new(0),
            ttl: Duration::minutes(10),
        };
        let token = cache.refresh(&issuer, Role::User, now()).unwrap();

        assert!(matches!(
            cache.refresh(&FailingIssuer, Role::User, now()),
            Err(StorageError::Unavailable)
        ));
        assert_eq!(cache.current(now()), Some(token));
    }

    fn cache_with(role: Role) -> TokenCache {
        let cache = TokenCache::new();
        cache.restore(AuthToken {
            token: "secret".to_string(),
            role,
            expires_at: now() + Duration::minutes(10),
        });
        cache
    }

    #[rstest]
    #[case(Role::User, Access::Read)]
    #[case(Role::Developer, Access::Read)]
    #[case(Role::Developer, Access::Write)]
    fn test_token_cache_authorize(#[case] role: Role, #[case] access: Access) {
        let token = cache_with(role)
            .authorize(Some("secret"), access, now(), &DefaultMessages)
            .unwrap();
        assert_eq!(token.role, role);
    }

    #[test]
    fn test_token_cache_authorize_forbidden() {
        let err = cache_with(Role::User)
            .authorize(Some("secret"), Access::Write, now(), &DefaultMessages)
            .unwrap_err();
        assert_eq!(err.status(), 403);
        assert_eq!(
            err.to_string(),
            "You do not have permission to perform this action"
        );
    }

    #[rstest]
    #[case(None, now())]
    #[case(Some("guess"), now())]
    #[case(Some("secret"), now() + Duration::minutes(10))]
    fn test_token_cache_authorize_unauthorized(
        #[case] presented: Option<&str>,
        #[case] at: DateTime<Utc>,
    ) {
        let err = cache_with(Role::Developer)
            .authorize(presented, Access::Read, at, &DefaultMessages)
            .unwrap_err();
        assert_eq!(err.status(), 401);
        assert_eq!(
            err.to_string(),
            "Full authentication is required to access this resource"
        );
    }

    #[test]
    fn test_token_cache_authorize_empty() {
        assert!(matches!(
            TokenCache::new().authorize(Some("secret"), Access::Read, now(), &DefaultMessages),
            Err(CatalogError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_role_serialize() {
        assert_eq!(serde_json::to_string(&Role::Developer).unwrap(), "\"DEVELOPER\"");
        assert_eq!(crate::parse_enum::<Role>("developer"), Ok(Role::Developer));
    }
}
