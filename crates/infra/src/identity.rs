//! Bearer token → resolved user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use careops_auth::{AuthzError, TokenService, User};

use crate::repository;
use crate::store::Store;

/// Resolves the caller behind a bearer token.
///
/// A valid token is not enough: the referenced account must still exist. Every
/// failure collapses to [`AuthzError::Unauthorized`]; the reason is only logged.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn Store>) -> Self {
        Self { tokens, store }
    }

    pub async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<User, AuthzError> {
        let claims = self.tokens.verify(token, now).map_err(|e| {
            debug!(reason = %e, "bearer token rejected");
            AuthzError::Unauthorized
        })?;

        match repository::find_by_id::<User, _>(&*self.store, claims.user_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                debug!(user_id = %claims.user_id, "token references a missing account");
                Err(AuthzError::Unauthorized)
            }
            Err(e) => {
                warn!(error = %e, "account lookup failed during authentication");
                Err(AuthzError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use careops_auth::{Algorithm, Registration, Role};
    use careops_core::UserId;
    use chrono::Duration;

    fn tokens() -> Arc<TokenService> {
        let service = TokenService::new(b"test-secret", Algorithm::HS256, Duration::minutes(30));
        Arc::new(service.unwrap())
    }

    async fn setup() -> (IdentityResolver, User) {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new().with_unique("users", "email"));
        let user = Registration {
            email: "casey@example.com".into(),
            password: "long-enough".into(),
            username: "casey".into(),
            phone_number: None,
            role: Role::Staff,
        }
        .into_user("hash".into(), Utc::now());
        repository::insert(&*store, &user).await.unwrap();
        (IdentityResolver::new(tokens(), store), user)
    }

    #[tokio::test]
    async fn resolves_existing_user() {
        let (resolver, user) = setup().await;
        let now = Utc::now();
        let token = tokens().issue(&user.email, user.id, now).unwrap();

        let resolved = resolver.resolve(&token, now).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.role, Role::Staff);
    }

    #[tokio::test]
    async fn valid_token_for_missing_user_is_unauthorized() {
        let (resolver, _) = setup().await;
        let now = Utc::now();
        let token = tokens().issue("ghost@example.com", UserId::new(), now).unwrap();

        assert_eq!(resolver.resolve(&token, now).await, Err(AuthzError::Unauthorized));
    }

    #[tokio::test]
    async fn expired_and_garbage_tokens_are_unauthorized() {
        let (resolver, user) = setup().await;
        let issued = Utc::now();
        let token = tokens().issue(&user.email, user.id, issued).unwrap();

        let later = issued + Duration::minutes(31);
        assert_eq!(resolver.resolve(&token, later).await, Err(AuthzError::Unauthorized));
        assert_eq!(resolver.resolve("not.a.token", issued).await, Err(AuthzError::Unauthorized));
    }

    #[tokio::test]
    async fn token_signed_with_other_key_is_unauthorized() {
        let (resolver, user) = setup().await;
        let now = Utc::now();
        let foreign =
            TokenService::new(b"other-secret", Algorithm::HS256, Duration::minutes(30)).unwrap();
        let token = foreign.issue(&user.email, user.id, now).unwrap();

        assert_eq!(resolver.resolve(&token, now).await, Err(AuthzError::Unauthorized));
    }
}
