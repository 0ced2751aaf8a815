//! Bearer token claims and signing.
//!
//! Tokens are symmetric-signed JWTs carrying the subject email, the user id and
//! an expiry. Expiry is checked against a caller-supplied clock so that the
//! decision stays deterministic and testable.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use careops_core::UserId;

/// Default token lifetime (7 days).
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 10_080;

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account email.
    pub sub: String,

    /// Account identifier; the only claim used to resolve identity.
    pub user_id: UserId,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Wire shape used while decoding so that absent claims surface as a distinct error.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    user_id: Option<String>,
    exp: Option<i64>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("algorithm {0:?} is not a symmetric HMAC algorithm")]
    UnsupportedAlgorithm(Algorithm),

    #[error("token lifetime must be positive")]
    InvalidLifetime,

    #[error("token could not be decoded: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,

    #[error("token is missing required claims")]
    MissingClaims,

    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Issues and verifies bearer tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl: Duration) -> Result<Self, TokenError> {
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(TokenError::UnsupportedAlgorithm(algorithm));
        }
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidLifetime);
        }
        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token valid for the configured lifetime starting at `now`.
    pub fn issue(
        &self,
        email: &str,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.issue_with_ttl(email, user_id, self.ttl, now)
    }

    pub fn issue_with_ttl(
        &self,
        email: &str,
        user_id: UserId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: email.to_string(),
            user_id,
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature, required claims and expiry (as of `now`).
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the supplied clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        let data = jsonwebtoken::decode::<RawClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        let raw = data.claims;

        let (Some(sub), Some(user_id), Some(exp)) = (raw.sub, raw.user_id, raw.exp) else {
            return Err(TokenError::MissingClaims);
        };
        let user_id: UserId = user_id.parse().map_err(|_| TokenError::MissingClaims)?;

        if now.timestamp() >= exp {
            return Err(TokenError::Expired);
        }

        Ok(TokenClaims { sub, user_id, exp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            b"test-secret",
            Algorithm::HS256,
            Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_verifies_before_expiry() {
        let svc = service();
        let user_id = UserId::new();
        let now = Utc::now();
        let token = svc.issue("ann@example.com", user_id, now).unwrap();

        let claims = svc.verify(&token, now + Duration::minutes(5)).unwrap();
        assert_eq!(claims.sub, "ann@example.com");
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.exp, (now + Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)).timestamp());
    }

    #[test]
    fn token_is_rejected_after_expiry() {
        let svc = service();
        let issued_at = Utc::now() - Duration::days(30);
        let token = svc.issue("ann@example.com", UserId::new(), issued_at).unwrap();

        assert_eq!(svc.verify(&token, Utc::now()), Err(TokenError::Expired));
        assert!(svc.verify(&token, issued_at + Duration::days(6)).is_ok());
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue_with_ttl("a@b.c", UserId::new(), Duration::seconds(60), now).unwrap();
        assert!(svc.verify(&token, now + Duration::seconds(59)).is_ok());
        assert_eq!(svc.verify(&token, now + Duration::seconds(60)), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = service().issue("a@b.c", UserId::new(), Utc::now()).unwrap();
        let other =
            TokenService::new(b"another-secret", Algorithm::HS256, Duration::minutes(5)).unwrap();
        assert!(matches!(other.verify(&token, Utc::now()), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(service().verify("not.a.jwt", Utc::now()), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn missing_user_id_is_rejected() {
        #[derive(Serialize)]
        struct Partial {
            sub: String,
            exp: i64,
        }
        let claims = Partial {
            sub: "a@b.c".into(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(service().verify(&token, Utc::now()), Err(TokenError::MissingClaims));
    }

    #[test]
    fn asymmetric_algorithms_are_refused() {
        let err = TokenService::new(b"k", Algorithm::RS256, Duration::minutes(5)).unwrap_err();
        assert_eq!(err, TokenError::UnsupportedAlgorithm(Algorithm::RS256));
        assert_eq!(
            TokenService::new(b"k", Algorithm::HS256, Duration::zero()).unwrap_err(),
            TokenError::InvalidLifetime
        );
    }
}
