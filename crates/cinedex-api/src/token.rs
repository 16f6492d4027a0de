use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

use cinedex_types::api::Claims;
use cinedex_types::models::User;

use crate::error::AuthError;

/// Tokens are good for seven days from issuance.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

/// HS256 signing and verification keys derived from the shared secret.
///
/// Built once from configuration and shared through the app state; there is
/// no process-global secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by hand so the clock can be pinned.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user: &User) -> jsonwebtoken::errors::Result<String> {
        self.issue_at(user, Utc::now())
    }

    /// Same inputs and `now` always give the same token.
    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> jsonwebtoken::errors::Result<String> {
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Check structure, signature and expiry, in that order. Resolving the
    /// subject to a live user is the authenticator's job.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn alice() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice1".into(),
            email: "a@example.com".into(),
            birthday: None,
            favorite_movies: vec![],
        }
    }

    #[test]
    fn fresh_token_verifies() {
        let keys = TokenKeys::new("test-secret");
        let user = alice();
        let token = keys.issue(&user).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice1");
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn token_expires_after_seven_days() {
        let keys = TokenKeys::new("test-secret");
        let issued = Utc::now();
        let token = keys.issue_at(&alice(), issued).unwrap();

        let last_valid = issued + Duration::days(7) - Duration::seconds(1);
        assert!(keys.verify_at(&token, last_valid).is_ok());

        let expiry = issued + Duration::days(7);
        assert!(matches!(
            keys.verify_at(&token, expiry),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn old_token_rejected_on_real_clock() {
        let keys = TokenKeys::new("test-secret");
        let token = keys
            .issue_at(&alice(), Utc::now() - Duration::days(8))
            .unwrap();
        assert!(matches!(keys.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let ours = TokenKeys::new("test-secret");
        let theirs = TokenKeys::new("another-secret");
        let token = theirs.issue(&alice()).unwrap();

        assert!(matches!(
            ours.verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let keys = TokenKeys::new("test-secret");
        let token = keys.issue(&alice()).unwrap();
        let bob = User {
            username: "bobby1".into(),
            ..alice()
        };
        let other = keys.issue(&bob).unwrap();

        // Splice another token's claims under this token's signature.
        let mut parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        parts[1] = other_parts[1];
        let spliced = parts.join(".");

        assert!(matches!(
            keys.verify(&spliced),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let keys = TokenKeys::new("test-secret");
        for token in ["", "abc", "not.a.token", "a.b"] {
            assert!(
                matches!(keys.verify(token), Err(AuthError::MalformedToken)),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn issuance_is_deterministic_for_fixed_clock() {
        let keys = TokenKeys::new("test-secret");
        let user = alice();
        let now = Utc::now();

        assert_eq!(
            keys.issue_at(&user, now).unwrap(),
            keys.issue_at(&user, now).unwrap()
        );
        assert_ne!(
            keys.issue_at(&user, now).unwrap(),
            keys.issue_at(&user, now + Duration::seconds(1)).unwrap()
        );
    }
}
