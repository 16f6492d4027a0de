//! Authentication strategies.
//!
//! Each route picks its strategy explicitly: `/login` uses
//! [`PasswordAuthenticator`], the bearer guard uses [`TokenAuthenticator`].
//! Both resolve to the stored user or an [`AuthError`].

use cinedex_db::{CatalogStore, StoredUser};

use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::token::TokenKeys;

pub trait Authenticator {
    type Credentials;

    fn authenticate(&self, credentials: Self::Credentials) -> Result<StoredUser, AuthError>;
}

/// Username and plaintext password as submitted at login. Never stored.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A raw bearer token string taken from the `Authorization` header.
#[derive(Debug)]
pub struct BearerToken(pub String);

pub struct PasswordAuthenticator<'a> {
    store: &'a dyn CatalogStore,
    hasher: &'a PasswordHasher,
}

impl<'a> PasswordAuthenticator<'a> {
    pub fn new(store: &'a dyn CatalogStore, hasher: &'a PasswordHasher) -> Self {
        Self { store, hasher }
    }
}

impl Authenticator for PasswordAuthenticator<'_> {
    type Credentials = Credentials;

    /// Unknown usernames and wrong passwords fail identically, and both pay
    /// for one hash verification.
    fn authenticate(&self, credentials: Credentials) -> Result<StoredUser, AuthError> {
        let Some(user) = self.store.find_user_by_username(&credentials.username)? else {
            self.hasher.verify_decoy(&credentials.password);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&credentials.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

pub struct TokenAuthenticator<'a> {
    store: &'a dyn CatalogStore,
    keys: &'a TokenKeys,
}

impl<'a> TokenAuthenticator<'a> {
    pub fn new(store: &'a dyn CatalogStore, keys: &'a TokenKeys) -> Self {
        Self { store, keys }
    }
}

impl Authenticator for TokenAuthenticator<'_> {
    type Credentials = BearerToken;

    fn authenticate(&self, BearerToken(token): BearerToken) -> Result<StoredUser, AuthError> {
        let claims = self.keys.verify(&token)?;

        self.store
            .find_user_by_id(claims.sub)?
            .ok_or(AuthError::UnknownSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinedex_db::{Database, NewUser};

    use crate::password::cheap_hasher;

    fn store_with_alice(hasher: &PasswordHasher) -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&NewUser {
            username: "alice1".into(),
            password_hash: hasher.hash("secret1").unwrap(),
            email: "a@example.com".into(),
            birthday: None,
        })
        .unwrap();
        db
    }

    fn login(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn correct_password_returns_user() {
        let hasher = cheap_hasher();
        let db = store_with_alice(&hasher);
        let auth = PasswordAuthenticator::new(&db, &hasher);

        let user = auth.authenticate(login("alice1", "secret1")).unwrap();
        assert_eq!(user.username, "alice1");
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let hasher = cheap_hasher();
        let db = store_with_alice(&hasher);
        let auth = PasswordAuthenticator::new(&db, &hasher);

        let wrong = auth.authenticate(login("alice1", "secret2")).unwrap_err();
        let unknown = auth.authenticate(login("mallory", "secret1")).unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn username_is_case_sensitive() {
        let hasher = cheap_hasher();
        let db = store_with_alice(&hasher);
        let auth = PasswordAuthenticator::new(&db, &hasher);

        assert!(auth.authenticate(login("Alice1", "secret1")).is_err());
    }

    #[test]
    fn plaintext_stored_password_does_not_match() {
        let hasher = cheap_hasher();
        let db = Database::open_in_memory().unwrap();
        db.create_user(&NewUser {
            username: "legacy1".into(),
            password_hash: "secret1".into(),
            email: "l@example.com".into(),
            birthday: None,
        })
        .unwrap();

        let auth = PasswordAuthenticator::new(&db, &hasher);
        assert!(matches!(
            auth.authenticate(login("legacy1", "secret1")),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn token_resolves_to_user() {
        let hasher = cheap_hasher();
        let db = store_with_alice(&hasher);
        let keys = TokenKeys::new("test-secret");
        let alice = db.get_user_by_username("alice1").unwrap().unwrap();
        let token = keys.issue(&alice.clone().into_public()).unwrap();

        let user = TokenAuthenticator::new(&db, &keys)
            .authenticate(BearerToken(token))
            .unwrap();
        assert_eq!(user, alice);
    }

    #[test]
    fn token_for_deleted_user_is_unknown_subject() {
        let hasher = cheap_hasher();
        let db = store_with_alice(&hasher);
        let keys = TokenKeys::new("test-secret");
        let alice = db.get_user_by_username("alice1").unwrap().unwrap();
        let token = keys.issue(&alice.into_public()).unwrap();

        db.delete_user("alice1").unwrap();

        assert!(matches!(
            TokenAuthenticator::new(&db, &keys).authenticate(BearerToken(token)),
            Err(AuthError::UnknownSubject)
        ));
    }

    #[test]
    fn token_errors_pass_through() {
        let hasher = cheap_hasher();
        let db = store_with_alice(&hasher);
        let keys = TokenKeys::new("test-secret");

        assert!(matches!(
            TokenAuthenticator::new(&db, &keys).authenticate(BearerToken("junk".into())),
            Err(AuthError::MalformedToken)
        ));
    }
}
