//! Cookie-backed session persistence.
//!
//! The store owns the *mutating* half of the session lifecycle: issuing a
//! token into a namespace's cookie and clearing it again. Reads go through
//! the [`resolver`](super::resolver).

use chrono::{Duration as ChronoDuration, Utc};
use cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use uuid::Uuid;

use super::codec::SessionCodec;
use super::{SessionError, SessionNamespace};

/// Session lifetime in seconds (7 days).
pub const SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Writes and clears session cookies.
pub struct SessionStore<'a> {
    codec: &'a SessionCodec,
    secure: bool,
}

impl<'a> SessionStore<'a> {
    /// Create a session store.
    ///
    /// `secure` should be true whenever the application is served over HTTPS
    /// (see [`BackendConfig::cookies_secure`](crate::config::BackendConfig::cookies_secure)).
    #[must_use]
    pub const fn new(codec: &'a SessionCodec, secure: bool) -> Self {
        Self { codec, secure }
    }

    /// Issue a token for `principal_id` and store it in the namespace's
    /// cookie with the fixed 7-day expiry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if token signing fails.
    pub fn create_session(
        &self,
        jar: &mut CookieJar,
        namespace: SessionNamespace,
        principal_id: Uuid,
    ) -> Result<(), SessionError> {
        let expires_at = Utc::now() + ChronoDuration::seconds(SESSION_TTL_SECONDS);
        let token = self.codec.issue(principal_id, expires_at)?;
        jar.add(self.build_cookie(namespace, token, Duration::seconds(SESSION_TTL_SECONDS)));
        tracing::debug!(namespace = namespace.cookie_name(), "session created");
        Ok(())
    }

    /// Remove the namespace's session cookie.
    ///
    /// Idempotent: clearing an absent session emits the same removal cookie
    /// and is not an error.
    pub fn delete_session(&self, jar: &mut CookieJar, namespace: SessionNamespace) {
        jar.add(self.build_cookie(namespace, String::new(), Duration::ZERO));
        tracing::debug!(namespace = namespace.cookie_name(), "session cleared");
    }

    fn build_cookie(
        &self,
        namespace: SessionNamespace,
        value: String,
        max_age: Duration,
    ) -> Cookie<'static> {
        Cookie::build((namespace.cookie_name(), value))
            .path("/")
            .max_age(max_age)
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn codec() -> SessionCodec {
        SessionCodec::new(&SecretString::from("kX9vQ2mL8pR4tZ7wB3nH6jD1fG5sA0yE"))
    }

    #[test]
    fn test_create_session_sets_cookie_attributes() {
        let codec = codec();
        let store = SessionStore::new(&codec, true);
        let mut jar = CookieJar::new();

        store
            .create_session(&mut jar, SessionNamespace::Customer, Uuid::new_v4())
            .unwrap();

        let cookie = jar.get(SessionNamespace::Customer.cookie_name()).unwrap();
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(SESSION_TTL_SECONDS)));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert!(!cookie.value().is_empty());
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let codec = codec();
        let store = SessionStore::new(&codec, true);
        let mut jar = CookieJar::new();

        store
            .create_session(&mut jar, SessionNamespace::Customer, Uuid::new_v4())
            .unwrap();
        store
            .create_session(&mut jar, SessionNamespace::Admin, Uuid::new_v4())
            .unwrap();

        let customer = jar.get(SessionNamespace::Customer.cookie_name()).unwrap();
        let admin = jar.get(SessionNamespace::Admin.cookie_name()).unwrap();
        assert_ne!(customer.value(), admin.value());
    }

    #[test]
    fn test_delete_session_is_idempotent() {
        let codec = codec();
        let store = SessionStore::new(&codec, false);
        let mut jar = CookieJar::new();

        // Deleting with no session present must not panic or error.
        store.delete_session(&mut jar, SessionNamespace::Customer);
        let cleared = jar.get(SessionNamespace::Customer.cookie_name()).unwrap();
        assert_eq!(cleared.max_age(), Some(Duration::ZERO));
        assert!(cleared.value().is_empty());

        // And again after a create.
        store
            .create_session(&mut jar, SessionNamespace::Customer, Uuid::new_v4())
            .unwrap();
        store.delete_session(&mut jar, SessionNamespace::Customer);
        let cleared = jar.get(SessionNamespace::Customer.cookie_name()).unwrap();
        assert!(cleared.value().is_empty());
    }
}
