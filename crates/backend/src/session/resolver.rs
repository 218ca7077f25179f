//! Dual-context session resolution.
//!
//! Two entry points converge on one state machine:
//!
//! - [`SessionResolver::from_jar`] — trusted execution context where the
//!   framework has already parsed the cookie jar;
//! - [`SessionResolver::from_cookie_header`] — untrusted context holding only
//!   the raw `Cookie` header, parsed manually here.
//!
//! Every lookup failure funnels through [`absent_on_failure`]: the outcome is
//! always "logged out", never an error. This fail-open-to-logged-out policy
//! is deliberate and applies only to lookups — session mutations propagate
//! their errors normally.

use cookie::CookieJar;
use uuid::Uuid;

use super::SessionNamespace;
use super::codec::{SessionCodec, TokenError};

/// Outcome of a session lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token, an unreadable token, or a token that failed verification.
    Absent,
    /// A correctly-signed token whose embedded expiry has passed. Treated
    /// identically to [`Absent`](Self::Absent) by every caller; kept distinct
    /// so callers can prompt a re-login rather than a first login.
    Expired,
    /// A live session for the contained principal.
    Valid(Uuid),
}

impl SessionState {
    /// The authenticated principal, if any. `Expired` and `Absent` both
    /// yield `None`.
    #[must_use]
    pub const fn principal_id(&self) -> Option<Uuid> {
        match self {
            Self::Valid(id) => Some(*id),
            Self::Absent | Self::Expired => None,
        }
    }
}

/// Resolves the current principal from either execution context.
pub struct SessionResolver<'a> {
    codec: &'a SessionCodec,
}

impl<'a> SessionResolver<'a> {
    /// Create a resolver over the given codec.
    #[must_use]
    pub const fn new(codec: &'a SessionCodec) -> Self {
        Self { codec }
    }

    /// Resolve from a parsed cookie jar (trusted context).
    #[must_use]
    pub fn from_jar(&self, jar: &CookieJar, namespace: SessionNamespace) -> SessionState {
        jar.get(namespace.cookie_name())
            .map_or(SessionState::Absent, |cookie| {
                self.verify_value(namespace, cookie.value())
            })
    }

    /// Resolve from a raw `Cookie` header (untrusted context). The header is
    /// parsed manually; the token still goes through the same codec
    /// verification as the trusted path.
    #[must_use]
    pub fn from_cookie_header(&self, header: &str, namespace: SessionNamespace) -> SessionState {
        extract_cookie_value(header, namespace.cookie_name())
            .map_or(SessionState::Absent, |raw| {
                self.verify_value(namespace, raw)
            })
    }

    fn verify_value(&self, namespace: SessionNamespace, raw: &str) -> SessionState {
        match self.codec.verify_detailed(raw) {
            Ok(claims) => SessionState::Valid(claims.principal_id),
            Err(TokenError::Expired) => SessionState::Expired,
            Err(err) => absent_on_failure(namespace, &err),
        }
    }
}

/// The single fail-open fallback: a session lookup that failed for any
/// reason resolves to logged-out. Kept as one named function so future
/// failure modes cannot be silently mis-attributed to "no session".
fn absent_on_failure(namespace: SessionNamespace, err: &dyn std::fmt::Display) -> SessionState {
    tracing::debug!(
        namespace = namespace.cookie_name(),
        error = %err,
        "session lookup failed; treating as absent"
    );
    SessionState::Absent
}

/// Pull a named cookie's value out of a raw `Cookie` header.
fn extract_cookie_value<'h>(header: &'h str, name: &str) -> Option<&'h str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use cookie::Cookie;
    use secrecy::SecretString;

    fn codec() -> SessionCodec {
        SessionCodec::new(&SecretString::from("kX9vQ2mL8pR4tZ7wB3nH6jD1fG5sA0yE"))
    }

    fn jar_with(namespace: SessionNamespace, value: &str) -> CookieJar {
        let mut jar = CookieJar::new();
        jar.add(Cookie::new(namespace.cookie_name(), value.to_owned()));
        jar
    }

    #[test]
    fn test_empty_jar_is_absent() {
        let codec = codec();
        let resolver = SessionResolver::new(&codec);
        let state = resolver.from_jar(&CookieJar::new(), SessionNamespace::Customer);
        assert_eq!(state, SessionState::Absent);
        assert_eq!(state.principal_id(), None);
    }

    #[test]
    fn test_valid_token_resolves_principal() {
        let codec = codec();
        let resolver = SessionResolver::new(&codec);
        let principal = Uuid::new_v4();
        let token = codec
            .issue(principal, Utc::now() + Duration::hours(1))
            .unwrap();

        let jar = jar_with(SessionNamespace::Customer, &token);
        assert_eq!(
            resolver.from_jar(&jar, SessionNamespace::Customer),
            SessionState::Valid(principal)
        );
    }

    #[test]
    fn test_expired_token_is_expired_with_no_principal() {
        let codec = codec();
        let resolver = SessionResolver::new(&codec);
        let token = codec
            .issue(Uuid::new_v4(), Utc::now() - Duration::hours(1))
            .unwrap();

        let jar = jar_with(SessionNamespace::Customer, &token);
        let state = resolver.from_jar(&jar, SessionNamespace::Customer);
        assert_eq!(state, SessionState::Expired);
        assert_eq!(state.principal_id(), None);
    }

    #[test]
    fn test_tampered_token_is_absent() {
        let codec = codec();
        let resolver = SessionResolver::new(&codec);
        let token = codec
            .issue(Uuid::new_v4(), Utc::now() + Duration::hours(1))
            .unwrap();
        let tampered = format!("{token}x");

        let jar = jar_with(SessionNamespace::Customer, &tampered);
        assert_eq!(
            resolver.from_jar(&jar, SessionNamespace::Customer),
            SessionState::Absent
        );
    }

    #[test]
    fn test_namespace_isolation() {
        // A customer token stored under the customer cookie must not
        // authenticate the admin namespace.
        let codec = codec();
        let resolver = SessionResolver::new(&codec);
        let token = codec
            .issue(Uuid::new_v4(), Utc::now() + Duration::hours(1))
            .unwrap();

        let jar = jar_with(SessionNamespace::Customer, &token);
        assert_eq!(
            resolver.from_jar(&jar, SessionNamespace::Admin),
            SessionState::Absent
        );
    }

    #[test]
    fn test_raw_header_parsing() {
        let codec = codec();
        let resolver = SessionResolver::new(&codec);
        let principal = Uuid::new_v4();
        let token = codec
            .issue(principal, Utc::now() + Duration::hours(1))
            .unwrap();

        let header = format!(
            "theme=dark; {}={token}; locale=en",
            SessionNamespace::Customer.cookie_name()
        );
        assert_eq!(
            resolver.from_cookie_header(&header, SessionNamespace::Customer),
            SessionState::Valid(principal)
        );
        assert_eq!(
            resolver.from_cookie_header(&header, SessionNamespace::Admin),
            SessionState::Absent
        );
        assert_eq!(
            resolver.from_cookie_header("", SessionNamespace::Customer),
            SessionState::Absent
        );
        assert_eq!(
            resolver.from_cookie_header("garbage-without-equals", SessionNamespace::Customer),
            SessionState::Absent
        );
    }
}
