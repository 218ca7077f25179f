//! Stateless session tokens.
//!
//! A session is a signed `{principal_id, expiry}` token carried in a cookie;
//! no server-side session state exists beyond the cookie itself. Two
//! independent namespaces — customer and administrator — differ only in which
//! cookie carries the token, and are kept apart at the type level by
//! [`SessionNamespace`] so an admin check can never accidentally accept a
//! customer token.
//!
//! - [`codec`] signs and verifies tokens (and is the single authoritative
//!   expiry check),
//! - [`store`] writes and clears the cookies,
//! - [`resolver`] turns either a parsed cookie jar or a raw `Cookie` header
//!   into the `{absent, valid, expired}` outcome.

pub mod codec;
pub mod resolver;
pub mod store;

pub use codec::{SessionClaims, SessionCodec};
pub use resolver::{SessionResolver, SessionState};
pub use store::{SESSION_TTL_SECONDS, SessionStore};

use thiserror::Error;

/// The two session namespaces, one per principal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionNamespace {
    /// Customer (`User`) sessions.
    Customer,
    /// Administrator (`Admin`) sessions.
    Admin,
}

impl SessionNamespace {
    /// Name of the cookie carrying this namespace's token.
    #[must_use]
    pub const fn cookie_name(self) -> &'static str {
        match self {
            Self::Customer => "copperleaf_session",
            Self::Admin => "copperleaf_admin_session",
        }
    }
}

/// Errors from session *mutation* operations (create/delete).
///
/// Lookup failures never surface as errors; the resolver maps them to
/// [`SessionState::Absent`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Token signing failed.
    #[error("failed to sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}
