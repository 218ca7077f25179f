//! Session lifecycle scenarios: login, cookie round-trips through both
//! resolver contexts, expiry, tamper rejection, and namespace isolation.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use cookie::CookieJar;

use copperleaf_backend::BackendError;
use copperleaf_backend::session::{SessionNamespace, SessionState};
use copperleaf_integration_tests::{TEST_PASSWORD, TestContext};

#[tokio::test]
async fn create_then_get_then_delete_session() {
    let ctx = TestContext::new();
    let user = ctx.user("tessa").await;
    let mut jar = CookieJar::new();

    ctx.backend
        .session_store()
        .create_session(&mut jar, SessionNamespace::Customer, user.id.as_uuid())
        .unwrap();

    // getSession -> { principalId }
    let state = ctx
        .backend
        .session_resolver()
        .from_jar(&jar, SessionNamespace::Customer);
    assert_eq!(state, SessionState::Valid(user.id.as_uuid()));

    // deleteSession then getSession -> { principalId: null }
    ctx.backend
        .session_store()
        .delete_session(&mut jar, SessionNamespace::Customer);
    let state = ctx
        .backend
        .session_resolver()
        .from_jar(&jar, SessionNamespace::Customer);
    assert_eq!(state.principal_id(), None);
}

#[tokio::test]
async fn login_yields_a_principal_and_stamps_last_login() {
    let ctx = TestContext::new();
    let user = ctx.user("ulrik").await;
    assert!(user.last_login.is_none());

    let principal = ctx
        .backend
        .auth()
        .login_user(user.email.as_str(), TEST_PASSWORD)
        .await
        .unwrap();
    assert_eq!(principal, user.id);

    let user = ctx.backend.users().find_by_id(user.id).await.unwrap();
    assert!(user.last_login.is_some());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    let user = ctx.user("vera").await;

    let wrong_password = ctx
        .backend
        .auth()
        .login_user(user.email.as_str(), "not the password")
        .await
        .unwrap_err();
    let unknown_email = ctx
        .backend
        .auth()
        .login_user("nobody@example.com", TEST_PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, BackendError::AuthFailed));
    assert!(matches!(unknown_email, BackendError::AuthFailed));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn token_round_trip_and_expiry() {
    let ctx = TestContext::new();
    let codec = ctx.backend.session_codec();
    let principal = uuid::Uuid::new_v4();

    // decrypt(encrypt(p, future)) == p
    let live = codec.issue(principal, Utc::now() + Duration::days(7)).unwrap();
    assert_eq!(codec.verify(&live).unwrap().principal_id, principal);

    // A past expiry is treated as absent by the resolver even though the
    // signature is valid.
    let expired = codec.issue(principal, Utc::now() - Duration::hours(1)).unwrap();
    assert!(codec.verify(&expired).is_none());

    let mut jar = CookieJar::new();
    jar.add(cookie::Cookie::new(
        SessionNamespace::Customer.cookie_name(),
        expired,
    ));
    let state = ctx
        .backend
        .session_resolver()
        .from_jar(&jar, SessionNamespace::Customer);
    assert_eq!(state, SessionState::Expired);
    assert_eq!(state.principal_id(), None);
}

#[tokio::test]
async fn every_tampered_byte_is_rejected() {
    let ctx = TestContext::new();
    let codec = ctx.backend.session_codec();
    let token = codec
        .issue(uuid::Uuid::new_v4(), Utc::now() + Duration::days(1))
        .unwrap();

    for position in 0..token.len() {
        let mut bytes = token.clone().into_bytes();
        let byte = bytes.get_mut(position).unwrap();
        *byte = if *byte == b'A' { b'B' } else { b'A' };
        let Ok(tampered) = String::from_utf8(bytes) else {
            continue;
        };
        assert!(
            codec.verify(&tampered).is_none(),
            "byte {position} mutation verified"
        );
    }
}

#[tokio::test]
async fn untrusted_header_path_matches_trusted_path() {
    let ctx = TestContext::new();
    let admin_id = uuid::Uuid::new_v4();
    let mut jar = CookieJar::new();
    ctx.backend
        .session_store()
        .create_session(&mut jar, SessionNamespace::Admin, admin_id)
        .unwrap();

    // Rebuild the raw Cookie header a browser would send.
    let token = jar
        .get(SessionNamespace::Admin.cookie_name())
        .unwrap()
        .value()
        .to_owned();
    let header = format!(
        "locale=en; {}={token}",
        SessionNamespace::Admin.cookie_name()
    );

    let resolver = ctx.backend.session_resolver();
    assert_eq!(
        resolver.from_cookie_header(&header, SessionNamespace::Admin),
        resolver.from_jar(&jar, SessionNamespace::Admin)
    );
    assert_eq!(
        resolver.from_cookie_header(&header, SessionNamespace::Admin),
        SessionState::Valid(admin_id)
    );

    // The customer namespace sees nothing in that header.
    assert_eq!(
        resolver.from_cookie_header(&header, SessionNamespace::Customer),
        SessionState::Absent
    );
}

#[tokio::test]
async fn customer_and_admin_sessions_are_independent() {
    let ctx = TestContext::new();
    let customer = uuid::Uuid::new_v4();
    let admin = uuid::Uuid::new_v4();
    let mut jar = CookieJar::new();

    let store = ctx.backend.session_store();
    store
        .create_session(&mut jar, SessionNamespace::Customer, customer)
        .unwrap();
    store
        .create_session(&mut jar, SessionNamespace::Admin, admin)
        .unwrap();

    let resolver = ctx.backend.session_resolver();
    assert_eq!(
        resolver.from_jar(&jar, SessionNamespace::Customer),
        SessionState::Valid(customer)
    );
    assert_eq!(
        resolver.from_jar(&jar, SessionNamespace::Admin),
        SessionState::Valid(admin)
    );

    // Logging the customer out leaves the admin session live.
    store.delete_session(&mut jar, SessionNamespace::Customer);
    assert_eq!(
        resolver
            .from_jar(&jar, SessionNamespace::Customer)
            .principal_id(),
        None
    );
    assert_eq!(
        resolver.from_jar(&jar, SessionNamespace::Admin),
        SessionState::Valid(admin)
    );
}
