//! End-to-end session lifecycle tests against the in-memory backends.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use time::{Duration, OffsetDateTime};

use gatekey_auth::clock::ManualClock;
use gatekey_auth::config::AuthConfig;
use gatekey_auth::error::AuthError;
use gatekey_auth::session::{NewUser, SessionService};
use gatekey_auth_memory::{
    MemoryResetTokenStorage, MemoryRevokedTokenStorage, MemoryUserStorage,
    MemoryVerificationCodeStorage,
};

fn build_service() -> (SessionService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
    ));
    let config = AuthConfig {
        signing_secret: "an-integration-test-secret-of-32b!".to_string(),
        access_token_lifetime: StdDuration::from_secs(15 * 60),
        refresh_token_lifetime: StdDuration::from_secs(7 * 24 * 3600),
        ..AuthConfig::default()
    };
    let service = SessionService::new(
        config,
        Arc::new(MemoryUserStorage::new()),
        Arc::new(MemoryRevokedTokenStorage::with_clock(clock.clone())),
        Arc::new(MemoryResetTokenStorage::with_clock(clock.clone())),
        Arc::new(MemoryVerificationCodeStorage::new()),
        clock.clone(),
    )
    .unwrap();
    (service, clock)
}

async fn register(service: &SessionService, email: &str) -> gatekey_auth::session::TokenPair {
    let (_user, pair) = service
        .register(NewUser {
            email: email.to_string(),
            password: "initial-password".to_string(),
            name: None,
        })
        .await
        .unwrap();
    pair
}

#[tokio::test]
async fn register_login_access_logout() {
    let (service, _clock) = build_service();
    let pair = register(&service, "alice@example.com").await;

    // The freshly minted access token opens the protected path.
    let user = service.authenticate(&pair.access_token).await.unwrap();
    assert_eq!(user.email, "alice@example.com");

    // A separate login yields an independent pair.
    let second = service
        .login("alice@example.com", "initial-password")
        .await
        .unwrap();
    assert_ne!(second.access_token, pair.access_token);

    // Logout revokes only the token presented.
    service.logout(&pair.access_token).await.unwrap();
    let err = service.authenticate(&pair.access_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));
    service.authenticate(&second.access_token).await.unwrap();
}

#[tokio::test]
async fn refresh_token_is_single_use() {
    let (service, _clock) = build_service();
    let pair = register(&service, "bob@example.com").await;

    let rotated = service.refresh(&pair.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    let err = service.refresh(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));

    // The chain continues with the successor.
    let next = service.refresh(&rotated.refresh_token).await.unwrap();
    service.authenticate(&next.access_token).await.unwrap();
}

#[tokio::test]
async fn concurrent_refresh_mints_exactly_one_pair() {
    let (service, _clock) = build_service();
    let service = Arc::new(service);
    let pair = register(&service, "carol@example.com").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let token = pair.refresh_token.clone();
        handles.push(tokio::spawn(
            async move { service.refresh(&token).await },
        ));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AuthError::TokenRevoked) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn access_token_expires_with_the_clock() {
    let (service, clock) = build_service();
    let pair = register(&service, "dave@example.com").await;

    clock.advance(Duration::minutes(14));
    service.authenticate(&pair.access_token).await.unwrap();

    clock.advance(Duration::minutes(2));
    let err = service.authenticate(&pair.access_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenInvalid));

    // The refresh token outlives the access token.
    service.refresh(&pair.refresh_token).await.unwrap();
}

#[tokio::test]
async fn wrong_token_type_is_rejected_at_both_checkpoints() {
    let (service, _clock) = build_service();
    let pair = register(&service, "erin@example.com").await;

    let err = service.authenticate(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenWrongType { .. }));

    let err = service.refresh(&pair.access_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenWrongType { .. }));
}

#[tokio::test]
async fn login_failure_modes() {
    let (service, _clock) = build_service();
    register(&service, "frank@example.com").await;

    let unknown = service
        .login("stranger@example.com", "initial-password")
        .await
        .unwrap_err();
    let wrong = service
        .login("frank@example.com", "not-the-password")
        .await
        .unwrap_err();

    // Unknown identity and wrong password are indistinguishable.
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert_eq!(unknown.canonical_message(), wrong.canonical_message());
}

#[tokio::test]
async fn password_reset_round_trip() {
    let (service, _clock) = build_service();
    register(&service, "grace@example.com").await;

    let reset = service.forgot_password("grace@example.com").await.unwrap();
    service
        .reset_password(&reset.secret, "replacement-password")
        .await
        .unwrap();

    // The secret is burned, even with a valid new password.
    let err = service
        .reset_password(&reset.secret, "yet-another-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidOrExpiredSecret));

    // Only the new password logs in now.
    let err = service
        .login("grace@example.com", "initial-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    service
        .login("grace@example.com", "replacement-password")
        .await
        .unwrap();
}

#[tokio::test]
async fn reset_secret_expires() {
    let (service, clock) = build_service();
    register(&service, "heidi@example.com").await;

    let reset = service.forgot_password("heidi@example.com").await.unwrap();
    clock.advance(Duration::hours(2));

    let err = service
        .reset_password(&reset.secret, "replacement-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidOrExpiredSecret));
}

#[tokio::test]
async fn email_verification_round_trip() {
    let (service, _clock) = build_service();
    let (user, pair) = service
        .register(NewUser {
            email: "ivan@example.com".to_string(),
            password: "initial-password".to_string(),
            name: Some("Ivan".to_string()),
        })
        .await
        .unwrap();

    let err = service
        .authenticate_verified(&pair.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountUnverified));

    let code = service.request_email_verification(&user).await.unwrap();
    assert_eq!(code.len(), 6);
    service.verify_email_with_code(&user, &code).await.unwrap();

    let verified = service
        .authenticate_verified(&pair.access_token)
        .await
        .unwrap();
    assert!(verified.is_verified());

    // The code is consumed with the verification.
    let err = service
        .verify_email_with_code(&verified, &code)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidOrExpiredSecret));
}
