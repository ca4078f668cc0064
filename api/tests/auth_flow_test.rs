//! End-to-end auth protocol tests over the in-memory store.

use actix_web::http::header;
use actix_web::{test, web};
use serde_json::{json, Value};
use std::sync::Arc;

use sn_api::app::create_app;
use sn_api::routes::AppState;
use sn_core::domain::entities::Role;
use sn_core::services::auth::AuthService;
use sn_core::services::otp::OtpService;
use sn_core::services::rate_limit::RateLimiter;
use sn_core::services::revocation::RevocationRegistry;
use sn_core::services::token::TokenService;
use sn_infra::cache::MemoryStore;
use sn_infra::database::InMemoryCredentialStore;
use sn_infra::sms::MockSmsDelivery;
use sn_shared::config::{Environment, JwtConfig, OtpConfig, RateLimitConfig, ServerConfig};

const PHONE: &str = "0901234567";
const PASSWORD: &str = "spa-staff-secret";

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "0123456789abcdef0123456789abcdef".to_string(),
        issuer: "serena".to_string(),
        audience: "serena-api".to_string(),
        access_token_ttl_seconds: 3600,
        refresh_token_ttl_seconds: 7 * 86_400,
    }
}

fn build_state(
    rate_config: RateLimitConfig,
) -> (web::Data<AppState<MemoryStore>>, Arc<MockSmsDelivery>) {
    let store = Arc::new(MemoryStore::new());
    let delivery = Arc::new(MockSmsDelivery::new());
    let credentials =
        Arc::new(InMemoryCredentialStore::new().with_account(PHONE, PASSWORD, Role::Staff));

    let otp = Arc::new(OtpService::new(
        store.clone(),
        delivery.clone(),
        OtpConfig::default(),
    ));
    let tokens = Arc::new(TokenService::new(jwt_config()));
    let revocation = Arc::new(RevocationRegistry::new(store.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(store, &rate_config));
    let auth_service = Arc::new(AuthService::new(
        credentials,
        otp,
        tokens,
        revocation,
        rate_limiter.clone(),
    ));

    (
        web::Data::new(AppState::new(auth_service, rate_limiter)),
        delivery,
    )
}

fn server_config() -> ServerConfig {
    ServerConfig::default()
}

#[actix_web::test]
async fn test_password_login_round_trip() {
    let (state, _delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": PHONE, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["user_info"]["username"], PHONE);
    assert_eq!(body["user_info"]["role"], "staff");
    assert!(body["access_token"].as_str().unwrap().contains('.'));
}

#[actix_web::test]
async fn test_login_with_bad_credentials_is_401() {
    let (state, _delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": PHONE, "password": "wrong-password" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[actix_web::test]
async fn test_otp_login_logout_scenario() {
    let (state, delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    // Request a challenge (password is the first factor)
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/otp/request")
            .set_json(json!({ "username": PHONE, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let ticket: Value = test::read_body_json(resp).await;
    assert_eq!(ticket["identifier"], "090****567");

    let code = delivery.last_code(PHONE).unwrap();

    // Wrong code: 401, generic payload
    let wrong = if code == "000000" { "000001" } else { "000000" };
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/otp/verify")
            .set_json(json!({ "username": PHONE, "otp_code": wrong }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_OTP");

    // Correct code: bearer pair
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/otp/verify")
            .set_json(json!({ "username": PHONE, "otp_code": code }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let tokens: Value = test::read_body_json(resp).await;
    let access_token = tokens["access_token"].as_str().unwrap().to_string();

    // Logout with that token
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    // The token is now unusable, even though signature and expiry hold
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", access_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_otp_failures_do_not_reveal_challenge_existence() {
    let (state, _delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    // No challenge was ever requested for this identifier
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/otp/verify")
            .set_json(json!({ "username": "0907654321", "otp_code": "123456" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_OTP");
}

#[actix_web::test]
async fn test_otp_request_cooldown_is_429() {
    let (state, _delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    for expected in [200, 429] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/auth/otp/request")
                .set_json(json!({ "username": PHONE, "password": PASSWORD }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), expected);
        if expected == 429 {
            assert!(resp.headers().contains_key(header::RETRY_AFTER));
        }
    }
}

#[actix_web::test]
async fn test_refresh_rotation_revokes_old_token() {
    let (state, _delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": PHONE, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    let tokens: Value = test::read_body_json(resp).await;
    let refresh_token = tokens["refresh_token"].as_str().unwrap().to_string();

    // First exchange succeeds
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refresh_token": refresh_token }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    // Replaying the rotated-out token fails
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refresh_token": refresh_token }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_change_password_signs_out_other_sessions() {
    let (state, _delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    let login = |password: &'static str| {
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": PHONE, "password": password }))
            .to_request()
    };

    let resp = test::call_service(&app, login(PASSWORD)).await;
    let office: Value = test::read_body_json(resp).await;
    let resp = test::call_service(&app, login(PASSWORD)).await;
    let tablet: Value = test::read_body_json(resp).await;

    // Change the password from the office session
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/change-password")
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", office["access_token"].as_str().unwrap()),
            ))
            .set_json(json!({
                "current_password": PASSWORD,
                "new_password": "a-brand-new-password"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    // The tablet session is signed out too
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", tablet["access_token"].as_str().unwrap()),
            ))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    // Old password dead, new one works
    let resp = test::call_service(&app, login(PASSWORD)).await;
    assert_eq!(resp.status(), 401);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": PHONE, "password": "a-brand-new-password" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_protected_route_without_token_is_401() {
    let (state, _delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/v1/auth/logout").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_validation_failure_is_400() {
    let (state, _delivery) = build_state(RateLimitConfig::default());
    let app = test::init_service(create_app(
        state,
        Environment::Development,
        &server_config(),
    ))
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/otp/verify")
            .set_json(json!({ "username": PHONE, "otp_code": "12345" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}
