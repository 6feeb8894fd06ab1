use actix_web::{test, web, App};
use serde_json::json;
use std::sync::Arc;

use portfolio_server::api::{self, AppState};
use portfolio_server::auth::AuthService;
use portfolio_server::models::Admin;
use portfolio_server::store::Store;

/// Helper macro to create the admin account and log in, returning the token
macro_rules! login_admin {
    ($app:expr, $store:expr, $auth:expr) => {{
        let password_hash = $auth.hash_password("password123").unwrap();
        let mut admin = Admin {
            id: String::new(),
            username: "admin".to_string(),
            password_hash,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        $store.create_admin(&mut admin).unwrap();

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "username": "admin",
                "password": "password123"
            }))
            .to_request();

        let resp: serde_json::Value = test::call_and_read_body_json(&$app, req).await;
        resp["data"]["token"].as_str().unwrap().to_string()
    }};
}

macro_rules! init_app {
    ($store:expr, $auth:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($store.clone()))
                .app_data(web::Data::new($auth.clone()))
                .app_data(web::Data::new(AppState {
                    store: $store.clone(),
                    auth_service: $auth.clone(),
                }))
                .configure(api::configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_auth_status_reflects_admin_presence() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let req = test::TestRequest::get().uri("/api/auth/status").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["hasAdmin"], false);

    let _token = login_admin!(app, store, auth_service);

    let req = test::TestRequest::get().uri("/api/auth/status").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["hasAdmin"], true);
}

#[actix_web::test]
async fn test_login_and_me() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let token = login_admin!(app, store, auth_service);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp["success"], true);
    assert_eq!(resp["data"]["username"], "admin");
    // Password hash must never be serialized
    assert!(resp["data"]["password_hash"].is_null());
}

#[actix_web::test]
async fn test_login_with_wrong_password() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let _token = login_admin!(app, store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "username": "admin",
            "password": "not-the-password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_login_with_unknown_username() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "username": "nobody",
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_mutation_without_token() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/works")
        .set_json(json!({
            "title": "Poster",
            "category": "poster_design"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_mutation_with_garbage_token() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let req = test::TestRequest::delete()
        .uri("/api/skills/some-id")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_logout_revokes_token() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let token = login_admin!(app, store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    // The JWT is still within its validity window but the session is gone
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
