use actix_web::{test, web, App};
use serde_json::json;
use std::sync::Arc;

use portfolio_server::api::{self, AppState};
use portfolio_server::auth::AuthService;
use portfolio_server::models::Admin;
use portfolio_server::store::Store;

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

const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

#[actix_web::test]
async fn test_upload_then_fetch_round_trip() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);
    let token = login_admin!(app, store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/assets?filename=hero.jpg")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .insert_header(("Content-Type", "image/jpeg"))
        .set_payload(JPEG_BYTES)
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["success"], true);
    assert_eq!(resp["data"]["filename"], "hero.jpg");
    assert_eq!(resp["data"]["content_type"], "image/jpeg");
    assert_eq!(resp["data"]["size"], JPEG_BYTES.len() as i64);

    let url = resp["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/assets/"));

    // The stored URL serves back the original bytes with the original type
    let req = test::TestRequest::get().uri(&url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "image/jpeg"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], JPEG_BYTES);
}

#[actix_web::test]
async fn test_upload_requires_auth() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/assets")
        .insert_header(("Content-Type", "image/jpeg"))
        .set_payload(JPEG_BYTES)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_empty_upload_is_rejected() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);
    let token = login_admin!(app, store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/assets")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_missing_asset_is_404() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);

    let req = test::TestRequest::get().uri("/assets/no-such-id").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
