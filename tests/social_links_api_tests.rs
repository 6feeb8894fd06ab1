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

#[actix_web::test]
async fn test_create_then_list_ordered() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);
    let token = login_admin!(app, store, auth_service);

    for (platform, order_index) in [("Github", 1), ("Instagram", 0)] {
        let req = test::TestRequest::post()
            .uri("/api/social-links")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({
                "platform": platform,
                "url": format!("https://{}.com/me", platform.to_lowercase()),
                "icon_name": platform,
                "order_index": order_index
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
    }

    let req = test::TestRequest::get().uri("/api/social-links").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let links = resp["data"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["platform"], "Instagram");
    assert_eq!(links[1]["platform"], "Github");
}

#[actix_web::test]
async fn test_icon_name_is_free_text() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);
    let token = login_admin!(app, store, auth_service);

    // Unknown icon names are stored as-is; resolution happens at render time
    let req = test::TestRequest::post()
        .uri("/api/social-links")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({
            "platform": "Mastodon",
            "url": "https://mastodon.social/@me",
            "icon_name": "Mastodon"
        }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["icon_name"], "Mastodon");
}

#[actix_web::test]
async fn test_update_social_link() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);
    let token = login_admin!(app, store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/social-links")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({
            "platform": "Twitter",
            "url": "https://twitter.com/me",
            "icon_name": "Twitter"
        }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let id = resp["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/social-links/{}", id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "url": "https://x.com/me" }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["id"], id.as_str());
    assert_eq!(resp["data"]["url"], "https://x.com/me");
    assert_eq!(resp["data"]["platform"], "Twitter");
}

#[actix_web::test]
async fn test_delete_social_link() {
    let store = Arc::new(Store::in_memory().unwrap());
    let auth_service = Arc::new(AuthService::new("test_secret".to_string()));
    let app = init_app!(store, auth_service);
    let token = login_admin!(app, store, auth_service);

    let req = test::TestRequest::post()
        .uri("/api/social-links")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({
            "platform": "Facebook",
            "url": "https://facebook.com/me",
            "icon_name": "Facebook"
        }))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let id = resp["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/social-links/{}", id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);

    let req = test::TestRequest::get().uri("/api/social-links").to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(resp["data"].as_array().unwrap().is_empty());

    // Deleting again is a 404
    let req = test::TestRequest::delete()
        .uri(&format!("/api/social-links/{}", id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
