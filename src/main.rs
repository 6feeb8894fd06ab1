mod api;
mod auth;
mod metrics;
mod models;
mod render;
mod store;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use chrono::Utc;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use api::AppState;
use auth::AuthService;
use metrics::MetricsCollector;
use models::Admin;
use store::Store;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Load environment variables
    dotenvy::dotenv().ok();

    // Get configuration from environment
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a number");

    let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "portfolio.db".to_string());

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
        log::warn!("JWT_SECRET not set, using default (not secure for production!)");
        "default_jwt_secret_change_me".to_string()
    });

    // Initialize store
    let store = Arc::new(Store::new(&db_path).expect("Failed to initialize database"));

    // Initialize auth service
    let auth_service = Arc::new(AuthService::new(jwt_secret));

    // Initialize metrics collector with separate database
    let metrics_db = db_path.replace(".db", "-metrics.db");
    let metrics_collector = MetricsCollector::new(PathBuf::from(metrics_db));

    // Auto-create the admin account from environment variables if none exists
    let admin_username = env::var("ADMIN_USERNAME").ok();
    let admin_password = env::var("ADMIN_PASSWORD").ok();

    if let (Some(username), Some(password)) = (admin_username, admin_password) {
        let admin_count = store.count_admins().expect("Failed to count admins");
        if admin_count == 0 {
            log::info!("Creating admin account from environment: {}", username);
            let password_hash = auth_service
                .hash_password(&password)
                .expect("Failed to hash password");

            let mut admin = Admin {
                id: String::new(),
                username,
                password_hash,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };

            store
                .create_admin(&mut admin)
                .expect("Failed to create admin account");
            log::info!("Admin account created successfully");
        }
    }

    log::info!("Database: {}", db_path);
    log::info!("Starting portfolio-server on port {}", port);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .wrap(metrics_collector.clone())
            // Register Store and AuthService individually for the auth extractor
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(metrics_collector.clone()))
            // AppState for handlers that need both
            .app_data(web::Data::new(AppState {
                store: store.clone(),
                auth_service: auth_service.clone(),
            }))
            // Payload size limit for image uploads (25MB)
            .app_data(web::PayloadConfig::new(25 * 1024 * 1024))
            .route(
                "/api/metrics",
                web::get().to(metrics::get_metrics_handler),
            )
            .configure(api::configure_routes)
    })
    .workers(1); // Single worker for minimal memory

    server.bind(("0.0.0.0", port))?.run().await
}
