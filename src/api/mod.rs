use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{AdminUser, AuthService};
use crate::models::*;
use crate::render;
use crate::store::{Store, StoreError};

pub struct AppState {
    pub store: Arc<Store>,
    pub auth_service: Arc<AuthService>,
}

// ==================== Health Check ====================

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

// ==================== Public Site ====================

/// The single public page. Each section is fetched independently; a failed
/// fetch is logged and leaves that section empty.
pub async fn site(state: web::Data<AppState>) -> impl Responder {
    let profile = state.store.get_profile().unwrap_or_else(|e| {
        log::error!("Failed to load profile: {}", e);
        None
    });
    let works = state.store.list_works().unwrap_or_else(|e| {
        log::error!("Failed to load works: {}", e);
        Vec::new()
    });
    let skills = state.store.list_skills().unwrap_or_else(|e| {
        log::error!("Failed to load skills: {}", e);
        Vec::new()
    });
    let social_links = state.store.list_social_links().unwrap_or_else(|e| {
        log::error!("Failed to load social links: {}", e);
        Vec::new()
    });

    render::site_page(profile.as_ref(), &works, &skills, &social_links)
}

// ==================== Auth Endpoints ====================

pub async fn auth_status(state: web::Data<AppState>) -> impl Responder {
    let has_admin = state.store.count_admins().map(|c| c > 0).unwrap_or(false);
    HttpResponse::Ok().json(serde_json::json!({
        "hasAdmin": has_admin
    }))
}

pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let admin = match state.store.get_admin_by_username(&body.username) {
        Ok(a) => a,
        Err(StoreError::NotFound(_)) => {
            return HttpResponse::Unauthorized()
                .json(ApiResponse::<()>::error("Invalid credentials"));
        }
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Database error"));
        }
    };

    let valid = state
        .auth_service
        .verify_password(&body.password, &admin.password_hash)
        .unwrap_or(false);

    if !valid {
        return HttpResponse::Unauthorized().json(ApiResponse::<()>::error("Invalid credentials"));
    }

    let token = match state.auth_service.generate_token(&admin.id) {
        Ok(t) => t,
        Err(_) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to generate token"));
        }
    };

    // Record the session so logout can revoke the token
    let mut session = Session {
        id: String::new(),
        admin_id: admin.id.clone(),
        token: token.clone(),
        expires_at: Utc::now() + Duration::days(7),
        created_at: Utc::now(),
    };
    if let Err(e) = state.store.create_session(&mut session) {
        return HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to create session: {}", e)));
    }

    HttpResponse::Ok().json(ApiResponse::success(LoginResponse { token, admin }))
}

pub async fn logout(
    state: web::Data<AppState>,
    _admin: AdminUser,
    req: HttpRequest,
) -> impl Responder {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .unwrap_or_default();

    match state.store.delete_session(token) {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to sign out: {}", e))),
    }
}

pub async fn get_current_admin(state: web::Data<AppState>, admin: AdminUser) -> impl Responder {
    match state.store.get_admin(&admin.admin_id) {
        Ok(a) => HttpResponse::Ok().json(ApiResponse::success(a)),
        Err(_) => HttpResponse::NotFound().json(ApiResponse::<()>::error("Admin not found")),
    }
}

// ==================== Profile Endpoints ====================

pub async fn get_profile(state: web::Data<AppState>) -> impl Responder {
    match state.store.get_profile() {
        Ok(profile) => HttpResponse::Ok().json(ApiResponse::success(profile)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to load profile: {}", e))),
    }
}

pub async fn save_profile(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<SaveProfileRequest>,
) -> impl Responder {
    let mut profile = Profile {
        id: String::new(),
        name: body.name.clone(),
        subtitle: body.subtitle.clone(),
        description: body.description.clone(),
        profile_image_url: body.profile_image_url.clone(),
        email: body.email.clone(),
        phone: body.phone.clone(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    match state.store.save_profile(&mut profile) {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(profile)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to save profile: {}", e))),
    }
}

// ==================== Works Endpoints ====================

#[derive(Deserialize)]
pub struct ListWorksQuery {
    category: Option<String>,
}

pub async fn list_works(
    state: web::Data<AppState>,
    query: web::Query<ListWorksQuery>,
) -> impl Responder {
    let category = match query.category.as_deref() {
        None | Some("all") => None,
        Some(raw) => match WorkCategory::parse(raw) {
            Some(c) => Some(c),
            None => {
                return HttpResponse::BadRequest()
                    .json(ApiResponse::<()>::error(format!("Unknown category: {}", raw)));
            }
        },
    };

    match state.store.list_works() {
        Ok(works) => {
            let filtered = render::filter_works(&works, category);
            HttpResponse::Ok().json(ApiResponse::success(filtered))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to list works: {}", e))),
    }
}

pub async fn get_work(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.get_work(&id) {
        Ok(work) => HttpResponse::Ok().json(ApiResponse::success(work)),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Work not found"))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to get work: {}", e))),
    }
}

pub async fn create_work(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<CreateWorkRequest>,
) -> impl Responder {
    let mut work = Work {
        id: String::new(),
        title: body.title.clone(),
        category: body.category,
        image_url: body.image_url.clone(),
        description: body.description.clone(),
        order_index: body.order_index,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    match state.store.create_work(&mut work) {
        Ok(_) => HttpResponse::Created().json(ApiResponse::success(work)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to create work: {}", e))),
    }
}

pub async fn update_work(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<String>,
    body: web::Json<UpdateWorkRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let mut work = match state.store.get_work(&id) {
        Ok(w) => w,
        Err(StoreError::NotFound(_)) => {
            return HttpResponse::NotFound().json(ApiResponse::<()>::error("Work not found"));
        }
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error(format!("Failed to get work: {}", e)));
        }
    };

    // Apply updates
    if let Some(ref t) = body.title {
        work.title = t.clone();
    }
    if let Some(c) = body.category {
        work.category = c;
    }
    if let Some(ref u) = body.image_url {
        work.image_url = u.clone();
    }
    if let Some(ref d) = body.description {
        work.description = d.clone();
    }
    if let Some(o) = body.order_index {
        work.order_index = o;
    }

    match state.store.update_work(&mut work) {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(work)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to update work: {}", e))),
    }
}

pub async fn delete_work(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    match state.store.delete_work(&id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Work not found"))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to delete work: {}", e))),
    }
}

// ==================== Skills Endpoints ====================

pub async fn list_skills(state: web::Data<AppState>) -> impl Responder {
    match state.store.list_skills() {
        Ok(skills) => HttpResponse::Ok().json(ApiResponse::success(skills)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to list skills: {}", e))),
    }
}

pub async fn get_skill(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.get_skill(&id) {
        Ok(skill) => HttpResponse::Ok().json(ApiResponse::success(skill)),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Skill not found"))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to get skill: {}", e))),
    }
}

pub async fn create_skill(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<CreateSkillRequest>,
) -> impl Responder {
    let mut skill = Skill {
        id: String::new(),
        name: body.name.clone(),
        percentage: body.percentage,
        order_index: body.order_index,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    match state.store.create_skill(&mut skill) {
        Ok(_) => HttpResponse::Created().json(ApiResponse::success(skill)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to create skill: {}", e))),
    }
}

pub async fn update_skill(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<String>,
    body: web::Json<UpdateSkillRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let mut skill = match state.store.get_skill(&id) {
        Ok(s) => s,
        Err(StoreError::NotFound(_)) => {
            return HttpResponse::NotFound().json(ApiResponse::<()>::error("Skill not found"));
        }
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error(format!("Failed to get skill: {}", e)));
        }
    };

    if let Some(ref n) = body.name {
        skill.name = n.clone();
    }
    if let Some(p) = body.percentage {
        skill.percentage = p;
    }
    if let Some(o) = body.order_index {
        skill.order_index = o;
    }

    match state.store.update_skill(&mut skill) {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(skill)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to update skill: {}", e))),
    }
}

pub async fn delete_skill(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    match state.store.delete_skill(&id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Skill not found"))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to delete skill: {}", e))),
    }
}

// ==================== Social Links Endpoints ====================

pub async fn list_social_links(state: web::Data<AppState>) -> impl Responder {
    match state.store.list_social_links() {
        Ok(links) => HttpResponse::Ok().json(ApiResponse::success(links)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to list social links: {}", e))),
    }
}

pub async fn get_social_link(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.get_social_link(&id) {
        Ok(link) => HttpResponse::Ok().json(ApiResponse::success(link)),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Social link not found"))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to get social link: {}", e))),
    }
}

pub async fn create_social_link(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<CreateSocialLinkRequest>,
) -> impl Responder {
    let mut link = SocialLink {
        id: String::new(),
        platform: body.platform.clone(),
        url: body.url.clone(),
        icon_name: body.icon_name.clone(),
        order_index: body.order_index,
        created_at: Utc::now(),
    };

    match state.store.create_social_link(&mut link) {
        Ok(_) => HttpResponse::Created().json(ApiResponse::success(link)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to create social link: {}", e))),
    }
}

pub async fn update_social_link(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<String>,
    body: web::Json<UpdateSocialLinkRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let mut link = match state.store.get_social_link(&id) {
        Ok(l) => l,
        Err(StoreError::NotFound(_)) => {
            return HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Social link not found"));
        }
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error(format!("Failed to get social link: {}", e)));
        }
    };

    if let Some(ref p) = body.platform {
        link.platform = p.clone();
    }
    if let Some(ref u) = body.url {
        link.url = u.clone();
    }
    if let Some(ref i) = body.icon_name {
        link.icon_name = i.clone();
    }
    if let Some(o) = body.order_index {
        link.order_index = o;
    }

    match state.store.update_social_link(&mut link) {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::success(link)),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to update social link: {}", e))),
    }
}

pub async fn delete_social_link(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    match state.store.delete_social_link(&id) {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(StoreError::NotFound(_)) => {
            HttpResponse::NotFound().json(ApiResponse::<()>::error("Social link not found"))
        }
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to delete social link: {}", e))),
    }
}

// ==================== Assets Endpoints ====================

#[derive(Deserialize)]
pub struct UploadAssetQuery {
    filename: Option<String>,
}

/// Raw-body image upload. The stored document keeps only the returned URL.
pub async fn upload_asset(
    state: web::Data<AppState>,
    _admin: AdminUser,
    req: HttpRequest,
    query: web::Query<UploadAssetQuery>,
    body: web::Bytes,
) -> impl Responder {
    if body.is_empty() {
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error("Empty upload"));
    }

    let content_type = match req.content_type() {
        "" => "application/octet-stream".to_string(),
        ct => ct.to_string(),
    };
    let filename = query
        .filename
        .clone()
        .unwrap_or_else(|| "upload".to_string());

    let mut asset = Asset {
        id: String::new(),
        size: body.len() as i64,
        data: body.to_vec(),
        content_type,
        filename,
        created_at: Utc::now(),
    };

    match state.store.create_asset(&mut asset) {
        Ok(_) => HttpResponse::Created().json(ApiResponse::success(UploadedAsset {
            url: format!("/assets/{}", asset.id),
            id: asset.id,
            filename: asset.filename,
            content_type: asset.content_type,
            size: asset.size,
        })),
        Err(e) => HttpResponse::InternalServerError()
            .json(ApiResponse::<()>::error(format!("Failed to store asset: {}", e))),
    }
}

pub async fn get_asset(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.store.get_asset(&id) {
        Ok(asset) => HttpResponse::Ok()
            .content_type(asset.content_type)
            .body(asset.data),
        Err(StoreError::NotFound(_)) => HttpResponse::NotFound().finish(),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

// ==================== Route Configuration ====================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public page and assets
        .route("/", web::get().to(site))
        .route("/assets/{id}", web::get().to(get_asset))
        // Health check
        .route("/health", web::get().to(health))
        // Auth
        .route("/api/auth/status", web::get().to(auth_status))
        .route("/api/auth/login", web::post().to(login))
        .route("/api/auth/logout", web::post().to(logout))
        .route("/api/auth/me", web::get().to(get_current_admin))
        // Profile
        .route("/api/profile", web::get().to(get_profile))
        .route("/api/profile", web::put().to(save_profile))
        // Works
        .route("/api/works", web::get().to(list_works))
        .route("/api/works", web::post().to(create_work))
        .route("/api/works/{id}", web::get().to(get_work))
        .route("/api/works/{id}", web::put().to(update_work))
        .route("/api/works/{id}", web::delete().to(delete_work))
        // Skills
        .route("/api/skills", web::get().to(list_skills))
        .route("/api/skills", web::post().to(create_skill))
        .route("/api/skills/{id}", web::get().to(get_skill))
        .route("/api/skills/{id}", web::put().to(update_skill))
        .route("/api/skills/{id}", web::delete().to(delete_skill))
        // Social links
        .route("/api/social-links", web::get().to(list_social_links))
        .route("/api/social-links", web::post().to(create_social_link))
        .route("/api/social-links/{id}", web::get().to(get_social_link))
        .route("/api/social-links/{id}", web::put().to(update_social_link))
        .route("/api/social-links/{id}", web::delete().to(delete_social_link))
        // Assets
        .route("/api/assets", web::post().to(upload_asset));
}
