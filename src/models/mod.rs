use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile is the site owner's record. The collection holds at most one row;
/// readers always take the oldest record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub profile_image_url: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Work is a single portfolio piece shown in the gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    pub id: String,
    pub title: String,
    pub category: WorkCategory,
    pub image_url: String,
    pub description: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The four fixed gallery categories. Anything else is rejected at the API
/// boundary by deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkCategory {
    #[default]
    PosterDesign,
    ThumbnailDesign,
    LogoDesign,
    BusinessCard,
}

impl WorkCategory {
    pub const ALL: [WorkCategory; 4] = [
        WorkCategory::PosterDesign,
        WorkCategory::ThumbnailDesign,
        WorkCategory::LogoDesign,
        WorkCategory::BusinessCard,
    ];

    /// Wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkCategory::PosterDesign => "poster_design",
            WorkCategory::ThumbnailDesign => "thumbnail_design",
            WorkCategory::LogoDesign => "logo_design",
            WorkCategory::BusinessCard => "business_card",
        }
    }

    /// Human label shown on the public page.
    pub fn label(&self) -> &'static str {
        match self {
            WorkCategory::PosterDesign => "Poster Design",
            WorkCategory::ThumbnailDesign => "Thumbnail Design",
            WorkCategory::LogoDesign => "Logo Design",
            WorkCategory::BusinessCard => "Business Card",
        }
    }

    pub fn parse(s: &str) -> Option<WorkCategory> {
        match s {
            "poster_design" => Some(WorkCategory::PosterDesign),
            "thumbnail_design" => Some(WorkCategory::ThumbnailDesign),
            "logo_design" => Some(WorkCategory::LogoDesign),
            "business_card" => Some(WorkCategory::BusinessCard),
            _ => None,
        }
    }
}

/// Skill is one progress bar on the skills section.
/// Percentage is 0-100 by convention, not enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub percentage: i32,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// SocialLink is a footer link. icon_name is free text; unresolved names fall
/// back to a default glyph at render time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: String,
    pub platform: String,
    pub url: String,
    pub icon_name: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Asset stores uploaded image binary data, served at /assets/{id}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(skip_serializing)]
    pub data: Vec<u8>,
    pub content_type: String,
    pub filename: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

/// Admin is the account gating the editing API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session records an issued login token so sign-out can revoke it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub admin_id: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// Request/Response types for API

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: Admin,
}

#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    pub name: String,
    pub subtitle: String,
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkRequest {
    pub title: String,
    pub category: WorkCategory,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkRequest {
    pub title: Option<String>,
    pub category: Option<WorkCategory>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub percentage: i32,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSkillRequest {
    pub name: Option<String>,
    pub percentage: Option<i32>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSocialLinkRequest {
    pub platform: String,
    pub url: String,
    #[serde(default)]
    pub icon_name: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSocialLinkRequest {
    pub platform: Option<String>,
    pub url: Option<String>,
    pub icon_name: Option<String>,
    pub order_index: Option<i32>,
}

/// Returned from an asset upload. The url is what documents store.
#[derive(Debug, Serialize)]
pub struct UploadedAsset {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
