use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe SQLite content store. Holds the four site collections plus
/// uploaded assets and the admin account/session tables.
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store for testing
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS admins (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                admin_id TEXT NOT NULL,
                token TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (admin_id) REFERENCES admins(id)
            );

            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                name TEXT DEFAULT '',
                subtitle TEXT DEFAULT '',
                description TEXT DEFAULT '',
                profile_image_url TEXT DEFAULT '',
                email TEXT DEFAULT '',
                phone TEXT DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS works (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                image_url TEXT DEFAULT '',
                description TEXT DEFAULT '',
                order_index INTEGER DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS skills (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                percentage INTEGER DEFAULT 0,
                order_index INTEGER DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS social_links (
                id TEXT PRIMARY KEY,
                platform TEXT NOT NULL,
                url TEXT NOT NULL,
                icon_name TEXT DEFAULT '',
                order_index INTEGER DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS assets (
                id TEXT PRIMARY KEY,
                data BLOB,
                content_type TEXT NOT NULL,
                filename TEXT NOT NULL,
                size INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_token ON sessions(token);
            CREATE INDEX IF NOT EXISTS idx_works_order_index ON works(order_index);
            CREATE INDEX IF NOT EXISTS idx_skills_order_index ON skills(order_index);
            CREATE INDEX IF NOT EXISTS idx_social_links_order_index ON social_links(order_index);
            "#,
        )?;
        Ok(())
    }

    // ==================== Admin Operations ====================

    pub fn create_admin(&self, admin: &mut Admin) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        admin.id = Uuid::new_v4().to_string();
        let now = Utc::now();
        admin.created_at = now;
        admin.updated_at = now;

        conn.execute(
            r#"INSERT INTO admins (id, username, password_hash, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                &admin.id,
                &admin.username,
                &admin.password_hash,
                admin.created_at.to_rfc3339(),
                admin.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_admin(&self, id: &str) -> StoreResult<Admin> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM admins WHERE id = ?1", params![id], |row| {
            self.row_to_admin(row)
        })
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("Admin {}", id)),
            _ => StoreError::Database(e),
        })
    }

    pub fn get_admin_by_username(&self, username: &str) -> StoreResult<Admin> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM admins WHERE username = ?1",
            params![username],
            |row| self.row_to_admin(row),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound(format!("Admin {}", username))
            }
            _ => StoreError::Database(e),
        })
    }

    pub fn count_admins(&self) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_admin(&self, row: &rusqlite::Row) -> rusqlite::Result<Admin> {
        Ok(Admin {
            id: row.get("id")?,
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
            created_at: parse_datetime(row.get::<_, String>("created_at")?),
            updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
        })
    }

    // ==================== Session Operations ====================

    pub fn create_session(&self, session: &mut Session) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        session.id = Uuid::new_v4().to_string();
        session.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO sessions (id, admin_id, token, expires_at, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                &session.id,
                &session.admin_id,
                &session.token,
                session.expires_at.to_rfc3339(),
                session.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_session_by_token(&self, token: &str) -> StoreResult<Session> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM sessions WHERE token = ?1",
            params![token],
            |row| {
                Ok(Session {
                    id: row.get("id")?,
                    admin_id: row.get("admin_id")?,
                    token: row.get("token")?,
                    expires_at: parse_datetime(row.get::<_, String>("expires_at")?),
                    created_at: parse_datetime(row.get::<_, String>("created_at")?),
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound("Session".to_string()),
            _ => StoreError::Database(e),
        })
    }

    pub fn delete_session(&self, token: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }

    // ==================== Profile Operations ====================

    /// The profile collection is a singleton by convention: readers take the
    /// oldest record, or None when nothing has been saved yet.
    pub fn get_profile(&self) -> StoreResult<Option<Profile>> {
        let conn = self.conn.lock().unwrap();
        let profile = conn
            .query_row(
                "SELECT * FROM profiles ORDER BY created_at ASC LIMIT 1",
                [],
                |row| self.row_to_profile(row),
            )
            .optional()?;
        Ok(profile)
    }

    /// Create the profile record when the collection is empty, otherwise
    /// overwrite the oldest record in place. Keeps the collection at one row.
    pub fn save_profile(&self, profile: &mut Profile) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let existing: Option<(String, String)> = conn
            .query_row(
                "SELECT id, created_at FROM profiles ORDER BY created_at ASC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let now = Utc::now();
        profile.updated_at = now;

        match existing {
            Some((id, created_at)) => {
                profile.id = id;
                profile.created_at = parse_datetime(created_at);
                conn.execute(
                    r#"UPDATE profiles SET name = ?1, subtitle = ?2, description = ?3,
                       profile_image_url = ?4, email = ?5, phone = ?6, updated_at = ?7
                       WHERE id = ?8"#,
                    params![
                        &profile.name,
                        &profile.subtitle,
                        &profile.description,
                        &profile.profile_image_url,
                        &profile.email,
                        &profile.phone,
                        profile.updated_at.to_rfc3339(),
                        &profile.id,
                    ],
                )?;
            }
            None => {
                profile.id = Uuid::new_v4().to_string();
                profile.created_at = now;
                conn.execute(
                    r#"INSERT INTO profiles (id, name, subtitle, description, profile_image_url,
                       email, phone, created_at, updated_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
                    params![
                        &profile.id,
                        &profile.name,
                        &profile.subtitle,
                        &profile.description,
                        &profile.profile_image_url,
                        &profile.email,
                        &profile.phone,
                        profile.created_at.to_rfc3339(),
                        profile.updated_at.to_rfc3339(),
                    ],
                )?;
            }
        }
        Ok(())
    }

    fn row_to_profile(&self, row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        Ok(Profile {
            id: row.get("id")?,
            name: row.get("name")?,
            subtitle: row.get("subtitle")?,
            description: row.get("description")?,
            profile_image_url: row.get("profile_image_url")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            created_at: parse_datetime(row.get::<_, String>("created_at")?),
            updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
        })
    }

    // ==================== Work Operations ====================

    pub fn create_work(&self, work: &mut Work) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        work.id = Uuid::new_v4().to_string();
        let now = Utc::now();
        work.created_at = now;
        work.updated_at = now;

        conn.execute(
            r#"INSERT INTO works (id, title, category, image_url, description, order_index, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                &work.id,
                &work.title,
                work.category.as_str(),
                &work.image_url,
                &work.description,
                work.order_index,
                work.created_at.to_rfc3339(),
                work.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_work(&self, id: &str) -> StoreResult<Work> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM works WHERE id = ?1", params![id], |row| {
            self.row_to_work(row)
        })
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("Work {}", id)),
            _ => StoreError::Database(e),
        })
    }

    /// All works in display order (order_index ascending).
    pub fn list_works(&self) -> StoreResult<Vec<Work>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM works ORDER BY order_index ASC")?;
        let works = stmt
            .query_map([], |row| self.row_to_work(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(works)
    }

    /// Full-record overwrite; last write wins.
    pub fn update_work(&self, work: &mut Work) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        work.updated_at = Utc::now();

        let rows = conn.execute(
            r#"UPDATE works SET title = ?1, category = ?2, image_url = ?3, description = ?4,
               order_index = ?5, updated_at = ?6 WHERE id = ?7"#,
            params![
                &work.title,
                work.category.as_str(),
                &work.image_url,
                &work.description,
                work.order_index,
                work.updated_at.to_rfc3339(),
                &work.id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("Work {}", work.id)));
        }
        Ok(())
    }

    pub fn delete_work(&self, id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM works WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Work {}", id)));
        }
        Ok(())
    }

    fn row_to_work(&self, row: &rusqlite::Row) -> rusqlite::Result<Work> {
        let category_str: String = row.get("category")?;
        Ok(Work {
            id: row.get("id")?,
            title: row.get("title")?,
            category: WorkCategory::parse(&category_str).unwrap_or_default(),
            image_url: row.get("image_url")?,
            description: row.get("description")?,
            order_index: row.get("order_index")?,
            created_at: parse_datetime(row.get::<_, String>("created_at")?),
            updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
        })
    }

    // ==================== Skill Operations ====================

    pub fn create_skill(&self, skill: &mut Skill) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        skill.id = Uuid::new_v4().to_string();
        let now = Utc::now();
        skill.created_at = now;
        skill.updated_at = now;

        conn.execute(
            r#"INSERT INTO skills (id, name, percentage, order_index, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                &skill.id,
                &skill.name,
                skill.percentage,
                skill.order_index,
                skill.created_at.to_rfc3339(),
                skill.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_skill(&self, id: &str) -> StoreResult<Skill> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM skills WHERE id = ?1", params![id], |row| {
            self.row_to_skill(row)
        })
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("Skill {}", id)),
            _ => StoreError::Database(e),
        })
    }

    pub fn list_skills(&self) -> StoreResult<Vec<Skill>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM skills ORDER BY order_index ASC")?;
        let skills = stmt
            .query_map([], |row| self.row_to_skill(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(skills)
    }

    pub fn update_skill(&self, skill: &mut Skill) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        skill.updated_at = Utc::now();

        let rows = conn.execute(
            r#"UPDATE skills SET name = ?1, percentage = ?2, order_index = ?3, updated_at = ?4
               WHERE id = ?5"#,
            params![
                &skill.name,
                skill.percentage,
                skill.order_index,
                skill.updated_at.to_rfc3339(),
                &skill.id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("Skill {}", skill.id)));
        }
        Ok(())
    }

    pub fn delete_skill(&self, id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM skills WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Skill {}", id)));
        }
        Ok(())
    }

    fn row_to_skill(&self, row: &rusqlite::Row) -> rusqlite::Result<Skill> {
        Ok(Skill {
            id: row.get("id")?,
            name: row.get("name")?,
            percentage: row.get("percentage")?,
            order_index: row.get("order_index")?,
            created_at: parse_datetime(row.get::<_, String>("created_at")?),
            updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
        })
    }

    // ==================== Social Link Operations ====================

    pub fn create_social_link(&self, link: &mut SocialLink) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        link.id = Uuid::new_v4().to_string();
        link.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO social_links (id, platform, url, icon_name, order_index, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                &link.id,
                &link.platform,
                &link.url,
                &link.icon_name,
                link.order_index,
                link.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_social_link(&self, id: &str) -> StoreResult<SocialLink> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM social_links WHERE id = ?1",
            params![id],
            |row| self.row_to_social_link(row),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound(format!("Social link {}", id))
            }
            _ => StoreError::Database(e),
        })
    }

    pub fn list_social_links(&self) -> StoreResult<Vec<SocialLink>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT * FROM social_links ORDER BY order_index ASC")?;
        let links = stmt
            .query_map([], |row| self.row_to_social_link(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    pub fn update_social_link(&self, link: &mut SocialLink) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows = conn.execute(
            r#"UPDATE social_links SET platform = ?1, url = ?2, icon_name = ?3, order_index = ?4
               WHERE id = ?5"#,
            params![
                &link.platform,
                &link.url,
                &link.icon_name,
                link.order_index,
                &link.id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("Social link {}", link.id)));
        }
        Ok(())
    }

    pub fn delete_social_link(&self, id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM social_links WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Social link {}", id)));
        }
        Ok(())
    }

    fn row_to_social_link(&self, row: &rusqlite::Row) -> rusqlite::Result<SocialLink> {
        Ok(SocialLink {
            id: row.get("id")?,
            platform: row.get("platform")?,
            url: row.get("url")?,
            icon_name: row.get("icon_name")?,
            order_index: row.get("order_index")?,
            created_at: parse_datetime(row.get::<_, String>("created_at")?),
        })
    }

    // ==================== Asset Operations ====================

    pub fn create_asset(&self, asset: &mut Asset) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        asset.id = Uuid::new_v4().to_string();
        asset.created_at = Utc::now();

        conn.execute(
            r#"INSERT INTO assets (id, data, content_type, filename, size, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                &asset.id,
                &asset.data,
                &asset.content_type,
                &asset.filename,
                asset.size,
                asset.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_asset(&self, id: &str) -> StoreResult<Asset> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM assets WHERE id = ?1", params![id], |row| {
            Ok(Asset {
                id: row.get("id")?,
                data: row.get("data")?,
                content_type: row.get("content_type")?,
                filename: row.get("filename")?,
                size: row.get("size")?,
                created_at: parse_datetime(row.get::<_, String>("created_at")?),
            })
        })
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("Asset {}", id)),
            _ => StoreError::Database(e),
        })
    }
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
