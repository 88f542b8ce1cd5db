use chrono::NaiveDateTime;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Encoded argon2 hash
    pub password: String,
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, FromRow)]
pub struct Page {
    pub id: i64,
    pub title: String,
}

/// Ids of the pages every database is seeded with
#[derive(Debug, Clone, Copy)]
pub struct SeedPages {
    pub home: i64,
    pub profile: i64,
}

/// A text entry joined with its author and source page
#[derive(Debug, Clone, FromRow)]
pub struct Entry {
    pub id: i64,
    pub page_id: i64,
    pub user_id: i64,
    pub username: String,
    pub text: String,
    pub link_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub is_edited: bool,
    pub path: Option<String>,
    pub source: Option<i64>,
    pub source_title: Option<String>,
}

impl Entry {
    pub fn is_link(&self) -> bool {
        self.link_id.is_some()
    }
}

pub struct NewEntry<'a> {
    pub page_id: i64,
    pub user_id: i64,
    pub text: &'a str,
    pub link_id: Option<i64>,
    pub path: &'a str,
    pub source: i64,
}
