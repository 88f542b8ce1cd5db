pub mod models;
pub mod pool;
pub mod schema;

use crate::error::{Error, Result};
use chrono::Utc;
use models::{Entry, NewEntry, NewUser, SeedPages, User};
use sqlx::SqlitePool;
use std::{future::Future, time::Duration};

const ENTRY_COLUMNS: &str = r#"
    pagetext.id,
    pagetext.page_id,
    pagetext.user_id,
    users.username,
    pagetext.text,
    pagetext.link_id,
    pagetext.created_at,
    pagetext.is_edited,
    pagetext.path,
    pagetext.source,
    pages.title AS source_title
FROM pagetext
INNER JOIN users ON pagetext.user_id = users.id
LEFT JOIN pages ON pagetext.source = pages.id
"#;

/// Database handle bounding every query with a timeout
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
    timeout: Duration,
}

impl Db {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn timed<T>(&self, query: impl Future<Output = Result<T, sqlx::Error>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }

    /// Creates the tables and seed pages when missing
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn init(&self) -> Result<()> {
        self.timed(sqlx::query(schema::SCHEMA_SQL).execute(&self.pool))
            .await?;

        match self
            .timed(sqlx::query(schema::ADD_SOURCE_COLUMN).execute(&self.pool))
            .await
        {
            Ok(_) => tracing::info!("added source column to pagetext"),
            Err(Error::Database(sqlx::Error::Database(e)))
                if e.message().contains("duplicate column name") => {}
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Looks up the Home and Profile pages
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn seed_pages(&self) -> Result<SeedPages> {
        let rows: Vec<(i64, String)> = self
            .timed(
                sqlx::query_as("SELECT id, title FROM pages WHERE title IN (?, ?)")
                    .bind(schema::HOME_TITLE)
                    .bind(schema::PROFILE_TITLE)
                    .fetch_all(&self.pool),
            )
            .await?;

        let find = |title: &str| {
            rows.iter()
                .find(|(_, t)| t == title)
                .map(|(id, _)| *id)
                .ok_or_else(|| Error::not_found(format!("missing required page {}", title)))
        };
        Ok(SeedPages {
            home: find(schema::HOME_TITLE)?,
            profile: find(schema::PROFILE_TITLE)?,
        })
    }

    #[tracing::instrument(level = "debug", skip(self, user), fields(username = user.username))]
    pub async fn insert_user(&self, user: &NewUser<'_>) -> Result<i64> {
        let res = self
            .timed(
                sqlx::query("INSERT INTO users (username, email, password) VALUES (?, ?, ?)")
                    .bind(user.username)
                    .bind(user.email)
                    .bind(user.password_hash)
                    .execute(&self.pool),
            )
            .await?;
        Ok(res.last_insert_rowid())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.timed(
            sqlx::query_as("SELECT * FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool),
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.timed(
            sqlx::query_as("SELECT * FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.timed(
            sqlx::query_as("SELECT * FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn page_title(&self, id: i64) -> Result<Option<String>> {
        self.timed(
            sqlx::query_scalar("SELECT title FROM pages WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    #[cfg(test)]
    pub async fn page_id(&self, title: &str) -> Result<Option<i64>> {
        self.timed(
            sqlx::query_scalar("SELECT id FROM pages WHERE title = ?")
                .bind(title)
                .fetch_optional(&self.pool),
        )
        .await
    }

    /// Returns the id of the page titled `title`, creating it if needed
    ///
    /// The insert and the lookup happen in one statement so concurrent
    /// callers always agree on the id.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn resolve_page(&self, title: &str) -> Result<i64> {
        self.timed(
            sqlx::query_scalar(
                r#"
                INSERT INTO pages (title) VALUES (?)
                ON CONFLICT(title) DO UPDATE SET title = pages.title
                RETURNING id
                "#,
            )
            .bind(title)
            .fetch_one(&self.pool),
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self, entry), fields(page_id = entry.page_id))]
    pub async fn insert_entry(&self, entry: &NewEntry<'_>) -> Result<i64> {
        let res = self
            .timed(
                sqlx::query(
                    r#"
                    INSERT INTO pagetext (page_id, user_id, text, is_link, link_id, created_at, path, source)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(entry.page_id)
                .bind(entry.user_id)
                .bind(entry.text)
                .bind(entry.link_id.is_some())
                .bind(entry.link_id)
                .bind(Utc::now().naive_utc())
                .bind(entry.path)
                .bind(entry.source)
                .execute(&self.pool),
            )
            .await?;
        Ok(res.last_insert_rowid())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn entry(&self, page_id: i64, id: i64) -> Result<Option<Entry>> {
        let sql = format!(
            "SELECT {} WHERE pagetext.page_id = ? AND pagetext.id = ?",
            ENTRY_COLUMNS
        );
        self.timed(
            sqlx::query_as(&sql)
                .bind(page_id)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    /// Entries of a page in creation order, optionally only those of `author`
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn entries(&self, page_id: i64, author: Option<i64>) -> Result<Vec<Entry>> {
        let sql = format!(
            r#"SELECT {}
            WHERE pagetext.page_id = ? AND (? IS NULL OR pagetext.user_id = ?)
            ORDER BY pagetext.created_at ASC, pagetext.id ASC"#,
            ENTRY_COLUMNS
        );
        self.timed(
            sqlx::query_as(&sql)
                .bind(page_id)
                .bind(author)
                .bind(author)
                .fetch_all(&self.pool),
        )
        .await
    }

    /// Rewrites an entry owned by `user_id`, returns whether a row changed
    #[tracing::instrument(level = "debug", skip(self, text))]
    pub async fn update_entry(
        &self,
        page_id: i64,
        id: i64,
        user_id: i64,
        text: &str,
        link_id: Option<i64>,
    ) -> Result<bool> {
        let res = self
            .timed(
                sqlx::query(
                    r#"
                    UPDATE pagetext SET text = ?, is_link = ?, link_id = ?, is_edited = 1
                    WHERE page_id = ? AND id = ? AND user_id = ?
                    "#,
                )
                .bind(text)
                .bind(link_id.is_some())
                .bind(link_id)
                .bind(page_id)
                .bind(id)
                .bind(user_id)
                .execute(&self.pool),
            )
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Deletes an entry owned by `user_id`, returns whether a row was removed
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn delete_entry(&self, page_id: i64, id: i64, user_id: i64) -> Result<bool> {
        let res = self
            .timed(
                sqlx::query("DELETE FROM pagetext WHERE page_id = ? AND id = ? AND user_id = ?")
                    .bind(page_id)
                    .bind(id)
                    .bind(user_id)
                    .execute(&self.pool),
            )
            .await?;
        Ok(res.rows_affected() > 0)
    }

    #[cfg(test)]
    pub async fn count_pages(&self, title: &str) -> Result<i64> {
        self.timed(
            sqlx::query_scalar("SELECT COUNT(*) FROM pages WHERE title = ?")
                .bind(title)
                .fetch_one(&self.pool),
        )
        .await
    }
}
